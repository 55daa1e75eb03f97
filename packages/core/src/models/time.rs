//! Time Provider Abstraction
//!
//! Orphan expiration and provenance stamps depend on "now"; routing every
//! clock read through a trait keeps those paths deterministic in tests
//! without thread sleeps. The document owns a clock handle, so the mock is
//! part of the public API rather than test-only: a host hands the same
//! handle to the document and advances it from outside.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

/// Source of the current time.
pub trait TimeProvider: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;

    /// Current time as epoch milliseconds.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// Current time as epoch seconds.
    fn now_seconds(&self) -> i64 {
        self.now().timestamp()
    }
}

/// System clock; the default for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for deterministic tests.
///
/// Cloning shares the underlying instant, so a copy handed to a document
/// and a copy kept by the test advance together.
///
/// # Examples
///
/// ```rust
/// use symthink_core::models::time::{MockTimeProvider, TimeProvider};
/// use chrono::Duration;
///
/// let clock = MockTimeProvider::new();
/// let before = clock.now();
/// clock.advance(Duration::days(7));
/// assert_eq!(clock.now() - before, Duration::days(7));
/// ```
#[derive(Debug, Clone)]
pub struct MockTimeProvider {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl MockTimeProvider {
    /// Mock clock starting at the real current time.
    pub fn new() -> Self {
        Self::with_time(Utc::now())
    }

    /// Mock clock starting at a specific instant.
    pub fn with_time(time: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(time)),
        }
    }

    /// Jump to a specific instant.
    pub fn set_time(&self, time: DateTime<Utc>) {
        *self.current.lock().expect("clock lock poisoned") = time;
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: chrono::Duration) {
        let mut current = self.current.lock().expect("clock lock poisoned");
        *current += duration;
    }
}

impl Default for MockTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for MockTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().expect("clock lock poisoned")
    }
}
