//! Change Notification
//!
//! Observer-pattern signals for document mutation. Every mutating operation
//! emits on a per-node or document-level [`Signal`] *after* the structural
//! edit completes, so subscribers always observe a consistent post-mutation
//! state. Fan-out is synchronous; there is no queueing and no hidden
//! process-wide registry — each signal owns its listener set and lives as
//! long as the node or document that carries it.
//!
//! # Examples
//!
//! ```rust
//! use symthink_core::events::Signal;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let signal: Signal<u32> = Signal::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = seen.clone();
//! let id = signal.subscribe(move |value| {
//!     counter.fetch_add(*value as usize, Ordering::SeqCst);
//! });
//! signal.emit(&3);
//! signal.unsubscribe(id);
//! signal.emit(&5);
//! assert_eq!(seen.load(Ordering::SeqCst), 3);
//! ```

use std::sync::{Arc, Mutex};

/// Handle returned by [`Signal::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct SignalInner<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

/// A synchronous multi-subscriber signal.
///
/// Cloning is cheap and shares the listener set, which lets a signal be
/// handed out of the document while mutations continue. Emission snapshots
/// the listener list before invoking callbacks, so a callback may itself
/// subscribe or unsubscribe without deadlocking.
pub struct Signal<T> {
    inner: Arc<Mutex<SignalInner<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SignalInner {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register a listener; returns the id to unsubscribe with.
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> SubscriberId {
        let mut inner = self.inner.lock().expect("signal lock poisoned");
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Arc::new(listener)));
        SubscriberId(id)
    }

    /// Remove a listener. Unknown ids are a no-op.
    pub fn unsubscribe(&self, id: SubscriberId) {
        let mut inner = self.inner.lock().expect("signal lock poisoned");
        inner.listeners.retain(|(listener_id, _)| *listener_id != id.0);
    }

    /// Invoke every current listener with `value`.
    pub fn emit(&self, value: &T) {
        let listeners: Vec<Listener<T>> = {
            let inner = self.inner.lock().expect("signal lock poisoned");
            inner
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect()
        };
        for listener in listeners {
            listener(value);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().expect("signal lock poisoned").listeners.len()
    }
}

/// Per-node change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvent {
    /// A direct child was appended (`added = true`) or detached.
    SupportChanged { added: bool },
    /// The node's selected flag changed.
    Selected(bool),
    /// Content, sources or merge state changed.
    Modified,
}

/// Kinds of document actions recorded on the action log signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    AddChild,
    RemoveChild,
    AdoptOrphan,
    MakeOrphan,
    Reorder,
    Edit,
    AddSource,
    RemoveSource,
}

/// One entry on the document's action log: what happened and when
/// (epoch milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionLogEntry {
    pub action: ActionKind,
    pub ts: i64,
}

/// Mutually exclusive document-wide UI mode.
///
/// The model validates no transition — any mode may follow any other; its
/// only contract is that exactly one mode is current and every change is
/// observable on the document's mode signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocMode {
    /// Behind a modal or side panel.
    #[default]
    Hidden,
    Viewing,
    /// Displaying drag handles.
    Ranking,
    /// Displaying the selection bar.
    Voting,
    /// Displaying a textarea.
    Editing,
}
