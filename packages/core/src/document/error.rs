//! Document Error Types
//!
//! Expected "not found" conditions are surfaced as `Option`/`bool` by the
//! tree operations; these errors cover the cases a caller cannot sensibly
//! continue from.

use thiserror::Error;

/// Structural and contract failures of the document tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// A node's parent chain does not reach the root — the tree is broken.
    #[error("Node {id} is detached from the document tree")]
    DetachedNode { id: String },

    /// Linking to a document that carries no URL.
    #[error("Cannot link document {uid}: it has no URL")]
    MissingUrl { uid: String },
}

impl DocumentError {
    pub fn detached(id: impl Into<String>) -> Self {
        Self::DetachedNode { id: id.into() }
    }

    pub fn missing_url(uid: impl Into<String>) -> Self {
        Self::MissingUrl { uid: uid.into() }
    }
}
