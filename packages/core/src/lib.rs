//! Symthink Core Document Model
//!
//! This crate provides the argument-tree document model for the Symthink
//! structured-dialog system: typed nodes, tree editing, orphan recycling,
//! merge decisions and serialization.
//!
//! # Architecture
//!
//! - **Arena-owned tree**: `SymthinkDocument` owns every node in an id-keyed
//!   arena; parent links are plain id strings, so ownership always flows
//!   root → support
//! - **Tri-state children**: "never enabled" and "enabled but empty" are
//!   distinct states and survive serialization on the root card
//! - **Synchronous signals**: node, mode and action-log changes notify
//!   subscribers through reentrancy-safe [`events::Signal`]s
//! - **Tolerant wire format**: unknown node categories and older
//!   `$schemaVersion` values degrade gracefully instead of failing a load
//!
//! # Modules
//!
//! - [`models`] - Data structures (NodeData, Citation, card rules, time)
//! - [`document`] - The document arena, nodes and tree operations
//! - [`events`] - Signals, node events, action log, document modes
//!
//! # Example
//!
//! ```rust
//! use symthink_core::document::SymthinkDocument;
//! use symthink_core::models::{ArgType, NodeData};
//!
//! let mut doc = SymthinkDocument::new();
//! let root_id = doc.root_id().to_string();
//! doc.set_text(&root_id, "Should we ship it?");
//! let idea = doc
//!     .add_child(&root_id, Some(NodeData::with_text(ArgType::Idea, "Ship behind a flag")))
//!     .unwrap();
//! assert_eq!(doc.get(&idea).unwrap().kind, ArgType::Idea);
//! ```

pub mod document;
pub mod events;
pub mod models;

// Re-export commonly used types
pub use document::{
    Children, DocumentError, Labels, ShallowCopy, SourceRef, Symthink, SymthinkDocument,
    TypeTotals,
};
pub use events::{ActionKind, ActionLogEntry, DocMode, NodeEvent, Signal, SubscriberId};
pub use models::*;
