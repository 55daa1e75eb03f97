//! Data Models
//!
//! Serialized document shapes and the static lookup tables that go with
//! them:
//!
//! - `NodeData` / `DocumentData` - the plain-JSON wire shapes
//! - `Citation` - CSL-JSON bibliographic records
//! - `card_rules` - per-category editing rules, bullets and sympunk glyphs
//! - `time` - clock abstraction for deterministic expiry tests

pub mod card_rules;
mod citation;
mod node;
pub mod time;

pub use citation::{Citation, CitationAuthor, IssuedDate};
pub use node::{
    ArgType, Decision, DocFormat, DocumentData, NodeData, MAX_KIDS, SCHEMA_VERSION,
};
