//! Serialized Document Shapes
//!
//! This module defines the plain-JSON shapes a Symthink document is loaded
//! from and serialized back to. The in-memory tree (`document::Symthink`)
//! is built from these shapes and produces them again via
//! `SymthinkDocument::to_raw_doc()`.
//!
//! # Wire format
//!
//! Field names are camelCase on the wire (`lastSupIsConcl`, `eventDate`,
//! `createdTime`). The root document adds `$schemaVersion`, `orphans`,
//! `format`, `decisions`, `uid` and `timestamp` on top of the node shape.
//! `support` distinguishes *absent* (children never enabled) from an
//! *empty array* (children enabled but none yet) — both states survive a
//! round trip.
//!
//! # Examples
//!
//! ```rust
//! use symthink_core::models::{ArgType, DocumentData};
//!
//! let data: DocumentData = serde_json::from_str(
//!     r#"{"type":"QUE","text":"root?","support":[{"type":"CLM","text":"a claim"}]}"#,
//! ).unwrap();
//! assert_eq!(data.node.kind, ArgType::Question);
//! assert_eq!(data.node.support.as_ref().unwrap().len(), 1);
//! ```

use crate::models::Citation;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Current serialized schema version. Older documents are accepted and
/// logged; migration is a no-op hook for now.
pub const SCHEMA_VERSION: i64 = 1;

/// Advisory cap on direct supports per node. Never enforced by the model;
/// the hosting UI decides what to do when `max_kids()` reports true.
pub const MAX_KIDS: usize = 10;

/// Argument category of a node.
///
/// Governs placeholder text, the trailing "sympunk" glyph and the default
/// category of the next child (see [`crate::models::card_rules`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ArgType {
    #[default]
    #[serde(rename = "QUE")]
    Question,
    #[serde(rename = "CLM")]
    Claim,
    #[serde(rename = "IDA")]
    Idea,
    #[serde(rename = "EVT")]
    Event,
    #[serde(rename = "SRC")]
    SourceList,
}

impl ArgType {
    /// Wire tag for this category (`QUE`, `CLM`, `IDA`, `EVT`, `SRC`).
    pub fn tag(&self) -> &'static str {
        match self {
            ArgType::Question => "QUE",
            ArgType::Claim => "CLM",
            ArgType::Idea => "IDA",
            ArgType::Event => "EVT",
            ArgType::SourceList => "SRC",
        }
    }
}

impl std::fmt::Display for ArgType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

// Deserialization is lenient: an unknown tag is warned about and falls back
// to Question so a partially bad document still loads.
impl<'de> Deserialize<'de> for ArgType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "QUE" => ArgType::Question,
            "CLM" => ArgType::Claim,
            "IDA" => ArgType::Idea,
            "EVT" => ArgType::Event,
            "SRC" => ArgType::SourceList,
            other => {
                tracing::warn!("Unknown argument type tag '{}', defaulting to QUE", other);
                ArgType::Question
            }
        })
    }
}

/// Document-level rendering format, serialized as an integer.
///
/// `Review` puts the first citation at the top instead of a byline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocFormat {
    #[default]
    Default,
    Review,
}

impl Serialize for DocFormat {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(match self {
            DocFormat::Default => 1,
            DocFormat::Review => 2,
        })
    }
}

impl<'de> Deserialize<'de> for DocFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Ok(match value {
            2 => DocFormat::Review,
            1 => DocFormat::Default,
            other => {
                tracing::warn!("Unknown document format {}, defaulting", other);
                DocFormat::Default
            }
        })
    }
}

/// Record of a resolved merge: which of several alternative child branches
/// replaced a node. Appended to the document's `decisions` log by
/// `SymthinkDocument::decide()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// ISO timestamp of the decision.
    pub ts: String,
    /// Admin level the decision was made at.
    pub scope: String,
    /// Location of the decision within the scope, if scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// `|`-separated subscription paths of `userId/docUid/nodeId`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
}

/// Serialized shape of one argument-tree node.
///
/// `support: None` means children were never enabled; `support: Some(vec![])`
/// means enabled but empty. Orphans carry an `expires` stamp (epoch
/// milliseconds); `eventDate` and `lastmod` are epoch seconds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: ArgType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Fully qualified URL of a public Symthink document this node
    /// references instead of expanding its own supports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub support: Option<Vec<NodeData>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Vec<Citation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sup_is_concl: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<bool>,

    /// UTC seconds; Events only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,

    /// Provenance: epoch milliseconds at creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<i64>,

    /// Provenance: creator display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,

    /// UTC seconds of the last modification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<i64>,

    /// Orphans only: epoch milliseconds after which the orphan is
    /// discarded by `cleanup()`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
}

impl NodeData {
    /// Shorthand for a node with just a category and text, the shape most
    /// callers pass to `add_child`.
    pub fn with_text(kind: ArgType, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Serialized shape of a whole document: the root node plus document-wide
/// state. `timestamp` is an opaque passthrough (the hosting store's own
/// metadata); the model never interprets it beyond `modified_time()`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentData {
    #[serde(rename = "$schemaVersion", skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<i64>,

    #[serde(flatten)]
    pub node: NodeData,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub orphans: Option<Vec<NodeData>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<DocFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub decisions: Option<Vec<Decision>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<serde_json::Value>,
}
