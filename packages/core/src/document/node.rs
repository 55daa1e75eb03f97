//! Tree Node
//!
//! One entry in the argument tree. Nodes live in the document's arena and
//! reference parent and children by id; ownership flows strictly
//! parent → child through the arena, so the `parent` back-reference can
//! never create a cycle. Structural fields (`id`, `parent`, `children`,
//! `selected`) are only writable through `SymthinkDocument` operations,
//! which keep the tree invariants and fire the change signals.

use crate::events::{NodeEvent, Signal, SubscriberId};
use crate::models::{ArgType, Citation, Decision, NodeData, MAX_KIDS};
use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Child list tri-state: "children never enabled" is distinct from
/// "enabled but none yet", and both survive serialization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Children {
    #[default]
    Disabled,
    Enabled(Vec<String>),
}

impl Children {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Children::Enabled(_))
    }

    /// Child ids in order; empty when disabled.
    pub fn ids(&self) -> &[String] {
        match self {
            Children::Disabled => &[],
            Children::Enabled(ids) => ids,
        }
    }

    pub fn len(&self) -> usize {
        self.ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids().is_empty()
    }
}

fn leading_label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^:]+:").expect("valid leading label pattern"))
}

/// One argument-tree entry: typed content, citation sources, an optional
/// child list and a change signal.
#[derive(Debug, Clone)]
pub struct Symthink {
    pub(crate) id: String,
    pub kind: ArgType,
    /// Short caption for outline and mind-map displays, derived from a
    /// leading `label: body` pattern in `text`.
    pub label: Option<String>,
    pub text: String,
    /// When present the node is a reference to another public document
    /// rather than an expandable argument.
    pub url: Option<Url>,
    pub(crate) children: Children,
    pub sources: Vec<Citation>,
    pub(crate) parent: Option<String>,
    pub(crate) selected: bool,
    pub event_date: Option<DateTime<Utc>>,
    /// Render supports numbered instead of bulleted.
    pub numeric: bool,
    pub decision: Option<Decision>,
    pub created_time: Option<i64>,
    pub creator: Option<String>,
    pub creator_id: Option<String>,
    /// UTC seconds of the last modification.
    pub lastmod: Option<i64>,
    /// The last support renders as a conclusion, not a regular item.
    pub last_sup_is_concl: bool,
    pub(crate) signal: Signal<NodeEvent>,
}

impl Symthink {
    pub(crate) fn new(id: String, parent: Option<String>) -> Self {
        Self {
            id,
            kind: ArgType::Question,
            label: None,
            text: String::new(),
            url: None,
            children: Children::Disabled,
            sources: Vec::new(),
            parent,
            selected: false,
            event_date: None,
            numeric: false,
            decision: None,
            created_time: None,
            creator: None,
            creator_id: None,
            lastmod: None,
            last_sup_is_concl: false,
            signal: Signal::new(),
        }
    }

    /// Immutable once assigned; unique within the document.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Parent node id; `None` only for the document root.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Direct child ids in order.
    pub fn child_ids(&self) -> &[String] {
        self.children.ids()
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    /// Handle to this node's change signal; survives independently of the
    /// borrow on the node.
    pub fn events(&self) -> Signal<NodeEvent> {
        self.signal.clone()
    }

    /// Register a listener on this node's change signal.
    pub fn subscribe(&self, listener: impl Fn(&NodeEvent) + Send + Sync + 'static) -> SubscriberId {
        self.signal.subscribe(listener)
    }

    pub fn is_event(&self) -> bool {
        self.kind == ArgType::Event
    }

    pub fn is_source(&self) -> bool {
        self.kind == ArgType::SourceList
    }

    pub fn is_claim(&self) -> bool {
        self.kind == ArgType::Claim
    }

    pub fn has_kids(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_kid_enabled(&self) -> bool {
        self.children.is_enabled()
    }

    /// True exactly when children are enabled but empty.
    pub fn can_disable(&self) -> bool {
        self.is_kid_enabled() && !self.has_kids()
    }

    /// Advisory UI limit; never enforced by mutation operations.
    pub fn max_kids(&self) -> bool {
        self.children.len() >= MAX_KIDS
    }

    pub fn last_child_id(&self) -> Option<&str> {
        self.children.ids().last().map(String::as_str)
    }

    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }

    /// Converts "no children" into "empty list". Returns false when
    /// children were already enabled.
    pub(crate) fn enable_kids(&mut self) -> bool {
        if self.children.is_enabled() {
            return false;
        }
        self.children = Children::Enabled(Vec::new());
        true
    }

    /// Reverts to "children never enabled". Only succeeds while the list
    /// is empty; the label is cleared with it.
    pub(crate) fn disable_kids(&mut self) -> bool {
        if self.has_kids() {
            return false;
        }
        self.children = Children::Disabled;
        self.label = None;
        true
    }

    /// Copy the scalar fields of `data` onto this node. Children and
    /// orphan bookkeeping are the document's job. Malformed optional
    /// fields (bad URL, bad event date) are warned about and omitted.
    pub(crate) fn apply_scalars(&mut self, data: &NodeData, now_millis: i64) {
        self.kind = data.kind;
        self.label = data.label.clone();
        self.text = data.text.clone().unwrap_or_default();
        self.numeric = data.numeric.unwrap_or(false);
        self.decision = data.decision.clone();
        self.created_time = data.created_time.or(Some(now_millis));
        self.creator = data.creator.clone();
        self.creator_id = data.creator_id.clone();
        self.last_sup_is_concl = data.last_sup_is_concl.unwrap_or(false);
        self.lastmod = data.lastmod;
        self.event_date = data.event_date.and_then(|seconds| {
            match Utc.timestamp_opt(seconds, 0).single() {
                Some(date) => Some(date),
                None => {
                    tracing::warn!("Invalid event date {} on node {}", seconds, self.id);
                    None
                }
            }
        });
        if let Some(source) = &data.source {
            self.sources = source.clone();
        }
        self.url = data.url.as_ref().and_then(|raw| match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(err) => {
                tracing::warn!("Invalid URL on node {}: {}", self.id, err);
                None
            }
        });
    }

    /// Serialized form of this node's scalar fields. The document layers
    /// `support` (and `expires` for orphans) on top.
    pub(crate) fn raw_scalars(&self) -> NodeData {
        NodeData {
            id: Some(self.id.clone()),
            kind: self.kind,
            label: self.label.clone(),
            text: Some(self.text.clone()),
            url: self.url.as_ref().map(Url::to_string),
            support: None,
            source: if self.sources.is_empty() {
                None
            } else {
                Some(self.sources.clone())
            },
            last_sup_is_concl: Some(self.last_sup_is_concl),
            numeric: self.numeric.then_some(true),
            event_date: self.event_date.map(|date| date.timestamp()),
            decision: self.decision.clone(),
            created_time: self.created_time,
            creator: self.creator.clone(),
            creator_id: self.creator_id.clone(),
            lastmod: self.lastmod,
            expires: None,
        }
    }

    /// True when the node carries any caption or body content.
    pub fn has_item_text(&self) -> bool {
        !self.text.is_empty() || self.label.as_ref().is_some_and(|label| !label.is_empty())
    }

    /// Text shown when the node appears as a support item. Splits a
    /// leading `label: body` out of `text` on first use and capitalizes
    /// the label.
    pub fn support_item_text(&mut self) -> String {
        if let Some((label, body)) = self.text.split_once(':') {
            let label = label.trim().to_string();
            let body = body.trim().to_string();
            if !label.is_empty() {
                self.label = Some(label);
            }
            self.text = body;
        }
        if let Some(label) = &mut self.label {
            let mut chars = label.chars();
            if let Some(first) = chars.next() {
                *label = first.to_uppercase().collect::<String>() + chars.as_str();
            }
        }
        match &self.label {
            Some(label) if !label.is_empty() => format!("{}: {}", label, self.text.trim()),
            _ => self.text.trim().to_string(),
        }
    }

    /// Text shown when the node is the current card. While editing, a
    /// stored label is folded back into `label:text` form for the editor.
    pub fn current_item_text(&self, editing: bool) -> Option<String> {
        if editing {
            if let Some(label) = &self.label {
                if !label.is_empty() && !self.text.contains(':') {
                    let mut chars = label.chars();
                    let capitalized = match chars.next() {
                        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                        None => String::new(),
                    };
                    return Some(format!("{}:{}", capitalized, self.text));
                }
            }
        }
        if self.text.is_empty() {
            None
        } else {
            Some(self.text.clone())
        }
    }

    /// Fits on a single display line.
    pub fn single_line(&self) -> bool {
        let label_part = self
            .label
            .as_ref()
            .filter(|label| !label.is_empty())
            .map(|label| label.len() + 2)
            .unwrap_or(0);
        let len = label_part + self.text.trim().len();
        len > 0 && len < 25
    }

    /// Caption for outline displays: the label, else the text up to the
    /// first colon, else the text.
    pub fn short_text(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        if leading_label_regex().is_match(&self.text) {
            if let Some((prefix, _)) = self.text.split_once(':') {
                return prefix.to_string();
            }
        }
        if self.text.is_empty() {
            " ".to_string()
        } else {
            self.text.clone()
        }
    }

    /// Lowercased caption used in ancestor label paths; empty for the
    /// root.
    pub fn label_text(&self) -> String {
        if self.is_root() {
            return String::new();
        }
        let raw = match &self.label {
            Some(label) => label.clone(),
            None => match self.text.find(':') {
                Some(position) => self.text[..position].to_string(),
                None => String::new(),
            },
        };
        raw.trim().to_lowercase()
    }
}
