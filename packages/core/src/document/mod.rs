//! Document Tree
//!
//! `SymthinkDocument` owns every node of one argument tree in an arena
//! keyed by node id. Parent links are plain id strings, ownership flows
//! strictly root → support, and all structural mutation goes through the
//! document so the tree invariants hold: ids stay unique, exactly one node
//! (the root) has no parent, and a non-empty child list is never silently
//! disabled.
//!
//! Mutations fire their change signals *after* the edit completes, so a
//! subscriber always observes consistent state. Expected "not found"
//! conditions return `Option`/`bool`; only a broken parent chain is an
//! error (see [`DocumentError`]).
//!
//! # Examples
//!
//! ```rust
//! use symthink_core::document::SymthinkDocument;
//! use symthink_core::models::DocumentData;
//!
//! let data: DocumentData = serde_json::from_str(
//!     r#"{"type":"QUE","text":"root?","support":[{"type":"CLM","text":"a claim"}]}"#,
//! ).unwrap();
//! let doc = SymthinkDocument::from_data(data);
//! assert!(doc.root().has_kids());
//! assert_eq!(doc.get_total_nodes(), 2);
//! ```

mod error;
mod node;

pub use error::DocumentError;
pub use node::{Children, Symthink};

use crate::events::{ActionKind, ActionLogEntry, DocMode, NodeEvent, Signal};
use crate::models::card_rules::{bullet, card_rule};
use crate::models::time::{SystemTimeProvider, TimeProvider};
use crate::models::{
    ArgType, Citation, Decision, DocFormat, DocumentData, NodeData, SCHEMA_VERSION,
};
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// How long a detached subtree waits in the orphan pool before `cleanup()`
/// may discard it.
const ORPHAN_TTL_DAYS: i64 = 7;

/// One citation tagged with its owner, so it can be deleted again by
/// `(owner_id, index)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRef {
    pub owner_id: String,
    /// Index within the owner's source list.
    pub index: usize,
    pub citation: Citation,
}

/// Node counts per category, root included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeTotals {
    pub question_cnt: usize,
    pub claim_cnt: usize,
    pub idea_cnt: usize,
}

/// Ancestor label path plus the labels of the node's own supports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Labels {
    /// Root-to-node captions, lowercased; the root contributes "".
    pub path: Vec<String>,
    pub support_labels: Vec<String>,
}

/// Flat single-card summary used by share/preview surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShallowCopy {
    pub text: String,
    pub conclusion: String,
    pub numeric: bool,
    pub supports: Vec<String>,
}

/// The root of an argument tree plus document-wide state: schema version,
/// orphan pool, decision log, UI mode and the action log signal.
pub struct SymthinkDocument {
    nodes: HashMap<String, Symthink>,
    root: String,
    schema_version: i64,
    orphans: Vec<NodeData>,
    format: DocFormat,
    uid: Option<String>,
    timestamp: Option<serde_json::Value>,
    /// `None` when the serialized document carried no `decisions` key;
    /// an empty list is a distinct, round-tripped state.
    decisions: Option<Vec<Decision>>,
    mode: DocMode,
    mode_signal: Signal<DocMode>,
    log_signal: Signal<ActionLogEntry>,
    /// Cursor for the voting-mode selection bar; persisted host-side, not
    /// part of the serialized document.
    pub vote_for_top: i32,
    clock: Arc<dyn TimeProvider>,
}

impl Default for SymthinkDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SymthinkDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymthinkDocument")
            .field("root", &self.root)
            .field("nodes", &self.nodes.len())
            .field("orphans", &self.orphans.len())
            .field("mode", &self.mode)
            .finish()
    }
}

impl SymthinkDocument {
    /// Empty document with a generated root id.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Empty document with a caller-supplied root id.
    pub fn with_id(id: impl Into<String>) -> Self {
        let root = id.into();
        let mut nodes = HashMap::new();
        nodes.insert(root.clone(), Symthink::new(root.clone(), None));
        Self {
            nodes,
            root,
            schema_version: SCHEMA_VERSION,
            orphans: Vec::new(),
            format: DocFormat::Default,
            uid: None,
            timestamp: None,
            decisions: None,
            mode: DocMode::Hidden,
            mode_signal: Signal::new(),
            log_signal: Signal::new(),
            vote_for_top: 0,
            clock: Arc::new(SystemTimeProvider),
        }
    }

    /// Construct and [`load`](Self::load) in one step.
    pub fn from_data(data: DocumentData) -> Self {
        let mut doc = Self::new();
        doc.load(data);
        doc
    }

    /// Replace the clock; tests hand in a `MockTimeProvider` here.
    pub fn set_clock(&mut self, clock: Arc<dyn TimeProvider>) {
        self.clock = clock;
    }

    // ---- accessors ------------------------------------------------------

    pub fn root_id(&self) -> &str {
        &self.root
    }

    pub fn root(&self) -> &Symthink {
        &self.nodes[&self.root]
    }

    pub fn get(&self, id: &str) -> Option<&Symthink> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn schema_version(&self) -> i64 {
        self.schema_version
    }

    pub fn format(&self) -> DocFormat {
        self.format
    }

    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    /// Detached subtrees awaiting re-adoption or expiry.
    pub fn orphans(&self) -> &[NodeData] {
        &self.orphans
    }

    /// Append-only log of resolved merge decisions.
    pub fn decisions(&self) -> &[Decision] {
        self.decisions.as_deref().unwrap_or_default()
    }

    /// The root's label, else its text.
    pub fn title(&self) -> String {
        let root = self.root();
        match &root.label {
            Some(label) if !label.is_empty() => label.clone(),
            _ => root.text.clone(),
        }
    }

    /// Last modification in epoch milliseconds: the store timestamp when
    /// present, else the root's `lastmod`.
    pub fn modified_time(&self) -> Option<i64> {
        if let Some(seconds) = self
            .timestamp
            .as_ref()
            .and_then(|ts| ts.get("seconds"))
            .and_then(serde_json::Value::as_i64)
        {
            return Some(seconds * 1000);
        }
        self.root().lastmod.map(|seconds| seconds * 1000)
    }

    // ---- mode and logging -----------------------------------------------

    pub fn mode(&self) -> DocMode {
        self.mode
    }

    /// Switch the document-wide mode and notify mode subscribers. Any mode
    /// may follow any other.
    pub fn set_mode(&mut self, mode: DocMode) {
        self.mode = mode;
        self.mode_signal.emit(&mode);
    }

    /// Signal emitting on every mode change.
    pub fn mode_events(&self) -> Signal<DocMode> {
        self.mode_signal.clone()
    }

    /// Signal emitting one entry per logged structural action.
    pub fn action_log(&self) -> Signal<ActionLogEntry> {
        self.log_signal.clone()
    }

    /// Record an action on the log signal. Public so a host can log edits
    /// it performs outside the model (e.g. drag-reordering previews).
    pub fn log_action(&self, action: ActionKind) {
        self.log_signal.emit(&ActionLogEntry {
            action,
            ts: self.clock.now_millis(),
        });
    }

    fn emit_node(&self, id: &str, event: NodeEvent) {
        if let Some(node) = self.nodes.get(id) {
            let signal = node.events();
            signal.emit(&event);
        }
    }

    // ---- load / serialize -----------------------------------------------

    /// Populate the document from its serialized form, replacing the
    /// current tree. Missing or older `$schemaVersion` values are accepted
    /// and noted; subscribers on the root node survive the reload.
    pub fn load(&mut self, data: DocumentData) {
        self.schema_version = data.schema_version.unwrap_or(SCHEMA_VERSION);
        if self.schema_version < SCHEMA_VERSION {
            tracing::info!(
                "Schema migrate from {} to {}",
                self.schema_version,
                SCHEMA_VERSION
            );
        }
        self.orphans = data.orphans.unwrap_or_default();
        self.format = data.format.unwrap_or_default();
        self.uid = data.uid;
        self.timestamp = data.timestamp;
        self.decisions = data.decisions;
        self.vote_for_top = 0;

        let root_signal = self.root().events();
        let root_id = data.node.id.clone().unwrap_or_else(|| self.root.clone());
        self.nodes.clear();
        let mut root = Symthink::new(root_id.clone(), None);
        root.signal = root_signal;
        self.nodes.insert(root_id.clone(), root);
        self.root = root_id.clone();
        self.apply_data(&root_id, data.node);
    }

    /// Copy `data` onto an existing node, rebuilding its subtree when the
    /// data carries one.
    fn apply_data(&mut self, id: &str, data: NodeData) {
        let now = self.clock.now_millis();
        let support = data.support.clone();
        if let Some(node) = self.nodes.get_mut(id) {
            node.apply_scalars(&data, now);
        } else {
            return;
        }
        if let Some(children) = support {
            if let Some(node) = self.nodes.get_mut(id) {
                node.enable_kids();
            }
            for child in children {
                self.add_child_with_log(id, Some(child), false);
            }
        }
    }

    /// Serialized form of one node. With `deep`, each child recurses with
    /// its own `deep` flag set to whether it has children, so the
    /// recursion bottoms out at leaves.
    pub fn to_raw(&self, id: &str, deep: bool) -> Option<NodeData> {
        let node = self.nodes.get(id)?;
        let mut raw = node.raw_scalars();
        if deep && node.is_kid_enabled() {
            let support = node
                .child_ids()
                .iter()
                .filter_map(|child_id| {
                    let child_has_kids = self
                        .nodes
                        .get(child_id)
                        .map(Symthink::has_kids)
                        .unwrap_or(false);
                    self.to_raw(child_id, child_has_kids)
                })
                .collect();
            raw.support = Some(support);
        }
        Some(raw)
    }

    /// Full serialization: the tree plus orphans, decisions, format and
    /// identifiers. `load` of the result reproduces an equivalent tree.
    pub fn to_raw_doc(&self) -> DocumentData {
        let node = self
            .to_raw(&self.root, true)
            .unwrap_or_default();
        DocumentData {
            schema_version: Some(SCHEMA_VERSION),
            node,
            orphans: Some(self.orphans.clone()),
            format: Some(self.format),
            decisions: self.decisions.clone(),
            uid: self.uid.clone(),
            timestamp: self.timestamp.clone(),
        }
    }

    // ---- structural mutation --------------------------------------------

    fn claim_id(&self, wanted: Option<String>) -> String {
        match wanted {
            Some(id) if !id.is_empty() && !self.nodes.contains_key(&id) => id,
            Some(id) => {
                tracing::debug!("Node id {} already taken, generating a fresh one", id);
                Uuid::new_v4().to_string()
            }
            None => Uuid::new_v4().to_string(),
        }
    }

    /// Append a new support under `parent_id`, enabling children first if
    /// needed. `data` defaults to an empty Question. Returns the new
    /// node's id, or `None` when the parent doesn't exist.
    pub fn add_child(&mut self, parent_id: &str, data: Option<NodeData>) -> Option<String> {
        self.add_child_with_log(parent_id, data, true)
    }

    /// `add_child` with the action-log entry suppressed; used while
    /// bulk-loading a document.
    pub fn add_child_with_log(
        &mut self,
        parent_id: &str,
        data: Option<NodeData>,
        log: bool,
    ) -> Option<String> {
        if !self.nodes.contains_key(parent_id) {
            return None;
        }
        let id = self.claim_id(data.as_ref().and_then(|d| d.id.clone()));
        let node = Symthink::new(id.clone(), Some(parent_id.to_string()));
        self.nodes.insert(id.clone(), node);
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.enable_kids();
            if let Children::Enabled(ids) = &mut parent.children {
                ids.push(id.clone());
            }
        }
        if let Some(data) = data {
            self.apply_data(&id, data);
        }
        self.emit_node(parent_id, NodeEvent::SupportChanged { added: true });
        if log {
            self.log_action(ActionKind::AddChild);
        }
        Some(id)
    }

    /// Remove every node of the subtree rooted at `id` from the arena.
    fn detach_subtree(&mut self, id: &str) {
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.child_ids().iter().cloned());
            }
        }
    }

    /// Detach a direct child of `parent_id`, returning its serialized
    /// subtree. `None` when the child isn't found there.
    pub fn remove_child(&mut self, parent_id: &str, child_id: &str) -> Option<NodeData> {
        let position = {
            let parent = self.nodes.get(parent_id)?;
            parent
                .child_ids()
                .iter()
                .position(|id| id == child_id)?
        };
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            if let Children::Enabled(ids) = &mut parent.children {
                ids.remove(position);
            }
        }
        let raw = self.to_raw(child_id, true);
        self.detach_subtree(child_id);
        self.log_action(ActionKind::RemoveChild);
        self.emit_node(parent_id, NodeEvent::SupportChanged { added: false });
        raw
    }

    fn orphan_expiry(&self) -> i64 {
        self.clock.now_millis() + Duration::days(ORPHAN_TTL_DAYS).num_milliseconds()
    }

    /// Detach `id` from its parent and park the serialized subtree in the
    /// orphan pool, stamped with `expires` (epoch ms; defaults to 7 days
    /// out). False when the node has no parent to be removed from.
    pub fn make_orphan(&mut self, id: &str, expires: Option<i64>) -> bool {
        let Some(parent_id) = self.nodes.get(id).and_then(|n| n.parent.clone()) else {
            return false;
        };
        let Some(mut raw) = self.remove_child(&parent_id, id) else {
            return false;
        };
        raw.expires = Some(expires.unwrap_or_else(|| self.orphan_expiry()));
        self.orphans.push(raw);
        self.log_action(ActionKind::MakeOrphan);
        true
    }

    /// Move every child of `id` into the orphan pool, emptying the child
    /// list in place. Each orphan gets its own 7-day expiry; one
    /// `MakeOrphan` entry is logged if anything moved.
    pub fn orphanize_kids(&mut self, id: &str) {
        let mut moved = false;
        loop {
            let child_id = match self.nodes.get_mut(id) {
                Some(node) => match &mut node.children {
                    Children::Enabled(ids) => ids.pop(),
                    Children::Disabled => None,
                },
                None => None,
            };
            let Some(child_id) = child_id else { break };
            if let Some(mut raw) = self.to_raw(&child_id, true) {
                raw.expires = Some(self.orphan_expiry());
                self.orphans.push(raw);
                moved = true;
            }
            self.detach_subtree(&child_id);
        }
        if moved {
            self.log_action(ActionKind::MakeOrphan);
        }
    }

    /// Take an orphan out of the pool and add it as a new child of
    /// `parent_id`. The orphan's old id is stripped so a fresh one is
    /// generated. `None` when no orphan has that id.
    pub fn adopt_orphan(&mut self, parent_id: &str, orphan_id: &str) -> Option<String> {
        let position = self
            .orphans
            .iter()
            .position(|orphan| orphan.id.as_deref() == Some(orphan_id))?;
        self.log_action(ActionKind::AdoptOrphan);
        let mut orphan = self.orphans.remove(position);
        orphan.id = None;
        orphan.expires = None;
        self.add_child(parent_id, Some(orphan))
    }

    /// Convert "no children" into "empty list" on `id`.
    pub fn enable_kids(&mut self, id: &str) -> bool {
        self.nodes
            .get_mut(id)
            .is_some_and(|node| node.enable_kids())
    }

    /// Revert `id` to "children never enabled"; refuses while children
    /// exist.
    pub fn disable_kids(&mut self, id: &str) -> bool {
        self.nodes
            .get_mut(id)
            .is_some_and(|node| node.disable_kids())
    }

    /// Resolve a merge: promote the first child's text, category and
    /// children onto `id`, move the remaining children to the orphan
    /// pool, and append the node's pending decision (if any) to the
    /// document's decision log. Destructive; there is no rollback.
    pub fn decide(&mut self, id: &str) -> bool {
        let first_id = {
            let Some(node) = self.nodes.get_mut(id) else {
                return false;
            };
            match &mut node.children {
                Children::Enabled(ids) if !ids.is_empty() => ids.remove(0),
                _ => return false,
            }
        };
        let Some(first) = self.nodes.remove(&first_id) else {
            return false;
        };
        if let Some(node) = self.nodes.get_mut(id) {
            node.text = first.text.clone();
            node.kind = first.kind;
        }
        self.orphanize_kids(id);
        let promoted_children: Vec<String> = first.child_ids().to_vec();
        if let Some(node) = self.nodes.get_mut(id) {
            node.children = first.children.clone();
        }
        for child_id in promoted_children {
            if let Some(child) = self.nodes.get_mut(&child_id) {
                child.parent = Some(id.to_string());
            }
        }
        if let Some(decision) = self.nodes.get_mut(id).and_then(|node| node.decision.take()) {
            self.decisions.get_or_insert_with(Vec::new).push(decision);
        }
        self.emit_node(id, NodeEvent::Modified);
        true
    }

    /// "Continue the argument": a sibling of the last child's category, or
    /// the first child with this node's successor category, or a default
    /// Question.
    pub fn add_next_default(&mut self, id: &str) -> Option<String> {
        let kind = {
            let node = self.nodes.get(id)?;
            match node.last_child_id() {
                Some(last_id) => self.nodes.get(last_id).map(|last| last.kind),
                None => card_rule(node.kind).map(|rule| rule.next),
            }
        };
        match kind {
            Some(kind) => self.add_child(
                id,
                Some(NodeData {
                    kind,
                    ..Default::default()
                }),
            ),
            None => self.add_child(id, None),
        }
    }

    /// Move a direct child of `parent_id` from one position to another.
    /// A same-position move succeeds without touching the action log.
    pub fn reorder_child(&mut self, parent_id: &str, from: usize, to: usize) -> bool {
        let moved = {
            let Some(parent) = self.nodes.get_mut(parent_id) else {
                return false;
            };
            match &mut parent.children {
                Children::Enabled(ids) if from < ids.len() && to < ids.len() => {
                    if from != to {
                        let id = ids.remove(from);
                        ids.insert(to, id);
                    }
                    true
                }
                _ => false,
            }
        };
        if moved && from != to {
            self.log_action(ActionKind::Reorder);
        }
        moved
    }

    // ---- selection ------------------------------------------------------

    /// Mark `id` as the document's selected node. Any previous selection
    /// anywhere in the tree is cleared first, so at most one node ever has
    /// `selected` set.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.nodes.contains_key(id) {
            return false;
        }
        for node in self.nodes.values_mut() {
            node.selected = false;
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.selected = true;
        }
        self.emit_node(id, NodeEvent::Selected(true));
        true
    }

    /// Clear the current selection, wherever it is. True when a node was
    /// actually deselected.
    pub fn deselect(&mut self) -> bool {
        let selected_id = if self.root().selected() {
            Some(self.root.clone())
        } else {
            self.find(|node| node.selected()).map(|node| node.id().to_string())
        };
        match selected_id {
            Some(id) => {
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.selected = false;
                }
                self.emit_node(&id, NodeEvent::Selected(false));
                true
            }
            None => false,
        }
    }

    /// The single selected node, if any.
    pub fn selected_node(&self) -> Option<&Symthink> {
        self.find(|node| node.selected())
    }

    // ---- traversal ------------------------------------------------------

    /// Pre-order depth-first search over the whole tree.
    pub fn find<P>(&self, predicate: P) -> Option<&Symthink>
    where
        P: Fn(&Symthink) -> bool,
    {
        self.find_from(&self.root, predicate)
    }

    /// Pre-order depth-first search over the subtree rooted at `id`.
    /// Iterative, so pathological nesting can't overflow the stack.
    pub fn find_from<P>(&self, id: &str, predicate: P) -> Option<&Symthink>
    where
        P: Fn(&Symthink) -> bool,
    {
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            if predicate(node) {
                return self.nodes.get(&current);
            }
            for child_id in node.child_ids().iter().rev() {
                stack.push(child_id.clone());
            }
        }
        None
    }

    /// Direct child of `parent_id` with the given id.
    pub fn find_child(&self, parent_id: &str, child_id: &str) -> Option<&Symthink> {
        let parent = self.nodes.get(parent_id)?;
        if parent.child_ids().iter().any(|id| id == child_id) {
            self.nodes.get(child_id)
        } else {
            None
        }
    }

    /// Root-to-`id` path, inclusive. A parent link pointing at a node the
    /// arena doesn't hold means the tree is broken and is reported as
    /// [`DocumentError::DetachedNode`].
    pub fn ancestors(&self, id: &str) -> Result<Vec<String>, DocumentError> {
        if !self.nodes.contains_key(id) {
            return Err(DocumentError::detached(id));
        }
        let mut path = vec![id.to_string()];
        let mut current = id.to_string();
        while let Some(parent_id) = self.nodes.get(&current).and_then(|node| node.parent.clone()) {
            if !self.nodes.contains_key(&parent_id) {
                return Err(DocumentError::detached(parent_id));
            }
            path.push(parent_id.clone());
            current = parent_id;
        }
        path.reverse();
        Ok(path)
    }

    /// The id of `id`'s card page plus its supports' ids, self first.
    pub fn page_ids(&self, id: &str) -> Vec<String> {
        let mut ids = vec![id.to_string()];
        if let Some(node) = self.nodes.get(id) {
            ids.extend(node.child_ids().iter().cloned());
        }
        ids
    }

    /// Ancestor caption path and support captions for breadcrumb display.
    pub fn labels(&self, id: &str) -> Result<Labels, DocumentError> {
        let path = self
            .ancestors(id)?
            .iter()
            .filter_map(|ancestor_id| self.nodes.get(ancestor_id))
            .map(Symthink::label_text)
            .collect();
        let support_labels = self
            .nodes
            .get(id)
            .map(|node| {
                node.child_ids()
                    .iter()
                    .filter_map(|child_id| self.nodes.get(child_id))
                    .map(Symthink::label_text)
                    .collect()
            })
            .unwrap_or_default();
        Ok(Labels {
            path,
            support_labels,
        })
    }

    /// Flat `(id, text)` list of every node of `kind` in the subtree,
    /// pre-order.
    pub fn extract_by_kind(&self, id: &str, kind: ArgType) -> Vec<(String, String)> {
        let mut out = Vec::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            if node.kind == kind {
                out.push((node.id().to_string(), node.text.clone()));
            }
            for child_id in node.child_ids().iter().rev() {
                stack.push(child_id.clone());
            }
        }
        out
    }

    // ---- aggregation ----------------------------------------------------

    /// Number of descendants of `id` carrying text, optionally filtered by
    /// category. The node itself is not counted.
    pub fn count_descendants(&self, id: &str, kind: Option<ArgType>) -> usize {
        let Some(node) = self.nodes.get(id) else {
            return 0;
        };
        let mut count = 0;
        for child_id in node.child_ids() {
            if let Some(child) = self.nodes.get(child_id) {
                if child.has_item_text() && kind.map_or(true, |k| k == child.kind) {
                    count += 1;
                }
            }
        }
        for child_id in node.child_ids() {
            count += self.count_descendants(child_id, kind);
        }
        count
    }

    /// Citations in the whole subtree of `id`, own sources included.
    pub fn count_sources(&self, id: &str) -> usize {
        let Some(node) = self.nodes.get(id) else {
            return 0;
        };
        node.sources.len()
            + node
                .child_ids()
                .iter()
                .map(|child_id| self.count_sources(child_id))
                .sum::<usize>()
    }

    /// Maximum nesting level below `id`, tracked through a level/depth
    /// accumulator pair threaded through the descent.
    pub fn depth(&self, id: &str) -> usize {
        self.depth_walk(id, 0, 0).1
    }

    fn depth_walk(&self, id: &str, mut level: usize, mut depth: usize) -> (usize, usize) {
        if depth < level {
            depth += 1;
        }
        if let Some(node) = self.nodes.get(id) {
            for child_id in node.child_ids() {
                level += 1;
                let (new_level, new_depth) = self.depth_walk(child_id, level, depth);
                level = new_level;
                depth = new_depth;
                level -= 1;
            }
        }
        (level, depth)
    }

    /// Total nodes in the document, root included.
    pub fn get_total_nodes(&self) -> usize {
        self.count_descendants(&self.root, None) + 1
    }

    /// Per-category totals, root included.
    pub fn get_totals_by_type(&self) -> TypeTotals {
        let root_kind = self.root().kind;
        let root_is = |kind: ArgType| usize::from(root_kind == kind);
        TypeTotals {
            question_cnt: self.count_descendants(&self.root, Some(ArgType::Question))
                + root_is(ArgType::Question),
            claim_cnt: self.count_descendants(&self.root, Some(ArgType::Claim))
                + root_is(ArgType::Claim),
            idea_cnt: self.count_descendants(&self.root, Some(ArgType::Idea))
                + root_is(ArgType::Idea),
        }
    }

    /// Citations in the whole document.
    pub fn get_total_sources(&self) -> usize {
        self.count_sources(&self.root)
    }

    // ---- sources --------------------------------------------------------

    /// Attach a citation to `id` and notify subscribers.
    pub fn add_source(&mut self, id: &str, citation: Citation) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.sources.push(citation);
                self.emit_node(id, NodeEvent::Modified);
                self.log_action(ActionKind::AddSource);
                true
            }
            None => false,
        }
    }

    /// Citations shown with the card for `id`: its own sources plus its
    /// direct children's — one level only, grandchildren are excluded by
    /// design. Each entry is tagged `(owner_id, index)` so it can be
    /// deleted again; malformed records are skipped with a warning.
    pub fn get_showable_sources(&self, id: &str) -> Vec<SourceRef> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        let mut refs = Vec::new();
        let mut collect = |owner: &Symthink, refs: &mut Vec<SourceRef>| {
            for (index, citation) in owner.sources.iter().enumerate() {
                if citation.is_valid() {
                    refs.push(SourceRef {
                        owner_id: owner.id().to_string(),
                        index,
                        citation: citation.clone(),
                    });
                } else {
                    tracing::warn!(
                        "Skipping malformed citation {} on node {}",
                        index,
                        owner.id()
                    );
                }
            }
        };
        collect(node, &mut refs);
        for child_id in node.child_ids() {
            if let Some(child) = self.nodes.get(child_id) {
                collect(child, &mut refs);
            }
        }
        refs
    }

    /// Delete one citation by `(node_id, index)` anywhere in the subtree
    /// of `scope_id`. False when the node or index doesn't exist.
    pub fn rm_child_source(&mut self, scope_id: &str, node_id: &str, index: usize) -> bool {
        let found = self
            .find_from(scope_id, |node| node.id() == node_id)
            .map(|node| node.id().to_string());
        let Some(owner_id) = found else {
            return false;
        };
        let removed = match self.nodes.get_mut(&owner_id) {
            Some(node) if index < node.sources.len() => {
                node.sources.remove(index);
                true
            }
            _ => false,
        };
        if removed {
            self.emit_node(scope_id, NodeEvent::Modified);
            self.log_action(ActionKind::RemoveSource);
        }
        removed
    }

    // ---- orphan pool ----------------------------------------------------

    /// Drop every orphan whose expiry is at or before now. Idempotent.
    pub fn cleanup(&mut self) {
        let now = self.clock.now_millis();
        self.orphans
            .retain(|orphan| orphan.expires.unwrap_or(0) > now);
    }

    // ---- editing --------------------------------------------------------

    /// Replace `id`'s body text, refresh its `lastmod` stamp and log the
    /// edit.
    pub fn set_text(&mut self, id: &str, text: impl Into<String>) -> bool {
        let now_seconds = self.clock.now_seconds();
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.text = text.into();
                node.lastmod = Some(now_seconds);
                self.emit_node(id, NodeEvent::Modified);
                self.log_action(ActionKind::Edit);
                true
            }
            None => false,
        }
    }

    /// Change `id`'s category.
    pub fn set_kind(&mut self, id: &str, kind: ArgType) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.kind = kind;
                self.emit_node(id, NodeEvent::Modified);
                self.log_action(ActionKind::Edit);
                true
            }
            None => false,
        }
    }

    /// Refresh `id`'s `lastmod` stamp (UTC seconds) without logging.
    pub fn update_last_mod_time(&mut self, id: &str) {
        let now_seconds = self.clock.now_seconds();
        if let Some(node) = self.nodes.get_mut(id) {
            node.lastmod = Some(now_seconds);
        }
    }

    /// Support text for `id`, splitting a leading `label: body` pattern
    /// out of the node's text on first use.
    pub fn support_item_text(&mut self, id: &str) -> Option<String> {
        self.nodes.get_mut(id).map(Symthink::support_item_text)
    }

    // ---- document links -------------------------------------------------

    /// Turn `id` into a reference to another public document: its own
    /// supports are dropped and text, URL and provenance are copied from
    /// the target's root. Fails when the target document carries no URL.
    pub fn subscribe_to(&mut self, id: &str, target: &SymthinkDocument) -> Result<(), DocumentError> {
        let target_root = target.root();
        let url = target_root
            .url
            .clone()
            .ok_or_else(|| DocumentError::missing_url(target.uid().unwrap_or(target.root_id())))?;
        let child_ids: Vec<String> = self
            .nodes
            .get(id)
            .map(|node| node.child_ids().to_vec())
            .unwrap_or_default();
        for child_id in child_ids {
            self.detach_subtree(&child_id);
        }
        let parent_id = match self.nodes.get_mut(id) {
            Some(node) => {
                node.children = Children::Disabled;
                node.text = target_root.text.clone();
                node.url = Some(url);
                node.created_time = target_root.created_time;
                node.creator = target_root.creator.clone();
                node.creator_id = target_root.creator_id.clone();
                node.decision = target_root.decision.clone();
                node.parent.clone()
            }
            None => return Err(DocumentError::detached(id)),
        };
        if let Some(parent_id) = parent_id {
            self.emit_node(&parent_id, NodeEvent::Modified);
        }
        Ok(())
    }

    /// Record a subscriber path (`userId/docUid/nodeId`) on this
    /// document's pending decision. No-op without a pending decision.
    pub fn add_subscriber(&mut self, user_uid: &str, origin_doc_uid: &str, origin_node_id: &str) {
        let path = format!("{}/{}/{}", user_uid, origin_doc_uid, origin_node_id);
        let root_id = self.root.clone();
        if let Some(decision) = self
            .nodes
            .get_mut(&root_id)
            .and_then(|node| node.decision.as_mut())
        {
            decision.subscription = Some(match decision.subscription.take() {
                Some(existing) => format!("{}|{}", existing, path),
                None => path,
            });
        }
    }

    /// Find the node in `origin` that subscribed to this document, by
    /// matching the origin document's uid against the recorded paths.
    pub fn get_subscriber<'a>(&self, origin: &'a SymthinkDocument) -> Option<&'a Symthink> {
        let subscription = self.root().decision.as_ref()?.subscription.as_ref()?;
        let origin_uid = origin.uid()?;
        for path in subscription.split('|') {
            let mut parts = path.split('/');
            let _user_uid = parts.next();
            let doc_uid = parts.next();
            let item_id = parts.next();
            if doc_uid == Some(origin_uid) {
                return origin.find(|node| Some(node.id()) == item_id);
            }
        }
        None
    }

    // ---- text rendering -------------------------------------------------

    /// Plain-text rendering of the card for `id`: its text, its supports
    /// bulleted or numbered per the node's `numeric` flag, and a trailing
    /// conclusion line when the last support is one.
    pub fn text_page(&self, id: &str) -> String {
        let Some(node) = self.nodes.get(id) else {
            return String::new();
        };
        let mut lines: Vec<String> = node
            .child_ids()
            .iter()
            .filter_map(|child_id| self.nodes.get(child_id))
            .map(|child| child.text.clone())
            .collect();
        let mut conclusion = String::new();
        if node.last_sup_is_concl {
            if let Some(last) = lines.pop() {
                conclusion = last;
            }
        }
        if node.numeric {
            for (position, line) in lines.iter_mut().enumerate() {
                // positions past the glyph table keep the separator space
                let glyph = bullet(position + 1).map(|b| b.filled).unwrap_or("");
                *line = format!("{} {}", glyph, line);
            }
        } else if let Some(glyph) = bullet(0) {
            for line in lines.iter_mut() {
                *line = format!("{} {}", glyph.filled, line);
            }
        }
        format!("{}\n{}\n{}", node.text, lines.join("\n"), conclusion)
    }

    /// Flat summary of the card for `id` for share/preview surfaces.
    pub fn shallow_copy(&self, id: &str) -> ShallowCopy {
        let Some(node) = self.nodes.get(id) else {
            return ShallowCopy::default();
        };
        let mut supports: Vec<String> = node
            .child_ids()
            .iter()
            .filter_map(|child_id| self.nodes.get(child_id))
            .map(|child| child.text.clone())
            .collect();
        let conclusion = if node.last_sup_is_concl {
            supports.pop().unwrap_or_default()
        } else {
            String::new()
        };
        ShallowCopy {
            text: node.text.clone(),
            conclusion,
            numeric: node.numeric,
            supports,
        }
    }
}

impl std::fmt::Display for SymthinkDocument {
    /// The full serialized document as a JSON string.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let raw = self.to_raw_doc();
        match serde_json::to_string(&raw) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(std::fmt::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::MockTimeProvider;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn doc_with_clock() -> (SymthinkDocument, MockTimeProvider) {
        let clock = MockTimeProvider::new();
        let mut doc = SymthinkDocument::with_id("root");
        doc.set_clock(Arc::new(clock.clone()));
        (doc, clock)
    }

    fn loaded(value: serde_json::Value) -> SymthinkDocument {
        SymthinkDocument::from_data(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_add_child_defaults_to_empty_question() {
        let (mut doc, _clock) = doc_with_clock();
        assert!(!doc.root().is_kid_enabled());
        let child_id = doc.add_child("root", None).unwrap();
        let child = doc.get(&child_id).unwrap();
        assert_eq!(child.kind, ArgType::Question);
        assert_eq!(child.text, "");
        assert_eq!(child.parent_id(), Some("root"));
        assert!(doc.root().is_kid_enabled());
        assert_eq!(doc.root().child_ids(), [child_id.clone()]);
    }

    #[test]
    fn test_add_child_emits_support_changed_and_log() {
        let (mut doc, _clock) = doc_with_clock();
        let adds = Arc::new(AtomicUsize::new(0));
        let counter = adds.clone();
        doc.root().subscribe(move |event| {
            if matches!(event, NodeEvent::SupportChanged { added: true }) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        let logged = Arc::new(AtomicUsize::new(0));
        let log_counter = logged.clone();
        doc.action_log().subscribe(move |entry| {
            if entry.action == ActionKind::AddChild {
                log_counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        doc.add_child("root", None);
        doc.add_child_with_log("root", None, false);
        assert_eq!(adds.load(Ordering::SeqCst), 2);
        assert_eq!(logged.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_child_returns_subtree_and_handles_first_position() {
        let (mut doc, _clock) = doc_with_clock();
        let first = doc.add_child("root", Some(NodeData::with_text(ArgType::Claim, "one"))).unwrap();
        let second = doc.add_child("root", Some(NodeData::with_text(ArgType::Claim, "two"))).unwrap();
        doc.add_child(&first, Some(NodeData::with_text(ArgType::Question, "sub"))).unwrap();

        let removed = doc.remove_child("root", &first).unwrap();
        assert_eq!(removed.text.as_deref(), Some("one"));
        assert_eq!(removed.support.as_ref().unwrap().len(), 1);
        assert!(!doc.contains(&first));
        assert_eq!(doc.root().child_ids(), [second]);

        assert!(doc.remove_child("root", "missing").is_none());
    }

    #[test]
    fn test_make_orphan_stamps_seven_day_expiry() {
        let (mut doc, clock) = doc_with_clock();
        let a = doc.add_child("root", Some(NodeData::with_text(ArgType::Claim, "a"))).unwrap();
        doc.add_child("root", Some(NodeData::with_text(ArgType::Claim, "b"))).unwrap();
        doc.add_child("root", Some(NodeData::with_text(ArgType::Claim, "c"))).unwrap();

        assert!(doc.make_orphan(&a, None));
        assert_eq!(doc.root().child_ids().len(), 2);
        assert_eq!(doc.orphans().len(), 1);
        let expected = clock.now_millis() + chrono::Duration::days(7).num_milliseconds();
        assert_eq!(doc.orphans()[0].expires, Some(expected));

        // the root has no parent to be orphaned from
        assert!(!doc.make_orphan("root", None));
    }

    #[test]
    fn test_orphanize_kids_empties_list_in_place() {
        let (mut doc, _clock) = doc_with_clock();
        let parent = doc.add_child("root", Some(NodeData::with_text(ArgType::Question, "q"))).unwrap();
        doc.add_child(&parent, Some(NodeData::with_text(ArgType::Idea, "i1"))).unwrap();
        doc.add_child(&parent, Some(NodeData::with_text(ArgType::Idea, "i2"))).unwrap();

        doc.orphanize_kids(&parent);
        let parent_node = doc.get(&parent).unwrap();
        assert!(parent_node.is_kid_enabled());
        assert!(!parent_node.has_kids());
        assert_eq!(doc.orphans().len(), 2);
        assert!(doc.orphans().iter().all(|o| o.expires.is_some()));
    }

    #[test]
    fn test_adopt_orphan_generates_fresh_id() {
        let (mut doc, _clock) = doc_with_clock();
        let child = doc.add_child("root", Some(NodeData::with_text(ArgType::Claim, "claim"))).unwrap();
        assert!(doc.make_orphan(&child, None));
        let orphan_id = doc.orphans()[0].id.clone().unwrap();
        assert_eq!(orphan_id, child);

        let adopted = doc.adopt_orphan("root", &orphan_id).unwrap();
        assert_ne!(adopted, child);
        assert!(doc.orphans().is_empty());
        let node = doc.get(&adopted).unwrap();
        assert_eq!(node.text, "claim");
        assert_eq!(node.parent_id(), Some("root"));

        assert!(doc.adopt_orphan("root", "missing").is_none());
    }

    #[test]
    fn test_decide_promotes_first_child() {
        let (mut doc, _clock) = doc_with_clock();
        let n = doc.add_child("root", Some(NodeData::with_text(ArgType::Question, "q"))).unwrap();
        let c1 = doc.add_child(&n, Some(NodeData::with_text(ArgType::Idea, "winner"))).unwrap();
        doc.add_child(&c1, Some(NodeData::with_text(ArgType::Claim, "ground"))).unwrap();
        doc.add_child(&n, Some(NodeData::with_text(ArgType::Idea, "loser-1"))).unwrap();
        doc.add_child(&n, Some(NodeData::with_text(ArgType::Idea, "loser-2"))).unwrap();
        if let Some(node) = doc.nodes.get_mut(&n) {
            node.decision = Some(Decision {
                ts: "2026-01-01T00:00:00Z".to_string(),
                scope: "team".to_string(),
                uri: None,
                subscription: None,
            });
        }

        assert!(doc.decide(&n));
        let node = doc.get(&n).unwrap();
        assert_eq!(node.text, "winner");
        assert_eq!(node.kind, ArgType::Idea);
        assert_eq!(node.child_ids().len(), 1);
        let ground = doc.get(&node.child_ids()[0]).unwrap();
        assert_eq!(ground.text, "ground");
        assert_eq!(ground.parent_id(), Some(n.as_str()));
        assert!(node.decision.is_none());
        assert_eq!(doc.decisions().len(), 1);
        assert_eq!(doc.decisions()[0].scope, "team");
        assert_eq!(doc.orphans().len(), 2);
    }

    #[test]
    fn test_decide_without_children_is_a_no_op() {
        let (mut doc, _clock) = doc_with_clock();
        let leaf = doc.add_child("root", Some(NodeData::with_text(ArgType::Claim, "leaf"))).unwrap();
        assert!(!doc.decide(&leaf));
        assert_eq!(doc.get(&leaf).unwrap().text, "leaf");
        assert!(doc.decisions().is_empty());
    }

    #[test]
    fn test_add_next_default_follows_card_rules() {
        let (mut doc, _clock) = doc_with_clock();
        // root is a Question: first default child is an Idea
        let first = doc.add_next_default("root").unwrap();
        assert_eq!(doc.get(&first).unwrap().kind, ArgType::Idea);
        // with a last child present, the sibling repeats its category
        let second = doc.add_next_default("root").unwrap();
        assert_eq!(doc.get(&second).unwrap().kind, ArgType::Idea);
    }

    #[test]
    fn test_add_next_default_without_rule_defaults_to_question() {
        let (mut doc, _clock) = doc_with_clock();
        let event = doc
            .add_child("root", Some(NodeData::with_text(ArgType::Event, "launch")))
            .unwrap();
        let child = doc.add_next_default(&event).unwrap();
        assert_eq!(doc.get(&child).unwrap().kind, ArgType::Question);
    }

    #[test]
    fn test_reorder_child_logs_once() {
        let (mut doc, _clock) = doc_with_clock();
        let a = doc.add_child("root", Some(NodeData::with_text(ArgType::Claim, "a"))).unwrap();
        let b = doc.add_child("root", Some(NodeData::with_text(ArgType::Claim, "b"))).unwrap();
        let reorders = Arc::new(AtomicUsize::new(0));
        let counter = reorders.clone();
        doc.action_log().subscribe(move |entry| {
            if entry.action == ActionKind::Reorder {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        assert!(doc.reorder_child("root", 0, 1));
        assert_eq!(doc.root().child_ids(), [b.clone(), a.clone()]);
        assert!(!doc.reorder_child("root", 0, 5));
        // a same-position move succeeds but is not worth a log entry
        assert!(doc.reorder_child("root", 1, 1));
        assert_eq!(doc.root().child_ids(), [b, a]);
        assert_eq!(reorders.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_selection_is_exclusive_across_the_tree() {
        let (mut doc, _clock) = doc_with_clock();
        let q = doc.add_child("root", Some(NodeData::with_text(ArgType::Question, "q"))).unwrap();
        let i1 = doc.add_child(&q, Some(NodeData::with_text(ArgType::Idea, "i1"))).unwrap();
        let i2 = doc.add_child(&q, Some(NodeData::with_text(ArgType::Idea, "i2"))).unwrap();

        assert!(doc.select(&i1));
        assert!(doc.get(&i1).unwrap().selected());

        assert!(doc.select(&i2));
        let everyone = ["root".to_string(), q.clone(), i1.clone(), i2.clone()];
        let selected: Vec<String> = everyone
            .iter()
            .filter(|id| doc.get(id).unwrap().selected())
            .cloned()
            .collect();
        assert_eq!(selected, [i2.clone()]);

        // selecting an ancestor clears the leaf
        assert!(doc.select(&q));
        assert_eq!(doc.selected_node().unwrap().id(), q);
    }

    #[test]
    fn test_selection_moves_across_branches() {
        let (mut doc, _clock) = doc_with_clock();
        let a = doc.add_child("root", Some(NodeData::with_text(ArgType::Idea, "a"))).unwrap();
        let a1 = doc.add_child(&a, Some(NodeData::with_text(ArgType::Claim, "a1"))).unwrap();
        let b = doc.add_child("root", Some(NodeData::with_text(ArgType::Idea, "b"))).unwrap();

        // the new target is neither a sibling nor an ancestor of the old one
        assert!(doc.select(&a1));
        assert!(doc.select(&b));
        assert!(!doc.get(&a1).unwrap().selected());
        assert_eq!(doc.selected_node().unwrap().id(), b);

        // and back down into the deeper branch
        assert!(doc.select(&a1));
        assert!(!doc.get(&b).unwrap().selected());
        assert_eq!(doc.selected_node().unwrap().id(), a1);
    }

    #[test]
    fn test_deselect_finds_the_selected_node_anywhere() {
        let (mut doc, _clock) = doc_with_clock();
        let q = doc.add_child("root", Some(NodeData::with_text(ArgType::Question, "q"))).unwrap();
        assert!(!doc.deselect());
        doc.select(&q);
        assert!(doc.deselect());
        assert!(doc.selected_node().is_none());
        // root selection is handled directly
        doc.select("root");
        assert!(doc.deselect());
        assert!(!doc.root().selected());
    }

    #[test]
    fn test_find_is_pre_order() {
        let doc = loaded(json!({
            "type": "QUE", "text": "root",
            "support": [
                {"id": "a", "type": "CLM", "text": "match", "support": [
                    {"id": "a1", "type": "CLM", "text": "match"}
                ]},
                {"id": "b", "type": "CLM", "text": "match"}
            ]
        }));
        let found = doc.find(|node| node.text == "match").unwrap();
        assert_eq!(found.id(), "a");
    }

    #[test]
    fn test_ancestors_is_root_to_self() {
        let doc = loaded(json!({
            "id": "r", "type": "QUE", "text": "root",
            "support": [
                {"id": "a", "type": "CLM", "text": "a", "support": [
                    {"id": "a1", "type": "CLM", "text": "a1"}
                ]}
            ]
        }));
        assert_eq!(doc.ancestors("a1").unwrap(), ["r", "a", "a1"]);
        assert!(matches!(
            doc.ancestors("nope"),
            Err(DocumentError::DetachedNode { .. })
        ));
    }

    #[test]
    fn test_counts_and_depth() {
        let doc = loaded(json!({
            "type": "QUE", "text": "root",
            "support": [
                {"type": "IDA", "text": "i", "support": [
                    {"type": "CLM", "text": "c", "support": [
                        {"type": "QUE", "text": "q"}
                    ]}
                ]},
                {"type": "IDA", "text": ""}
            ]
        }));
        // the textless Idea is not counted
        assert_eq!(doc.count_descendants(doc.root_id(), None), 3);
        assert_eq!(doc.count_descendants(doc.root_id(), Some(ArgType::Idea)), 1);
        assert_eq!(doc.get_total_nodes(), 4);
        assert_eq!(doc.depth(doc.root_id()), 3);
        let totals = doc.get_totals_by_type();
        assert_eq!(totals.question_cnt, 2);
        assert_eq!(totals.idea_cnt, 1);
        assert_eq!(totals.claim_cnt, 1);
    }

    #[test]
    fn test_showable_sources_are_shallow() {
        let source = |title: &str| {
            json!({"type": "webpage", "title": title, "issued": {"date-parts": [[2024, 1, 1]]}})
        };
        let doc = loaded(json!({
            "id": "r", "type": "QUE", "text": "root",
            "source": [source("s0")],
            "support": [
                {"id": "c1", "type": "CLM", "text": "c1", "source": [source("s1a"), source("s1b")],
                 "support": [
                    {"id": "g", "type": "CLM", "text": "g", "source": [source("deep")]}
                 ]},
                {"id": "c2", "type": "CLM", "text": "c2", "source": [source("s2")]}
            ]
        }));
        let refs = doc.get_showable_sources("r");
        let titles: Vec<&str> = refs
            .iter()
            .map(|r| r.citation.title.as_deref().unwrap())
            .collect();
        assert_eq!(titles, ["s0", "s1a", "s1b", "s2"]);
        let tagged: Vec<(&str, usize)> = refs
            .iter()
            .map(|r| (r.owner_id.as_str(), r.index))
            .collect();
        assert_eq!(tagged, [("r", 0), ("c1", 0), ("c1", 1), ("c2", 0)]);
        assert_eq!(doc.get_total_sources(), 5);
    }

    #[test]
    fn test_rm_child_source_by_owner_and_index() {
        let doc_value = json!({
            "id": "r", "type": "QUE", "text": "root",
            "support": [
                {"id": "c1", "type": "CLM", "text": "c1", "source": [
                    {"type": "webpage", "title": "keep", "issued": {"date-parts": [[2024]]}},
                    {"type": "webpage", "title": "drop", "issued": {"date-parts": [[2024]]}}
                ]}
            ]
        });
        let mut doc = loaded(doc_value);
        assert!(doc.rm_child_source("r", "c1", 1));
        assert_eq!(doc.get("c1").unwrap().sources.len(), 1);
        assert_eq!(
            doc.get("c1").unwrap().sources[0].title.as_deref(),
            Some("keep")
        );
        assert!(!doc.rm_child_source("r", "c1", 5));
        assert!(!doc.rm_child_source("r", "missing", 0));
    }

    #[test]
    fn test_cleanup_is_idempotent_and_boundary_inclusive() {
        let (mut doc, clock) = doc_with_clock();
        let a = doc.add_child("root", Some(NodeData::with_text(ArgType::Claim, "a"))).unwrap();
        let b = doc.add_child("root", Some(NodeData::with_text(ArgType::Claim, "b"))).unwrap();
        let now = clock.now_millis();
        doc.make_orphan(&a, Some(now));
        doc.make_orphan(&b, Some(now + 60_000));

        doc.cleanup();
        assert_eq!(doc.orphans().len(), 1);
        doc.cleanup();
        assert_eq!(doc.orphans().len(), 1);

        clock.advance(chrono::Duration::minutes(2));
        doc.cleanup();
        assert!(doc.orphans().is_empty());
    }

    #[test]
    fn test_mode_changes_are_observable() {
        let (mut doc, _clock) = doc_with_clock();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        doc.mode_events().subscribe(move |mode| {
            if *mode == DocMode::Editing {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        assert_eq!(doc.mode(), DocMode::Hidden);
        doc.set_mode(DocMode::Editing);
        doc.set_mode(DocMode::Viewing);
        assert_eq!(doc.mode(), DocMode::Viewing);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscribe_to_replaces_supports_with_link() {
        let (mut doc, _clock) = doc_with_clock();
        let n = doc.add_child("root", Some(NodeData::with_text(ArgType::Question, "q"))).unwrap();
        doc.add_child(&n, Some(NodeData::with_text(ArgType::Idea, "old"))).unwrap();

        let mut target = SymthinkDocument::with_id("target-root");
        target.load(serde_json::from_value(json!({
            "type": "CLM",
            "text": "linked claim",
            "url": "https://symthink.io/n/TARGET",
            "uid": "target-uid",
            "creator": "Ada"
        })).unwrap());

        doc.subscribe_to(&n, &target).unwrap();
        let node = doc.get(&n).unwrap();
        assert!(!node.is_kid_enabled());
        assert_eq!(node.text, "linked claim");
        assert_eq!(node.url.as_ref().unwrap().as_str(), "https://symthink.io/n/TARGET");
        assert_eq!(node.creator.as_deref(), Some("Ada"));

        let unlinked = SymthinkDocument::with_id("no-url");
        assert!(matches!(
            doc.subscribe_to(&n, &unlinked),
            Err(DocumentError::MissingUrl { .. })
        ));
    }

    #[test]
    fn test_subscriber_paths_round_trip() {
        let mut target = SymthinkDocument::with_id("t");
        target.load(serde_json::from_value(json!({
            "type": "CLM", "text": "t",
            "decision": {"ts": "2026-01-01T00:00:00Z", "scope": "org"}
        })).unwrap());
        target.add_subscriber("user-1", "origin-uid", "node-9");
        target.add_subscriber("user-2", "other-doc", "node-3");

        let mut origin = SymthinkDocument::with_id("o");
        origin.load(serde_json::from_value(json!({
            "type": "QUE", "text": "o", "uid": "origin-uid",
            "support": [{"id": "node-9", "type": "CLM", "text": "subscribing item"}]
        })).unwrap());

        let subscriber = target.get_subscriber(&origin).unwrap();
        assert_eq!(subscriber.id(), "node-9");
    }

    #[test]
    fn test_text_page_bullets_and_conclusion() {
        let doc = loaded(json!({
            "type": "QUE", "text": "Why?", "lastSupIsConcl": true,
            "support": [
                {"type": "IDA", "text": "first"},
                {"type": "IDA", "text": "second"},
                {"type": "IDA", "text": "therefore"}
            ]
        }));
        let page = doc.text_page(doc.root_id());
        assert!(page.starts_with("Why?\n"));
        assert!(page.contains("\u{25C9} first"));
        assert!(page.contains("\u{25C9} second"));
        assert!(page.ends_with("\ntherefore"));
        assert!(!page.contains("\u{25C9} therefore"));

        let copy = doc.shallow_copy(doc.root_id());
        assert_eq!(copy.supports, ["first", "second"]);
        assert_eq!(copy.conclusion, "therefore");
    }

    #[test]
    fn test_numbered_text_page() {
        let doc = loaded(json!({
            "type": "QUE", "text": "Why?", "numeric": true,
            "support": [
                {"type": "IDA", "text": "first"},
                {"type": "IDA", "text": "second"}
            ]
        }));
        let page = doc.text_page(doc.root_id());
        assert!(page.contains("\u{278A} first"));
        assert!(page.contains("\u{278B} second"));
    }

    #[test]
    fn test_numbered_page_past_the_glyph_table() {
        let supports: Vec<serde_json::Value> = (1..=11)
            .map(|n| json!({"type": "IDA", "text": format!("item {}", n)}))
            .collect();
        let doc = loaded(json!({
            "type": "QUE", "text": "Why?", "numeric": true, "support": supports
        }));
        let page = doc.text_page(doc.root_id());
        assert!(page.contains("\u{2793} item 10"));
        // the eleventh item keeps its separator space, glyphless
        assert!(page.contains("\n item 11"));
    }

    #[test]
    fn test_extract_by_kind_is_pre_order() {
        let doc = loaded(json!({
            "id": "r", "type": "QUE", "text": "root",
            "support": [
                {"id": "a", "type": "CLM", "text": "a", "support": [
                    {"id": "a1", "type": "CLM", "text": "a1"}
                ]},
                {"id": "b", "type": "CLM", "text": "b"}
            ]
        }));
        let claims = doc.extract_by_kind("r", ArgType::Claim);
        let ids: Vec<&str> = claims.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["a", "a1", "b"]);
    }

    #[test]
    fn test_schema_version_tolerance() {
        let doc = loaded(json!({"$schemaVersion": 0, "type": "QUE", "text": "old"}));
        assert_eq!(doc.schema_version(), 0);
        assert_eq!(doc.root().text, "old");
        // serializing always stamps the current version
        assert_eq!(doc.to_raw_doc().schema_version, Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_title_and_modified_time() {
        let doc = loaded(json!({
            "type": "QUE", "text": "the question", "label": "shorty",
            "timestamp": {"seconds": 100, "nanoseconds": 0}
        }));
        assert_eq!(doc.title(), "shorty");
        assert_eq!(doc.modified_time(), Some(100_000));

        let doc = loaded(json!({"type": "QUE", "text": "plain", "lastmod": 7}));
        assert_eq!(doc.title(), "plain");
        assert_eq!(doc.modified_time(), Some(7_000));
    }
}
