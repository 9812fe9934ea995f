//! Lazy navigation tree: per-entry expansion and fetch state for the catalog
//! menu, plus the pure derivation from that state to renderable nodes.
//!
//! Only `subMenu` entries ever get state here. Expansion and fetch state live
//! in separate maps, so collapsing never touches fetched data. A fetch is
//! admitted at most once per entry: `begin_fetch` refuses while the entry's
//! in-flight marker is set, and `toggle` only asks for one while the entry is
//! still idle, so `loaded`/`error` are terminal.

use std::collections::{HashMap, HashSet};

use crate::model::{CatalogEntry, MenuMode, Resource, SelectedItem};

pub const LOADING_LABEL: &str = "Loading...";
pub const EMPTY_LABEL: &str = "No resources found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFetchState {
    pub status: FetchStatus,
    // Meaningful only when Loaded
    pub resources: Vec<Resource>,
    // Set only when Error
    pub error_message: Option<String>,
}

impl EntryFetchState {
    fn loading() -> Self {
        Self {
            status: FetchStatus::Loading,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// `grid` entry, selected directly.
    Leaf { wrap: String, label: String },
    /// `subMenu` entry. `children` is always derived, shown only when expanded.
    Branch {
        wrap: String,
        label: String,
        expanded: bool,
        status: FetchStatus,
        children: Vec<ChildNode>,
    },
}

impl TreeNode {
    pub fn wrap(&self) -> &str {
        match self {
            TreeNode::Leaf { wrap, .. } | TreeNode::Branch { wrap, .. } => wrap,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildNode {
    Resource(Resource),
    // Disabled placeholders
    Loading,
    Failed(String),
    Empty,
}

impl ChildNode {
    pub fn is_selectable(&self) -> bool {
        matches!(self, ChildNode::Resource(_))
    }

    pub fn label(&self) -> String {
        match self {
            ChildNode::Resource(r) => r.name.clone(),
            ChildNode::Loading => LOADING_LABEL.to_string(),
            ChildNode::Failed(msg) => format!("Error: {msg}"),
            ChildNode::Empty => EMPTY_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct NavTree {
    expanded: HashMap<String, bool>,
    fetches: HashMap<String, EntryFetchState>,
    in_flight: HashSet<String>,
}

impl NavTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, wrap: &str) -> bool {
        self.expanded.get(wrap).copied().unwrap_or(false)
    }

    pub fn status(&self, wrap: &str) -> FetchStatus {
        self.fetches
            .get(wrap)
            .map(|s| s.status)
            .unwrap_or(FetchStatus::Idle)
    }

    pub fn fetch_state(&self, wrap: &str) -> Option<&EntryFetchState> {
        self.fetches.get(wrap)
    }

    pub fn is_in_flight(&self, wrap: &str) -> bool {
        self.in_flight.contains(wrap)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Flips expansion of a `subMenu` entry. Returns true when the caller must
    /// dispatch the entry's one resource fetch. `grid` entries are ignored.
    pub fn toggle(&mut self, entry: &CatalogEntry) -> bool {
        if entry.menu_mode != MenuMode::SubMenu {
            return false;
        }
        let flag = self.expanded.entry(entry.name.clone()).or_insert(false);
        *flag = !*flag;
        let expanding = *flag;
        tracing::debug!(wrap = %entry.name, expanded = expanding, "toggle");
        expanding && self.status(&entry.name) == FetchStatus::Idle && self.begin_fetch(&entry.name)
    }

    /// Admission control for a fetch: sets the in-flight marker and moves the
    /// entry to Loading. False when a fetch for `wrap` is already in flight.
    pub fn begin_fetch(&mut self, wrap: &str) -> bool {
        if !self.in_flight.insert(wrap.to_string()) {
            tracing::debug!(wrap, "fetch already in flight");
            return false;
        }
        self.fetches
            .insert(wrap.to_string(), EntryFetchState::loading());
        true
    }

    /// Applies a finished fetch. The in-flight marker is cleared whatever the
    /// outcome; results for entries that are not Loading are dropped.
    pub fn settle(&mut self, wrap: &str, outcome: Result<Vec<Resource>, String>) {
        self.in_flight.remove(wrap);
        let Some(state) = self.fetches.get_mut(wrap) else {
            tracing::warn!(wrap, "fetch result for unknown entry dropped");
            return;
        };
        if state.status != FetchStatus::Loading {
            tracing::warn!(wrap, status = ?state.status, "stale fetch result dropped");
            return;
        }
        match outcome {
            Ok(resources) => {
                tracing::info!(wrap, count = resources.len(), "resources loaded");
                *state = EntryFetchState {
                    status: FetchStatus::Loaded,
                    resources,
                    error_message: None,
                };
            }
            Err(message) => {
                tracing::error!(wrap, error = %message, "failed to load resources");
                *state = EntryFetchState {
                    status: FetchStatus::Error,
                    resources: Vec::new(),
                    error_message: Some(message),
                };
            }
        }
    }

    pub fn select(&self, wrap: &str, resource: Option<&str>) -> SelectedItem {
        SelectedItem {
            wrap: wrap.to_string(),
            resource: resource.map(str::to_string),
        }
    }

    /// Pure view of the current state, one node per catalog entry in order.
    pub fn render_tree(&self, catalog: &[CatalogEntry]) -> Vec<TreeNode> {
        catalog
            .iter()
            .map(|entry| match entry.menu_mode {
                MenuMode::Grid => TreeNode::Leaf {
                    wrap: entry.name.clone(),
                    label: entry.label.clone(),
                },
                MenuMode::SubMenu => TreeNode::Branch {
                    wrap: entry.name.clone(),
                    label: entry.label.clone(),
                    expanded: self.is_expanded(&entry.name),
                    status: self.status(&entry.name),
                    children: self.children_of(&entry.name),
                },
            })
            .collect()
    }

    fn children_of(&self, wrap: &str) -> Vec<ChildNode> {
        let Some(state) = self.fetches.get(wrap) else {
            return vec![ChildNode::Empty];
        };
        if state.status == FetchStatus::Loading {
            return vec![ChildNode::Loading];
        }
        if state.status == FetchStatus::Error {
            let msg = state
                .error_message
                .clone()
                .unwrap_or_else(|| "unknown error".to_string());
            return vec![ChildNode::Failed(msg)];
        }
        if !state.resources.is_empty() {
            return state
                .resources
                .iter()
                .cloned()
                .map(ChildNode::Resource)
                .collect();
        }
        vec![ChildNode::Empty]
    }
}
