use serde::Deserialize;

use crate::labelize::labelize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum MenuMode {
    // Selected directly; no children
    #[serde(rename = "grid")]
    Grid,
    // Children fetched lazily from /resources/{name}
    #[serde(rename = "subMenu")]
    SubMenu,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "menuMode")]
    pub menu_mode: MenuMode,
}

impl CatalogEntry {
    #[cfg(test)]
    pub fn new(name: &str, label: &str, menu_mode: MenuMode) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            menu_mode,
        }
    }

    pub fn is_sub_menu(&self) -> bool {
        self.menu_mode == MenuMode::SubMenu
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Catalog {
    pub wraps: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub namespace: Option<String>,
}

// Wire shape of one element of GET /resources/{name}; everything beyond
// metadata.name/namespace is ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct ResourceObject {
    pub(crate) metadata: ResourceMetadata,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceMetadata {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) namespace: Option<String>,
}

impl From<ResourceObject> for Resource {
    fn from(obj: ResourceObject) -> Self {
        Self {
            name: obj.metadata.name,
            namespace: obj.metadata.namespace,
        }
    }
}

/// What the content pane shows. `resource` is only set when a loaded child
/// of a subMenu entry was picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedItem {
    pub wrap: String,
    pub resource: Option<String>,
}

/// Drops unusable entries (empty or duplicate names, first one wins) and fills
/// in missing labels. Returns the cleaned list plus one warning per drop.
pub(crate) fn normalize_catalog(entries: Vec<CatalogEntry>) -> (Vec<CatalogEntry>, Vec<String>) {
    use std::collections::HashSet;
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();
    let mut out = Vec::with_capacity(entries.len());
    for (i, mut e) in entries.into_iter().enumerate() {
        if e.name.is_empty() {
            warnings.push(format!("catalog entry at index {i} has an empty name"));
            continue;
        }
        if !seen.insert(e.name.clone()) {
            warnings.push(format!("duplicate catalog name: '{}' at index {}", e.name, i));
            continue;
        }
        if e.label.trim().is_empty() {
            e.label = labelize(&e.name);
        }
        out.push(e);
    }
    (out, warnings)
}
