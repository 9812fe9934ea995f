use crate::model::{Resource, SelectedItem};
use crate::services::catalog::CatalogSnapshot;
use crate::ui::AppState;

pub enum AppMsg {
    CatalogLoaded(CatalogSnapshot),
    ToggleEntry(String),
    Select {
        wrap: String,
        resource: Option<String>,
    },
    ResourcesLoaded {
        wrap: String,
        outcome: Result<Vec<Resource>, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadResources { wrap: String },
    // Outward selection event for the content pane
    Selected(SelectedItem),
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        CatalogLoaded(snapshot) => {
            if state.catalog_loaded {
                tracing::warn!("catalog already loaded; ignoring second snapshot");
                return effects;
            }
            state.catalog_loaded = true;
            state.catalog = snapshot;
        }
        ToggleEntry(wrap) => {
            let Some(entry) = state.catalog.find(&wrap) else {
                tracing::debug!(wrap = %wrap, "toggle for unknown entry");
                return effects;
            };
            if state.tree.toggle(entry) {
                tracing::debug!(wrap = %wrap, "dispatching resource fetch");
                effects.push(Effect::LoadResources { wrap });
            }
        }
        Select { wrap, resource } => {
            let item = state.tree.select(&wrap, resource.as_deref());
            effects.push(Effect::Selected(item));
        }
        ResourcesLoaded { wrap, outcome } => {
            state.tree.settle(&wrap, outcome);
        }
    }
    effects
}
