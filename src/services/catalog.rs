use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use crate::model::{normalize_catalog, CatalogEntry};
use crate::services::WrapSource;
use crate::ui::LoadMsg;

/// Result of the one catalog request made per run. On failure `entries` is
/// empty and `error` carries the diagnostic.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub entries: Arc<Vec<CatalogEntry>>,
    pub error: Option<String>,
}

impl CatalogSnapshot {
    pub fn loaded(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: Arc::new(entries),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            entries: Arc::new(Vec::new()),
            error: Some(error.into()),
        }
    }

    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

pub fn load_catalog(source: &dyn WrapSource) -> CatalogSnapshot {
    match source.fetch_catalog() {
        Ok(entries) => {
            let (entries, warnings) = normalize_catalog(entries);
            for w in warnings {
                tracing::warn!("{w}");
            }
            tracing::info!(count = entries.len(), "catalog loaded");
            CatalogSnapshot::loaded(entries)
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch wraps");
            CatalogSnapshot::failed(e.to_string())
        }
    }
}

pub fn spawn_load_catalog(source: Arc<dyn WrapSource>, tx: Sender<LoadMsg>) {
    thread::spawn(move || {
        let snapshot = load_catalog(source.as_ref());
        let _ = tx.send(LoadMsg::Catalog(snapshot));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MenuMode, Resource};
    use crate::services::http::FetchError;

    struct FixedCatalog(Result<Vec<CatalogEntry>, u16>);

    impl WrapSource for FixedCatalog {
        fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, FetchError> {
            match &self.0 {
                Ok(v) => Ok(v.clone()),
                Err(status) => Err(FetchError::Status {
                    status: *status,
                    message: format!("HTTP {status}"),
                }),
            }
        }
        fn fetch_resources(&self, _wrap: &str) -> Result<Vec<Resource>, FetchError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn failure_yields_empty_snapshot_with_error() {
        let snap = load_catalog(&FixedCatalog(Err(502)));
        assert!(snap.entries.is_empty());
        assert_eq!(snap.error.as_deref(), Some("HTTP 502"));
    }

    #[test]
    fn success_keeps_catalog_order() {
        let snap = load_catalog(&FixedCatalog(Ok(vec![
            CatalogEntry::new("b", "B", MenuMode::Grid),
            CatalogEntry::new("a", "", MenuMode::SubMenu),
        ])));
        assert!(snap.error.is_none());
        let names: Vec<&str> = snap.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(snap.find("a").map(|e| e.label.as_str()), Some("A"));
        assert!(snap.find("zzz").is_none());
    }

    #[test]
    fn spawned_load_posts_one_message() {
        let (tx, rx) = std::sync::mpsc::channel();
        spawn_load_catalog(
            Arc::new(FixedCatalog(Ok(vec![CatalogEntry::new(
                "db",
                "Database",
                MenuMode::SubMenu,
            )]))),
            tx,
        );
        match rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap() {
            LoadMsg::Catalog(snap) => assert_eq!(snap.entries.len(), 1),
            _ => panic!("expected catalog message"),
        }
    }
}
