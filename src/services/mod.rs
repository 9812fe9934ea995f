pub mod catalog;
pub mod http;
pub mod loader;

use crate::model::{CatalogEntry, Resource};
use http::FetchError;

/// Read-only backend the menu is built from. `HttpClient` is the real one;
/// tests plug in fakes.
pub trait WrapSource: Send + Sync {
    fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, FetchError>;
    fn fetch_resources(&self, wrap: &str) -> Result<Vec<Resource>, FetchError>;
}
