//! Department → area → orientation dataset behind the cascading selects of
//! the contest forms.
//!
//! The dataset is loaded at most once per process into a [`CatalogCell`]
//! and is immutable afterwards. Lookups see it only once the load reached
//! [`LoadState::Ready`].

use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::types::types::CatalogError;

/// Default location of the dataset on the portal.
pub const DEFAULT_CATALOG_PATH: &str = "/static/DEPTOS_AREAS_ORIENTACIONES.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "DEPARTAMENTO")]
    pub department: String,
    #[serde(rename = "AREA", default)]
    pub area: Option<String>,
    #[serde(rename = "ORIENTACION", default)]
    pub orientation: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, CatalogError> {
        Ok(Self::new(serde_json::from_slice(bytes)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct areas of `department`, in dataset order.
    pub fn areas(&self, department: &str) -> Vec<&str> {
        distinct(
            self.entries
                .iter()
                .filter(|e| e.department == department)
                .filter_map(|e| e.area.as_deref()),
        )
    }

    /// Distinct orientations of `area` within `department`, in dataset order.
    pub fn orientations(&self, department: &str, area: &str) -> Vec<&str> {
        if department.is_empty() || area.is_empty() {
            return Vec::new();
        }
        distinct(
            self.entries
                .iter()
                .filter(|e| e.department == department && e.area.as_deref() == Some(area))
                .filter_map(|e| e.orientation.as_deref()),
        )
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(*v))
        .collect()
}

#[derive(Debug, Clone)]
pub enum LoadState {
    Unloaded,
    Loading,
    Ready(Arc<Catalog>),
    Failed(String),
}

#[async_trait]
pub trait CatalogLoader: Send + Sync {
    async fn fetch(&self) -> Result<Catalog, CatalogError>;
}

pub struct HttpCatalogLoader {
    client: Client,
    url: String,
}

impl HttpCatalogLoader {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new(Client::new(), url)
    }
}

#[async_trait]
impl CatalogLoader for HttpCatalogLoader {
    async fn fetch(&self) -> Result<Catalog, CatalogError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::HttpStatus(response.status().as_u16()));
        }
        let bytes = response.bytes().await?;
        Catalog::from_json(&bytes)
    }
}

/// Holds the dataset and its load state.
pub struct CatalogCell {
    state: RwLock<LoadState>,
}

impl Default for CatalogCell {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogCell {
    pub const fn new() -> Self {
        Self {
            state: RwLock::new(LoadState::Unloaded),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, LoadState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, LoadState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> LoadState {
        self.read().clone()
    }

    /// The dataset, once ready.
    pub fn get(&self) -> Option<Arc<Catalog>> {
        match &*self.read() {
            LoadState::Ready(catalog) => Some(Arc::clone(catalog)),
            _ => None,
        }
    }

    /// Loads the dataset unless it is already ready.
    ///
    /// A failed load leaves the cell in `Failed` and may be retried by
    /// calling `load` again. A concurrent call while loading gets
    /// `CatalogError::InProgress`. A load whose future is dropped before it
    /// finishes puts the cell back to `Unloaded`.
    pub async fn load(&self, loader: &dyn CatalogLoader) -> Result<Arc<Catalog>, CatalogError> {
        {
            let mut state = self.write();
            match &*state {
                LoadState::Ready(catalog) => return Ok(Arc::clone(catalog)),
                LoadState::Loading => return Err(CatalogError::InProgress),
                LoadState::Unloaded | LoadState::Failed(_) => *state = LoadState::Loading,
            }
        }

        let mut pending = PendingLoad { cell: self, settled: false };
        let result = loader.fetch().await;
        pending.settled = true;

        match result {
            Ok(catalog) => {
                let catalog = Arc::new(catalog);
                log::info!("Department catalog loaded ({} entries)", catalog.len());
                *self.write() = LoadState::Ready(Arc::clone(&catalog));
                Ok(catalog)
            }
            Err(e) => {
                log::error!("Error loading departments data: {}", e);
                *self.write() = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }
}

/// Resets a cell left in `Loading` by a load that never finished.
struct PendingLoad<'a> {
    cell: &'a CatalogCell,
    settled: bool,
}

impl Drop for PendingLoad<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = self.cell.write();
        if matches!(*state, LoadState::Loading) {
            log::warn!("Department catalog load abandoned before it finished");
            *state = LoadState::Unloaded;
        }
    }
}

/// Process-wide department catalog.
pub fn departments() -> &'static CatalogCell {
    static DEPARTMENTS: CatalogCell = CatalogCell::new();
    &DEPARTMENTS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(d: &str, a: Option<&str>, o: Option<&str>) -> CatalogEntry {
        CatalogEntry {
            department: d.to_string(),
            area: a.map(str::to_string),
            orientation: o.map(str::to_string),
        }
    }

    #[test]
    fn areas_are_distinct_ordered_and_non_empty() {
        let catalog = Catalog::new(vec![
            entry("Biología", Some("Zoología"), Some("Vertebrados")),
            entry("Biología", Some("Botánica"), None),
            entry("Biología", Some("Zoología"), Some("Invertebrados")),
            entry("Biología", Some(""), None),
            entry("Biología", None, None),
            entry("Biología", Some("  "), None),
            entry("Física", Some("Óptica"), None),
        ]);
        assert_eq!(catalog.areas("Biología"), vec!["Zoología", "Botánica", "  "]);
        assert_eq!(catalog.areas("Química"), Vec::<&str>::new());
        assert_eq!(
            catalog.orientations("Biología", "Zoología"),
            vec!["Vertebrados", "Invertebrados"]
        );
        assert!(catalog.orientations("Biología", "").is_empty());
    }

    #[test]
    fn parses_upper_case_keys() {
        let json = r#"[{"DEPARTAMENTO": "Física", "AREA": "Óptica", "ORIENTACION": "Láser"},
                        {"DEPARTAMENTO": "Física"}]"#;
        let catalog = Catalog::from_json(json.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.orientations("Física", "Óptica"), vec!["Láser"]);
    }
}
