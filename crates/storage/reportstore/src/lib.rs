//! Reportstore - pluggable report storage for embeddable web report designers
//!
//! This crate provides the storage contract a report designer host plugs
//! into: a [`store::ReportStore`] mediating between the designer's abstract
//! save/load/list/delete operations and a swappable backing store, with the
//! temporary/permanent report lifecycle split handled in one place, plus the
//! read-only [`traits::ResourceProvider`] contract for auxiliary designer
//! assets.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backends;
pub mod config;
pub mod error;
pub mod factory;
pub mod rdl;
pub mod resources;
pub mod store;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{BackendConfig, FileConfig};
pub use error::{Result, StoreError};
pub use factory::{BackendFactory, BackendHandles};
pub use rdl::{classify_rdl, shared_data_source_provider};
pub use resources::{DirectoryResourceProvider, StoreResourceProvider};
pub use store::ReportStore;
pub use traits::{ReportBackend, ResourceProvider, ResourceStore};
pub use types::{
    RdlSubtype, ReportDescriptor, ReportInfo, ReportRecord, ReportType, ResourceDescriptor,
    ResourceKind, ResourceRecord, SaveMode,
};

use std::path::PathBuf;
use std::sync::Arc;

/// Builder wiring a report store and a resource provider from one
/// backend configuration.
///
/// ```no_run
/// use reportstore::{BackendConfig, FileConfig, StoreBuilder};
///
/// # fn main() -> reportstore::Result<()> {
/// let storage = StoreBuilder::new(BackendConfig::File(FileConfig {
///     root: "resources/reports".into(),
/// }))
/// .with_resource_directory("resources/datasources")
/// .build()?;
/// # Ok(()) }
/// ```
pub struct StoreBuilder {
    config: BackendConfig,
    resource_dir: Option<PathBuf>,
}

/// Report store plus resource provider built from one configuration
pub struct DesignerStorage {
    /// The report store the designer host calls into
    pub reports: Arc<ReportStore>,
    /// The resource provider serving auxiliary designer assets
    pub resources: Arc<dyn ResourceProvider>,
}

impl StoreBuilder {
    /// Create a builder for the given backend configuration
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            resource_dir: None,
        }
    }

    /// Serve resources from a directory instead of the backing store
    pub fn with_resource_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dir = Some(dir.into());
        self
    }

    /// Build the report store and resource provider
    pub fn build(self) -> Result<DesignerStorage> {
        let file_root = match &self.config {
            BackendConfig::File(cfg) => Some(cfg.root.clone()),
            _ => None,
        };
        let handles = BackendFactory::from_config(&self.config)?;

        let resources: Arc<dyn ResourceProvider> = if let Some(dir) = self.resource_dir {
            Arc::new(DirectoryResourceProvider::new(dir)?)
        } else if let Some(store) = handles.resources {
            Arc::new(StoreResourceProvider::new(store))
        } else if let Some(root) = file_root {
            // File-backed stores keep resources next to the reports
            Arc::new(DirectoryResourceProvider::new(root)?)
        } else {
            return Err(StoreError::Config(
                "backend persists no resources and no resource directory was given".into(),
            ));
        };

        Ok(DesignerStorage {
            reports: Arc::new(ReportStore::new(handles.reports)),
            resources,
        })
    }
}
