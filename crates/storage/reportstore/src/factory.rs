//! Factory for constructing backing stores from configuration

use crate::backends::{FileBackend, MemoryBackend};
use crate::config::BackendConfig;
use crate::error::Result;
use crate::traits::{ReportBackend, ResourceStore};
use std::sync::Arc;

/// Backend handles produced from one configuration.
///
/// When the backing store also persists resources (memory, sqlite, sled),
/// `resources` shares the same underlying instance as `reports`. The
/// file-system store serves resources through
/// [`crate::resources::DirectoryResourceProvider`] instead.
pub struct BackendHandles {
    /// Permanent-tier report store
    pub reports: Arc<dyn ReportBackend>,
    /// Resource store, when the backend persists resources itself
    pub resources: Option<Arc<dyn ResourceStore>>,
}

/// Factory for creating backing stores
pub struct BackendFactory;

impl BackendFactory {
    /// Construct the backend described by the configuration
    pub fn from_config(config: &BackendConfig) -> Result<BackendHandles> {
        match config {
            BackendConfig::Memory => {
                let backend = Arc::new(MemoryBackend::new());
                Ok(BackendHandles {
                    reports: backend.clone(),
                    resources: Some(backend),
                })
            }
            BackendConfig::File(cfg) => {
                let backend = Arc::new(FileBackend::new(&cfg.root)?);
                Ok(BackendHandles {
                    reports: backend,
                    resources: None,
                })
            }
            #[cfg(feature = "sqlite")]
            BackendConfig::Sqlite(cfg) => {
                let backend = Arc::new(crate::backends::SqliteBackend::new(&cfg.path)?);
                Ok(BackendHandles {
                    reports: backend.clone(),
                    resources: Some(backend),
                })
            }
            #[cfg(feature = "sled")]
            BackendConfig::Sled(cfg) => {
                let backend = Arc::new(crate::backends::SledBackend::new(&cfg.path)?);
                Ok(BackendHandles {
                    reports: backend.clone(),
                    resources: Some(backend),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ReportType, SaveMode};

    #[tokio::test]
    async fn factory_builds_a_usable_memory_store() {
        let handles = BackendFactory::from_config(&BackendConfig::Memory).unwrap();
        let store = crate::store::ReportStore::new(handles.reports);
        store
            .save(ReportType::RdlXml, "Doc.rdlx", b"<Report/>", SaveMode::Permanent)
            .await
            .unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert!(handles.resources.is_some());
    }

    #[tokio::test]
    async fn file_backend_has_no_resource_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let handles = BackendFactory::from_config(&BackendConfig::File(crate::config::FileConfig {
            root: dir.path().to_path_buf(),
        }))
        .unwrap();
        assert!(handles.resources.is_none());
    }
}
