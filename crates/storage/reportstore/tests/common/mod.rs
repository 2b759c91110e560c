//! Common test utilities and fixtures for reportstore

use reportstore::backends::{FileBackend, MemoryBackend};
use reportstore::{ReportStore, Result};
use std::sync::Arc;
use tempfile::TempDir;

enum BackendHandle {
    Memory(Arc<MemoryBackend>),
    File(Arc<FileBackend>),
    #[cfg(feature = "sqlite")]
    Sqlite(Arc<reportstore::backends::SqliteBackend>),
    #[cfg(feature = "sled")]
    Sled(Arc<reportstore::backends::SledBackend>),
}

/// Test fixture wiring a report store over a concrete backend
pub struct StoreTestFixture {
    _temp_dir: Option<TempDir>,
    pub store: ReportStore,
    backend: BackendHandle,
}

impl StoreTestFixture {
    /// Report store over the in-memory backend
    pub async fn new_memory() -> Result<Self> {
        let backend = Arc::new(MemoryBackend::new());
        Ok(Self {
            _temp_dir: None,
            store: ReportStore::new(backend.clone()),
            backend: BackendHandle::Memory(backend),
        })
    }

    /// Report store over a file-system directory
    pub async fn new_file() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let backend = Arc::new(FileBackend::new(temp_dir.path())?);
        Ok(Self {
            _temp_dir: Some(temp_dir),
            store: ReportStore::new(backend.clone()),
            backend: BackendHandle::File(backend),
        })
    }

    /// Report store over a SQLite database file
    #[cfg(feature = "sqlite")]
    pub async fn new_sqlite() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let backend = Arc::new(reportstore::backends::SqliteBackend::new(
            temp_dir.path().join("Storage.db"),
        )?);
        Ok(Self {
            _temp_dir: Some(temp_dir),
            store: ReportStore::new(backend.clone()),
            backend: BackendHandle::Sqlite(backend),
        })
    }

    /// Report store over an embedded document database
    #[cfg(feature = "sled")]
    pub async fn new_sled() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let backend = Arc::new(reportstore::backends::SledBackend::new(
            temp_dir.path().join("documents"),
        )?);
        Ok(Self {
            _temp_dir: Some(temp_dir),
            store: ReportStore::new(backend.clone()),
            backend: BackendHandle::Sled(backend),
        })
    }

    /// Mark a stored report readonly through the backend's admin path
    pub async fn mark_readonly(&self, id: &str) -> Result<()> {
        match &self.backend {
            BackendHandle::Memory(backend) => backend.set_readonly(id, true),
            BackendHandle::File(backend) => backend.set_readonly(id, true).await,
            #[cfg(feature = "sqlite")]
            BackendHandle::Sqlite(backend) => backend.set_readonly(id, true),
            #[cfg(feature = "sled")]
            BackendHandle::Sled(backend) => backend.set_readonly(id, true),
        }
    }
}

/// Macro running one test body against every backend
#[macro_export]
macro_rules! test_all_backends {
    ($test_name:ident, $test_fn:expr) => {
        mod $test_name {
            use super::*;

            #[tokio::test]
            async fn memory() {
                let fixture = $crate::common::StoreTestFixture::new_memory()
                    .await
                    .expect("Failed to create memory store");
                $test_fn(fixture).await;
            }

            #[tokio::test]
            async fn file() {
                let fixture = $crate::common::StoreTestFixture::new_file()
                    .await
                    .expect("Failed to create file store");
                $test_fn(fixture).await;
            }

            #[cfg(feature = "sqlite")]
            #[tokio::test]
            async fn sqlite() {
                let fixture = $crate::common::StoreTestFixture::new_sqlite()
                    .await
                    .expect("Failed to create sqlite store");
                $test_fn(fixture).await;
            }

            #[cfg(feature = "sled")]
            #[tokio::test]
            async fn sled() {
                let fixture = $crate::common::StoreTestFixture::new_sled()
                    .await
                    .expect("Failed to create sled store");
                $test_fn(fixture).await;
            }
        }
    };
}
