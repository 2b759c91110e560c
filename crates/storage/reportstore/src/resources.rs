//! Resource provider implementations
//!
//! The designer consumes auxiliary assets (images, themes, templates,
//! shared data sources) through the read-only [`ResourceProvider`]
//! contract. Unsupported kinds always yield empty listings rather than
//! errors, so a host can plug in a provider that only serves a subset.

use crate::error::{Result, StoreError};
use crate::rdl::shared_data_source_provider;
use crate::traits::{ResourceProvider, ResourceStore};
use crate::types::{ResourceDescriptor, ResourceKind};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::warn;

const SHARED_DATA_SOURCE_EXTENSION: &str = ".rdsx";

/// Provider over a backing store that persists resources itself
pub struct StoreResourceProvider {
    store: Arc<dyn ResourceStore>,
}

impl StoreResourceProvider {
    /// Create a provider over the given resource store
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ResourceProvider for StoreResourceProvider {
    async fn get_resource(&self, kind: ResourceKind, name: &str) -> Result<Bytes> {
        self.store.get_resource(kind, name).await
    }

    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ResourceDescriptor>> {
        self.store.list_resources(kind).await
    }

    async fn describe_resources(
        &self,
        kind: ResourceKind,
        names: &[&str],
    ) -> Result<Vec<ResourceDescriptor>> {
        let mut descriptors = Vec::new();
        for name in names {
            if let Some(descriptor) = self.store.describe_resource(kind, name).await? {
                descriptors.push(descriptor);
            }
        }
        Ok(descriptors)
    }
}

/// Provider over a plain directory of resource files.
///
/// Serves raw fetches for any kind and lists shared data sources
/// (`.rdsx` files, with the data provider sniffed from the definition).
/// Other kinds list as empty, matching stores that keep only data
/// source definitions on disk.
pub struct DirectoryResourceProvider {
    root: PathBuf,
}

impl DirectoryResourceProvider {
    /// Create a provider rooted at the given directory
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn resource_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(StoreError::InvalidId(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    async fn data_source_descriptor(&self, name: &str) -> Result<Option<ResourceDescriptor>> {
        let path = self.resource_path(name)?;
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let provider = shared_data_source_provider(&content).unwrap_or_else(|err| {
            warn!(resource = %name, %err, "failed to sniff data source provider");
            None
        });
        Ok(Some(ResourceDescriptor::SharedDataSource {
            id: name.to_string(),
            name: name.to_string(),
            provider,
        }))
    }
}

#[async_trait]
impl ResourceProvider for DirectoryResourceProvider {
    async fn get_resource(&self, _kind: ResourceKind, name: &str) -> Result<Bytes> {
        let path = self.resource_path(name)?;
        match fs::read(&path).await {
            Ok(content) => Ok(Bytes::from(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ResourceDescriptor>> {
        if kind != ResourceKind::SharedDataSource {
            return Ok(Vec::new());
        }

        let mut descriptors = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name
                .to_ascii_lowercase()
                .ends_with(SHARED_DATA_SOURCE_EXTENSION)
            {
                continue;
            }
            if let Some(descriptor) = self.data_source_descriptor(&name).await? {
                descriptors.push(descriptor);
            }
        }
        Ok(descriptors)
    }

    async fn describe_resources(
        &self,
        kind: ResourceKind,
        names: &[&str],
    ) -> Result<Vec<ResourceDescriptor>> {
        if kind != ResourceKind::SharedDataSource {
            return Ok(Vec::new());
        }

        let mut descriptors = Vec::new();
        for name in names {
            if let Some(descriptor) = self.data_source_descriptor(name).await? {
                descriptors.push(descriptor);
            }
        }
        Ok(descriptors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryBackend;
    use crate::types::ResourceRecord;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const DATA_SOURCE: &str = r#"<SharedDataSource>
        <ConnectionProperties><DataProvider>JSON</DataProvider></ConnectionProperties>
    </SharedDataSource>"#;

    #[tokio::test]
    async fn store_provider_describes_only_known_names() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_resource(ResourceRecord {
            id: "invoice.rdlx".into(),
            name: "invoice.rdlx".into(),
            kind: ResourceKind::ReportTemplate,
            content: b"<Report/>".to_vec(),
            content_type: None,
            thumbnail: None,
            palette: Vec::new(),
            provider: None,
        });
        let provider = StoreResourceProvider::new(backend);

        let described = provider
            .describe_resources(ResourceKind::ReportTemplate, &["invoice.rdlx", "missing.rdlx"])
            .await
            .unwrap();
        assert_eq!(described.len(), 1);
        assert_eq!(described[0].id(), "invoice.rdlx");

        // Unknown names of any kind yield empty rather than an error
        let described = provider
            .describe_resources(ResourceKind::Theme, &["nonexistent.theme"])
            .await
            .unwrap();
        assert!(described.is_empty());
    }

    #[tokio::test]
    async fn directory_provider_lists_shared_data_sources() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("sales.rdsx"), DATA_SOURCE).unwrap();
        std::fs::write(dir.path().join("readme.txt"), "not a data source").unwrap();

        let provider = DirectoryResourceProvider::new(dir.path()).unwrap();
        let listed = provider
            .list_resources(ResourceKind::SharedDataSource)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        match &listed[0] {
            ResourceDescriptor::SharedDataSource { id, provider, .. } => {
                assert_eq!(id, "sales.rdsx");
                assert_eq!(provider.as_deref(), Some("JSON"));
            }
            other => panic!("expected shared data source, got {other:?}"),
        }

        // Unsupported kinds list as empty
        assert!(provider
            .list_resources(ResourceKind::Image)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn directory_provider_fetches_raw_bytes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("sales.rdsx"), DATA_SOURCE).unwrap();
        let provider = DirectoryResourceProvider::new(dir.path()).unwrap();

        let bytes = provider
            .get_resource(ResourceKind::SharedDataSource, "sales.rdsx")
            .await
            .unwrap();
        assert_eq!(bytes, Bytes::from(DATA_SOURCE.as_bytes().to_vec()));

        assert!(provider
            .get_resource(ResourceKind::SharedDataSource, "missing.rdsx")
            .await
            .unwrap_err()
            .is_not_found());
    }
}
