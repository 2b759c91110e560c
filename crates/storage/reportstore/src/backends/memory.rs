//! In-memory backend for testing and development

use crate::error::{Result, StoreError};
use crate::rdl::classify_rdl;
use crate::traits::{ReportBackend, ResourceStore};
use crate::types::{
    ReportDescriptor, ReportInfo, ReportRecord, ReportType, ResourceDescriptor, ResourceKind,
    ResourceRecord,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory backing store, also used to seed fixtures in tests
#[derive(Default)]
pub struct MemoryBackend {
    reports: RwLock<HashMap<String, ReportRecord>>,
    resources: RwLock<HashMap<(ResourceKind, String), ResourceRecord>>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the readonly flag of a stored report.
    ///
    /// Administrative seeding path; the designer-facing contract never
    /// mutates the flag.
    pub fn set_readonly(&self, id: &str, readonly: bool) -> Result<()> {
        let mut reports = self.reports.write();
        let record = reports
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.info.readonly = readonly;
        Ok(())
    }

    /// Seed a resource record
    pub fn insert_resource(&self, record: ResourceRecord) {
        self.resources
            .write()
            .insert((record.kind, record.id.clone()), record);
    }
}

#[async_trait]
impl ReportBackend for MemoryBackend {
    async fn descriptor(&self, id: &str) -> Result<ReportDescriptor> {
        let reports = self.reports.read();
        let record = reports
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(ReportDescriptor::new(record.info.report_type))
    }

    async fn load(&self, id: &str) -> Result<Bytes> {
        let reports = self.reports.read();
        let record = reports
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(Bytes::copy_from_slice(&record.content))
    }

    async fn save(&self, report_type: ReportType, id: &str, content: &[u8]) -> Result<String> {
        let mut reports = self.reports.write();
        if let Some(existing) = reports.get(id) {
            if existing.info.readonly {
                return Err(StoreError::ReadOnly(id.to_string()));
            }
        }

        let rdl_subtype = match report_type {
            ReportType::RpxXml => None,
            _ => classify_rdl(content)?,
        };
        reports.insert(
            id.to_string(),
            ReportRecord {
                info: ReportInfo {
                    id: id.to_string(),
                    name: id.to_string(),
                    report_type,
                    rdl_subtype,
                    readonly: false,
                    modified_at: Some(Utc::now()),
                },
                content: content.to_vec(),
            },
        );
        Ok(id.to_string())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut reports = self.reports.write();
        if let Some(record) = reports.get(id) {
            if record.info.readonly {
                return Err(StoreError::ReadOnly(id.to_string()));
            }
            reports.remove(id);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ReportInfo>> {
        let reports = self.reports.read();
        Ok(reports.values().map(|record| record.info.clone()).collect())
    }
}

#[async_trait]
impl ResourceStore for MemoryBackend {
    async fn get_resource(&self, kind: ResourceKind, id: &str) -> Result<Bytes> {
        let resources = self.resources.read();
        let record = resources
            .get(&(kind, id.to_string()))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(Bytes::copy_from_slice(&record.content))
    }

    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ResourceDescriptor>> {
        let resources = self.resources.read();
        Ok(resources
            .values()
            .filter(|record| record.kind == kind)
            .map(ResourceRecord::descriptor)
            .collect())
    }

    async fn describe_resource(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<Option<ResourceDescriptor>> {
        let resources = self.resources.read();
        Ok(resources
            .get(&(kind, id.to_string()))
            .map(ResourceRecord::descriptor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_sniffs_rdl_subtype() {
        let backend = MemoryBackend::new();
        backend
            .save(
                ReportType::RdlXml,
                "Sections.rdlx",
                b"<Report><ReportSections><ReportSection/></ReportSections></Report>",
            )
            .await
            .unwrap();

        let listing = backend.list().await.unwrap();
        assert_eq!(
            listing[0].rdl_subtype,
            Some(crate::types::RdlSubtype::MultiSection)
        );
    }

    #[tokio::test]
    async fn save_rejects_malformed_rdl() {
        let backend = MemoryBackend::new();
        let err = backend
            .save(ReportType::RdlXml, "Broken.rdlx", b"<Report></Oops>")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidContent(_)));
    }

    #[tokio::test]
    async fn rpx_content_is_not_sniffed() {
        let backend = MemoryBackend::new();
        backend
            .save(ReportType::RpxXml, "Legacy.rpx", b"<Report></Oops>")
            .await
            .unwrap();
        assert_eq!(backend.list().await.unwrap()[0].rdl_subtype, None);
    }

    #[tokio::test]
    async fn readonly_blocks_save_and_delete() {
        let backend = MemoryBackend::new();
        backend
            .save(ReportType::RdlXml, "Template.rdlx", b"<Report/>")
            .await
            .unwrap();
        backend.set_readonly("Template.rdlx", true).unwrap();

        let err = backend
            .save(ReportType::RdlXml, "Template.rdlx", b"<New/>")
            .await
            .unwrap_err();
        assert!(err.is_read_only());

        let err = backend.delete("Template.rdlx").await.unwrap_err();
        assert!(err.is_read_only());

        // Original bytes stay intact and loadable
        assert_eq!(
            backend.load("Template.rdlx").await.unwrap(),
            Bytes::from_static(b"<Report/>")
        );
    }
}
