//! File-system backing store
//!
//! One file per report under a root directory; the file name is the report
//! id and the extension implies the report type. The readonly flag maps to
//! the file-system readonly permission bit, so originals can be protected
//! with ordinary file tooling.

use crate::error::{Result, StoreError};
use crate::rdl::classify_rdl;
use crate::traits::ReportBackend;
use crate::types::{is_report_file, ReportDescriptor, ReportInfo, ReportType};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

/// File-backed report store rooted at a single directory
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Create a backend over the given root directory, creating it if needed
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Flip the readonly permission bit of a stored report
    pub async fn set_readonly(&self, id: &str, readonly: bool) -> Result<()> {
        let path = self.report_path(id)?;
        let metadata = fs::metadata(&path)
            .await
            .map_err(|err| map_io(err, id))?;
        let mut permissions = metadata.permissions();
        permissions.set_readonly(readonly);
        fs::set_permissions(&path, permissions)
            .await
            .map_err(|err| map_io(err, id))?;
        Ok(())
    }

    fn report_path(&self, id: &str) -> Result<PathBuf> {
        // Ids are plain file names; anything path-like is rejected
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(id))
    }

    async fn is_readonly(&self, path: &Path) -> Result<Option<bool>> {
        match fs::metadata(path).await {
            Ok(metadata) => Ok(Some(metadata.permissions().readonly())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

fn map_io(err: std::io::Error, id: &str) -> StoreError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StoreError::NotFound(id.to_string())
    } else {
        StoreError::Io(err)
    }
}

#[async_trait]
impl ReportBackend for FileBackend {
    async fn descriptor(&self, id: &str) -> Result<ReportDescriptor> {
        let path = self.report_path(id)?;
        if !fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(ReportDescriptor::new(ReportType::from_id(id)?))
    }

    async fn load(&self, id: &str) -> Result<Bytes> {
        let path = self.report_path(id)?;
        let content = fs::read(&path).await.map_err(|err| map_io(err, id))?;
        Ok(Bytes::from(content))
    }

    async fn save(&self, report_type: ReportType, id: &str, content: &[u8]) -> Result<String> {
        let path = self.report_path(id)?;
        if self.is_readonly(&path).await? == Some(true) {
            return Err(StoreError::ReadOnly(id.to_string()));
        }
        if report_type != ReportType::RpxXml {
            classify_rdl(content)?;
        }
        fs::write(&path, content).await?;
        Ok(id.to_string())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let path = self.report_path(id)?;
        match self.is_readonly(&path).await? {
            Some(true) => Err(StoreError::ReadOnly(id.to_string())),
            Some(false) => Ok(fs::remove_file(&path).await?),
            None => Ok(()),
        }
    }

    async fn list(&self) -> Result<Vec<ReportInfo>> {
        let mut reports = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_report_file(&name) {
                continue;
            }
            let report_type = match ReportType::from_id(&name) {
                Ok(report_type) => report_type,
                Err(_) => continue,
            };

            let rdl_subtype = if report_type == ReportType::RpxXml {
                None
            } else {
                match fs::read(entry.path()).await {
                    Ok(content) => classify_rdl(&content).unwrap_or_else(|err| {
                        warn!(report = %name, %err, "skipping subtype for unreadable report XML");
                        None
                    }),
                    Err(err) => {
                        warn!(report = %name, %err, "failed to read report for subtype sniffing");
                        None
                    }
                }
            };

            let metadata = entry.metadata().await?;
            let modified_at = metadata.modified().ok().map(DateTime::<Utc>::from);

            reports.push(ReportInfo {
                id: name.clone(),
                name,
                report_type,
                rdl_subtype,
                readonly: metadata.permissions().readonly(),
                modified_at,
            });
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RdlSubtype;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn backend() -> (TempDir, FileBackend) {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path()).unwrap();
        (dir, backend)
    }

    #[tokio::test]
    async fn save_writes_one_file_per_report() {
        let (dir, backend) = backend();
        backend
            .save(ReportType::RdlXml, "Invoice.rdlx", b"<Report/>")
            .await
            .unwrap();
        assert!(dir.path().join("Invoice.rdlx").is_file());
        assert_eq!(
            backend.load("Invoice.rdlx").await.unwrap(),
            Bytes::from_static(b"<Report/>")
        );
    }

    #[tokio::test]
    async fn list_derives_type_and_subtype_from_files() {
        let (_dir, backend) = backend();
        backend
            .save(
                ReportType::RdlXml,
                "Fixed.rdlx",
                b"<Report><Body><ReportItems><FixedPage/></ReportItems></Body></Report>",
            )
            .await
            .unwrap();
        backend
            .save(ReportType::RpxXml, "Legacy.rpx", b"anything")
            .await
            .unwrap();

        let mut listing = backend.list().await.unwrap();
        listing.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].id, "Fixed.rdlx");
        assert_eq!(listing[0].report_type, ReportType::RdlXml);
        assert_eq!(listing[0].rdl_subtype, Some(RdlSubtype::FixedPage));
        assert_eq!(listing[1].report_type, ReportType::RpxXml);
        assert_eq!(listing[1].rdl_subtype, None);
    }

    #[tokio::test]
    async fn list_ignores_non_report_files() {
        let (dir, backend) = backend();
        std::fs::write(dir.path().join("notes.txt"), b"not a report").unwrap();
        assert!(backend.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn readonly_bit_protects_in_place_save_and_delete() {
        let (_dir, backend) = backend();
        backend
            .save(ReportType::RdlXml, "Template.rdlx", b"<Report/>")
            .await
            .unwrap();
        backend.set_readonly("Template.rdlx", true).await.unwrap();

        let err = backend
            .save(ReportType::RdlXml, "Template.rdlx", b"<New/>")
            .await
            .unwrap_err();
        assert!(err.is_read_only());
        let err = backend.delete("Template.rdlx").await.unwrap_err();
        assert!(err.is_read_only());

        assert_eq!(
            backend.load("Template.rdlx").await.unwrap(),
            Bytes::from_static(b"<Report/>")
        );
        assert!(backend.list().await.unwrap()[0].readonly);

        // Save-as under a new id is still allowed
        backend
            .save(ReportType::RdlXml, "Copy.rdlx", b"<New/>")
            .await
            .unwrap();

        backend.set_readonly("Template.rdlx", false).await.unwrap();
        backend.delete("Template.rdlx").await.unwrap();
    }

    #[tokio::test]
    async fn delete_missing_file_is_a_no_op() {
        let (_dir, backend) = backend();
        backend.delete("absent.rdlx").await.unwrap();
    }

    #[tokio::test]
    async fn path_like_ids_are_rejected() {
        let (_dir, backend) = backend();
        let err = backend.load("../escape.rdlx").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }

    #[tokio::test]
    async fn descriptor_requires_an_existing_file() {
        let (_dir, backend) = backend();
        assert!(backend.descriptor("absent.rdlx").await.unwrap_err().is_not_found());

        backend
            .save(ReportType::RdlMasterXml, "Base.rdlx-master", b"<Report/>")
            .await
            .unwrap();
        assert_eq!(
            backend.descriptor("Base.rdlx-master").await.unwrap().report_type,
            ReportType::RdlMasterXml
        );
    }
}
