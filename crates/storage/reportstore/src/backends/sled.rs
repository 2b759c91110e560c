//! Embedded document backing store on sled
//!
//! The document-database analog of the report store: one tree per
//! collection (`reports`, `images`, `themes`, `templates`, `datasets`,
//! `datasources`), documents encoded with bincode and keyed by id.

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
use sled::Tree;
use std::path::Path;

const REPORTS: &str = "reports";
const IMAGES: &str = "images";
const THEMES: &str = "themes";
const TEMPLATES: &str = "templates";
const DATASETS: &str = "datasets";
const DATASOURCES: &str = "datasources";

/// Sled-backed document store for reports and seeded resources
pub struct SledBackend {
    db: sled::Db,
    reports: Tree,
}

impl SledBackend {
    /// Open (or create) a database directory
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_db(sled::open(path)?)
    }

    /// Open a temporary database, used by tests and scratch tooling
    pub fn temporary() -> Result<Self> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: sled::Db) -> Result<Self> {
        let reports = db.open_tree(REPORTS)?;
        Ok(Self { db, reports })
    }

    /// Flip the readonly flag of a stored report
    pub fn set_readonly(&self, id: &str, readonly: bool) -> Result<()> {
        let mut record = self
            .fetch_report(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.info.readonly = readonly;
        self.reports.insert(id, encode(&record)?)?;
        Ok(())
    }

    /// Seed a resource document into its collection
    pub fn insert_resource(&self, record: &ResourceRecord) -> Result<()> {
        let tree = self.resource_tree(record.kind)?;
        tree.insert(record.id.as_str(), encode(record)?)?;
        Ok(())
    }

    fn fetch_report(&self, id: &str) -> Result<Option<ReportRecord>> {
        match self.reports.get(id)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn resource_tree(&self, kind: ResourceKind) -> Result<Tree> {
        let name = match kind {
            ResourceKind::Image => IMAGES,
            ResourceKind::Theme => THEMES,
            ResourceKind::ReportTemplate => TEMPLATES,
            ResourceKind::DataSetTemplate => DATASETS,
            ResourceKind::SharedDataSource => DATASOURCES,
        };
        Ok(self.db.open_tree(name)?)
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|err| StoreError::Serialization(err.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|err| StoreError::Serialization(err.to_string()))
}

#[async_trait]
impl ReportBackend for SledBackend {
    async fn descriptor(&self, id: &str) -> Result<ReportDescriptor> {
        let record = self
            .fetch_report(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(ReportDescriptor::new(record.info.report_type))
    }

    async fn load(&self, id: &str) -> Result<Bytes> {
        let record = self
            .fetch_report(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(Bytes::from(record.content))
    }

    async fn save(&self, report_type: ReportType, id: &str, content: &[u8]) -> Result<String> {
        if let Some(existing) = self.fetch_report(id)? {
            if existing.info.readonly {
                return Err(StoreError::ReadOnly(id.to_string()));
            }
        }

        let rdl_subtype = match report_type {
            ReportType::RpxXml => None,
            _ => classify_rdl(content)?,
        };

        let record = ReportRecord {
            info: ReportInfo {
                id: id.to_string(),
                name: id.to_string(),
                report_type,
                rdl_subtype,
                readonly: false,
                modified_at: Some(Utc::now()),
            },
            content: content.to_vec(),
        };
        self.reports.insert(id, encode(&record)?)?;
        Ok(id.to_string())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if let Some(record) = self.fetch_report(id)? {
            if record.info.readonly {
                return Err(StoreError::ReadOnly(id.to_string()));
            }
            self.reports.remove(id)?;
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ReportInfo>> {
        let mut reports = Vec::new();
        for entry in self.reports.iter() {
            let (_, bytes) = entry?;
            let record: ReportRecord = decode(&bytes)?;
            reports.push(record.info);
        }
        Ok(reports)
    }
}

#[async_trait]
impl ResourceStore for SledBackend {
    async fn get_resource(&self, kind: ResourceKind, id: &str) -> Result<Bytes> {
        let tree = self.resource_tree(kind)?;
        let bytes = tree
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let record: ResourceRecord = decode(&bytes)?;
        Ok(Bytes::from(record.content))
    }

    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ResourceDescriptor>> {
        let tree = self.resource_tree(kind)?;
        let mut descriptors = Vec::new();
        for entry in tree.iter() {
            let (_, bytes) = entry?;
            let record: ResourceRecord = decode(&bytes)?;
            descriptors.push(record.descriptor());
        }
        Ok(descriptors)
    }

    async fn describe_resource(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<Option<ResourceDescriptor>> {
        let tree = self.resource_tree(kind)?;
        match tree.get(id)? {
            Some(bytes) => {
                let record: ResourceRecord = decode(&bytes)?;
                Ok(Some(record.descriptor()))
            }
            None => Ok(None),
        }
    }
}
