//! Core traits that define the report store abstraction

use crate::error::Result;
use crate::types::{
    ReportDescriptor, ReportInfo, ReportType, ResourceDescriptor, ResourceKind,
};
use async_trait::async_trait;
use bytes::Bytes;

/// Permanent-tier contract implemented by every backing store.
///
/// Backends handle persisted reports only; the temporary tier lives in
/// [`crate::store::ReportStore`] and never reaches a backend.
#[async_trait]
pub trait ReportBackend: Send + Sync {
    /// Get shape metadata for a stored report
    async fn descriptor(&self, id: &str) -> Result<ReportDescriptor>;

    /// Load the raw definition of a stored report
    async fn load(&self, id: &str) -> Result<Bytes>;

    /// Upsert a report under the given id and return the stored id.
    ///
    /// Fails with [`crate::StoreError::ReadOnly`] when the existing record
    /// is marked readonly.
    async fn save(&self, report_type: ReportType, id: &str, content: &[u8]) -> Result<String>;

    /// Delete a report. Missing ids are an idempotent no-op; readonly
    /// records are rejected.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Enumerate stored reports. Order is backend-native and unspecified.
    async fn list(&self) -> Result<Vec<ReportInfo>>;
}

/// Read-only resource access implemented by seeded backing stores
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch raw resource bytes by kind and id
    async fn get_resource(&self, kind: ResourceKind, id: &str) -> Result<Bytes>;

    /// List resources of a kind. Unsupported kinds yield an empty list.
    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ResourceDescriptor>>;

    /// Fetch the descriptor of a single resource, if present
    async fn describe_resource(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<Option<ResourceDescriptor>>;
}

/// The contract the designer host consumes for auxiliary assets
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Single-resource fetch by kind and name
    async fn get_resource(&self, kind: ResourceKind, name: &str) -> Result<Bytes>;

    /// Enumerate resources of a kind; empty for unsupported kinds
    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ResourceDescriptor>>;

    /// Batch metadata lookup; empty for unsupported kinds or unknown names
    async fn describe_resources(
        &self,
        kind: ResourceKind,
        names: &[&str],
    ) -> Result<Vec<ResourceDescriptor>>;
}
