//! Temporary/permanent report mediation
//!
//! [`ReportStore`] is the single entry point the designer host talks to. It
//! owns the in-process temporary tier (scratch documents for preview and
//! "new document" flows) and delegates everything permanent to the
//! configured [`ReportBackend`].

use crate::error::{Result, StoreError};
use crate::traits::ReportBackend;
use crate::types::{ReportDescriptor, ReportInfo, ReportType, SaveMode};
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

struct TempReport {
    report_type: ReportType,
    content: Bytes,
}

/// Report store mediating between the designer host and a backing store.
///
/// The store is intended to live as a process-wide singleton; the temporary
/// map is safe to share across concurrent requests.
pub struct ReportStore {
    backend: Arc<dyn ReportBackend>,
    temp: DashMap<String, TempReport>,
}

impl ReportStore {
    /// Create a store over the given backing store
    pub fn new(backend: Arc<dyn ReportBackend>) -> Self {
        Self {
            backend,
            temp: DashMap::new(),
        }
    }

    /// Get shape metadata for a report in either tier
    pub async fn descriptor(&self, id: &str) -> Result<ReportDescriptor> {
        if let Some(entry) = self.temp.get(id) {
            return Ok(ReportDescriptor::new(entry.report_type));
        }
        self.backend.descriptor(id).await
    }

    /// Load report content, checking the temporary tier first
    pub async fn load(&self, id: &str) -> Result<Bytes> {
        if let Some(entry) = self.temp.get(id) {
            return Ok(entry.content.clone());
        }
        self.backend.load(id).await
    }

    /// Save a report and return the id it was stored under.
    ///
    /// Temporary saves generate a fresh id carrying the report type's
    /// canonical extension and never touch the backing store. Permanent
    /// saves upsert under the caller-supplied id and fail with
    /// [`StoreError::ReadOnly`] when the existing record is readonly.
    pub async fn save(
        &self,
        report_type: ReportType,
        id: &str,
        content: &[u8],
        mode: SaveMode,
    ) -> Result<String> {
        match mode {
            SaveMode::Temporary => {
                let temp_id = format!("{}{}", Uuid::new_v4(), report_type.canonical_extension());
                debug!(id = %temp_id, "storing temporary report");
                self.temp.insert(
                    temp_id.clone(),
                    TempReport {
                        report_type,
                        content: Bytes::copy_from_slice(content),
                    },
                );
                Ok(temp_id)
            }
            SaveMode::Permanent => {
                debug!(id, "saving permanent report");
                self.backend.save(report_type, id, content).await
            }
        }
    }

    /// Upsert a permanent report; alias of a permanent [`ReportStore::save`]
    pub async fn update(
        &self,
        report_type: ReportType,
        id: &str,
        content: &[u8],
    ) -> Result<String> {
        self.save(report_type, id, content, SaveMode::Permanent).await
    }

    /// Enumerate permanent reports.
    ///
    /// Temporary reports are scratch state, not first-class documents, and
    /// are never listed. Order is backend-native and not stable.
    pub async fn list(&self) -> Result<Vec<ReportInfo>> {
        self.backend.list().await
    }

    /// Delete a report from whichever tier holds it.
    ///
    /// Missing ids are an idempotent no-op in both tiers.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if self.temp.remove(id).is_some() {
            debug!(id, "removed temporary report");
            return Ok(());
        }
        self.backend.delete(id).await
    }

    /// Number of temporary reports currently held
    pub fn temp_len(&self) -> usize {
        self.temp.len()
    }
}
