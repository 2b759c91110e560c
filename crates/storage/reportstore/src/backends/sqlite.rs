//! SQLite backing store
//!
//! Single `reports` table keyed by report id plus a `resources` table keyed
//! by (kind, id). The readonly flag is an ordinary column, toggled by
//! administrative seeding rather than the designer-facing contract.

use crate::error::{Result, StoreError};
use crate::rdl::classify_rdl;
use crate::traits::{ReportBackend, ResourceStore};
use crate::types::{
    RdlSubtype, ReportDescriptor, ReportInfo, ReportType, ResourceDescriptor, ResourceKind,
    ResourceRecord,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS reports (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    report_type TEXT NOT NULL,
    rdl_subtype TEXT,
    content     BLOB NOT NULL,
    readonly    INTEGER NOT NULL DEFAULT 0,
    modified_at TEXT
);
CREATE TABLE IF NOT EXISTS resources (
    kind         TEXT NOT NULL,
    id           TEXT NOT NULL,
    name         TEXT NOT NULL,
    content      BLOB NOT NULL,
    content_type TEXT,
    thumbnail    BLOB,
    palette      TEXT,
    provider     TEXT,
    PRIMARY KEY (kind, id)
);
";

/// SQLite-backed report and resource store
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open (or create) a database file and ensure the schema exists
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database, used by tests and scratch tooling
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Flip the readonly flag of a stored report
    pub fn set_readonly(&self, id: &str, readonly: bool) -> Result<()> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE reports SET readonly = ?1 WHERE id = ?2",
            params![readonly as i64, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Seed a resource record
    pub fn insert_resource(&self, record: &ResourceRecord) -> Result<()> {
        let palette = if record.palette.is_empty() {
            None
        } else {
            Some(
                serde_json::to_string(&record.palette)
                    .map_err(|err| StoreError::Serialization(err.to_string()))?,
            )
        };
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO resources (kind, id, name, content, content_type, thumbnail, palette, provider)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT (kind, id) DO UPDATE SET
                 name = excluded.name,
                 content = excluded.content,
                 content_type = excluded.content_type,
                 thumbnail = excluded.thumbnail,
                 palette = excluded.palette,
                 provider = excluded.provider",
            params![
                kind_tag(record.kind),
                record.id,
                record.name,
                record.content,
                record.content_type,
                record.thumbnail,
                palette,
                record.provider,
            ],
        )?;
        Ok(())
    }

    fn readonly_flag(conn: &Connection, id: &str) -> Result<Option<bool>> {
        let flag = conn
            .query_row(
                "SELECT readonly FROM reports WHERE id = ?1",
                params![id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(flag.map(|value| value != 0))
    }
}

fn type_tag(report_type: ReportType) -> &'static str {
    match report_type {
        ReportType::RdlXml => "rdl_xml",
        ReportType::RdlMasterXml => "rdl_master_xml",
        ReportType::RpxXml => "rpx_xml",
    }
}

fn parse_type(tag: &str) -> Result<ReportType> {
    match tag {
        "rdl_xml" => Ok(ReportType::RdlXml),
        "rdl_master_xml" => Ok(ReportType::RdlMasterXml),
        "rpx_xml" => Ok(ReportType::RpxXml),
        other => Err(StoreError::Serialization(format!(
            "unknown report type tag: {other}"
        ))),
    }
}

fn subtype_tag(subtype: RdlSubtype) -> &'static str {
    match subtype {
        RdlSubtype::FixedPage => "fixed_page",
        RdlSubtype::MultiSection => "multi_section",
        RdlSubtype::Dashboard => "dashboard",
    }
}

fn parse_subtype(tag: &str) -> Option<RdlSubtype> {
    match tag {
        "fixed_page" => Some(RdlSubtype::FixedPage),
        "multi_section" => Some(RdlSubtype::MultiSection),
        "dashboard" => Some(RdlSubtype::Dashboard),
        _ => None,
    }
}

fn kind_tag(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Image => "image",
        ResourceKind::Theme => "theme",
        ResourceKind::ReportTemplate => "report_template",
        ResourceKind::DataSetTemplate => "data_set_template",
        ResourceKind::SharedDataSource => "shared_data_source",
    }
}

fn row_to_info(
    id: String,
    name: String,
    type_tag_value: String,
    subtype_tag_value: Option<String>,
    readonly: i64,
    modified_at: Option<String>,
) -> Result<ReportInfo> {
    Ok(ReportInfo {
        id,
        name,
        report_type: parse_type(&type_tag_value)?,
        rdl_subtype: subtype_tag_value.as_deref().and_then(parse_subtype),
        readonly: readonly != 0,
        modified_at: modified_at
            .as_deref()
            .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
            .map(|value| value.with_timezone(&Utc)),
    })
}

#[async_trait]
impl ReportBackend for SqliteBackend {
    async fn descriptor(&self, id: &str) -> Result<ReportDescriptor> {
        let conn = self.conn.lock();
        let tag = conn
            .query_row(
                "SELECT report_type FROM reports WHERE id = ?1",
                params![id],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(ReportDescriptor::new(parse_type(&tag)?))
    }

    async fn load(&self, id: &str) -> Result<Bytes> {
        let conn = self.conn.lock();
        let content = conn
            .query_row(
                "SELECT content FROM reports WHERE id = ?1",
                params![id],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(Bytes::from(content))
    }

    async fn save(&self, report_type: ReportType, id: &str, content: &[u8]) -> Result<String> {
        let conn = self.conn.lock();
        if Self::readonly_flag(&conn, id)? == Some(true) {
            return Err(StoreError::ReadOnly(id.to_string()));
        }

        let rdl_subtype = match report_type {
            ReportType::RpxXml => None,
            _ => classify_rdl(content)?,
        };

        conn.execute(
            "INSERT INTO reports (id, name, report_type, rdl_subtype, content, readonly, modified_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
             ON CONFLICT (id) DO UPDATE SET
                 report_type = excluded.report_type,
                 rdl_subtype = excluded.rdl_subtype,
                 content = excluded.content,
                 modified_at = excluded.modified_at",
            params![
                id,
                id,
                type_tag(report_type),
                rdl_subtype.map(subtype_tag),
                content,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(id.to_string())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock();
        match Self::readonly_flag(&conn, id)? {
            Some(true) => Err(StoreError::ReadOnly(id.to_string())),
            Some(false) => {
                conn.execute("DELETE FROM reports WHERE id = ?1", params![id])?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn list(&self) -> Result<Vec<ReportInfo>> {
        let conn = self.conn.lock();
        let mut statement = conn.prepare(
            "SELECT id, name, report_type, rdl_subtype, readonly, modified_at FROM reports",
        )?;
        let rows = statement.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?;

        let mut reports = Vec::new();
        for row in rows {
            let (id, name, type_tag_value, subtype_tag_value, readonly, modified_at) = row?;
            reports.push(row_to_info(
                id,
                name,
                type_tag_value,
                subtype_tag_value,
                readonly,
                modified_at,
            )?);
        }
        Ok(reports)
    }
}

#[async_trait]
impl ResourceStore for SqliteBackend {
    async fn get_resource(&self, kind: ResourceKind, id: &str) -> Result<Bytes> {
        let conn = self.conn.lock();
        let content = conn
            .query_row(
                "SELECT content FROM resources WHERE kind = ?1 AND id = ?2",
                params![kind_tag(kind), id],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(Bytes::from(content))
    }

    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ResourceDescriptor>> {
        let conn = self.conn.lock();
        let mut statement = conn.prepare(
            "SELECT id, name, content_type, thumbnail, palette, provider
             FROM resources WHERE kind = ?1",
        )?;
        let rows = statement.query_map(params![kind_tag(kind)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<Vec<u8>>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?;

        let mut descriptors = Vec::new();
        for row in rows {
            let (id, name, content_type, thumbnail, palette, provider) = row?;
            descriptors.push(row_to_descriptor(
                kind,
                id,
                name,
                content_type,
                thumbnail,
                palette,
                provider,
            )?);
        }
        Ok(descriptors)
    }

    async fn describe_resource(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<Option<ResourceDescriptor>> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT id, name, content_type, thumbnail, palette, provider
                 FROM resources WHERE kind = ?1 AND id = ?2",
                params![kind_tag(kind), id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<Vec<u8>>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, name, content_type, thumbnail, palette, provider)) => Ok(Some(
                row_to_descriptor(kind, id, name, content_type, thumbnail, palette, provider)?,
            )),
            None => Ok(None),
        }
    }
}

fn row_to_descriptor(
    kind: ResourceKind,
    id: String,
    name: String,
    content_type: Option<String>,
    thumbnail: Option<Vec<u8>>,
    palette: Option<String>,
    provider: Option<String>,
) -> Result<ResourceDescriptor> {
    let palette = match palette {
        Some(json) => serde_json::from_str(&json)
            .map_err(|err| StoreError::Serialization(err.to_string()))?,
        None => Vec::new(),
    };
    let record = ResourceRecord {
        id,
        name,
        kind,
        content: Vec::new(),
        content_type,
        thumbnail,
        palette,
        provider,
    };
    Ok(record.descriptor())
}
