//! Data model shared by the report store and its backends

use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File extensions recognized as report definitions
pub const REPORT_EXTENSIONS: &[&str] = &[".rdl", ".rdlx", ".rdlx-master", ".rpx"];

/// Report definition format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// Page/RDL report (`.rdl`, `.rdlx`)
    RdlXml,
    /// Master report (`.rdlx-master`)
    RdlMasterXml,
    /// Section report (`.rpx`)
    RpxXml,
}

impl ReportType {
    /// Map a file extension (with or without the leading dot) to a report type
    pub fn from_extension(extension: &str) -> Result<Self> {
        let ext = extension.strip_prefix('.').unwrap_or(extension);
        match ext {
            "rdl" | "rdlx" => Ok(ReportType::RdlXml),
            "rdlx-master" => Ok(ReportType::RdlMasterXml),
            "rpx" => Ok(ReportType::RpxXml),
            _ => Err(StoreError::UnknownExtension(extension.to_string())),
        }
    }

    /// Derive the report type from a report id such as `Invoice.rdlx`
    pub fn from_id(id: &str) -> Result<Self> {
        let extension = Path::new(id)
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| StoreError::UnknownExtension(id.to_string()))?;
        Self::from_extension(extension)
    }

    /// Canonical extension used when generating report ids
    pub fn canonical_extension(&self) -> &'static str {
        match self {
            ReportType::RdlXml => ".rdlx",
            ReportType::RdlMasterXml => ".rdlx-master",
            ReportType::RpxXml => ".rpx",
        }
    }
}

/// Check whether a file name carries a known report extension
pub fn is_report_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    REPORT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Structural flavor of an RDL report, derived by content sniffing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RdlSubtype {
    /// Fixed page layout report
    FixedPage,
    /// Multi-section report
    MultiSection,
    /// Dashboard report
    Dashboard,
}

/// Listing metadata for a permanent report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportInfo {
    /// Unique report id (file name for permanent reports)
    pub id: String,
    /// Display name, usually equal to the id
    pub name: String,
    /// Report definition format
    pub report_type: ReportType,
    /// RDL flavor if it could be derived; `None` for RPX and unknown shapes
    #[serde(default)]
    pub rdl_subtype: Option<RdlSubtype>,
    /// Readonly reports can be loaded and duplicated but never overwritten
    #[serde(default)]
    pub readonly: bool,
    /// Last modification time, when the backend tracks one
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

/// A full permanent report record as persisted by a backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Listing metadata
    pub info: ReportInfo,
    /// Serialized report definition
    pub content: Vec<u8>,
}

/// Shape metadata returned by descriptor lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportDescriptor {
    /// Report definition format
    pub report_type: ReportType,
}

impl ReportDescriptor {
    /// Descriptor for the given report type
    pub fn new(report_type: ReportType) -> Self {
        Self { report_type }
    }
}

/// How a save request is tiered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Upsert into the backing store under the caller-supplied id
    Permanent,
    /// Keep in process memory under a generated id, never persisted
    Temporary,
}

/// Kinds of auxiliary designer assets served by a resource provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Embedded image
    Image,
    /// Report theme
    Theme,
    /// Report template
    ReportTemplate,
    /// Data set template
    DataSetTemplate,
    /// Shared data source definition (`.rdsx`)
    SharedDataSource,
}

/// Thumbnail attached to image and template descriptors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    /// Raw thumbnail bytes
    pub data: Vec<u8>,
    /// MIME type of the thumbnail bytes
    pub content_type: String,
}

/// Descriptor returned by resource listing and batch lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceDescriptor {
    /// Image resource
    Image {
        /// Resource id
        id: String,
        /// Display name
        name: String,
        /// MIME type of the image bytes
        content_type: Option<String>,
        /// Preview thumbnail, if one is stored
        thumbnail: Option<Thumbnail>,
    },
    /// Theme resource
    Theme {
        /// Resource id
        id: String,
        /// Display name
        name: String,
        /// Theme color palette
        palette: Vec<String>,
    },
    /// Report template resource
    ReportTemplate {
        /// Resource id
        id: String,
        /// Display name
        name: String,
        /// Preview thumbnail, if one is stored
        thumbnail: Option<Thumbnail>,
    },
    /// Shared data source resource
    SharedDataSource {
        /// Resource id
        id: String,
        /// Display name
        name: String,
        /// Data provider tag from the definition, e.g. `SQL` or `JSON`
        provider: Option<String>,
    },
}

impl ResourceDescriptor {
    /// Resource id regardless of kind
    pub fn id(&self) -> &str {
        match self {
            ResourceDescriptor::Image { id, .. }
            | ResourceDescriptor::Theme { id, .. }
            | ResourceDescriptor::ReportTemplate { id, .. }
            | ResourceDescriptor::SharedDataSource { id, .. } => id,
        }
    }
}

/// A resource as persisted by a backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Resource id, unique within its kind
    pub id: String,
    /// Display name
    pub name: String,
    /// Resource kind
    pub kind: ResourceKind,
    /// Raw resource bytes
    pub content: Vec<u8>,
    /// MIME type, for images
    #[serde(default)]
    pub content_type: Option<String>,
    /// Stored thumbnail bytes, for images and templates
    #[serde(default)]
    pub thumbnail: Option<Vec<u8>>,
    /// Theme color palette
    #[serde(default)]
    pub palette: Vec<String>,
    /// Data provider tag, for shared data sources
    #[serde(default)]
    pub provider: Option<String>,
}

impl ResourceRecord {
    /// Derive the listing descriptor for this record
    pub fn descriptor(&self) -> ResourceDescriptor {
        match self.kind {
            ResourceKind::Image => ResourceDescriptor::Image {
                id: self.id.clone(),
                name: self.name.clone(),
                content_type: self.content_type.clone(),
                thumbnail: self.thumbnail.as_ref().map(|data| Thumbnail {
                    data: data.clone(),
                    content_type: self.content_type.clone().unwrap_or_else(|| "image/png".into()),
                }),
            },
            ResourceKind::Theme => ResourceDescriptor::Theme {
                id: self.id.clone(),
                name: self.name.clone(),
                palette: self.palette.clone(),
            },
            ResourceKind::ReportTemplate | ResourceKind::DataSetTemplate => {
                ResourceDescriptor::ReportTemplate {
                    id: self.id.clone(),
                    name: self.name.clone(),
                    thumbnail: self.thumbnail.as_ref().map(|data| Thumbnail {
                        data: data.clone(),
                        content_type: "image/png".into(),
                    }),
                }
            }
            ResourceKind::SharedDataSource => ResourceDescriptor::SharedDataSource {
                id: self.id.clone(),
                name: self.name.clone(),
                provider: self.provider.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_type_from_extension() {
        assert_eq!(ReportType::from_extension(".rdl").unwrap(), ReportType::RdlXml);
        assert_eq!(ReportType::from_extension("rdlx").unwrap(), ReportType::RdlXml);
        assert_eq!(
            ReportType::from_extension(".rdlx-master").unwrap(),
            ReportType::RdlMasterXml
        );
        assert_eq!(ReportType::from_extension(".rpx").unwrap(), ReportType::RpxXml);
        assert!(ReportType::from_extension(".pdf").is_err());
    }

    #[test]
    fn report_type_from_id() {
        assert_eq!(ReportType::from_id("Invoice.rdlx").unwrap(), ReportType::RdlXml);
        assert_eq!(
            ReportType::from_id("Base.rdlx-master").unwrap(),
            ReportType::RdlMasterXml
        );
        assert!(ReportType::from_id("noextension").is_err());
    }

    #[test]
    fn canonical_extension_round_trips() {
        for ty in [ReportType::RdlXml, ReportType::RdlMasterXml, ReportType::RpxXml] {
            assert_eq!(ReportType::from_extension(ty.canonical_extension()).unwrap(), ty);
        }
    }

    #[test]
    fn report_file_detection() {
        assert!(is_report_file("Invoice.rdlx"));
        assert!(is_report_file("BASE.RDLX-MASTER"));
        assert!(!is_report_file("picture.png"));
    }
}
