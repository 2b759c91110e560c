//! Configuration structures for the backing stores

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Backing store selection, deserializable from host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// In-memory store (tests and development)
    Memory,

    /// File-system store rooted at a directory
    File(FileConfig),

    /// SQLite database store
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteConfig),

    /// Embedded document store
    #[cfg(feature = "sled")]
    Sled(SledConfig),
}

/// Configuration for the file-system store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    /// Directory holding one file per report
    pub root: PathBuf,
}

/// Configuration for the SQLite store
#[cfg(feature = "sqlite")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Path to the database file
    pub path: PathBuf,
}

/// Configuration for the embedded document store
#[cfg(feature = "sled")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SledConfig {
    /// Path to the database directory
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_deserializes_from_tagged_json() {
        let config: BackendConfig =
            serde_json::from_str(r#"{ "type": "file", "root": "resources/reports" }"#).unwrap();
        assert!(matches!(config, BackendConfig::File(_)));

        let config: BackendConfig = serde_json::from_str(r#"{ "type": "memory" }"#).unwrap();
        assert!(matches!(config, BackendConfig::Memory));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn sqlite_config_deserializes() {
        let config: BackendConfig =
            serde_json::from_str(r#"{ "type": "sqlite", "path": "resources/Storage.db" }"#)
                .unwrap();
        assert!(matches!(config, BackendConfig::Sqlite(_)));
    }
}
