//! Backing store implementations

pub mod file;
pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sled")]
pub mod sled;

pub use file::FileBackend;
pub use memory::MemoryBackend;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;

#[cfg(feature = "sled")]
pub use self::sled::SledBackend;
