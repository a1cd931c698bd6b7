#![forbid(unsafe_code)]

pub mod config;
pub mod repository;
pub mod sheets;
pub mod sqlite;

pub use config::{ConfigError, LedgerBackend, StorageConfig};
pub use repository::{CatalogRepository, LedgerRepository, Storage, StorageError};
