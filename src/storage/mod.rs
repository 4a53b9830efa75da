//! Storage module for progress documents and configuration.

pub mod config;
pub mod database;
pub mod documents;
pub mod kv;
pub mod schema;

pub use config::{AppConfig, ConfigError, StorageBackend};
pub use database::SqliteStore;
pub use documents::{DocumentKeys, DocumentKind, DocumentStore, StorageChange};
pub use kv::{KeyValueStore, MemoryStore, StorageError};
