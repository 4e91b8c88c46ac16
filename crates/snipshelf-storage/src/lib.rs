//! Storage layer for snipshelf.
//!
//! A small key-value abstraction the snippet and config repositories are
//! written against, with two backends:
//! - JSON files on disk (default)
//! - In-memory (tests, `serve --memory`)

pub mod error;
pub mod json;
pub mod memory;

pub use error::{StorageError, StorageResult};
pub use json::JsonStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// A key-value storage backend.
///
/// Keys are path segments, e.g. `["snippets", "snp_01j9..."]`. Values are
/// stored as JSON.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read a value. Returns `None` if the key doesn't exist.
    async fn read<T: DeserializeOwned + Send>(&self, key: &[&str]) -> StorageResult<Option<T>>;

    /// Write a value, replacing any previous one.
    async fn write<T: Serialize + Send + Sync>(&self, key: &[&str], value: &T)
        -> StorageResult<()>;

    /// Remove a value. Removing a missing key is not an error.
    async fn remove(&self, key: &[&str]) -> StorageResult<()>;

    /// List the direct children of a prefix as full key paths.
    async fn list(&self, prefix: &[&str]) -> StorageResult<Vec<Vec<String>>>;

    async fn exists(&self, key: &[&str]) -> StorageResult<bool>;
}

/// Reject keys that are empty or could escape the storage root.
pub(crate) fn validate_key(key: &[&str]) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::invalid_key("key cannot be empty"));
    }

    for component in key {
        if component.is_empty()
            || component.contains('/')
            || component.contains('\\')
            || *component == "."
            || *component == ".."
        {
            return Err(StorageError::invalid_key(format!(
                "invalid key component: {component:?}"
            )));
        }
    }

    Ok(())
}
