//! In-memory storage. Nothing survives the process.

use crate::{validate_key, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Records are kept serialized so reads behave like the file backend:
/// every read hands out a fresh value.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RwLock<BTreeMap<Vec<String>, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn owned_key(key: &[&str]) -> Vec<String> {
        key.iter().map(|s| s.to_string()).collect()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn read<T: DeserializeOwned + Send>(&self, key: &[&str]) -> StorageResult<Option<T>> {
        validate_key(key)?;
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        match data.get(&Self::owned_key(key)) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize + Send + Sync>(
        &self,
        key: &[&str],
        value: &T,
    ) -> StorageResult<()> {
        validate_key(key)?;
        let json = serde_json::to_string(value)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        data.insert(Self::owned_key(key), json);
        Ok(())
    }

    async fn remove(&self, key: &[&str]) -> StorageResult<()> {
        validate_key(key)?;
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        data.remove(&Self::owned_key(key));
        Ok(())
    }

    async fn list(&self, prefix: &[&str]) -> StorageResult<Vec<Vec<String>>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        // BTreeMap iteration is ordered, so the result is sorted like the file backend.
        Ok(data
            .keys()
            .filter(|k| k.len() == prefix.len() + 1 && k.iter().zip(prefix).all(|(a, b)| a == b))
            .cloned()
            .collect())
    }

    async fn exists(&self, key: &[&str]) -> StorageResult<bool> {
        validate_key(key)?;
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        Ok(data.contains_key(&Self::owned_key(key)))
    }
}
