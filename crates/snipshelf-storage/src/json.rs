//! JSON file-based storage.
//!
//! Each key is one file: `["snippets", "snp_01"]` -> `<root>/snippets/snp_01.json`.

use crate::{validate_key, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn key_to_path(&self, key: &[&str]) -> StorageResult<PathBuf> {
        validate_key(key)?;

        let mut path = self.root.clone();
        for component in key {
            path.push(component);
        }
        // set_extension would eat anything after a dot in the id.
        let file_name = format!("{}.json", key[key.len() - 1]);
        path.set_file_name(file_name);
        Ok(path)
    }

    fn prefix_to_dir(&self, prefix: &[&str]) -> StorageResult<PathBuf> {
        if !prefix.is_empty() {
            validate_key(prefix)?;
        }
        let mut path = self.root.clone();
        for component in prefix {
            path.push(component);
        }
        Ok(path)
    }
}

#[async_trait]
impl Storage for JsonStorage {
    async fn read<T: DeserializeOwned + Send>(&self, key: &[&str]) -> StorageResult<Option<T>> {
        let path = self.key_to_path(key)?;
        debug!(path = %path.display(), "reading record");

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn write<T: Serialize + Send + Sync>(
        &self,
        key: &[&str],
        value: &T,
    ) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        debug!(path = %path.display(), "writing record");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(value)?;

        // Write to a sibling temp file, then rename over the target.
        let mut temp_path = path.clone().into_os_string();
        temp_path.push(".tmp");
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &path).await?;

        Ok(())
    }

    async fn remove(&self, key: &[&str]) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        debug!(path = %path.display(), "removing record");

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn list(&self, prefix: &[&str]) -> StorageResult<Vec<Vec<String>>> {
        let dir = self.prefix_to_dir(prefix)?;

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            let mut key: Vec<String> = prefix.iter().map(|s| s.to_string()).collect();
            key.push(stem.to_string());
            keys.push(key);
        }

        keys.sort();
        Ok(keys)
    }

    async fn exists(&self, key: &[&str]) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        title: String,
        language: String,
    }

    fn record(title: &str) -> Record {
        Record {
            title: title.to_string(),
            language: "rust".to_string(),
        }
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());

        storage
            .write(&["snippets", "snp_1"], &record("Debounce"))
            .await
            .unwrap();

        let read: Option<Record> = storage.read(&["snippets", "snp_1"]).await.unwrap();
        assert_eq!(read, Some(record("Debounce")));
        assert!(dir.path().join("snippets").join("snp_1.json").exists());
    }

    #[tokio::test]
    async fn test_read_missing_is_none() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());

        let read: Option<Record> = storage.read(&["snippets", "nope"]).await.unwrap();
        assert_eq!(read, None);
    }

    #[tokio::test]
    async fn test_ids_with_dots_keep_their_name() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());

        storage
            .write(&["configs", "settings.v2"], &record("Settings"))
            .await
            .unwrap();

        let keys = storage.list(&["configs"]).await.unwrap();
        assert_eq!(keys, vec![vec!["configs".to_string(), "settings.v2".to_string()]]);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());

        storage
            .write(&["configs", "a"], &record("VSCode settings.json"))
            .await
            .unwrap();
        assert!(storage.exists(&["configs", "a"]).await.unwrap());

        storage.remove(&["configs", "a"]).await.unwrap();
        storage.remove(&["configs", "a"]).await.unwrap();
        assert!(!storage.exists(&["configs", "a"]).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_skips_temp_files() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());

        for id in ["3", "1", "2"] {
            storage.write(&["snippets", id], &record(id)).await.unwrap();
        }
        std::fs::write(dir.path().join("snippets").join("4.json.tmp"), "{}").unwrap();

        let keys = storage.list(&["snippets"]).await.unwrap();
        let ids: Vec<&str> = keys.iter().map(|k| k[1].as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_list_missing_collection_is_empty() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        assert!(storage.list(&["configs"]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        let value = record("x");

        assert!(storage.write(&[], &value).await.is_err());
        assert!(storage.write(&["..", "etc", "passwd"], &value).await.is_err());
        assert!(storage.write(&["path/traversal"], &value).await.is_err());
    }
}
