//! Record storage for snippets and configs.
//!
//! Handlers depend on `Arc<dyn Repository<T>>`, so tests and the CLI can swap
//! the backing store without touching route code.

use crate::error::{CoreError, CoreResult};
use crate::filter::{search, Searchable};
use crate::model::{Snippet, ToolConfig};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use snipshelf_storage::Storage;
use snipshelf_util::Identifier;
use std::marker::PhantomData;
use tracing::debug;

/// A record type that lives in its own storage collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// First key segment for this record type.
    const COLLECTION: &'static str;
    /// Name used in error messages.
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Generate an id for a newly created record.
    fn new_id() -> String;
}

impl Record for Snippet {
    const COLLECTION: &'static str = "snippets";
    const KIND: &'static str = "snippet";

    fn id(&self) -> &str {
        &self.id
    }

    fn new_id() -> String {
        Identifier::snippet()
    }
}

impl Record for ToolConfig {
    const COLLECTION: &'static str = "configs";
    const KIND: &'static str = "config";

    fn id(&self) -> &str {
        &self.id
    }

    fn new_id() -> String {
        Identifier::config()
    }
}

/// CRUD over one record type.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// All records, ordered by id.
    async fn list(&self) -> CoreResult<Vec<T>>;

    async fn get(&self, id: &str) -> CoreResult<T>;

    /// Store a new record. Fails if the id is taken.
    async fn create(&self, record: T) -> CoreResult<T>;

    /// Replace an existing record.
    async fn update(&self, record: T) -> CoreResult<T>;

    async fn delete(&self, id: &str) -> CoreResult<()>;

    /// `list` narrowed by the record type's search fields.
    async fn search(&self, query: &str) -> CoreResult<Vec<T>>
    where
        T: Searchable,
    {
        let all = self.list().await?;
        Ok(search::<T, _>(query, all))
    }
}

/// [`Repository`] over any [`Storage`] backend, one key per record.
pub struct StoreRepository<T, S> {
    storage: S,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record, S: Storage> StoreRepository<T, S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            _record: PhantomData,
        }
    }

    fn not_found(id: &str) -> CoreError {
        CoreError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        }
    }
}

#[async_trait]
impl<T: Record, S: Storage> Repository<T> for StoreRepository<T, S> {
    async fn list(&self) -> CoreResult<Vec<T>> {
        let keys = self.storage.list(&[T::COLLECTION]).await?;

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let key_refs: Vec<&str> = key.iter().map(|s| s.as_str()).collect();
            if let Some(record) = self.storage.read::<T>(&key_refs).await? {
                records.push(record);
            }
        }

        records.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(records)
    }

    async fn get(&self, id: &str) -> CoreResult<T> {
        self.storage
            .read(&[T::COLLECTION, id])
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, record: T) -> CoreResult<T> {
        let key = [T::COLLECTION, record.id()];
        if self.storage.exists(&key).await? {
            return Err(CoreError::AlreadyExists {
                kind: T::KIND,
                id: record.id().to_string(),
            });
        }

        self.storage.write(&key, &record).await?;
        debug!(kind = T::KIND, id = record.id(), "Record created");
        Ok(record)
    }

    async fn update(&self, record: T) -> CoreResult<T> {
        let key = [T::COLLECTION, record.id()];
        if !self.storage.exists(&key).await? {
            return Err(Self::not_found(record.id()));
        }

        self.storage.write(&key, &record).await?;
        debug!(kind = T::KIND, id = record.id(), "Record updated");
        Ok(record)
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        let key = [T::COLLECTION, id];
        if !self.storage.exists(&key).await? {
            return Err(Self::not_found(id));
        }

        self.storage.remove(&key).await?;
        debug!(kind = T::KIND, id, "Record deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use snipshelf_storage::{JsonStorage, MemoryStorage};

    fn memory_repo<T: Record>() -> StoreRepository<T, MemoryStorage> {
        StoreRepository::new(MemoryStorage::new())
    }

    #[tokio::test]
    async fn test_snippet_crud() {
        let repo = memory_repo::<Snippet>();
        let mut snippet = seed::snippets().remove(0);

        let created = repo.create(snippet.clone()).await.unwrap();
        assert_eq!(created.id, snippet.id);

        snippet.title = "Throttle function".to_string();
        repo.update(snippet.clone()).await.unwrap();
        assert_eq!(repo.get(&snippet.id).await.unwrap().title, "Throttle function");

        repo.delete(&snippet.id).await.unwrap();
        let err = repo.get(&snippet.id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: "snippet", .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_id() {
        let repo = memory_repo::<ToolConfig>();
        let config = seed::configs().remove(0);
        repo.create(config.clone()).await.unwrap();

        let err = repo.create(config).await.unwrap_err();
        assert!(matches!(err, CoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let repo = memory_repo::<ToolConfig>();
        let config = seed::configs().remove(0);
        assert!(repo.update(config).await.is_err());
        assert!(repo.delete("nope").await.is_err());
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let repo = memory_repo::<Snippet>();
        for snippet in seed::snippets().into_iter().rev() {
            repo.create(snippet).await.unwrap();
        }

        let ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[tokio::test]
    async fn test_search_composes_with_list() {
        let repo = memory_repo::<Snippet>();
        for snippet in seed::snippets() {
            repo.create(snippet).await.unwrap();
        }

        let found = repo.search("css").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Tailwind center container");
    }

    #[tokio::test]
    async fn test_json_backend_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let config = seed::configs().remove(1);

        let repo: StoreRepository<ToolConfig, _> =
            StoreRepository::new(JsonStorage::new(dir.path()));
        repo.create(config.clone()).await.unwrap();

        let reopened: StoreRepository<ToolConfig, _> =
            StoreRepository::new(JsonStorage::new(dir.path()));
        assert_eq!(reopened.get(&config.id).await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_usable_as_trait_object() {
        let repo: std::sync::Arc<dyn Repository<Snippet>> =
            std::sync::Arc::new(memory_repo::<Snippet>());
        assert!(repo.list().await.unwrap().is_empty());
    }
}
