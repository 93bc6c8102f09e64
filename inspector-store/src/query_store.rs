//! Saved explorer queries.

use inspector_core::SavedQuery;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_queries_path, Access, JsonFile};

/// Persisted list of saved queries, oldest first.
#[derive(Debug)]
pub struct QueryStore {
    queries: RwLock<Vec<SavedQuery>>,
    file: JsonFile,
}

impl QueryStore {
    /// Creates an empty store backed by `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            queries: RwLock::new(Vec::new()),
            file: JsonFile::new(path, Access::Shared),
        }
    }

    /// Loads queries from the default path.
    pub async fn load_default() -> Self {
        Self::load(default_queries_path()).await
    }

    /// Loads queries from `path`. A missing or unreadable file yields an
    /// empty store.
    pub async fn load(path: PathBuf) -> Self {
        let file = JsonFile::new(path, Access::Shared);
        let queries: Vec<SavedQuery> = file.read_or_default().await;
        debug!(path = %file.path().display(), count = queries.len(), "Loaded saved queries");
        Self {
            queries: RwLock::new(queries),
            file,
        }
    }

    /// All saved queries.
    pub async fn list(&self) -> Vec<SavedQuery> {
        self.queries.read().await.clone()
    }

    /// Looks up a query by id.
    pub async fn get(&self, id: i64) -> Option<SavedQuery> {
        self.queries.read().await.iter().find(|q| q.id == id).cloned()
    }

    /// Adds a query and persists the list.
    ///
    /// Ids are millisecond timestamps; a colliding id is bumped until unique.
    /// Returns the stored query.
    ///
    /// # Errors
    ///
    /// Returns error if the list cannot be written to disk. The in-memory
    /// list is unchanged in that case.
    pub async fn save(&self, mut query: SavedQuery) -> Result<SavedQuery, StoreError> {
        let mut queries = self.queries.write().await;
        while queries.iter().any(|q| q.id == query.id) {
            query.id += 1;
        }

        let mut updated = queries.clone();
        updated.push(query.clone());
        self.file.write(&updated).await?;
        *queries = updated;

        info!(id = query.id, name = %query.name, "Query saved");
        Ok(query)
    }

    /// Removes a query and persists the list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::QueryNotFound`] for an unknown id, or an IO
    /// error if the list cannot be written.
    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut queries = self.queries.write().await;
        let updated: Vec<SavedQuery> = queries.iter().filter(|q| q.id != id).cloned().collect();
        if updated.len() == queries.len() {
            return Err(StoreError::QueryNotFound(id));
        }

        self.file.write(&updated).await?;
        *queries = updated;

        info!(id, "Query deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspector_core::HttpMethod;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_crud_roundtrip_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("queries.json");

        let store = QueryStore::load(path.clone()).await;
        assert!(store.list().await.is_empty());

        let a = store
            .save(SavedQuery::new("accounts", HttpMethod::Get, "/Account", "{\"limit\":5}", ""))
            .await
            .unwrap();
        let b = store
            .save(SavedQuery::new("create", HttpMethod::Post, "/Account", "", "{\"Name\":\"x\"}"))
            .await
            .unwrap();
        assert_ne!(a.id, b.id);

        let reloaded = QueryStore::load(path.clone()).await;
        let names: Vec<String> = reloaded.list().await.into_iter().map(|q| q.name).collect();
        assert_eq!(names, vec!["accounts", "create"]);
        assert_eq!(reloaded.get(b.id).await.unwrap().method, HttpMethod::Post);

        reloaded.delete(a.id).await.unwrap();
        assert!(matches!(
            reloaded.delete(a.id).await,
            Err(StoreError::QueryNotFound(_))
        ));

        let again = QueryStore::load(path).await;
        assert_eq!(again.list().await.len(), 1);
        assert!(again.get(a.id).await.is_none());
    }

    #[tokio::test]
    async fn test_colliding_ids_are_bumped() {
        let dir = TempDir::new().unwrap();
        let store = QueryStore::new(dir.path().join("queries.json"));

        let mut q = SavedQuery::new("one", HttpMethod::Get, "/a", "", "");
        q.id = 1000;
        store.save(q.clone()).await.unwrap();
        let second = store.save(q).await.unwrap();
        assert_eq!(second.id, 1001);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_list_unchanged() {
        let dir = TempDir::new().unwrap();
        // The parent of the queries file is a regular file, so writes fail.
        let blocker = dir.path().join("blocker");
        tokio::fs::write(&blocker, "").await.unwrap();
        let store = QueryStore::new(blocker.join("queries.json"));

        let result = store
            .save(SavedQuery::new("lost", HttpMethod::Get, "/a", "", ""))
            .await;
        assert!(result.is_err());
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("queries.json");
        tokio::fs::write(&path, "not json").await.unwrap();
        assert!(QueryStore::load(path).await.list().await.is_empty());
    }
}
