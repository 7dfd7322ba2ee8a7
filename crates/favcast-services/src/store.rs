//! Unified favorites store supporting multiple backends.
//!
//! `FavoritesStore` wraps the in-memory and SQLite registries behind one
//! async interface. SQLite calls run on the blocking pool.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::{FavoritesBackend, FavoritesError, FavoritesResult};
use crate::favorite::{FavoriteLocation, UserId};
use crate::memory_store::MemoryFavoritesStore;
use crate::sqlite_store::SqliteFavoritesStore;

/// Favorites registry shared across tasks.
#[derive(Clone)]
pub enum FavoritesStore {
    /// Process-local registry; contents are lost on exit.
    Memory(Arc<MemoryFavoritesStore>),

    /// Local SQLite database.
    Sqlite(Arc<Mutex<SqliteFavoritesStore>>),
}

impl FavoritesStore {
    pub fn memory() -> Self {
        Self::Memory(Arc::new(MemoryFavoritesStore::new()))
    }

    pub fn sqlite(store: SqliteFavoritesStore) -> Self {
        Self::Sqlite(Arc::new(Mutex::new(store)))
    }

    pub fn is_sqlite(&self) -> bool {
        matches!(self, Self::Sqlite(_))
    }

    /// Run a backend call, off the async executor for SQLite.
    async fn run<T, F>(&self, op: F) -> FavoritesResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn FavoritesBackend) -> FavoritesResult<T> + Send + 'static,
    {
        match self {
            Self::Memory(store) => op(&**store),
            Self::Sqlite(store) => {
                let store = store.clone();
                tokio::task::spawn_blocking(move || op(&*store.lock()))
                    .await
                    .map_err(|e| FavoritesError::storage(format!("Storage task failed: {}", e)))?
            }
        }
    }

    pub async fn add(&self, favorite: FavoriteLocation) -> FavoritesResult<()> {
        self.run(move |backend| backend.add(favorite)).await
    }

    pub async fn remove(&self, user_id: UserId, city_name: &str) -> FavoritesResult<()> {
        let city_name = city_name.to_string();
        self.run(move |backend| backend.remove(user_id, &city_name)).await
    }

    pub async fn list(&self, user_id: UserId) -> FavoritesResult<Vec<FavoriteLocation>> {
        self.run(move |backend| backend.list(user_id)).await
    }

    pub async fn get(&self, user_id: UserId, city_name: &str) -> FavoritesResult<FavoriteLocation> {
        let city_name = city_name.to_string();
        self.run(move |backend| backend.get(user_id, &city_name)).await
    }

    pub async fn contains(&self, user_id: UserId, city_name: &str) -> FavoritesResult<bool> {
        let city_name = city_name.to_string();
        self.run(move |backend| backend.contains(user_id, &city_name)).await
    }
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory(_) => write!(f, "FavoritesStore::Memory"),
            Self::Sqlite(_) => write!(f, "FavoritesStore::Sqlite"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stores() -> Vec<FavoritesStore> {
        vec![
            FavoritesStore::memory(),
            FavoritesStore::sqlite(
                SqliteFavoritesStore::in_memory().expect("Failed to create in-memory store"),
            ),
        ]
    }

    #[tokio::test]
    async fn test_add_list_remove() {
        for store in stores() {
            let fav = FavoriteLocation::new(1, "Paris", 48.8566, 2.3522).unwrap();
            store.add(fav.clone()).await.unwrap();

            assert_eq!(store.list(1).await.unwrap(), vec![fav.clone()]);
            assert_eq!(store.get(1, "Paris").await.unwrap(), fav);
            assert!(store.contains(1, "Paris").await.unwrap());

            store.remove(1, "Paris").await.unwrap();
            assert!(store.list(1).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        for store in stores() {
            let fav = FavoriteLocation::new(1, "Paris", 48.8566, 2.3522).unwrap();
            store.add(fav.clone()).await.unwrap();

            assert!(matches!(
                store.add(fav).await,
                Err(FavoritesError::Duplicate { .. })
            ));
            assert!(matches!(
                store.remove(1, "Lyon").await,
                Err(FavoritesError::NotFound { .. })
            ));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_adds() {
        for store in stores() {
            let mut handles = Vec::new();
            for _ in 0..8 {
                let store = store.clone();
                handles.push(tokio::spawn(async move {
                    let fav = FavoriteLocation::new(3, "Oslo", 59.91, 10.75).unwrap();
                    store.add(fav).await.is_ok()
                }));
            }

            let mut successes = 0;
            for handle in handles {
                if handle.await.unwrap() {
                    successes += 1;
                }
            }
            assert_eq!(successes, 1, "{:?}", store);
            assert_eq!(store.list(3).await.unwrap().len(), 1);
        }
    }

    #[test]
    fn test_backend_kind() {
        assert!(!FavoritesStore::memory().is_sqlite());
    }
}
