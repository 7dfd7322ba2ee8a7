//! In-memory favorites registry.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::backend::{FavoritesBackend, FavoritesError, FavoritesResult};
use crate::favorite::{FavoriteLocation, UserId};

/// Per-user ordered favorites held in memory.
///
/// Readers run concurrently; writers are serialized by the write lock, so a
/// duplicate check and its insert can't interleave with another writer.
#[derive(Debug, Default)]
pub struct MemoryFavoritesStore {
    favorites: RwLock<HashMap<UserId, Vec<FavoriteLocation>>>,
}

impl MemoryFavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with at least one favorite.
    pub fn user_count(&self) -> usize {
        self.favorites.read().len()
    }
}

impl FavoritesBackend for MemoryFavoritesStore {
    fn add(&self, favorite: FavoriteLocation) -> FavoritesResult<()> {
        favorite.validate()?;

        let mut favorites = self.favorites.write();
        let entries = favorites.entry(favorite.user_id).or_default();

        if entries.iter().any(|f| f.city_name == favorite.city_name) {
            tracing::error!(
                user_id = favorite.user_id,
                city = %favorite.city_name,
                "City already exists in favorites"
            );
            return Err(FavoritesError::duplicate(favorite.user_id, favorite.city_name));
        }

        tracing::info!(
            "City {} added to favorites for user ID {}",
            favorite.city_name,
            favorite.user_id
        );
        entries.push(favorite);
        Ok(())
    }

    fn remove(&self, user_id: UserId, city_name: &str) -> FavoritesResult<()> {
        let mut favorites = self.favorites.write();

        let Some(entries) = favorites.get_mut(&user_id) else {
            tracing::error!(user_id, city = city_name, "City not found in favorites");
            return Err(FavoritesError::not_found(user_id, city_name));
        };

        let Some(index) = entries.iter().position(|f| f.city_name == city_name) else {
            tracing::error!(user_id, city = city_name, "City not found in favorites");
            return Err(FavoritesError::not_found(user_id, city_name));
        };

        entries.remove(index);
        if entries.is_empty() {
            favorites.remove(&user_id);
        }

        tracing::info!("City {} removed from favorites for user ID {}", city_name, user_id);
        Ok(())
    }

    fn list(&self, user_id: UserId) -> FavoritesResult<Vec<FavoriteLocation>> {
        let favorites = self
            .favorites
            .read()
            .get(&user_id)
            .cloned()
            .unwrap_or_default();
        tracing::debug!("Retrieved {} favorites for user ID {}", favorites.len(), user_id);
        Ok(favorites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn favorite(user_id: UserId, city: &str, lat: f64, lon: f64) -> FavoriteLocation {
        FavoriteLocation::new(user_id, city, lat, lon).unwrap()
    }

    #[test]
    fn test_add_and_list() {
        let store = MemoryFavoritesStore::new();
        store.add(favorite(1, "TestCity", 10.0, 20.0)).unwrap();

        let favorites = store.list(1).unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].city_name, "TestCity");
        assert_eq!(favorites[0].latitude, 10.0);
        assert_eq!(favorites[0].longitude, 20.0);
    }

    #[test]
    fn test_add_duplicate() {
        let store = MemoryFavoritesStore::new();
        store.add(favorite(1, "TestCity", 10.0, 20.0)).unwrap();

        let result = store.add(favorite(1, "TestCity", 11.0, 21.0));
        assert!(matches!(result, Err(FavoritesError::Duplicate { .. })));
        assert_eq!(store.list(1).unwrap().len(), 1);
        // First registration wins
        assert_eq!(store.list(1).unwrap()[0].latitude, 10.0);
    }

    #[test]
    fn test_add_rejects_unvalidated_record() {
        let store = MemoryFavoritesStore::new();
        let bogus = FavoriteLocation {
            user_id: 1,
            city_name: "Bogus".to_string(),
            latitude: 500.0,
            longitude: -999.0,
        };

        assert!(matches!(
            store.add(bogus),
            Err(FavoritesError::InvalidCoordinates { .. })
        ));
        assert!(store.list(1).unwrap().is_empty());
        assert_eq!(store.user_count(), 0);
    }

    #[test]
    fn test_duplicates_differing_in_case_are_distinct() {
        let store = MemoryFavoritesStore::new();
        store.add(favorite(1, "Paris", 48.8566, 2.3522)).unwrap();
        store.add(favorite(1, "paris", 48.8566, 2.3522)).unwrap();
        assert_eq!(store.list(1).unwrap().len(), 2);
    }

    #[test]
    fn test_same_city_different_users() {
        let store = MemoryFavoritesStore::new();
        store.add(favorite(1, "Paris", 48.8566, 2.3522)).unwrap();
        store.add(favorite(2, "Paris", 48.8566, 2.3522)).unwrap();
        assert_eq!(store.list(1).unwrap().len(), 1);
        assert_eq!(store.list(2).unwrap().len(), 1);
        assert_eq!(store.user_count(), 2);
    }

    #[test]
    fn test_remove() {
        let store = MemoryFavoritesStore::new();
        store.add(favorite(1, "TestCity", 10.0, 20.0)).unwrap();
        store.add(favorite(1, "AnotherCity", 30.0, 40.0)).unwrap();

        store.remove(1, "TestCity").unwrap();

        let favorites = store.list(1).unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].city_name, "AnotherCity");
    }

    #[test]
    fn test_remove_last_clears_user() {
        let store = MemoryFavoritesStore::new();
        store.add(favorite(1, "TestCity", 10.0, 20.0)).unwrap();
        store.remove(1, "TestCity").unwrap();
        assert!(store.list(1).unwrap().is_empty());
        assert_eq!(store.user_count(), 0);
    }

    #[test]
    fn test_remove_nonexistent() {
        let store = MemoryFavoritesStore::new();
        assert!(matches!(
            store.remove(1, "TestCity"),
            Err(FavoritesError::NotFound { .. })
        ));

        store.add(favorite(1, "AnotherCity", 30.0, 40.0)).unwrap();
        assert!(matches!(
            store.remove(1, "TestCity"),
            Err(FavoritesError::NotFound { .. })
        ));
        assert_eq!(store.list(1).unwrap().len(), 1);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let store = MemoryFavoritesStore::new();
        for (i, city) in ["Zurich", "Athens", "Madrid"].iter().enumerate() {
            store.add(favorite(1, city, i as f64, i as f64)).unwrap();
        }
        let names: Vec<_> = store.list(1).unwrap().into_iter().map(|f| f.city_name).collect();
        assert_eq!(names, vec!["Zurich", "Athens", "Madrid"]);
    }

    #[test]
    fn test_list_unknown_user_is_empty() {
        let store = MemoryFavoritesStore::new();
        assert!(store.list(42).unwrap().is_empty());
    }

    #[test]
    fn test_get_and_contains() {
        let store = MemoryFavoritesStore::new();
        store.add(favorite(1, "TestCity", 10.0, 20.0)).unwrap();

        assert_eq!(store.get(1, "TestCity").unwrap().longitude, 20.0);
        assert!(matches!(store.get(1, "Other"), Err(FavoritesError::NotFound { .. })));
        assert!(store.contains(1, "TestCity").unwrap());
        assert!(!store.contains(2, "TestCity").unwrap());
    }

    #[test]
    fn test_concurrent_adds_of_same_city() {
        let store = Arc::new(MemoryFavoritesStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.add(favorite(1, "Paris", 48.8566, 2.3522)).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(store.list(1).unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_adds_of_distinct_cities() {
        let store = Arc::new(MemoryFavoritesStore::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.add(favorite(1, &format!("City{i}"), 0.0, 0.0)))
            })
            .collect();

        for h in handles {
            h.join().unwrap().unwrap();
        }
        assert_eq!(store.list(1).unwrap().len(), 16);
    }
}
