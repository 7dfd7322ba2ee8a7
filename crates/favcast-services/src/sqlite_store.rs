//! SQLite-based favorites storage.
//!
//! This module provides `SqliteFavoritesStore`, a local SQLite implementation
//! of the `FavoritesBackend` trait. Uniqueness of (user_id, city_name) is
//! enforced by the schema.

use std::path::Path;

use rusqlite::{ffi, params, Connection};

use crate::backend::{FavoritesBackend, FavoritesError, FavoritesResult};
use crate::favorite::{FavoriteLocation, UserId};

/// SQLite-based favorites storage.
pub struct SqliteFavoritesStore {
    conn: Connection,
}

impl SqliteFavoritesStore {
    /// Open (or create) a favorites database at the given path.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store.
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS favorite_cities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                city_name TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                UNIQUE (user_id, city_name)
            );

            CREATE INDEX IF NOT EXISTS idx_favorite_cities_user ON favorite_cities(user_id);
            "#,
        )?;
        Ok(())
    }

    fn row_to_favorite(row: &rusqlite::Row) -> rusqlite::Result<FavoriteLocation> {
        Ok(FavoriteLocation {
            user_id: row.get(0)?,
            city_name: row.get(1)?,
            latitude: row.get(2)?,
            longitude: row.get(3)?,
        })
    }

    /// Total number of stored favorites across all users.
    pub fn count(&self) -> anyhow::Result<usize> {
        let count: i64 =
            self.conn.query_row("SELECT COUNT(*) FROM favorite_cities", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Only the (user_id, city_name) UNIQUE constraint means "already registered".
fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl FavoritesBackend for SqliteFavoritesStore {
    fn add(&self, favorite: FavoriteLocation) -> FavoritesResult<()> {
        favorite.validate()?;

        let result = self.conn.execute(
            "INSERT INTO favorite_cities (user_id, city_name, latitude, longitude)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                favorite.user_id,
                favorite.city_name,
                favorite.latitude,
                favorite.longitude
            ],
        );

        match result {
            Ok(_) => {
                tracing::info!(
                    "City {} added to favorites for user ID {}",
                    favorite.city_name,
                    favorite.user_id
                );
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => {
                tracing::error!(
                    user_id = favorite.user_id,
                    city = %favorite.city_name,
                    "City already exists in favorites"
                );
                Err(FavoritesError::duplicate(favorite.user_id, favorite.city_name))
            }
            Err(e) => Err(FavoritesError::storage(e.to_string())),
        }
    }

    fn remove(&self, user_id: UserId, city_name: &str) -> FavoritesResult<()> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM favorite_cities WHERE user_id = ?1 AND city_name = ?2",
                params![user_id, city_name],
            )
            .map_err(|e| FavoritesError::storage(e.to_string()))?;

        if changed == 0 {
            tracing::error!(user_id, city = city_name, "City not found in favorites");
            return Err(FavoritesError::not_found(user_id, city_name));
        }

        tracing::info!("City {} removed from favorites for user ID {}", city_name, user_id);
        Ok(())
    }

    fn list(&self, user_id: UserId) -> FavoritesResult<Vec<FavoriteLocation>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT user_id, city_name, latitude, longitude
                 FROM favorite_cities WHERE user_id = ?1 ORDER BY id ASC",
            )
            .map_err(|e| FavoritesError::storage(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id], Self::row_to_favorite)
            .map_err(|e| FavoritesError::storage(e.to_string()))?;

        let favorites = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| FavoritesError::storage(e.to_string()))?;
        tracing::debug!("Retrieved {} favorites for user ID {}", favorites.len(), user_id);
        Ok(favorites)
    }

    fn get(&self, user_id: UserId, city_name: &str) -> FavoritesResult<FavoriteLocation> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT user_id, city_name, latitude, longitude
                 FROM favorite_cities WHERE user_id = ?1 AND city_name = ?2",
            )
            .map_err(|e| FavoritesError::storage(e.to_string()))?;

        let mut rows = stmt
            .query(params![user_id, city_name])
            .map_err(|e| FavoritesError::storage(e.to_string()))?;

        match rows.next().map_err(|e| FavoritesError::storage(e.to_string()))? {
            Some(row) => {
                Self::row_to_favorite(row).map_err(|e| FavoritesError::storage(e.to_string()))
            }
            None => Err(FavoritesError::not_found(user_id, city_name)),
        }
    }
}
