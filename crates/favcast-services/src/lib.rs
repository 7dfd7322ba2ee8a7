pub mod backend;
pub mod favorite;
pub mod memory_store;
pub mod service;
pub mod sqlite_store;
pub mod store;

pub use backend::{FavoritesBackend, FavoritesError, FavoritesResult};
pub use favorite::{validate_city_name, FavoriteLocation, UserId, MAX_CITY_NAME_LENGTH};
pub use memory_store::MemoryFavoritesStore;
pub use service::{CityWeather, FavoritesService};
pub use sqlite_store::SqliteFavoritesStore;
pub use store::FavoritesStore;
