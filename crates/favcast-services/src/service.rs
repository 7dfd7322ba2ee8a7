//! Favorites service.
//!
//! Combines the registry with the coordinate resolver, the weather gateway
//! and the tile mapper. Every failure is logged with the user, the city and
//! the operation before it is returned.

use favcast_weather::{
    AirQuality, CoordinateResolver, CurrentWeather, EndpointKind, Forecast, MapCriterion,
    TileAddress, TileMapper, WeatherError, WeatherGateway, WeatherPayload,
};
use tracing::instrument;

use crate::backend::{FavoritesError, FavoritesResult};
use crate::favorite::{validate_city_name, FavoriteLocation, UserId};
use crate::store::FavoritesStore;

/// Current weather for one favorite, as returned by `fetch_all`.
#[derive(Debug)]
pub struct CityWeather {
    pub city_name: String,
    pub result: Result<CurrentWeather, WeatherError>,
}

fn log_failure(operation: &str, user_id: UserId, city: &str, error: &FavoritesError) {
    tracing::error!(user_id, city, operation, error = %error, "Favorites operation failed");
}

#[derive(Debug, Clone)]
pub struct FavoritesService {
    store: FavoritesStore,
    resolver: CoordinateResolver,
    gateway: WeatherGateway,
    tiles: TileMapper,
}

impl FavoritesService {
    pub fn new(
        store: FavoritesStore,
        resolver: CoordinateResolver,
        gateway: WeatherGateway,
        tiles: TileMapper,
    ) -> Self {
        Self {
            store,
            resolver,
            gateway,
            tiles,
        }
    }

    pub fn store(&self) -> &FavoritesStore {
        &self.store
    }

    /// Geocode a city and add it to the user's favorites.
    ///
    /// An already registered city is rejected before the geocoder is called.
    ///
    /// # Errors
    /// `InvalidInput` for an empty name, `Duplicate` if already registered,
    /// `Weather` when geocoding fails (nothing is stored in that case).
    #[instrument(skip(self), level = "info")]
    pub async fn add_city(&self, user_id: UserId, city_name: &str) -> FavoritesResult<FavoriteLocation> {
        self.add_city_inner(user_id, city_name)
            .await
            .inspect_err(|e| log_failure("add_city", user_id, city_name, e))
    }

    async fn add_city_inner(&self, user_id: UserId, city_name: &str) -> FavoritesResult<FavoriteLocation> {
        validate_city_name(city_name)?;

        if self.store.contains(user_id, city_name).await? {
            return Err(FavoritesError::duplicate(user_id, city_name));
        }

        let coords = self.resolver.resolve(city_name).await?;
        let favorite = FavoriteLocation::new(user_id, city_name, coords.latitude, coords.longitude)?;
        self.store.add(favorite.clone()).await?;
        Ok(favorite)
    }

    /// Add a favorite with caller-supplied coordinates.
    ///
    /// # Errors
    /// `InvalidInput`, `InvalidCoordinates` or `Duplicate`.
    #[instrument(skip(self), level = "info")]
    pub async fn add_favorite(
        &self,
        user_id: UserId,
        city_name: &str,
        latitude: f64,
        longitude: f64,
    ) -> FavoritesResult<FavoriteLocation> {
        let result = async {
            let favorite = FavoriteLocation::new(user_id, city_name, latitude, longitude)?;
            self.store.add(favorite.clone()).await?;
            Ok::<_, FavoritesError>(favorite)
        }
        .await;
        result.inspect_err(|e| log_failure("add_favorite", user_id, city_name, e))
    }

    /// # Errors
    /// `NotFound` if the city is not one of the user's favorites.
    #[instrument(skip(self), level = "info")]
    pub async fn remove_favorite(&self, user_id: UserId, city_name: &str) -> FavoritesResult<()> {
        self.store
            .remove(user_id, city_name)
            .await
            .inspect_err(|e| log_failure("remove_favorite", user_id, city_name, e))
    }

    pub async fn list_favorites(&self, user_id: UserId) -> FavoritesResult<Vec<FavoriteLocation>> {
        self.store
            .list(user_id)
            .await
            .inspect_err(|e| log_failure("list_favorites", user_id, "", e))
    }

    /// Look up a favorite and fetch one endpoint for it.
    ///
    /// # Errors
    /// `NotFound` when the city is not a favorite, `Weather` when the
    /// upstream call fails.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(
        &self,
        user_id: UserId,
        city_name: &str,
        kind: EndpointKind,
    ) -> FavoritesResult<WeatherPayload> {
        let result = async {
            let favorite = self.store.get(user_id, city_name).await?;
            Ok::<_, FavoritesError>(self.gateway.fetch(kind, favorite.coordinates()).await?)
        }
        .await;
        result.inspect_err(|e| log_failure(kind.path(), user_id, city_name, e))
    }

    pub async fn get_weather(&self, user_id: UserId, city_name: &str) -> FavoritesResult<CurrentWeather> {
        let result = async {
            let favorite = self.store.get(user_id, city_name).await?;
            Ok::<_, FavoritesError>(self.gateway.current(favorite.coordinates()).await?)
        }
        .await;
        result.inspect_err(|e| log_failure("get_weather", user_id, city_name, e))
    }

    pub async fn get_forecast(&self, user_id: UserId, city_name: &str) -> FavoritesResult<Forecast> {
        let result = async {
            let favorite = self.store.get(user_id, city_name).await?;
            Ok::<_, FavoritesError>(self.gateway.forecast(favorite.coordinates()).await?)
        }
        .await;
        result.inspect_err(|e| log_failure("get_forecast", user_id, city_name, e))
    }

    pub async fn get_air_pollution(&self, user_id: UserId, city_name: &str) -> FavoritesResult<AirQuality> {
        let result = async {
            let favorite = self.store.get(user_id, city_name).await?;
            Ok::<_, FavoritesError>(self.gateway.air_pollution(favorite.coordinates()).await?)
        }
        .await;
        result.inspect_err(|e| log_failure("get_air_pollution", user_id, city_name, e))
    }

    /// Overlay tile for a favorite.
    ///
    /// The criterion is validated before the favorite is looked up, so an
    /// unknown criterion is reported even for a city that isn't registered.
    ///
    /// # Errors
    /// `Weather(InvalidCriterion)`, `NotFound`, or `Weather(InvalidInput)`
    /// for a zoom above the supported maximum.
    #[instrument(skip(self), level = "info")]
    pub async fn get_weather_map(
        &self,
        user_id: UserId,
        city_name: &str,
        criterion: &str,
        zoom: Option<u8>,
    ) -> FavoritesResult<TileAddress> {
        let result = async {
            let criterion: MapCriterion = criterion.parse()?;
            let favorite = self.store.get(user_id, city_name).await?;
            Ok::<_, FavoritesError>(self.tiles.map_tile(
                favorite.coordinates(),
                criterion.as_str(),
                zoom,
            )?)
        }
        .await;
        result.inspect_err(|e| log_failure("get_weather_map", user_id, city_name, e))
    }

    /// Current weather for every favorite of the user, in favorite order.
    ///
    /// A failing city does not abort the others; its entry carries the error.
    ///
    /// # Errors
    /// Only when the favorites list itself cannot be read.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_all(&self, user_id: UserId) -> FavoritesResult<Vec<CityWeather>> {
        let favorites = self.list_favorites(user_id).await?;

        let mut results = Vec::with_capacity(favorites.len());
        for favorite in favorites {
            let result = self.gateway.current(favorite.coordinates()).await;
            if let Err(e) = &result {
                tracing::error!(
                    user_id,
                    city = %favorite.city_name,
                    operation = "fetch_all",
                    error = %e,
                    "Weather fetch failed for favorite"
                );
            }
            results.push(CityWeather {
                city_name: favorite.city_name,
                result,
            });
        }

        let failed = results.iter().filter(|r| r.result.is_err()).count();
        tracing::info!(
            "Fetched weather for {} favorites of user ID {} ({} failed)",
            results.len(),
            user_id,
            failed
        );
        Ok(results)
    }
}
