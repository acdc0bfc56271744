pub mod open_meteo;

use async_trait::async_trait;
use log::warn;
use thiserror::Error;

use crate::models::weather::{ Coordinates, WeatherSnapshot };

pub use open_meteo::OpenMeteoClient;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Failed to reach weather API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Weather API returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("Weather API response could not be parsed: {0}")]
    Malformed(String),
    #[error("Invalid weather API URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Anything that can produce a live weather reading for a coordinate pair.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(
        &self,
        coordinates: Coordinates,
        location: &str
    ) -> Result<WeatherSnapshot, WeatherError>;
}

/// Where to read weather for and what to call it.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherTarget {
    pub coordinates: Coordinates,
    pub location: String,
}

impl Default for WeatherTarget {
    fn default() -> Self {
        Self {
            coordinates: Coordinates::NEW_YORK,
            location: "New York City, NY".to_string(),
        }
    }
}

/// Fetches a snapshot, substituting the `"Unavailable"` placeholder when the
/// upstream fails.
pub async fn fetch_or_placeholder(
    source: &dyn WeatherSource,
    target: &WeatherTarget
) -> WeatherSnapshot {
    match source.fetch(target.coordinates, &target.location).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Weather fetch for {} failed, serving placeholder: {}", target.location, e);
            WeatherSnapshot::unavailable(target.location.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::weather::Reading;

    struct Broken;

    #[async_trait]
    impl WeatherSource for Broken {
        async fn fetch(&self, _: Coordinates, _: &str) -> Result<WeatherSnapshot, WeatherError> {
            Err(WeatherError::Status(reqwest::StatusCode::BAD_GATEWAY))
        }
    }

    struct Fixed;

    #[async_trait]
    impl WeatherSource for Fixed {
        async fn fetch(&self, _: Coordinates, location: &str) -> Result<WeatherSnapshot, WeatherError> {
            Ok(WeatherSnapshot::new(location, 10.0, 4.2))
        }
    }

    #[tokio::test]
    async fn failure_becomes_placeholder() {
        let snapshot = fetch_or_placeholder(&Broken, &WeatherTarget::default()).await;

        assert_eq!(snapshot.temperature, Reading::Unavailable);
        assert_eq!(snapshot.wind_speed, Reading::Unavailable);
        assert_eq!(snapshot.location, "New York City, NY");
    }

    #[tokio::test]
    async fn success_passes_through() {
        let snapshot = fetch_or_placeholder(&Fixed, &WeatherTarget::default()).await;

        assert_eq!(snapshot.temperature, Reading::Value(10.0));
        assert_eq!(snapshot.wind_speed, Reading::Value(4.2));
    }
}
