use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CACHE_CONTROL } };
use serde::Deserialize;
use url::Url;

use super::{ WeatherError, WeatherSource };
use crate::models::weather::{ Coordinates, WeatherSnapshot };

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: HttpClient,
    forecast_url: Url,
}

#[derive(Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeather,
}

#[derive(Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
}

impl OpenMeteoClient {
    pub fn new(base_url: Option<String>) -> Result<Self, WeatherError> {
        let base = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let forecast_url = Url::parse(&format!("{}/v1/forecast", base.trim_end_matches('/')))?;

        // Every call must hit the live API.
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

        let http = HttpClient::builder().default_headers(headers).build()?;

        Ok(Self { http, forecast_url })
    }

    pub fn forecast_url(&self) -> &Url {
        &self.forecast_url
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn fetch(
        &self,
        coordinates: Coordinates,
        location: &str
    ) -> Result<WeatherSnapshot, WeatherError> {
        debug!(
            "Fetching current weather for {} ({}, {})",
            location,
            coordinates.latitude,
            coordinates.longitude
        );

        let resp = self.http
            .get(self.forecast_url.clone())
            .query(
                &[
                    ("latitude", coordinates.latitude.to_string()),
                    ("longitude", coordinates.longitude.to_string()),
                    ("current_weather", "true".to_string()),
                ]
            )
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status));
        }

        let body = resp.text().await?;
        let forecast: ForecastResponse = serde_json
            ::from_str(&body)
            .map_err(|e| WeatherError::Malformed(e.to_string()))?;

        Ok(
            WeatherSnapshot::new(
                location,
                forecast.current_weather.temperature,
                forecast.current_weather.windspeed
            )
        )
    }
}
