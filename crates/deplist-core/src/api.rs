// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP client for the departure board backend.
//!
//! The backend is read-only: weather per airport, all departures keyed by
//! airport, and a health probe on the service root.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::departures::{AircraftRecord, DepartureSnapshot};
use crate::weather::WeatherReport;

pub const DEFAULT_API_BASE: &str = "http://localhost:5000/api";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Health endpoint root for an API base: a trailing `/api` is dropped.
#[must_use]
pub fn health_base_for(api_base: &str) -> String {
    let base = api_base.trim_end_matches('/');
    base.strip_suffix("/api").unwrap_or(base).to_string()
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_base: String,
    health_base: String,
}

impl ApiClient {
    pub fn new(api_base: &str, health_base: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            health_base: health_base.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    #[must_use]
    pub fn weather_url(&self, icao: &str) -> String {
        format!("{}/weather/{icao}", self.api_base)
    }

    #[must_use]
    pub fn departures_url(&self) -> String {
        format!("{}/departures", self.api_base)
    }

    #[must_use]
    pub fn airport_departures_url(&self, icao: &str) -> String {
        format!("{}/departures/{icao}", self.api_base)
    }

    #[must_use]
    pub fn health_url(&self) -> String {
        format!("{}/health", self.health_base)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        let response = match self
            .http
            .get(&url)
            .header("Cache-Control", "no-cache")
            .send()
            .await
        {
            Ok(response) => response,
            Err(source) => return Err(ApiError::Transport { url, source }),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
            });
        }

        match response.json::<T>().await {
            Ok(body) => Ok(body),
            Err(source) => Err(ApiError::Decode { url, source }),
        }
    }

    pub async fn fetch_weather(&self, icao: &str) -> Result<WeatherReport, ApiError> {
        self.get_json(self.weather_url(icao)).await
    }

    pub async fn fetch_departures(&self) -> Result<DepartureSnapshot, ApiError> {
        self.get_json(self.departures_url()).await
    }

    /// Departures of a single airport.
    pub async fn fetch_airport_departures(&self, icao: &str) -> Result<Vec<AircraftRecord>, ApiError> {
        self.get_json(self.airport_departures_url(icao)).await
    }

    /// True when the backend answers and reports `status: "ok"`.
    pub async fn check_health(&self) -> Result<bool, ApiError> {
        let health: HealthResponse = self.get_json(self.health_url()).await?;
        Ok(health.status.as_deref() == Some("ok"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_base: &str) -> ApiClient {
        ApiClient::new(api_base, &health_base_for(api_base), Duration::from_millis(500)).unwrap()
    }

    #[test]
    fn test_health_base_strips_api_suffix() {
        assert_eq!(health_base_for("http://localhost:5000/api"), "http://localhost:5000");
        assert_eq!(health_base_for("http://localhost:5000/api/"), "http://localhost:5000");
        assert_eq!(health_base_for("https://deps.example.net"), "https://deps.example.net");
    }

    #[test]
    fn test_endpoint_urls() {
        let api = client("http://localhost:5000/api/");
        assert_eq!(api.api_base(), "http://localhost:5000/api");
        assert_eq!(api.weather_url("EGLL"), "http://localhost:5000/api/weather/EGLL");
        assert_eq!(api.departures_url(), "http://localhost:5000/api/departures");
        assert_eq!(
            api.airport_departures_url("EGKK"),
            "http://localhost:5000/api/departures/EGKK"
        );
        assert_eq!(api.health_url(), "http://localhost:5000/health");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_a_transport_error() {
        let api = client("http://127.0.0.1:9/api");
        let err = api.fetch_departures().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }), "{err}");
        assert!(err.to_string().contains("/api/departures"));

        let err = api.fetch_airport_departures("EGKK").await.unwrap_err();
        assert!(err.to_string().contains("/api/departures/EGKK"), "{err}");
    }
}
