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

//! Application configuration management.
//!
//! Settings persist as TOML through `confy`. Command-line flags override
//! them for a single run without being written back.

use std::path::PathBuf;
use std::time::Duration;

use deplist_core::{health_base_for, DEFAULT_API_BASE};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "deplist-desktop";
const CONFIG_NAME: &str = "config";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Backend API root, e.g. `http://localhost:5000/api`
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Root of the health endpoint; derived from `api_base` when unset
    #[serde(default)]
    pub health_base: Option<String>,

    #[serde(default = "default_departure_refresh_ms")]
    pub departure_refresh_ms: u64,

    #[serde(default = "default_weather_refresh_secs")]
    pub weather_refresh_secs: u64,

    /// Quiet period before a window resize triggers a relayout
    #[serde(default = "default_resize_settle_ms")]
    pub resize_settle_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Position catalog to use instead of the built-in one
    #[serde(default)]
    pub positions_file: Option<PathBuf>,

    /// Sector group selected when the app was last closed
    #[serde(default)]
    pub last_sector: Option<String>,

    #[serde(default = "default_window_width")]
    pub window_width: f32,

    #[serde(default = "default_window_height")]
    pub window_height: f32,
}

// Default value functions for serde
fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_departure_refresh_ms() -> u64 {
    2000
}

fn default_weather_refresh_secs() -> u64 {
    180
}

fn default_resize_settle_ms() -> u64 {
    250
}

fn default_request_timeout_secs() -> u64 {
    5
}

fn default_window_width() -> f32 {
    1400.0
}

fn default_window_height() -> f32 {
    900.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            health_base: None,
            departure_refresh_ms: default_departure_refresh_ms(),
            weather_refresh_secs: default_weather_refresh_secs(),
            resize_settle_ms: default_resize_settle_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            positions_file: None,
            last_sector: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults on first run
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    pub fn effective_health_base(&self) -> String {
        self.health_base
            .clone()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| health_base_for(&self.api_base))
    }

    pub fn departure_refresh(&self) -> Duration {
        Duration::from_millis(self.departure_refresh_ms.max(1))
    }

    pub fn weather_refresh(&self) -> Duration {
        Duration::from_secs(self.weather_refresh_secs.max(1))
    }

    pub fn resize_settle(&self) -> Duration {
        Duration::from_millis(self.resize_settle_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        // Partial documents from older versions must still load.
        let config: AppConfig =
            serde_json::from_str(r#"{"api_base": "http://deps.local:8080/api"}"#).unwrap();
        assert_eq!(config.api_base, "http://deps.local:8080/api");
        assert_eq!(config.departure_refresh(), Duration::from_secs(2));
        assert_eq!(config.weather_refresh(), Duration::from_secs(180));
        assert_eq!(config.resize_settle(), Duration::from_millis(250));
        assert_eq!(config.effective_health_base(), "http://deps.local:8080");
    }

    #[test]
    fn test_explicit_health_base_wins() {
        let config = AppConfig {
            health_base: Some("http://health.local".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.effective_health_base(), "http://health.local");
        assert_eq!(AppConfig::default().effective_health_base(), "http://localhost:5000");
    }
}
