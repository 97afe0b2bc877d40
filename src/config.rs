/*
 * Copyright (C) 2026 Mark Wells Dev
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Default endpoint of the youth activity information service.
pub const DEFAULT_BASE_URL: &str = "https://apis.data.go.kr/1383000/YouthActivInfoSrvc";

/// Default per-call ceiling for upstream requests, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Prefix for environment overrides (`YOUTH_API_SERVICE_KEY`, ...).
pub const ENV_PREFIX: &str = "YOUTH_API";

/// Server settings merged from defaults, config files and the environment.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Public-data portal service key (required to serve)
    #[serde(default)]
    pub service_key: Option<String>,

    /// Base URL of the upstream API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-call timeout in seconds (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Validated settings the API client is built from.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Service key sent as `serviceKey`.
    pub service_key: String,
    /// Base URL without a trailing slash.
    pub base_url: Url,
    /// Per-call timeout.
    pub timeout: Duration,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from standard paths or a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be read or has the wrong shape.
    pub fn load(explicit_file: Option<PathBuf>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // 1. Start with defaults
        builder = builder
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?;

        // 2. Load from user config directory (~/.config/youth-activity-mcp/config.toml)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("youth-activity-mcp").join("config.toml");
            if config_path.exists() {
                builder = builder.add_source(config::File::from(config_path));
            }
        }

        // 3. Load from explicit file if provided
        if let Some(path) = explicit_file {
            builder = builder.add_source(config::File::from(path));
        }

        // 4. Load from environment variables (YOUTH_API_SERVICE_KEY, etc.)
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config = builder
            .build()
            .context("Failed to build configuration")?;

        config.try_deserialize().context("Failed to deserialize configuration")
    }

    /// Checks the settings needed to talk to the upstream API.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the service key is missing or blank, the
    /// base URL is not an absolute http(s) URL, or the timeout is zero.
    pub fn api_settings(&self) -> Result<ApiSettings, ConfigError> {
        let service_key = self
            .service_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingServiceKey)?
            .to_string();

        let trimmed = self.base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: "expected an http or https URL".to_string(),
            });
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(ApiSettings {
            service_key,
            base_url,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn with_key(key: &str) -> Config {
        Config {
            service_key: Some(key.to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 10);
        assert!(config.service_key.is_none());
    }

    #[test]
    fn test_missing_service_key_is_rejected() {
        assert!(matches!(
            Config::default().api_settings(),
            Err(ConfigError::MissingServiceKey)
        ));
        assert!(matches!(
            with_key("   ").api_settings(),
            Err(ConfigError::MissingServiceKey)
        ));
    }

    #[test]
    fn test_api_settings_normalizes_values() -> Result<()> {
        let config = Config {
            base_url: "http://127.0.0.1:9000/svc/".to_string(),
            ..with_key(" abc ")
        };
        let settings = config.api_settings()?;
        assert_eq!(settings.service_key, "abc");
        assert_eq!(settings.base_url.as_str(), "http://127.0.0.1:9000/svc");
        assert_eq!(settings.timeout, Duration::from_secs(10));
        Ok(())
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        for url in ["not a url", "ftp://example.com/x", "mailto:someone@example.com"] {
            let config = Config {
                base_url: url.to_string(),
                ..with_key("abc")
            };
            assert!(
                matches!(config.api_settings(), Err(ConfigError::InvalidBaseUrl { .. })),
                "expected {url} to be rejected"
            );
        }
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = Config {
            timeout_secs: 0,
            ..with_key("abc")
        };
        assert!(matches!(config.api_settings(), Err(ConfigError::InvalidTimeout)));
    }

    #[test]
    fn test_load_from_explicit_file() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "service_key = \"from-file\"")?;
        writeln!(file, "timeout_secs = 3")?;

        let config = Config::load(Some(file.path().to_path_buf()))?;
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        // The environment may override the key in CI; only check it is set.
        assert!(config.service_key.is_some());
        Ok(())
    }
}
