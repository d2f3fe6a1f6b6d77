//! Configuration settings for Skape.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the Ark API credential.
pub const API_KEY_ENV: &str = "ARK_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub api: ApiSettings,
    pub throttle: ThrottleSettings,
    pub poll: PollSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Remote generative-media API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base endpoint of the Ark API.
    pub endpoint: String,
    /// API credential. Falls back to the `ARK_API_KEY` environment variable.
    pub api_key: Option<String>,
    /// Model used for image generation.
    pub image_model: String,
    /// Model used for video generation.
    pub video_model: String,
    /// Per-call timeout for the synchronous image call (seconds).
    pub image_timeout_secs: u64,
    /// Per-call timeout for video job creation (seconds).
    pub create_timeout_secs: u64,
    /// Per-call timeout for video job status queries (seconds).
    pub query_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://ark.cn-beijing.volces.com/api/v3".to_string(),
            api_key: None,
            image_model: "doubao-seedream-4-0-250828".to_string(),
            video_model: "doubao-seedance-1-0-pro-250528".to_string(),
            image_timeout_secs: 120,
            create_timeout_secs: 30,
            query_timeout_secs: 30,
        }
    }
}

impl ApiSettings {
    /// Resolve the API credential from config or environment.
    ///
    /// Checked before any network call is made; an absent credential is a
    /// configuration error, not a request failure.
    pub fn resolve_api_key(&self) -> crate::error::Result<String> {
        if let Some(key) = self.api_key.as_deref() {
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(crate::error::SkapeError::Config(format!(
                "missing API credential: set {} or api.api_key in config",
                API_KEY_ENV
            ))),
        }
    }
}

/// Per-job query throttling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleSettings {
    /// Minimum spacing between status queries for the same job (seconds).
    pub min_interval_secs: u64,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            min_interval_secs: 15,
        }
    }
}

/// Poll-until-done loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Fixed sleep between poll ticks (seconds).
    pub tick_secs: u64,
    /// Maximum number of ticks before giving up (120 * 5s = 10 minutes).
    pub max_ticks: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            tick_secs: 5,
            max_ticks: 120,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SkapeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skape")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_remote_service_limits() {
        let settings = Settings::default();
        assert_eq!(settings.throttle.min_interval_secs, 15);
        assert_eq!(settings.poll.tick_secs, 5);
        assert_eq!(settings.poll.max_ticks, 120);
        assert!(settings.api.endpoint.starts_with("https://"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [api]
            endpoint = "https://ark.example.com/api/v3"

            [poll]
            max_ticks = 10
            "#,
        )
        .unwrap();
        assert_eq!(settings.api.endpoint, "https://ark.example.com/api/v3");
        assert_eq!(settings.poll.max_ticks, 10);
        // Untouched sections keep their defaults.
        assert_eq!(settings.poll.tick_secs, 5);
        assert_eq!(settings.throttle.min_interval_secs, 15);
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.api.video_model = "test-model".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.api.video_model, "test-model");
    }

    #[test]
    fn config_api_key_wins_over_env() {
        let mut api = ApiSettings::default();
        api.api_key = Some("from-config".to_string());
        assert_eq!(api.resolve_api_key().unwrap(), "from-config");
    }
}
