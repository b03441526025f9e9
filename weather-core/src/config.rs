use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::Units;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_GEO_BASE_URL: &str = "http://ip-api.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,

    pub units: Units,

    /// Overrides the OpenWeather host, mostly useful for testing.
    pub base_url: Option<String>,

    /// Overrides the IP geolocation host.
    pub geo_base_url: Option<String>,

    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the file holding the last search and first-run flags.
    pub fn settings_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("settings.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        let trimmed = api_key.trim();
        self.api_key = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    /// API key from the environment, falling back to the config file.
    pub fn resolve_api_key(&self) -> Result<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        Self::pick_api_key(from_env, self.api_key.as_deref())
    }

    fn pick_api_key(from_env: Option<String>, from_file: Option<&str>) -> Result<String> {
        from_env
            .filter(|k| !k.trim().is_empty())
            .or_else(|| from_file.map(str::to_string))
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `weather configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn geo_base_url(&self) -> &str {
        self.geo_base_url.as_deref().unwrap_or(DEFAULT_GEO_BASE_URL)
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_api_key_errors_when_nothing_set() {
        let err = Config::pick_api_key(None, None).unwrap_err();

        assert!(err.to_string().contains("No OpenWeather API key configured"));
        assert!(err.to_string().contains("weather configure"));
    }

    #[test]
    fn env_key_overrides_file_key() {
        let key = Config::pick_api_key(Some("ENV_KEY".into()), Some("FILE_KEY")).unwrap();
        assert_eq!(key, "ENV_KEY");
    }

    #[test]
    fn blank_env_key_falls_back_to_file() {
        let key = Config::pick_api_key(Some("  ".into()), Some("FILE_KEY")).unwrap();
        assert_eq!(key, "FILE_KEY");
    }

    #[test]
    fn set_api_key_trims_and_clears() {
        let mut cfg = Config::default();

        cfg.set_api_key("  KEY  ".into());
        assert_eq!(cfg.api_key.as_deref(), Some("KEY"));

        cfg.set_api_key("   ".into());
        assert_eq!(cfg.api_key, None);
    }

    #[test]
    fn defaults_when_fields_missing() {
        let cfg: Config = toml::from_str("api_key = \"abc\"").unwrap();

        assert_eq!(cfg.units, Units::Imperial);
        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
        assert_eq!(cfg.geo_base_url(), DEFAULT_GEO_BASE_URL);
        assert_eq!(cfg.timeout(), std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.units = Units::Metric;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("KEY"));
        assert_eq!(loaded.units, Units::Metric);
    }

    #[test]
    fn load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.api_key.is_none());
    }
}
