use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Environment variable consulted before the config file.
pub const API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";

/// Top-level configuration stored on disk.
///
/// A missing API key is a value, not an error: the app starts without it
/// and reports the unconfigured state per request.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeatherMap API key.
    ///
    /// Example TOML:
    /// api_key = "..."
    pub api_key: Option<String>,
}

impl Config {
    /// Load configuration. The environment variable wins over the file; a
    /// missing file is a normal first run.
    pub fn load() -> Result<Self> {
        if let Some(key) = env_api_key() {
            return Ok(Self { api_key: Some(key) });
        }

        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Locations of the durable stores. History and the theme preference each
/// get their own file, so neither can clobber the other.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub history: PathBuf,
    pub theme: PathBuf,
}

impl StoragePaths {
    pub fn resolve() -> Result<Self> {
        let dirs = project_dirs()?;
        let data = dirs.data_dir();

        Ok(Self {
            history: data.join("history.json"),
            theme: data.join("theme"),
        })
    }
}

fn env_api_key() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-dashboard", "dashboard")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_unconfigured() {
        let cfg = Config::default();
        assert!(!cfg.is_configured());
    }

    #[test]
    fn blank_api_key_counts_as_unconfigured() {
        let cfg = Config {
            api_key: Some(String::new()),
        };
        assert!(!cfg.is_configured());
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let cfg = Config {
            api_key: Some("SECRET".to_string()),
        };

        let serialized = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&serialized).expect("parse");

        assert_eq!(parsed.api_key.as_deref(), Some("SECRET"));
        assert!(parsed.is_configured());
    }

    #[test]
    fn storage_paths_do_not_collide() {
        let paths = StoragePaths::resolve().expect("platform dirs");
        assert_ne!(paths.history, paths.theme);
    }
}
