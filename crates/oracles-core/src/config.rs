use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding the configured base URL.
pub const BASE_URL_ENV: &str = "ORACLES_API_BASE_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_base_url(url: &str) -> Result<()> {
        Self::save_base_url_to(&Self::config_path()?, url)
    }

    /// Store `url` in the file at `path`. An unreadable existing file is
    /// replaced, with a warning.
    pub fn save_base_url_to(path: &Path, url: &str) -> Result<()> {
        let mut config = Self::load_from(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "replacing unreadable config file");
            Self::new()
        });
        config.api_base_url = Some(url.trim().trim_end_matches('/').to_string());
        config.save_to(path)
    }

    /// Effective base URL: `flag`, then the environment, then this file,
    /// then [`DEFAULT_BASE_URL`].
    pub fn resolve_base_url(&self, flag: Option<&str>) -> String {
        let env = std::env::var(BASE_URL_ENV).ok();
        resolve_base_url(flag, env.as_deref(), self.api_base_url.as_deref())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("oracles").join("config.json"))
    }
}

/// Blank candidates count as unset.
pub fn resolve_base_url(flag: Option<&str>, env: Option<&str>, file: Option<&str>) -> String {
    [flag, env, file]
        .into_iter()
        .flatten()
        .map(|url| url.trim().trim_end_matches('/'))
        .find(|url| !url.is_empty())
        .unwrap_or(DEFAULT_BASE_URL)
        .to_string()
}
