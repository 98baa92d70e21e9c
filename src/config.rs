use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use serde::{Deserialize, Serialize};

use crate::services::playlist::rebuild::DEFAULT_INSERT_DELAY;
use crate::youtube_rs::MAX_PAGE_SIZE;

const APP_DIR: &str = "playlist-sorter";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    cache_directory: String,
    token_file: String,
    pub page_size: u32,
    insert_delay: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_directory: "~/.cache/playlist-sorter".to_string(),
            token_file: "~/.config/playlist-sorter/token.json".to_string(),
            page_size: MAX_PAGE_SIZE,
            insert_delay: humantime::format_duration(DEFAULT_INSERT_DELAY).to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(eyre!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE,
                self.page_size
            ));
        }
        self.insert_delay()?;
        Ok(())
    }

    /// Default config file location, e.g. `~/.config/playlist-sorter/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join(APP_DIR).join("config.toml"))
    }

    /// Load `path` if given, otherwise the default file. A missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the default config to `path`, refusing to overwrite an existing file.
    pub fn create_default(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(eyre!("Config file already exists: {}", path.display()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(&Self::default())?;
        std::fs::write(path, contents)
            .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Expand ~ to home directory
    fn expand_path(&self, path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    pub fn cache_directory(&self) -> PathBuf {
        self.expand_path(&self.cache_directory)
    }

    pub fn token_file(&self) -> PathBuf {
        self.expand_path(&self.token_file)
    }

    pub fn insert_delay(&self) -> Result<Duration> {
        humantime::parse_duration(&self.insert_delay)
            .wrap_err_with(|| format!("Invalid insert_delay: {}", self.insert_delay))
    }
}
