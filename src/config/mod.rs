//! Configuration management for readlater.
//!
//! Configuration is read from `~/.config/readlater/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::parser::FeedDialect;
use crate::queue::DEFAULT_MAX_PENDING;
use crate::transport::http_transport::DEFAULT_USER_AGENT;

pub const DEFAULT_BASE_URL: &str = "https://www.instapaper.com/api/";
pub const DEFAULT_FEED_URL: &str = "https://www.theverge.com/rss/index.xml";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub queue: QueueConfig,
    pub feed: FeedConfig,
}

/// Where the bookmarking service lives and how long to wait for it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub authenticate_path: String,
    pub add_path: String,
    /// Transport-level timeout in seconds (default: 10)
    pub timeout_secs: u64,
    /// Deadline for a whole authenticate or add call in seconds (default: 30)
    pub request_timeout_secs: u64,
    /// Reachability check timeout in seconds (default: 5)
    pub reachability_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            authenticate_path: "authenticate".to_string(),
            add_path: "add".to_string(),
            timeout_secs: 10,
            request_timeout_secs: 30,
            reachability_timeout_secs: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.base_url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn reachability_timeout(&self) -> Duration {
        Duration::from_secs(self.reachability_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Oldest entries are dropped beyond this many (default: 256)
    pub max_pending: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_pending: DEFAULT_MAX_PENDING,
        }
    }
}

/// Default feed and the element names used to read it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub url: String,
    pub entry_element: String,
    pub title_element: String,
    pub link_element: String,
    pub link_attribute: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        let dialect = FeedDialect::atom();
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            entry_element: dialect.entry,
            title_element: dialect.title,
            link_element: dialect.link,
            link_attribute: dialect.link_attribute,
        }
    }
}

impl FeedConfig {
    pub fn dialect(&self) -> FeedDialect {
        FeedDialect {
            entry: self.entry_element.clone(),
            title: self.title_element.clone(),
            link: self.link_element.clone(),
            link_attribute: self.link_attribute.clone(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            Self::create_default_config(config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/readlater/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("readlater").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# readlater configuration

[service]
# Bookmarking API root; the paths below are resolved against it
base_url = "https://www.instapaper.com/api/"
authenticate_path = "authenticate"
add_path = "add"

# Transport timeout per HTTP request, in seconds
timeout_secs = 10

# Deadline for a whole sign-in or save call, in seconds
request_timeout_secs = 30

# How long to wait when checking whether the service is reachable
reachability_timeout_secs = 5

[queue]
# Bookmarks saved while offline are retried later. Beyond this many,
# the oldest ones are dropped.
max_pending = 256

[feed]
url = "https://www.theverge.com/rss/index.xml"

# Element names for Atom feeds. For RSS use:
#   entry_element = "item"
#   (and remove link_attribute)
entry_element = "entry"
title_element = "title"
link_element = "link"
link_attribute = "href"
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let config: Config = toml::from_str(Config::default_config_content())
            .expect("Default config should be valid TOML");

        assert_eq!(config.service.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.service.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.queue.max_pending, DEFAULT_MAX_PENDING);
        assert_eq!(config.feed.dialect(), FeedDialect::atom());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[feed]
entry_element = "item"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.feed.entry_element, "item");
        assert_eq!(config.feed.title_element, "title");
        assert_eq!(config.service.add_path, "add");
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");

        assert_eq!(config.service.timeout(), Duration::from_secs(10));
        assert_eq!(config.feed.url, DEFAULT_FEED_URL);
        assert!(config.service.base_url().is_ok());
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config.queue.max_pending, DEFAULT_MAX_PENDING);
        // Reading the generated file back gives the same settings
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.service.base_url, config.service.base_url);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[queue]\nmax_pending = \"lots\"\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
