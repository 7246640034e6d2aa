//! User configuration.
//!
//! Settings live in `config.toml` inside the platform configuration
//! directory (for example `~/.config/boilerpl8/config.toml` on Linux). Every
//! field is optional and falls back to its default, so a missing file is the
//! same as an empty one. The `BOILERPL8_API_URL` environment variable
//! overrides the API base URL, which is handy for GitHub Enterprise mirrors.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::time::Duration;

/// Environment variable overriding [`Settings::api_base_url`].
pub const API_URL_ENV: &str = "BOILERPL8_API_URL";

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unknown keys.
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying parse error.
        #[source]
        source: toml::de::Error,
    },
}

/// Tunable behaviour of the fetcher.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base URL of the GitHub REST API.
    pub api_base_url: String,
    /// Suffix appended to repository names unless `-B` is given.
    pub repository_suffix: String,
    /// Global timeout for each HTTP request, in seconds. `0` disables it.
    pub http_timeout_secs: u64,
    /// Kill the initializer script after this many seconds. Unset waits
    /// indefinitely.
    pub initializer_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_owned(),
            repository_suffix: "-boilerpl8".to_owned(),
            http_timeout_secs: 30,
            initializer_timeout_secs: None,
        }
    }
}

impl Settings {
    /// Loads settings from the platform configuration directory, then
    /// applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration file exists but cannot
    /// be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = match default_config_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        Ok(settings.with_env_overrides(|name| std::env::var(name).ok()))
    }

    /// Loads settings from `path`; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load_from(path: &Utf8Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no configuration at {path}; using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let settings = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        log::debug!("loaded configuration from {path}");
        Ok(settings)
    }

    /// Applies environment overrides resolved through `lookup`.
    ///
    /// Blank values are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|value| !value.trim().is_empty()) {
            self.api_base_url = url.trim().to_owned();
        }
        self
    }

    /// HTTP timeout as a [`Duration`].
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Initializer timeout as a [`Duration`], when configured.
    #[must_use]
    pub fn initializer_timeout(&self) -> Option<Duration> {
        self.initializer_timeout_secs.map(Duration::from_secs)
    }
}

/// Returns `<config dir>/boilerpl8/config.toml` for the current platform.
#[must_use]
pub fn default_config_path() -> Option<Utf8PathBuf> {
    directories_next::ProjectDirs::from("", "", "boilerpl8")
        .and_then(|dirs| Utf8PathBuf::try_from(dirs.config_dir().to_path_buf()).ok())
        .map(|dir| dir.join(CONFIG_FILE_NAME))
}
