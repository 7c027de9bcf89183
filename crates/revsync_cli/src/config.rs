//! Configuration file support for revsync.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `REVSYNC_`, sections separated by
//!    a double underscore, e.g. `REVSYNC_SYNC__PACE_MS`)
//! 3. Config file (./revsync.toml, then ~/.config/revsync/config.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [api]
//! endpoint = "https://www.coursera.org"
//! application_key = "..."  # search statistics, optional
//! api_key = "..."          # or use REVSYNC_API__API_KEY env var
//! proxy = "http://127.0.0.1:8080"
//!
//! [sync]
//! window_size = 1000
//! pace_ms = 1000
//!
//! [output]
//! directory = "reviews"
//! format = "json"
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use revsync::OutputFormat;
use revsync::api::{ApiConfig, COURSERA_HOST, SEARCH_HOST, default_headers};
use revsync::sync::{DEFAULT_PACE_MS, DEFAULT_WINDOW_SIZE};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote endpoints and credentials.
    pub api: ApiSection,
    /// Default sync options.
    pub sync: SyncConfig,
    /// Where and how review files are written.
    pub output: OutputConfig,
}

/// Remote endpoints and credentials.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// Coursera host.
    pub endpoint: String,
    /// Search index host.
    pub search_endpoint: String,
    /// Search index application id.
    /// Can also be set via REVSYNC_API__APPLICATION_KEY.
    pub application_key: Option<String>,
    /// Search index API key.
    /// Can also be set via REVSYNC_API__API_KEY.
    pub api_key: Option<String>,
    /// Overrides the default User-Agent header.
    pub user_agent: Option<String>,
    /// Proxy for all requests. Can also be set via REVSYNC_API__PROXY.
    pub proxy: Option<String>,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            endpoint: COURSERA_HOST.to_string(),
            search_endpoint: SEARCH_HOST.to_string(),
            application_key: None,
            api_key: None,
            user_agent: None,
            proxy: None,
        }
    }
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Reviews requested per batch.
    pub window_size: u32,
    /// Pause between batches in milliseconds; 0 disables pacing.
    pub pace_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            pace_ms: DEFAULT_PACE_MS,
        }
    }
}

/// Output options.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for review files when no explicit path is given.
    pub directory: Option<PathBuf>,
    /// File format when no explicit path is given.
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/revsync/config.toml)
    /// 3. Local config file (./revsync.toml)
    /// 4. Environment variables with REVSYNC_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("revsync.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./revsync.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., REVSYNC_SYNC__PACE_MS -> sync.pace_ms
        builder = builder.add_source(Self::environment());

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    fn environment() -> Environment {
        Environment::with_prefix("REVSYNC")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Build the client configuration from the `[api]` section.
    pub fn api_config(&self) -> ApiConfig {
        let mut api = ApiConfig::default()
            .with_endpoint(&self.api.endpoint)
            .with_search_endpoint(&self.api.search_endpoint);
        api.headers = default_headers(&api.endpoint);
        if let (Some(app), Some(key)) = (&self.api.application_key, &self.api.api_key) {
            api = api.with_search_keys(app.clone(), key.clone());
        }
        if let Some(agent) = &self.api.user_agent {
            api = api.with_header("User-Agent", agent.clone());
        }
        if let Some(proxy) = self.api.proxy.as_deref().filter(|p| !p.is_empty()) {
            api = api.with_proxy(proxy);
        }
        api
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "revsync").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
