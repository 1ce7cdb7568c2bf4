//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! Every field has a default, so an empty TOML file is a valid
//! configuration. Credentials are never stored here; they load separately
//! from the credentials file or environment.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub pools: PoolConfig,
    #[serde(default)]
    pub account: AccountConfig,
}

/// Remote API settings
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Directory listing files are written to
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Upper bound on pages fetched per listing; 0 disables the bound
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

/// Rate limit quotas, matching what the API meters per window
#[derive(Debug, Deserialize)]
pub struct QuotaConfig {
    #[serde(default = "default_read_capacity")]
    pub read_capacity: u32,
    #[serde(default = "default_write_capacity")]
    pub write_capacity: u32,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// Worker pool sizes
#[derive(Debug, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_workers")]
    pub query_workers: usize,
    #[serde(default = "default_workers")]
    pub mutation_workers: usize,
}

/// Account settings
#[derive(Debug, Deserialize)]
pub struct AccountConfig {
    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,
}

fn default_base_url() -> String {
    "https://api.twitter.com/1.1".to_string()
}

fn default_token_url() -> String {
    "https://api.twitter.com/oauth2/token".to_string()
}

fn default_page_size() -> u32 {
    200
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_timeout() -> u64 {
    30
}

fn default_max_pages() -> u32 {
    500
}

fn default_read_capacity() -> u32 {
    30
}

fn default_write_capacity() -> u32 {
    15
}

fn default_window_secs() -> u64 {
    900
}

fn default_workers() -> usize {
    25
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from("credentials.toml")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_url: default_token_url(),
            page_size: default_page_size(),
            data_dir: default_data_dir(),
            timeout_secs: default_timeout(),
            max_pages: default_max_pages(),
        }
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            read_capacity: default_read_capacity(),
            write_capacity: default_write_capacity(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            query_workers: default_workers(),
            mutation_workers: default_workers(),
        }
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            credentials_file: default_credentials_file(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        for (name, url) in [
            ("base_url", &config.api.base_url),
            ("token_url", &config.api.token_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(common::Error::Config(format!(
                    "{name} must start with http:// or https://, got: {url}"
                )));
            }
        }

        if config.api.page_size == 0 {
            return Err(common::Error::Config(
                "page_size must be greater than 0".into(),
            ));
        }

        if config.api.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if config.quota.read_capacity == 0 || config.quota.write_capacity == 0 {
            return Err(common::Error::Config(
                "quota capacities must be greater than 0".into(),
            ));
        }

        if config.quota.window_secs == 0 {
            return Err(common::Error::Config(
                "window_secs must be greater than 0".into(),
            ));
        }

        if config.pools.query_workers == 0 || config.pools.mutation_workers == 0 {
            return Err(common::Error::Config(
                "worker pool sizes must be greater than 0".into(),
            ));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or FLOCK_CONFIG env var.
    pub fn resolve_path(cli_path: Option<&Path>) -> PathBuf {
        if let Some(p) = cli_path {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("FLOCK_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("flock-bot.toml")
    }
}
