//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `ASSETREC_*` environment variables.
//! The checkpoint location has no default: [`Config::validate`] refuses to pass
//! without it.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_MAX_TOP_K, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SCORING_BATCH_SIZE, DEFAULT_TOP_K,
};
use crate::ranking::RankOptions;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `ASSETREC_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Checkpoint directory (`checkpoint.json` + `model.safetensors`). Required.
    pub checkpoint_path: Option<PathBuf>,

    /// JSON file with per-asset names. Without it every name falls back to the ISIN.
    pub assets_path: Option<PathBuf>,

    /// JSON object `{isin: name | {primary_name?, short_name?}}` patching asset names.
    pub name_overrides_path: Option<PathBuf>,

    /// `k` used when a request does not specify one. Default: `10`.
    pub default_top_k: usize,

    /// Largest `k` a request may ask for. Default: `100`.
    pub max_top_k: usize,

    /// Per-request scoring deadline in milliseconds. Default: `2000`.
    pub request_timeout_ms: u64,

    /// Items scored per tensor pass. Default: `4096`.
    pub scoring_batch_size: usize,

    /// Worker threads a single catalog scan is split across. Default: `1`.
    pub scoring_shards: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            checkpoint_path: None,
            assets_path: None,
            name_overrides_path: None,
            default_top_k: DEFAULT_TOP_K,
            max_top_k: DEFAULT_MAX_TOP_K,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            scoring_batch_size: DEFAULT_SCORING_BATCH_SIZE,
            scoring_shards: 1,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "ASSETREC_PORT";
    const ENV_BIND_ADDR: &'static str = "ASSETREC_BIND_ADDR";
    const ENV_CHECKPOINT_PATH: &'static str = "ASSETREC_CHECKPOINT_PATH";
    const ENV_ASSETS_PATH: &'static str = "ASSETREC_ASSETS_PATH";
    const ENV_NAME_OVERRIDES_PATH: &'static str = "ASSETREC_NAME_OVERRIDES_PATH";
    const ENV_DEFAULT_TOP_K: &'static str = "ASSETREC_DEFAULT_TOP_K";
    const ENV_MAX_TOP_K: &'static str = "ASSETREC_MAX_TOP_K";
    const ENV_REQUEST_TIMEOUT_MS: &'static str = "ASSETREC_REQUEST_TIMEOUT_MS";
    const ENV_SCORING_BATCH_SIZE: &'static str = "ASSETREC_SCORING_BATCH_SIZE";
    const ENV_SCORING_SHARDS: &'static str = "ASSETREC_SCORING_SHARDS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let checkpoint_path = Self::parse_optional_path_from_env(Self::ENV_CHECKPOINT_PATH);
        let assets_path = Self::parse_optional_path_from_env(Self::ENV_ASSETS_PATH);
        let name_overrides_path = Self::parse_optional_path_from_env(Self::ENV_NAME_OVERRIDES_PATH);
        let default_top_k =
            Self::parse_usize_from_env(Self::ENV_DEFAULT_TOP_K, defaults.default_top_k);
        let max_top_k = Self::parse_usize_from_env(Self::ENV_MAX_TOP_K, defaults.max_top_k);
        let request_timeout_ms =
            Self::parse_u64_from_env(Self::ENV_REQUEST_TIMEOUT_MS, defaults.request_timeout_ms);
        let scoring_batch_size =
            Self::parse_usize_from_env(Self::ENV_SCORING_BATCH_SIZE, defaults.scoring_batch_size);
        let scoring_shards =
            Self::parse_usize_from_env(Self::ENV_SCORING_SHARDS, defaults.scoring_shards);

        Ok(Self {
            port,
            bind_addr,
            checkpoint_path,
            assets_path,
            name_overrides_path,
            default_top_k,
            max_top_k,
            request_timeout_ms,
            scoring_batch_size,
            scoring_shards,
        })
    }

    /// Validates paths and numeric invariants (does not read any file).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checkpoint_path =
            self.checkpoint_path
                .as_ref()
                .ok_or(ConfigError::MissingEnvVar {
                    name: Self::ENV_CHECKPOINT_PATH,
                })?;

        if !checkpoint_path.exists() {
            return Err(ConfigError::PathNotFound {
                path: checkpoint_path.clone(),
            });
        }
        if !checkpoint_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: checkpoint_path.clone(),
            });
        }

        for path in [&self.assets_path, &self.name_overrides_path]
            .into_iter()
            .flatten()
        {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        if self.max_top_k == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MAX_TOP_K,
                reason: "must be at least 1".to_string(),
            });
        }
        if self.default_top_k > self.max_top_k {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_DEFAULT_TOP_K,
                reason: format!(
                    "{} exceeds {} ({})",
                    self.default_top_k,
                    Self::ENV_MAX_TOP_K,
                    self.max_top_k
                ),
            });
        }
        if self.scoring_batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_SCORING_BATCH_SIZE,
                reason: "must be at least 1".to_string(),
            });
        }
        if self.scoring_shards == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_SCORING_SHARDS,
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Per-request scoring deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Ranking options without a deadline; the gateway attaches one per request.
    pub fn rank_options(&self) -> RankOptions {
        RankOptions::default()
            .batch_size(self.scoring_batch_size)
            .shards(self.scoring_shards)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_usize_from_env(var_name: &str, default: usize) -> usize {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}
