//! Launchpad configuration.
//!
//! Resolution order: built-in defaults, then an optional TOML file, then
//! `LAUNCHPAD_*` environment variables. Command-line flags are applied on top
//! by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Public devnet endpoint. Airdrops only work on test clusters.
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

pub const ENV_RPC_URL: &str = "LAUNCHPAD_RPC_URL";
pub const ENV_KEYPAIR: &str = "LAUNCHPAD_KEYPAIR";
pub const ENV_LOG: &str = "LAUNCHPAD_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("cannot parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("invalid commitment level: {0}")]
    InvalidCommitment(String),
}

/// Commitment level used for confirmation and reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }

    /// Whether a status reported by `getSignatureStatuses` satisfies `self`.
    pub fn is_satisfied_by(&self, reported: &str) -> bool {
        let rank = |s: &str| match s {
            "processed" => 0,
            "confirmed" => 1,
            "finalized" => 2,
            _ => -1,
        };
        rank(reported) >= rank(self.as_str())
    }
}

impl std::str::FromStr for Commitment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(ConfigError::InvalidCommitment(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchpadConfig {
    pub rpc_url: String,
    pub commitment: Commitment,
    /// Solana CLI keypair file backing the local wallet.
    pub keypair_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub confirm_timeout_secs: u64,
    pub confirm_poll_interval_ms: u64,
    pub log_level: String,
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            commitment: Commitment::Confirmed,
            keypair_path: None,
            request_timeout_secs: 30,
            confirm_timeout_secs: 60,
            confirm_poll_interval_ms: 500,
            log_level: "warn".to_string(),
        }
    }
}

impl LaunchpadConfig {
    /// Defaults, overlaid with `path` (if given) and then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text).map_err(|reason| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    /// Overlay values from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_RPC_URL).filter(|v| !v.trim().is_empty()) {
            self.rpc_url = url.trim().to_string();
        }
        if let Some(path) = lookup(ENV_KEYPAIR).filter(|v| !v.trim().is_empty()) {
            self.keypair_path = Some(PathBuf::from(path.trim()));
        }
        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            self.log_level = level.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !validate_url(&self.rpc_url) {
            return Err(ConfigError::InvalidRpcUrl(self.rpc_url.clone()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn confirm_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirm_poll_interval_ms.max(1))
    }
}

/// Validate that a URL is well-formed and uses HTTP or HTTPS.
pub fn validate_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            (scheme == "http" || scheme == "https") && parsed.host().is_some()
        }
        Err(_) => false,
    }
}
