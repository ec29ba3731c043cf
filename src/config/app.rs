//! Process-level configuration: one JSON document plus environment overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::pool::{RateLimitConfig, WorkerPoolConfig};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("error reading config file {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid JSON for [`AppConfig`].
    #[error("error parsing config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:8080`.
    pub bind_addr: String,
    /// Directory holding `index.html`.
    pub html_assets_path: PathBuf,
    /// Grace period for in-flight HTTP requests on shutdown.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
            html_assets_path: PathBuf::from("./static"),
            shutdown_timeout_secs: 5,
        }
    }
}

/// Token signing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for HS256 tokens.
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: u64,
    /// bcrypt work factor for stored passwords.
    pub password_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: 24 * 60 * 60,
            password_cost: 10,
        }
    }
}

/// Backing stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Redis URL for rate-limit counters; in-memory counters when absent.
    pub redis_url: Option<String>,
    /// Directory generated reports are written to.
    pub pdf_output_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            pdf_output_path: std::env::temp_dir(),
        }
    }
}

/// Outgoing mail settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// SMTP host name.
    pub host: String,
    /// SMTP port.
    pub port: u16,
    /// Login name.
    pub user_name: String,
    /// Login password.
    pub password: String,
    /// Sender address.
    pub from: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 587,
            user_name: "test".into(),
            password: "test".into(),
            from: "noreply@localhost".into(),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener.
    pub server: ServerConfig,
    /// Worker pool.
    pub workers: WorkerPoolConfig,
    /// Admission gate.
    pub rate_limit: RateLimitConfig,
    /// Token service.
    pub auth: AuthConfig,
    /// Stores and output directories.
    pub storage: StorageConfig,
    /// Outgoing mail.
    pub smtp: SmtpConfig,
}

impl AppConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        self.workers.validate()?;
        self.rate_limit.validate()?;
        if self.auth.jwt_secret.is_empty() {
            return Err("auth.jwt_secret must be set".into());
        }
        if self.auth.token_ttl_secs == 0 {
            return Err("auth.token_ttl_secs must be greater than 0".into());
        }
        if !(4..=31).contains(&self.auth.password_cost) {
            return Err("auth.password_cost must be between 4 and 31".into());
        }
        if self.smtp.host.is_empty() || self.smtp.user_name.is_empty() {
            return Err("smtp.host and smtp.user_name must be set".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed JSON or invalid values.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(input)?;
        cfg.validate().map_err(ConfigError::Invalid)?;
        Ok(cfg)
    }

    /// Read a JSON file, apply environment overrides, then validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if the
    /// final configuration is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg: Self = serde_json::from_str(&raw)?;
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.validate().map_err(ConfigError::Invalid)?;
        Ok(cfg)
    }

    /// Apply `TASKQ_*` overrides from `lookup`.
    ///
    /// Unparseable numeric overrides are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("TASKQ_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(secret) = lookup("TASKQ_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(url) = lookup("TASKQ_REDIS_URL") {
            self.storage.redis_url = Some(url).filter(|u| !u.is_empty());
        }
        if let Some(workers) = lookup("TASKQ_WORKERS").and_then(|w| w.parse().ok()) {
            self.workers.worker_count = workers;
        }
        if let Some(dir) = lookup("TASKQ_PDF_OUTPUT_PATH") {
            self.storage.pdf_output_path = PathBuf::from(dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.workers.worker_count, 3);
        assert_eq!(cfg.workers.queue_capacity, 10);
        assert_eq!(cfg.rate_limit.limit, 100);
        assert_eq!(cfg.rate_limit.window_secs, 10);
        assert_eq!(cfg.smtp.host, "localhost");
        assert_eq!(cfg.smtp.port, 587);
    }

    #[test]
    fn test_env_overrides() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(|key| match key {
            "TASKQ_JWT_SECRET" => Some("s3cret".into()),
            "TASKQ_WORKERS" => Some("7".into()),
            "TASKQ_REDIS_URL" => Some(String::new()),
            _ => None,
        });
        assert_eq!(cfg.auth.jwt_secret, "s3cret");
        assert_eq!(cfg.workers.worker_count, 7);
        assert_eq!(cfg.storage.redis_url, None);
    }
}
