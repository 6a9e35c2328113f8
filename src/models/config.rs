//! Configuration module for the premium API
//!
//! All settings come from environment variables; defaults live in
//! utils/constants.rs.

use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use super::errors::{AppError, AppResult};
use crate::core::rate_table::RateTable;
use crate::utils::constants::{
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RATE_LIMIT_PER_WINDOW, DEFAULT_TELEMETRY_DIR,
    RATE_LIMIT_WINDOW_SECS,
};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Optional JSON rate table replacing the built-in one
    pub rate_table_path: Option<PathBuf>,
    /// Requests per client per window
    pub rate_limit_per_window: u32,
    /// Rate limit window
    pub rate_limit_window: Duration,
    /// Telemetry export directory
    pub telemetry_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            rate_table_path: None,
            rate_limit_per_window: DEFAULT_RATE_LIMIT_PER_WINDOW,
            rate_limit_window: Duration::from_secs(RATE_LIMIT_WINDOW_SECS),
            telemetry_dir: PathBuf::from(DEFAULT_TELEMETRY_DIR),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    ///
    /// `PORT` (set by most hosting platforms) wins over `PREMIUM_PORT`.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("PREMIUM_HOST").filter(|h| !h.is_empty()) {
            config.host = host;
        }

        if let Some((name, raw)) = lookup("PORT")
            .map(|v| ("PORT", v))
            .or_else(|| lookup("PREMIUM_PORT").map(|v| ("PREMIUM_PORT", v)))
        {
            config.port = raw
                .trim()
                .parse()
                .map_err(|_| AppError::invalid_config(name, &raw))?;
        }

        if let Some(raw) = lookup("PREMIUM_RATE_LIMIT") {
            let limit: u32 = raw
                .trim()
                .parse()
                .map_err(|_| AppError::invalid_config("PREMIUM_RATE_LIMIT", &raw))?;
            if limit == 0 {
                return Err(AppError::invalid_config("PREMIUM_RATE_LIMIT", &raw));
            }
            config.rate_limit_per_window = limit;
        }

        config.rate_table_path = lookup("PREMIUM_RATE_TABLE")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        if let Some(dir) = lookup("PREMIUM_TELEMETRY_DIR").filter(|d| !d.is_empty()) {
            config.telemetry_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Load the rate table once: the configured file, or the built-in table
    pub fn load_rate_table(&self) -> AppResult<RateTable> {
        match &self.rate_table_path {
            Some(path) => {
                info!("📄 Loading rate table from {}", path.display());
                let raw = std::fs::read_to_string(path)?;
                RateTable::from_json(&raw)
            }
            None => {
                info!("📄 Using built-in rate table");
                Ok(RateTable::builtin().as_ref().clone())
            }
        }
    }
}
