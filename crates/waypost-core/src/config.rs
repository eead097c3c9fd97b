//! Configuration module
//!
//! Environment-driven settings for storage, batch pacing, the periodic sync
//! service and the HTTP delivery adapter.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::DEFAULT_BATCH_COOLDOWN;
use crate::models::DeliveryErrorPolicy;
use crate::storage_types::StorageBackend;

const DEFAULT_STORAGE_PATH: &str = "./waypost-data";
const SYNC_INTERVAL_SECS: u64 = 300;
const DELIVERY_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub storage_path: Option<PathBuf>,
    // Batch runner configuration
    pub batch_cooldown: Duration,
    pub on_delivery_error: DeliveryErrorPolicy,
    /// Interval between runs of the periodic sync service.
    pub sync_interval: Duration,
    // Delivery endpoint configuration
    pub delivery_url: Option<String>,
    pub delivery_token: Option<String>,
    pub delivery_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            storage_backend: StorageBackend::Local,
            storage_path: Some(PathBuf::from(DEFAULT_STORAGE_PATH)),
            batch_cooldown: DEFAULT_BATCH_COOLDOWN,
            on_delivery_error: DeliveryErrorPolicy::default(),
            sync_interval: Duration::from_secs(SYNC_INTERVAL_SECS),
            delivery_url: None,
            delivery_token: None,
            delivery_timeout: Duration::from_secs(DELIVERY_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    /// Load configuration from the process environment (and a `.env` file, if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("WAYPOST_ENVIRONMENT")
            .or_else(|| var("ENVIRONMENT"))
            .unwrap_or(defaults.environment);

        let storage_backend = match var("WAYPOST_STORAGE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => defaults.storage_backend,
        };

        let storage_path = var("WAYPOST_STORAGE_PATH")
            .map(PathBuf::from)
            .or(defaults.storage_path);

        let batch_cooldown = match var("WAYPOST_BATCH_COOLDOWN_MS") {
            Some(raw) => Duration::from_millis(raw.trim().parse::<u64>().map_err(|e| {
                anyhow::anyhow!("WAYPOST_BATCH_COOLDOWN_MS must be a number of milliseconds: {}", e)
            })?),
            None => defaults.batch_cooldown,
        };

        let on_delivery_error = match var("WAYPOST_ON_DELIVERY_ERROR") {
            Some(raw) => raw.parse()?,
            None => defaults.on_delivery_error,
        };

        let sync_interval = match var("WAYPOST_SYNC_INTERVAL_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(|e| {
                anyhow::anyhow!("WAYPOST_SYNC_INTERVAL_SECS must be a number of seconds: {}", e)
            })?),
            None => defaults.sync_interval,
        };

        let delivery_timeout = match var("WAYPOST_DELIVERY_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(|e| {
                anyhow::anyhow!("WAYPOST_DELIVERY_TIMEOUT_SECS must be a number of seconds: {}", e)
            })?),
            None => defaults.delivery_timeout,
        };

        Ok(Self {
            environment,
            storage_backend,
            storage_path,
            batch_cooldown,
            on_delivery_error,
            sync_interval,
            delivery_url: var("WAYPOST_DELIVERY_URL").map(|url| url.trim().to_string()),
            delivery_token: var("WAYPOST_DELIVERY_TOKEN"),
            delivery_timeout,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage_backend == StorageBackend::Local && self.storage_path.is_none() {
            return Err(anyhow::anyhow!(
                "WAYPOST_STORAGE_PATH is required for the local storage backend"
            ));
        }

        if self.sync_interval.is_zero() {
            return Err(anyhow::anyhow!(
                "WAYPOST_SYNC_INTERVAL_SECS must be greater than zero"
            ));
        }

        if let Some(url) = &self.delivery_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow::anyhow!(
                    "WAYPOST_DELIVERY_URL must be an http(s) URL, got {}",
                    url
                ));
            }
        }

        if self.is_production() && self.storage_backend == StorageBackend::Memory {
            return Err(anyhow::anyhow!(
                "The memory storage backend does not survive restarts and cannot be used in production"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.storage_backend, StorageBackend::Local);
        assert_eq!(config.batch_cooldown, Duration::from_secs(5));
        assert_eq!(config.on_delivery_error, DeliveryErrorPolicy::Drop);
        assert_eq!(config.sync_interval, Duration::from_secs(300));
        assert!(config.delivery_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_overrides() {
        let config = from_pairs(&[
            ("WAYPOST_STORAGE_BACKEND", "memory"),
            ("WAYPOST_BATCH_COOLDOWN_MS", "250"),
            ("WAYPOST_ON_DELIVERY_ERROR", "retain"),
            ("WAYPOST_SYNC_INTERVAL_SECS", "60"),
            ("WAYPOST_DELIVERY_URL", "https://tracking.example.com/positions"),
            ("WAYPOST_DELIVERY_TOKEN", "secret"),
        ])
        .unwrap();

        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert_eq!(config.batch_cooldown, Duration::from_millis(250));
        assert_eq!(config.on_delivery_error, DeliveryErrorPolicy::Retain);
        assert_eq!(config.sync_interval, Duration::from_secs(60));
        assert_eq!(config.delivery_token.as_deref(), Some("secret"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(from_pairs(&[("WAYPOST_STORAGE_BACKEND", "s3")]).is_err());
    }

    #[test]
    fn rejects_malformed_cooldown() {
        assert!(from_pairs(&[("WAYPOST_BATCH_COOLDOWN_MS", "soon")]).is_err());
    }

    #[test]
    fn rejects_malformed_sync_interval() {
        let err = from_pairs(&[("WAYPOST_SYNC_INTERVAL_SECS", "5m")]).unwrap_err();
        assert!(err.to_string().contains("WAYPOST_SYNC_INTERVAL_SECS"));
    }

    #[test]
    fn rejects_malformed_delivery_timeout() {
        assert!(from_pairs(&[("WAYPOST_DELIVERY_TIMEOUT_SECS", "-1")]).is_err());

        let config = from_pairs(&[("WAYPOST_DELIVERY_TIMEOUT_SECS", " 45 ")]).unwrap();
        assert_eq!(config.delivery_timeout, Duration::from_secs(45));
    }

    #[test]
    fn validate_rejects_non_http_delivery_url() {
        let config = from_pairs(&[("WAYPOST_DELIVERY_URL", "ftp://example.com")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_sync_interval() {
        let config = Config {
            sync_interval: Duration::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_memory_backend_in_production() {
        let config = from_pairs(&[
            ("ENVIRONMENT", "production"),
            ("WAYPOST_STORAGE_BACKEND", "memory"),
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn production_detection() {
        let config = from_pairs(&[("ENVIRONMENT", "Prod")]).unwrap();
        assert!(config.is_production());
    }
}
