use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    // Storage
    pub database_url: String,   // sqlite:screener.db
    pub universe_file: String,  // universe_500.txt

    // Fetching
    pub scan_workers: usize,       // 12
    pub fetch_timeout_secs: u64,   // 10
    pub yahoo_base_url: String,
    pub cache_ttl_secs: i64,       // 300
}

impl ScannerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Self {
            database_url: var("DATABASE_URL", "sqlite:screener.db"),
            universe_file: var("UNIVERSE_FILE", "universe_500.txt"),
            scan_workers: var("SCAN_WORKERS", "12")
                .parse()
                .context("SCAN_WORKERS must be a positive integer")?,
            fetch_timeout_secs: var("FETCH_TIMEOUT_SECS", "10")
                .parse()
                .context("FETCH_TIMEOUT_SECS must be a positive integer")?,
            yahoo_base_url: var("YAHOO_BASE_URL", yahoo_client::DEFAULT_BASE_URL),
            cache_ttl_secs: var("FUNDAMENTALS_CACHE_TTL_SECS", "300")
                .parse()
                .context("FUNDAMENTALS_CACHE_TTL_SECS must be an integer")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.scan_workers == 0 {
            bail!("SCAN_WORKERS must be at least 1");
        }
        if self.fetch_timeout_secs == 0 {
            bail!("FETCH_TIMEOUT_SECS must be at least 1");
        }
        if self.cache_ttl_secs < 0 {
            bail!("FUNDAMENTALS_CACHE_TTL_SECS cannot be negative");
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ScannerConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ScannerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, "sqlite:screener.db");
        assert_eq!(config.universe_file, "universe_500.txt");
        assert_eq!(config.scan_workers, 12);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.yahoo_base_url, yahoo_client::DEFAULT_BASE_URL);
        assert_eq!(config.cache_ttl_secs, 300);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[("SCAN_WORKERS", "4"), ("DATABASE_URL", "sqlite::memory:")]).unwrap();
        assert_eq!(config.scan_workers, 4);
        assert_eq!(config.database_url, "sqlite::memory:");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config_from(&[("SCAN_WORKERS", "0")]).is_err());
        assert!(config_from(&[("SCAN_WORKERS", "many")]).is_err());
        assert!(config_from(&[("FETCH_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_from(&[("FUNDAMENTALS_CACHE_TTL_SECS", "-1")]).is_err());
    }
}
