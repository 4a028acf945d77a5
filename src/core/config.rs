use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FeedProviderConfig {
    pub feed_url: String,
    pub timeout_secs: u64,
    pub freshness_minutes: i64,
    pub retries: usize,
}

impl Default for FeedProviderConfig {
    fn default() -> Self {
        FeedProviderConfig {
            feed_url: "https://www.amfiindia.com/spages/NAVAll.txt".to_string(),
            timeout_secs: 30,
            freshness_minutes: 15,
            retries: 0,
        }
    }
}

impl FeedProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn freshness(&self) -> Result<chrono::Duration> {
        chrono::Duration::try_minutes(self.freshness_minutes).with_context(|| {
            format!(
                "freshness_minutes out of range: {}",
                self.freshness_minutes
            )
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct HistoryProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub retries: usize,
}

impl Default for HistoryProviderConfig {
    fn default() -> Self {
        HistoryProviderConfig {
            base_url: "https://api.mfapi.in/mf".to_string(),
            timeout_secs: 10,
            retries: 0,
        }
    }
}

impl HistoryProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ProvidersConfig {
    pub amfi: FeedProviderConfig,
    pub history: HistoryProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub providers: ProvidersConfig,
    /// Maximum history requests in flight when listing funds with returns
    pub concurrency: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            concurrency: 8,
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when there is none.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "fundscope", "fundscope")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  amfi:
    feed_url: "http://example.com/NAVAll.txt"
    freshness_minutes: 5
  history:
    base_url: "http://example.com/mf"
    timeout_secs: 3
    retries: 2
concurrency: 4
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(
            config.providers.amfi.feed_url,
            "http://example.com/NAVAll.txt"
        );
        assert_eq!(
            config.providers.amfi.freshness().unwrap(),
            chrono::Duration::minutes(5)
        );
        // Unset fields keep their defaults
        assert_eq!(config.providers.amfi.timeout(), Duration::from_secs(30));
        assert_eq!(config.providers.amfi.retries, 0);
        assert_eq!(config.providers.history.base_url, "http://example.com/mf");
        assert_eq!(config.providers.history.timeout(), Duration::from_secs(3));
        assert_eq!(config.providers.history.retries, 2);
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.providers.amfi.timeout(), Duration::from_secs(30));
        assert_eq!(
            config.providers.amfi.freshness().unwrap(),
            chrono::Duration::minutes(15)
        );
        assert_eq!(config.providers.history.timeout(), Duration::from_secs(10));
        assert_eq!(config.concurrency, 8);
    }

    #[test]
    fn test_out_of_range_freshness_is_an_error() {
        let config: AppConfig = serde_yaml::from_str(
            "providers:\n  amfi:\n    freshness_minutes: 9223372036854775807\n",
        )
        .unwrap();
        let err = config.providers.amfi.freshness().unwrap_err();
        assert!(err.to_string().contains("freshness_minutes out of range"));
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load_from_path("/nonexistent/fundscope/config.yaml");
        assert!(
            result
                .unwrap_err()
                .to_string()
                .starts_with("Failed to read config file")
        );
    }
}
