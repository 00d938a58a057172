//! Data Source Configuration
//! Resolves where the remote CSV tables are fetched from.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Upstream location of the public e-commerce dataset.
pub const DEFAULT_BASE_URL: &str = "https://raw.githubusercontent.com/Nuraniisti/Proyek_Analisis_Data/refs/heads/main/E-Commerce%20Public%20Dataset";

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "SHOPSIGHT_DATA_URL";

/// Optional JSON config file looked up in the working directory.
pub const CONFIG_FILE: &str = "shopsight.json";

/// Where the raw CSV tables are fetched from.
///
/// Resolution order: compiled-in default, then the config file if present,
/// then the environment variable. Later sources win.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSourceConfig {
    pub base_url: String,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl DataSourceConfig {
    /// Load the configuration from the working directory and environment.
    pub fn load() -> anyhow::Result<Self> {
        let file = if Path::new(CONFIG_FILE).exists() {
            Some(
                fs::read_to_string(CONFIG_FILE)
                    .with_context(|| format!("failed to read {CONFIG_FILE}"))?,
            )
        } else {
            None
        };
        Self::resolve(file.as_deref(), std::env::var(BASE_URL_ENV).ok())
    }

    fn resolve(file: Option<&str>, env_base_url: Option<String>) -> anyhow::Result<Self> {
        let mut config: Self = match file {
            Some(contents) => serde_json::from_str(contents)
                .with_context(|| format!("invalid JSON in {CONFIG_FILE}"))?,
            None => Self::default(),
        };

        if let Some(url) = env_base_url {
            let url = url.trim();
            if !url.is_empty() {
                config.base_url = url.to_string();
            }
        }

        Ok(config)
    }

    /// Full URL for one CSV resource.
    pub fn table_url(&self, file: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_url_when_nothing_is_set() {
        let config = DataSourceConfig::resolve(None, None).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn config_file_overrides_default() {
        let config = DataSourceConfig::resolve(
            Some(r#"{"base_url": "http://mirror.local/dataset"}"#),
            None,
        )
        .unwrap();
        assert_eq!(config.base_url, "http://mirror.local/dataset");
    }

    #[test]
    fn environment_overrides_config_file() {
        let config = DataSourceConfig::resolve(
            Some(r#"{"base_url": "http://mirror.local/dataset"}"#),
            Some("http://env.local/data".to_string()),
        )
        .unwrap();
        assert_eq!(config.base_url, "http://env.local/data");
    }

    #[test]
    fn blank_environment_value_is_ignored() {
        let config = DataSourceConfig::resolve(None, Some("   ".to_string())).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        assert!(DataSourceConfig::resolve(Some("{not json"), None).is_err());
    }

    #[test]
    fn table_url_handles_trailing_slash() {
        let config = DataSourceConfig {
            base_url: "http://mirror.local/dataset/".to_string(),
        };
        assert_eq!(
            config.table_url("orders_dataset.csv"),
            "http://mirror.local/dataset/orders_dataset.csv"
        );
    }
}
