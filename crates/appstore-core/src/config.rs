//! Client configuration.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::protocol::constants::{
    AUTHENTICATE_URL, DEFAULT_TIMEOUT_SECS, DOWNLOAD_URL, SEARCH_URL, USER_AGENT,
};

/// Endpoint URLs. Overridable so tests and proxies can redirect traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub authenticate: String,
    pub download: String,
    pub search: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            authenticate: AUTHENTICATE_URL.to_string(),
            download: DOWNLOAD_URL.to_string(),
            search: SEARCH_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Every endpoint under one base URL, keeping the production paths.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            authenticate: format!("{}/WebObjects/MZFinance.woa/wa/authenticate", base),
            download: format!(
                "{}/WebObjects/MZFinance.woa/wa/volumeStoreDownloadProduct",
                base
            ),
            search: format!("{}/search", base),
        }
    }
}

/// Configuration for StoreClient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
    pub endpoints: Endpoints,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: USER_AGENT.to_string(),
            endpoints: Endpoints::default(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.user_agent.starts_with("Configurator/"));
        assert_eq!(config.endpoints.search, "https://itunes.apple.com/search");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            timeout_secs = 5

            [endpoints]
            search = "http://localhost:8080/search"
            "#,
        )
        .unwrap();

        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.user_agent, USER_AGENT);
        assert_eq!(config.endpoints.search, "http://localhost:8080/search");
        assert_eq!(config.endpoints.authenticate, AUTHENTICATE_URL);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appstore.toml");

        let config = ClientConfig {
            timeout_secs: 10,
            endpoints: Endpoints::with_base("http://127.0.0.1:9000/"),
            ..Default::default()
        };
        config.save_to_file(&path).unwrap();

        assert_eq!(ClientConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_with_base() {
        let endpoints = Endpoints::with_base("http://127.0.0.1:9000/");
        assert_eq!(
            endpoints.authenticate,
            "http://127.0.0.1:9000/WebObjects/MZFinance.woa/wa/authenticate"
        );
        assert_eq!(endpoints.search, "http://127.0.0.1:9000/search");
    }
}
