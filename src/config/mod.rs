//! Configuration module

use serde::Deserialize;

use crate::topology::GraphLayout;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub layout: GraphLayout,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Console sessions nobody touched for this long are dropped
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

/// Inventory REST backend the console reads topology from
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_session_idle_secs() -> u64 {
    30 * 60
}

fn default_base_url() -> String {
    "http://localhost:8989".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("FIBERCONSOLE").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize().unwrap_or_else(|e| {
            tracing::warn!("Invalid configuration, using defaults: {}", e);
            Config::default()
        });

        url::Url::parse(&config.backend.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid backend.base_url {}: {}", config.backend.base_url, e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8090);
        assert_eq!(config.server.session_idle_secs, 1800);
        assert_eq!(config.backend.base_url, "http://localhost:8989");
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.layout.column_gap, 330.0);
        assert_eq!(config.layout.row_gap, 115.0);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let settings = config::Config::builder()
            .set_override("backend.base_url", "http://inventory:9000")
            .unwrap()
            .set_override("layout.row_gap", 90.0)
            .unwrap()
            .set_override("server.session_idle_secs", 120)
            .unwrap()
            .build()
            .unwrap();
        let config: Config = settings.try_deserialize().unwrap();
        assert_eq!(config.backend.base_url, "http://inventory:9000");
        assert!(config.backend.api_token.is_none());
        assert_eq!(config.layout.row_gap, 90.0);
        assert_eq!(config.layout.column_gap, 330.0);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.session_idle_secs, 120);
    }
}
