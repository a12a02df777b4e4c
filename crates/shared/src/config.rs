//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage backend configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Background poll configuration.
    #[serde(default)]
    pub poll: PollConfig,
    /// Display defaults.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Which storage backend the application talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    /// In-memory store seeded with demo data.
    Demo,
    /// Remote tabular REST resource.
    Rest,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Backend selection.
    #[serde(default = "default_store_mode")]
    pub mode: StoreMode,
    /// Base URL of the tabular REST resource (rest mode).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key sent as a bearer token (rest mode).
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            mode: default_store_mode(),
            base_url: default_base_url(),
            api_key: None,
        }
    }
}

const fn default_store_mode() -> StoreMode {
    StoreMode::Demo
}

fn default_base_url() -> String {
    "http://localhost:9000".to_string()
}

/// Background poll configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Whether the background reload poll runs at all.
    #[serde(default = "default_poll_enabled")]
    pub enabled: bool,
    /// Seconds between reload-and-reconcile passes.
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            enabled: default_poll_enabled(),
            interval_secs: default_poll_interval(),
        }
    }
}

const fn default_poll_enabled() -> bool {
    true
}

const fn default_poll_interval() -> u64 {
    30
}

/// Display defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Default deviation display mode: `month_end` or `pro_rated_today`.
    #[serde(default = "default_deviation_mode")]
    pub deviation_mode: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            deviation_mode: default_deviation_mode(),
        }
    }
}

fn default_deviation_mode() -> String {
    "month_end".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("KONSERN").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: AppConfig = serde_json::from_str("{}").expect("empty config deserializes");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.mode, StoreMode::Demo);
        assert!(config.poll.enabled);
        assert_eq!(config.poll.interval_secs, 30);
        assert_eq!(config.display.deviation_mode, "month_end");
    }

    #[test]
    fn test_store_mode_rest() {
        let config: AppConfig = serde_json::from_str(
            r#"{"store": {"mode": "rest", "base_url": "https://rows.example", "api_key": "k"}}"#,
        )
        .expect("config deserializes");
        assert_eq!(config.store.mode, StoreMode::Rest);
        assert_eq!(config.store.base_url, "https://rows.example");
        assert_eq!(config.store.api_key.as_deref(), Some("k"));
    }
}
