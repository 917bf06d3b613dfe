//! Server configuration.
//!
//! Values come from defaults, then `OUTLOOK_*` environment variables (a
//! `.env` file is loaded by the binary), then command-line flags.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable names.
pub const ENV_HOST: &str = "OUTLOOK_HOST";
pub const ENV_PORT: &str = "OUTLOOK_PORT";
pub const ENV_DATA_DIR: &str = "OUTLOOK_DATA_DIR";
pub const ENV_MIN_YEARS: &str = "OUTLOOK_MIN_YEARS";

/// HTTP server and storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding `outlook.json` and `outlook.csv` (default: "./data")
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Smallest number of years an upload may cover (default: 2)
    #[serde(default = "default_min_years")]
    pub min_years: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_min_years() -> usize {
    2
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            min_years: default_min_years(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `OUTLOOK_*` environment variables.
    ///
    /// Unparseable numeric values are ignored in favour of the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(host) = lookup(ENV_HOST) {
            config.host = host;
        }
        if let Some(port) = lookup(ENV_PORT).and_then(|v| v.parse().ok()) {
            config.port = port;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(min) = lookup(ENV_MIN_YEARS).and_then(|v| v.parse().ok()) {
            config.min_years = min;
        }

        config
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.min_years, 2);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_PORT, "8080"),
            (ENV_DATA_DIR, "/var/lib/outlook"),
            (ENV_MIN_YEARS, "not-a-number"),
        ]);
        let config = ServerConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.socket_addr(), "0.0.0.0:8080");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/outlook"));
        assert_eq!(config.min_years, 2);
    }

    #[test]
    fn test_partial_deserialize() {
        let config: ServerConfig = serde_json::from_str(r#"{ "port": 9000 }"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.min_years, 2);
    }
}
