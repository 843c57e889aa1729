//! Configuration management
//!
//! A single typed [`Config`] is assembled once at startup from an optional
//! YAML file merged with `MOTOPRO_GATEWAY_`-prefixed environment variables.
//! The deallocation and establishment blobs are read-only snapshots after
//! load: the only mutable setting at runtime is the forwarder's base URL.

use std::{path::Path, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Environment files to load before processing config.
    /// Paths support ~ expansion. Loaded in order, later files override earlier.
    pub env_files: Vec<String>,
    /// Local control-surface server configuration
    pub server: ServerConfig,
    /// Remote API configuration
    pub api: ApiConfig,
    /// Deallocation policy defaults (forwarded verbatim to the shell)
    pub deallocation: DeallocationConfig,
    /// Establishment defaults (forwarded verbatim to the shell)
    pub establishment: EstablishmentConfig,
}

/// Local HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 39410,
        }
    }
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Initial base URL for the remote API (mutable later via the forwarder)
    pub base_url: String,
    /// Login endpoint path, relative to the base URL
    pub login_path: String,
    /// Token refresh endpoint path, relative to the base URL
    pub refresh_path: String,
    /// Transport-level request timeout, in seconds (0 = no timeout)
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api/v1".to_string(),
            login_path: "/token/".to_string(),
            refresh_path: "/token/refresh/".to_string(),
            timeout_secs: 60,
        }
    }
}

impl ApiConfig {
    /// Transport timeout as a [`Duration`], `None` when disabled
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Deallocation policy defaults
///
/// Opaque to the gateway: the dispatch shell reads these and echoes them
/// into deallocation requests against the remote API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeallocationConfig {
    /// Default reason attached to a deallocation
    pub default_reason: String,
    /// Whether a deallocated rider is blocked from returning to the slot
    pub blocks_return: bool,
    /// Remote endpoint that cancels a rider's candidacy
    pub endpoint: String,
}

impl Default for DeallocationConfig {
    fn default() -> Self {
        Self {
            default_reason: "Desalocação solicitada pelo gestor".to_string(),
            blocks_return: false,
            endpoint: "/motoboy-vaga/cancelar-candidatura/".to_string(),
        }
    }
}

/// Establishment defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstablishmentConfig {
    /// Default establishment identifier, treated as an opaque string
    pub establishment_id: String,
}

impl Default for EstablishmentConfig {
    fn default() -> Self {
        Self {
            establishment_id: "11".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        figment = figment.merge(Env::prefixed("MOTOPRO_GATEWAY_").split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        config.load_env_files();

        Ok(config)
    }

    /// Load environment files into the process environment.
    /// Supports ~ expansion. Files that don't exist are silently skipped.
    fn load_env_files(&self) {
        for path_str in &self.env_files {
            let expanded = if path_str.starts_with('~') {
                if let Some(home) = dirs::home_dir() {
                    path_str.replacen('~', &home.display().to_string(), 1)
                } else {
                    path_str.clone()
                }
            } else {
                path_str.clone()
            };

            let path = Path::new(&expanded);
            if path.exists() {
                match dotenvy::from_path(path) {
                    Ok(()) => {
                        tracing::info!("Loaded env file: {expanded}");
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load env file {expanded}: {e}");
                    }
                }
            } else {
                tracing::debug!("Env file not found (skipped): {expanded}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;

    #[test]
    fn defaults_match_local_development() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 39410);
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000/api/v1");
        assert_eq!(config.api.refresh_path, "/token/refresh/");
        assert_eq!(config.api.login_path, "/token/");
    }

    #[test]
    fn deallocation_defaults_carry_manager_reason() {
        let dealloc = DeallocationConfig::default();
        assert_eq!(dealloc.default_reason, "Desalocação solicitada pelo gestor");
        assert!(!dealloc.blocks_return);
        assert_eq!(dealloc.endpoint, "/motoboy-vaga/cancelar-candidatura/");
    }

    #[test]
    fn timeout_zero_disables_transport_timeout() {
        let api = ApiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(api.timeout().is_none());

        let api = ApiConfig::default();
        assert_eq!(api.timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn config_deserialized_from_yaml() {
        let yaml = r#"
server:
  host: "0.0.0.0"
  port: 39500
api:
  base_url: "https://motopro-development.up.railway.app/api/v1"
establishment:
  establishment_id: "42"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 39500);
        assert_eq!(
            config.api.base_url,
            "https://motopro-development.up.railway.app/api/v1"
        );
        assert_eq!(config.establishment.establishment_id, "42");
        // Untouched sections keep their defaults
        assert_eq!(config.api.refresh_path, "/token/refresh/");
    }

    #[test]
    fn load_missing_config_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/gateway.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn load_env_files_sets_env_vars() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join("test.env");
        let mut f = std::fs::File::create(&env_path).unwrap();
        writeln!(f, "MOTOPRO_GW_TEST_KEY_A=hello_from_env_file").unwrap();
        writeln!(f, "MOTOPRO_GW_TEST_KEY_B=42").unwrap();
        drop(f);

        let config = Config {
            env_files: vec![env_path.to_string_lossy().to_string()],
            ..Default::default()
        };
        config.load_env_files();

        assert_eq!(
            env::var("MOTOPRO_GW_TEST_KEY_A").unwrap(),
            "hello_from_env_file"
        );
        assert_eq!(env::var("MOTOPRO_GW_TEST_KEY_B").unwrap(), "42");
    }

    #[test]
    fn load_env_files_skips_missing() {
        let config = Config {
            env_files: vec!["/nonexistent/path/.env".to_string()],
            ..Default::default()
        };
        // Should not panic
        config.load_env_files();
    }
}
