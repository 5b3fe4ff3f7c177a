use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{AdminError, AdminResult};

// Default configuration values
const LOCAL_API_URL: &str = "http://localhost:8000/api/v1";
const PRODUCTION_API_URL: &str = "https://rafactory.raworkshop.bg/api/v1";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_CONFIG_FILE: &str = "rafactory-admin.json";
const DEFAULT_STORAGE_FILE: &str = "rafactory-admin.session.json";

/// Well-known key the session record is stored under
pub const SESSION_STORAGE_KEY: &str = "auth";

/// Main configuration struct for the admin console
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,
    /// Session storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Deployment environment the console talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    /// Pick the environment from the host the console is served from
    pub fn from_host(host: &str) -> Self {
        match host {
            "localhost" | "127.0.0.1" => Self::Local,
            _ => Self::Production,
        }
    }

    /// Compiled-in API base URL for this environment
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Local => LOCAL_API_URL,
            Self::Production => PRODUCTION_API_URL,
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = AdminError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" | "development" | "dev" => Ok(Self::Local),
            "production" | "prod" => Ok(Self::Production),
            other => Err(AdminError::Config {
                key: "environment".to_string(),
                reason: format!("unknown environment '{}'", other),
            }),
        }
    }
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Explicit base URL, overrides environment selection
    #[serde(default = "default_base_url")]
    pub base_url: Option<String>,
    /// Explicit environment, otherwise derived from `host`
    #[serde(default = "default_environment")]
    pub environment: Option<Environment>,
    /// Host name used for environment detection
    #[serde(default = "default_host")]
    pub host: String,
    /// Transport timeout in seconds (0 disables it)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Session storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON key/value file holding the session
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

// Default functions
fn default_base_url() -> Option<String> {
    std::env::var("RAFACTORY_API_URL")
        .ok()
        .filter(|val| !val.trim().is_empty())
}

fn default_environment() -> Option<Environment> {
    std::env::var("RAFACTORY_ENV")
        .ok()
        .and_then(|val| val.parse().ok())
}

fn default_host() -> String {
    std::env::var("RAFACTORY_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string())
}

fn default_timeout() -> u64 {
    std::env::var("RAFACTORY_TIMEOUT_SECONDS")
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
}

fn default_storage_path() -> PathBuf {
    std::env::var("RAFACTORY_STORAGE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_FILE))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            environment: default_environment(),
            host: default_host(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl ApiConfig {
    /// Config pointing at an explicit base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            environment: None,
            host: DEFAULT_HOST.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    /// The environment in effect
    pub fn effective_environment(&self) -> Environment {
        self.environment
            .unwrap_or_else(|| Environment::from_host(&self.host))
    }

    /// Base URL all API paths are joined onto
    pub fn resolved_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => self.effective_environment().base_url().to_string(),
        }
    }
}

impl Config {
    /// Check the configuration for values the client cannot work with
    pub fn validate(&self) -> AdminResult<()> {
        let base_url = self.api.resolved_base_url();
        if base_url.is_empty() {
            return Err(AdminError::Config {
                key: "api.base_url".to_string(),
                reason: "base URL is empty".to_string(),
            });
        }
        reqwest::Url::parse(&base_url).map_err(|e| AdminError::Config {
            key: "api.base_url".to_string(),
            reason: e.to_string(),
        })?;
        if self.storage.path.as_os_str().is_empty() {
            return Err(AdminError::Config {
                key: "storage.path".to_string(),
                reason: "storage path is empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Load the application configuration
pub async fn load_config() -> Result<Config> {
    let path = get_config_path();
    let config = load_or_create_config(&path).await?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    Ok(config)
}

/// Get the path to the configuration file
fn get_config_path() -> PathBuf {
    std::env::var("RAFACTORY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load configuration from file or create default
async fn load_or_create_config(path: &Path) -> Result<Config> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        let default_config = Config::default();
        save_config(path, &default_config).await?;
        info!("Created default configuration at {}", path.display());
        return Ok(default_config);
    }

    let config_str = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config = serde_json::from_str(&config_str)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!("Loaded configuration from {}", path.display());

    Ok(config)
}

/// Save configuration to file
async fn save_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let config_str = serde_json::to_string_pretty(config)?;
    fs::write(path, config_str).await?;
    debug!("Saved configuration to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_host() {
        assert_eq!(Environment::from_host("localhost"), Environment::Local);
        assert_eq!(Environment::from_host("127.0.0.1"), Environment::Local);
        assert_eq!(
            Environment::from_host("admin.raworkshop.bg"),
            Environment::Production
        );
    }

    #[test]
    fn test_resolved_base_url() {
        let mut api = ApiConfig::with_base_url("http://example.test/api/v1/");
        assert_eq!(api.resolved_base_url(), "http://example.test/api/v1");

        api.base_url = None;
        api.host = "localhost".to_string();
        assert_eq!(api.resolved_base_url(), LOCAL_API_URL);

        api.environment = Some(Environment::Production);
        assert_eq!(api.resolved_base_url(), PRODUCTION_API_URL);
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("Local".parse::<Environment>().unwrap(), Environment::Local);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = Config {
            api: ApiConfig::with_base_url("not a url"),
            storage: StorageConfig {
                path: PathBuf::from("session.json"),
            },
        };
        assert!(matches!(config.validate(), Err(AdminError::Config { .. })));
    }

    #[tokio::test]
    async fn test_load_or_create_round_trip() {
        let path = std::env::temp_dir().join(format!("rafactory-config-{}.json", uuid::Uuid::new_v4()));

        let created = load_or_create_config(&path).await.unwrap();
        assert!(path.exists());

        let loaded = load_or_create_config(&path).await.unwrap();
        assert_eq!(loaded.api.timeout_seconds, created.api.timeout_seconds);
        assert_eq!(loaded.storage.path, created.storage.path);

        let _ = std::fs::remove_file(&path);
    }
}
