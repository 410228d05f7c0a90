//! Configuration management with file persistence

use crate::storage::{DatabaseConfig, default_database_path};
use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "MOTOMINDER_CONFIG_DIR";
/// Environment variable overriding the database file
pub const DATABASE_ENV: &str = "MOTOMINDER_DB";
/// Environment variable overriding the server port
pub const PORT_ENV: &str = "PORT";

/// MotoMinder configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database file; the platform data directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Send internal error detail to HTTP clients (development only)
    pub expose_internal_errors: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: crate::storage::database::DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            expose_internal_errors: false,
        }
    }
}

const KEYS: [&str; 5] = [
    "database.path",
    "database.max_connections",
    "server.host",
    "server.port",
    "server.expose_internal_errors",
];

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var(CONFIG_DIR_ENV) {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("motominder")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the config file, or defaults if there is none
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, or defaults if it doesn't exist
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the config file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.max_connections == 0 {
            return Err(anyhow!("database.max_connections must be at least 1"));
        }
        if self.server.host.trim().is_empty() {
            return Err(anyhow!("server.host must not be empty"));
        }
        if self.server.port == 0 {
            return Err(anyhow!("server.port must not be 0"));
        }
        Ok(())
    }

    /// Apply `MOTOMINDER_DB` and `PORT` from the process environment
    pub fn with_env_overrides(self) -> anyhow::Result<Self> {
        self.with_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides read through `lookup`
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        if let Some(path) = lookup(DATABASE_ENV).filter(|p| !p.trim().is_empty()) {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Some(port) = lookup(PORT_ENV).filter(|p| !p.trim().is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid {} value: {}", PORT_ENV, port))?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Resolved database file
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(default_database_path)
    }

    /// Storage configuration for [`crate::storage::Database::new`]
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::with_path(self.database_path()).max_connections(self.database.max_connections)
    }

    /// `host:port` the server listens on
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "database.path" => Ok(self.database_path().display().to_string()),
            "database.max_connections" => Ok(self.database.max_connections.to_string()),
            "server.host" => Ok(self.server.host.clone()),
            "server.port" => Ok(self.server.port.to_string()),
            "server.expose_internal_errors" => Ok(self.server.expose_internal_errors.to_string()),
            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `motominder config show` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "database.path" => {
                self.database.path = if value.trim().is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "database.max_connections" => {
                let max: u32 = value
                    .parse()
                    .with_context(|| format!("Invalid max_connections value: {}", value))?;
                if max == 0 {
                    return Err(anyhow!("max_connections must be at least 1"));
                }
                self.database.max_connections = max;
            }
            "server.host" => {
                if value.trim().is_empty() {
                    return Err(anyhow!("Host must not be empty"));
                }
                self.server.host = value.trim().to_string();
            }
            "server.port" => {
                let port: u16 = value
                    .parse()
                    .with_context(|| format!("Invalid port value: {}", value))?;
                if port == 0 {
                    return Err(anyhow!("Port must not be 0"));
                }
                self.server.port = port;
            }
            "server.expose_internal_errors" => {
                self.server.expose_internal_errors = value
                    .parse()
                    .with_context(|| format!("Invalid boolean value: {}", value))?;
            }
            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `motominder config show` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        KEYS.into_iter()
            .map(|key| Ok((key.to_string(), self.get(key)?)))
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}
