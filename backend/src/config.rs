//! Configuration management for the olive grove records server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with GROVE__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Data store configuration
    pub store: StoreConfig,

    /// Grid map source
    pub grid: GridConfig,

    /// Tree registry seeding
    pub registry: RegistryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

/// Which store backend to talk to
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// PostgREST endpoint (hosted Supabase)
    Rest,
    /// Direct PostgreSQL connection
    Postgres,
    /// In-process tables, lost on restart
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// PostgREST root URL or PostgreSQL connection URL
    #[serde(default)]
    pub url: String,

    /// PostgREST API key, sent as `apikey` and bearer token
    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Apply `migrations/` on startup (postgres backend only)
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GridConfig {
    /// Path of the comma separated grid map
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistryConfig {
    /// Rows per insert call when seeding trees
    pub seed_chunk_size: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("GROVE_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("store.backend", "rest")?
            .set_default("store.max_connections", 10)?
            .set_default("store.min_connections", 2)?
            .set_default("store.run_migrations", false)?
            .set_default("grid.path", "public/tree-map.csv")?
            .set_default("registry.seed_chunk_size", 100)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (GROVE__ prefix)
            .add_source(
                Environment::with_prefix("GROVE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            url: String::new(),
            api_key: None,
            max_connections: 10,
            min_connections: 2,
            run_migrations: false,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            path: "public/tree-map.csv".to_string(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            seed_chunk_size: 100,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            grid: GridConfig::default(),
            registry: RegistryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names_deserialize_lowercase() {
        let backend: StoreBackend = serde_json::from_str("\"postgres\"").unwrap();
        assert_eq!(backend, StoreBackend::Postgres);
        assert!(serde_json::from_str::<StoreBackend>("\"Mongo\"").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.registry.seed_chunk_size, 100);
        assert_eq!(config.grid.path, "public/tree-map.csv");
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }
}
