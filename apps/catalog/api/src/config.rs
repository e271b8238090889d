use core_config::{ConfigError, FromEnv, env_flag, env_parse, server::ServerConfig};
use database::postgres::PostgresConfig;
use domain_products::CacheConfig;
use std::fmt;
use std::str::FromStr;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Where products are stored
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// Process-local store, lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(format!(
                "unknown storage backend '{}', expected 'postgres' or 'memory'",
                other
            )),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres => write!(f, "postgres"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Application-specific configuration
/// Composes shared config components from the `core_config` and `database` libraries
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub storage: StorageBackend,
    /// Present only for the Postgres backend
    pub database: Option<PostgresConfig>,
    pub cache: CacheConfig,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let storage = env_parse("STORAGE_BACKEND", StorageBackend::Postgres)?;

        let database = match storage {
            StorageBackend::Postgres => Some(PostgresConfig::from_env()?), // Requires DATABASE_URL
            StorageBackend::Memory => None,
        };

        Ok(Self {
            environment,
            server,
            storage,
            database,
            cache: CacheConfig::from_env()?,
            run_migrations: env_flag("RUN_MIGRATIONS", true)?,
        })
    }
}
