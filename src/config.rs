/// Configuration management for the WaiEdu data layer
use crate::error::{DataError, DataResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub storage: StorageConfig,
    pub pool: PoolConfig,
    pub logging: LoggingConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub store_db: PathBuf,
}

/// Connection pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub enable_wal: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl StoreConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> DataResult<Self> {
        dotenv::dotenv().ok();

        let data_directory: PathBuf = env::var("WAIEDU_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let store_db = env::var("WAIEDU_STORE_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("waiedu.sqlite"));

        let max_connections = env::var("WAIEDU_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| DataError::Validation("Invalid max connections".to_string()))?;
        let enable_wal = env::var("WAIEDU_ENABLE_WAL")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(StoreConfig {
            storage: StorageConfig {
                data_directory,
                store_db,
            },
            pool: PoolConfig {
                max_connections,
                enable_wal,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> DataResult<()> {
        if self.pool.max_connections == 0 {
            return Err(DataError::Validation(
                "Pool must allow at least one connection".to_string(),
            ));
        }

        if self.storage.store_db.as_os_str().is_empty() {
            return Err(DataError::Validation(
                "Store database location cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
