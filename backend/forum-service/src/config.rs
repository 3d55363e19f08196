/// Configuration management for the forum service
///
/// Loads configuration from environment variables (a `.env` file is honored
/// in development). The JWT secret is read once here and threaded explicitly
/// into the token service; nothing looks it up ambiently at call time.
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Storage backend selection and tuning
    pub storage: StorageConfig,
    /// Token signing configuration
    pub jwt: JwtConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server host to bind to
    pub host: String,
    /// HTTP port serving the GraphQL API
    pub port: u16,
    /// Origin allowed to call the API from a browser
    pub cors_allowed_origin: String,
}

/// Which engine backs the storage contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Database URL, required for the postgres backend
    pub database_url: Option<String>,
    /// Max connections in pool
    pub max_connections: u32,
    /// Min connections in pool
    pub min_connections: u32,
    /// Snapshot directory for the in-memory backend
    pub data_dir: String,
}

/// Token signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            cors_allowed_origin: std::env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
        };

        let backend = match std::env::var("STORAGE_BACKEND").as_deref() {
            Ok("postgres") => StorageBackend::Postgres,
            Ok("memory") | Err(_) => StorageBackend::Memory,
            Ok(other) => {
                bail!("unknown STORAGE_BACKEND {other:?} (expected \"memory\" or \"postgres\")")
            }
        };

        let storage = StorageConfig {
            backend,
            database_url: std::env::var("DATABASE_URL").ok(),
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
            min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            data_dir: std::env::var("INMEMORY_DATA_DIR")
                .unwrap_or_else(|_| "data/inmemory".to_string()),
        };

        if storage.backend == StorageBackend::Postgres && storage.database_url.is_none() {
            bail!("DATABASE_URL must be set for the postgres storage backend");
        }

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")
                .context("JWT_SECRET environment variable not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "forum".to_string()),
        };

        Ok(Config { app, storage, jwt })
    }
}
