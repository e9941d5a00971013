//! # Runtime Configuration
//!
//! All settings come from the environment (a `.env` file is honored when
//! present). Defaults match a local development setup.

use std::env;
use std::str::FromStr;

/// PostgreSQL connection and pool settings
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database host (default: "localhost")
    pub host: String,

    /// Database port (default: 5432)
    pub port: u16,

    /// Database user (default: "postgres")
    pub user: String,

    /// Database password (default: empty)
    pub password: String,

    /// Database name (default: "postgres")
    pub name: String,

    /// Maximum pool size (default: 20)
    pub pool_size: u32,

    /// Connection acquire timeout in milliseconds (default: 5000)
    pub connect_timeout_ms: u64,

    /// Idle connection timeout in milliseconds (default: 30000)
    pub idle_timeout_ms: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "postgres".to_string(),
            pool_size: 20,
            connect_timeout_ms: 5000,
            idle_timeout_ms: 30000,
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Host to bind to (default: "0.0.0.0")
    pub host: String,

    /// Port to bind to (default: 5000)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl HttpConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Settings for the optional external gateway under `/api/external/`.
///
/// The gateway only exists when an upstream origin is configured, and
/// certificate validation stays on unless explicitly disabled for
/// development.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Upstream origin, e.g. "https://gateway.example.com"
    pub upstream: String,

    /// Accept invalid TLS certificates on the outbound call (default: false)
    pub accept_invalid_certs: bool,
}

/// Complete application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub db: DbConfig,
    pub http: HttpConfig,
    pub proxy: Option<ProxyConfig>,
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// Unset or unparseable variables fall back to their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db = DbConfig {
            host: env_or("DB_HOST", "localhost".to_string()),
            port: env_or("DB_PORT", 5432),
            user: env_or("DB_USER", "postgres".to_string()),
            password: env_or("DB_PASSWORD", String::new()),
            name: env_or("DB_NAME", "postgres".to_string()),
            pool_size: env_or("DB_POOL_SIZE", 20),
            connect_timeout_ms: env_or("DB_CONNECT_TIMEOUT_MS", 5000),
            idle_timeout_ms: env_or("DB_IDLE_TIMEOUT_MS", 30000),
        };

        let http = HttpConfig {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 5000),
        };

        let proxy = env::var("PROXY_UPSTREAM").ok().map(|upstream| ProxyConfig {
            upstream,
            accept_invalid_certs: env_or("PROXY_ACCEPT_INVALID_CERTS", false),
        });

        Self { db, http, proxy }
    }
}

/// Read an environment variable, falling back to `default` when the variable
/// is unset or does not parse.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
