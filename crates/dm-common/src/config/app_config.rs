//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: GatewayConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub history: HistoryConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// WebSocket gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// Capacity of each connection's outbound event queue
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
}

impl GatewayConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
}

/// CORS configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    /// Empty means any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Conversation history settings
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "dm-hub".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_outbound_buffer() -> usize {
    100
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_access_token_expiry() -> i64 {
    86_400 // 1 day
}

fn default_page_size() -> u32 {
    dm_core::DEFAULT_PAGE_SIZE
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

impl AppConfig {
    /// Build a configuration with defaults for everything but the required values
    #[must_use]
    pub fn new(gateway_port: u16, database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::default(),
            },
            gateway: GatewayConfig {
                host: default_host(),
                port: gateway_port,
                outbound_buffer: default_outbound_buffer(),
            },
            database: DatabaseConfig {
                url: database_url.into(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
            },
            jwt: JwtConfig {
                secret: jwt_secret.into(),
                access_token_expiry: default_access_token_expiry(),
            },
            cors: CorsConfig::default(),
            history: HistoryConfig {
                page_size: default_page_size(),
            },
            snowflake: SnowflakeConfig::default(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let port = env::var("GATEWAY_PORT").map_err(|_| ConfigError::MissingVar("GATEWAY_PORT"))?;
        let port = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("GATEWAY_PORT", port.clone()))?;
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET"))?;

        let mut config = Self::new(port, database_url, jwt_secret);

        if let Ok(name) = env::var("APP_NAME") {
            config.app.name = name;
        }
        if let Ok(value) = env::var("APP_ENV") {
            config.app.env =
                Environment::parse(&value).ok_or(ConfigError::InvalidValue("APP_ENV", value))?;
        }
        if let Ok(host) = env::var("GATEWAY_HOST") {
            config.gateway.host = host;
        }
        if let Some(buffer) = parse_var("OUTBOUND_BUFFER") {
            config.gateway.outbound_buffer = buffer;
        }
        if let Some(max) = parse_var("DATABASE_MAX_CONNECTIONS") {
            config.database.max_connections = max;
        }
        if let Some(min) = parse_var("DATABASE_MIN_CONNECTIONS") {
            config.database.min_connections = min;
        }
        if let Some(expiry) = parse_var("JWT_ACCESS_TOKEN_EXPIRY") {
            config.jwt.access_token_expiry = expiry;
        }
        if let Ok(origins) = env::var("CORS_ALLOWED_ORIGINS") {
            config.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(page_size) = parse_var::<u32>("HISTORY_PAGE_SIZE") {
            if page_size == 0 {
                return Err(ConfigError::InvalidValue("HISTORY_PAGE_SIZE", "0".to_string()));
            }
            config.history.page_size = page_size;
        }
        if let Some(worker_id) = parse_var::<u16>("WORKER_ID") {
            if worker_id >= 1024 {
                return Err(ConfigError::InvalidValue("WORKER_ID", worker_id.to_string()));
            }
            config.snowflake.worker_id = worker_id;
        }

        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
