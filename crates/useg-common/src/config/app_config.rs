//! Application configuration structs
//!
//! Loads configuration from environment variables, `.env` and `.env.db`.

use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
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
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Wall-clock budget for a single request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
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
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: String,
}

// Default value functions
fn default_app_name() -> String {
    "useg".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    80
}

fn default_request_timeout() -> u64 {
    60
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    1
}

fn default_run_migrations() -> bool {
    true
}

fn default_migrations_dir() -> String {
    "./migrations".to_string()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// `.env` and `.env.db` are read first when present.
    ///
    /// # Errors
    /// Returns an error if the database location cannot be determined
    pub fn from_env() -> Result<Self, ConfigError> {
        // Missing dotenv files are fine, the variables may come from the process
        let _ = dotenvy::dotenv();
        let _ = dotenvy::from_filename(".env.db");

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            app: AppSettings {
                name: var("APP_NAME").unwrap_or_else(default_app_name),
                env: var("APP_ENV")
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: var("API_HOST").unwrap_or_else(default_host),
                port: parse_or("API_PORT", var("API_PORT"), default_port)?,
                request_timeout_secs: parse_or(
                    "REQUEST_TIMEOUT_SECS",
                    var("REQUEST_TIMEOUT_SECS"),
                    default_request_timeout,
                )?,
            },
            database: DatabaseConfig {
                url: database_url(&lookup)?,
                max_connections: parse_or(
                    "DATABASE_MAX_CONNECTIONS",
                    var("DATABASE_MAX_CONNECTIONS"),
                    default_max_connections,
                )?,
                min_connections: parse_or(
                    "DATABASE_MIN_CONNECTIONS",
                    var("DATABASE_MIN_CONNECTIONS"),
                    default_min_connections,
                )?,
                run_migrations: parse_or(
                    "DATABASE_RUN_MIGRATIONS",
                    var("DATABASE_RUN_MIGRATIONS"),
                    default_run_migrations,
                )?,
                migrations_dir: var("DATABASE_MIGRATIONS_DIR")
                    .unwrap_or_else(default_migrations_dir),
            },
        })
    }
}

fn parse_or<T, D>(key: &'static str, raw: Option<String>, default: D) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    D: FnOnce() -> T,
{
    match raw {
        Some(s) => s
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, s)),
        None => Ok(default()),
    }
}

/// `DATABASE_URL`, or a URL assembled from the `POSTGRES_*` variables
fn database_url<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
        return Ok(url);
    }

    let user = lookup("POSTGRES_USER").ok_or(ConfigError::MissingVar("DATABASE_URL"))?;
    let password = lookup("POSTGRES_PASSWORD").ok_or(ConfigError::MissingVar("POSTGRES_PASSWORD"))?;
    let db = lookup("POSTGRES_DB").ok_or(ConfigError::MissingVar("POSTGRES_DB"))?;
    let host = lookup("POSTGRES_HOST").unwrap_or_else(|| "localhost".to_string());
    let port = lookup("POSTGRES_PORT").unwrap_or_else(|| "5432".to_string());

    Ok(format!("postgres://{user}:{password}@{host}:{port}/{db}"))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
