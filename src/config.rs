use std::{env, net::IpAddr, str::FromStr};

use dotenvy::dotenv;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::errors::ConfigError;

// Server-specific configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub workers: usize,
}

// Application-specific configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub environment: Environment,
    pub log_level: String,
}

// Environment enum for different deployment environments
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!(
                "Invalid environment: {}. Must be one of: development, testing, production",
                s
            )),
        }
    }
}

// Strategy used to mint anonymous visitor ids
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    Random,
    Sequence,
}

impl FromStr for GeneratorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" => Ok(GeneratorKind::Random),
            "sequence" | "seq" => Ok(GeneratorKind::Sequence),
            _ => Err(format!(
                "Invalid generator: {}. Must be one of: random, sequence",
                s
            )),
        }
    }
}

// Visitor identity configuration
#[derive(Debug, Deserialize, Clone)]
pub struct IdentityConfig {
    pub generator: GeneratorKind,
    pub sequence_start: u64,
    pub id_prefix: String,
    pub cookie_path: String,
    pub cookie_max_age_days: i64,
    pub cookie_http_only: bool,
    pub cookie_secure: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorKind::Random,
            sequence_start: 1,
            id_prefix: String::new(),
            cookie_path: "/".to_string(),
            cookie_max_age_days: 365,
            cookie_http_only: true,
            cookie_secure: false,
        }
    }
}

type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub identity: IdentityConfig,
}

impl Config {
    // Load configuration from environment variables
    pub fn load() -> ConfigResult<Self> {
        match dotenv() {
            Ok(_) => debug!(".env file loaded successfully"),
            Err(e) => warn!("Could not load .env file: {}", e),
        }

        let server = ServerConfig {
            host: get_env_or_default("SERVER_HOST", "127.0.0.1")?,
            port: get_env_or_default("SERVER_PORT", "8000")?,
            workers: get_env_or_default("SERVER_WORKERS", "4")?,
        };

        let version = option_env!("CARGO_PKG_VERSION")
            .unwrap_or("0.1.0")
            .to_string();

        let app = AppConfig {
            name: get_env_or_default("APP_NAME", "hush")?,
            version: env::var("APP_VERSION").unwrap_or(version),
            environment: get_env_or_default("APP_ENVIRONMENT", "development")?,
            log_level: get_env_or_default("RUST_LOG", "info")?,
        };

        let identity = IdentityConfig {
            generator: get_env_or_default("IDENTITY_GENERATOR", "random")?,
            sequence_start: get_env_or_default("IDENTITY_SEQUENCE_START", "1")?,
            id_prefix: get_env_or_default("IDENTITY_ID_PREFIX", "")?,
            cookie_path: get_env_or_default("IDENTITY_COOKIE_PATH", "/")?,
            cookie_max_age_days: get_env_or_default("IDENTITY_COOKIE_MAX_AGE_DAYS", "365")?,
            cookie_http_only: get_env_or_default("IDENTITY_COOKIE_HTTP_ONLY", "true")?,
            cookie_secure: get_env_or_default("IDENTITY_COOKIE_SECURE", "false")?,
        };

        let config = Config {
            server,
            app,
            identity,
        };
        info!("Configuration loaded successfully");
        debug!("Loaded config: {:?}", config);

        Ok(config)
    }
}

/// Helper function to get an env variable with a default value
fn get_env_or_default<T: FromStr>(key: &str, default: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => parse_value(key, &val),
        Err(env::VarError::NotPresent) => {
            debug!("{} not set, using default: {}", key, default);
            parse_value(key, default)
        }
        Err(source) => Err(ConfigError::EnvVar {
            key: key.to_string(),
            source,
        }),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::Parse {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
