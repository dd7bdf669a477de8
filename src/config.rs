//! Process configuration, read once from the environment at start-up.
//!
//! A `.env` file is loaded first when present. Every value is read-only after
//! `Config::from_env` returns, so the struct can be shared freely between workers.

use std::env;
use std::fmt;

/// Placeholder secret used when `JWT_SECRET` is unset. Fine for local runs only.
pub const PLACEHOLDER_JWT_SECRET: &str = "your-super-secret-key-change-in-production";

#[derive(Debug)]
pub enum ConfigError {
    /// A required variable is not set.
    Missing(&'static str),
    /// A variable is set but its value cannot be used.
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, reason } => write!(f, "{} is invalid: {}", key, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Token signing settings. `secret` is never printed by `Debug`.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Token time-to-live in seconds. `from_env` requires it to be positive; tests
    /// build this directly with a negative value to mint expired tokens.
    pub expiry_secs: i64,
    pub issuer: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiry_secs", &self.expiry_secs)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtConfig {
    pub fn uses_placeholder_secret(&self) -> bool {
        self.secret == PLACEHOLDER_JWT_SECRET
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        // Only an unset secret falls back to the placeholder; an empty one is an error.
        let secret = env::var("JWT_SECRET").unwrap_or_else(|_| PLACEHOLDER_JWT_SECRET.to_string());
        if secret.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET",
                reason: "must not be empty".into(),
            });
        }

        let bcrypt_cost = parse_env("BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                reason: format!("{} is outside 4..=31", bcrypt_cost),
            });
        }

        let expiry_secs: i64 = parse_env("JWT_EXPIRY", 60 * 60 * 24)?;
        if expiry_secs <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRY",
                reason: format!("{} is not a positive number of seconds", expiry_secs),
            });
        }

        Ok(Self {
            server: ServerConfig {
                host: env_or("SERVER_HOST", "127.0.0.1"),
                port: parse_env("SERVER_PORT", 8080)?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            jwt: JwtConfig {
                secret,
                expiry_secs,
                issuer: env_or("JWT_ISSUER", "todo-api"),
            },
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server.host, self.server.port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

fn parse_env<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(value) if !value.is_empty() => value.trim().parse().map_err(|e: T::Err| {
            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        }),
        _ => Ok(default),
    }
}
