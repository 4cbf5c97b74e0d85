use std::str::FromStr;

use seclock_core::privilege_cache::DEFAULT_TTL_SECS;
use seclock_core::users::DEFAULT_PASSWORD_MIN_LENGTH;

use crate::auth::jwt::JwtConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Who may call `POST /auth/register`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationMode {
    /// Anyone may register.
    Open,
    /// Registration requires a caller holding `edit_users`.
    Privileged,
}

impl FromStr for RegistrationMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(RegistrationMode::Open),
            "privileged" => Ok(RegistrationMode::Privileged),
            _ => Err(()),
        }
    }
}

/// Storage backend selected with the `STORE` env var.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    Memory,
}

/// Credentials for the first Admin account, created when no users exist.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub login: String,
    pub password: String,
    pub email: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub store: StoreBackend,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    pub password_min_length: usize,
    pub registration_mode: RegistrationMode,
    pub privilege_cache_ttl_secs: i64,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                    | Default                  |
    /// |----------------------------|--------------------------|
    /// | `HOST`                     | `0.0.0.0`                |
    /// | `PORT`                     | `3000`                   |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                     |
    /// | `STORE`                    | `postgres`               |
    /// | `DATABASE_URL`             | required for `postgres`  |
    /// | `JWT_SECRET`               | **required**             |
    /// | `TOKEN_EXPIRY_MINS`        | `60`                     |
    /// | `PASSWORD_MIN_LENGTH`      | `4`                      |
    /// | `REGISTRATION_MODE`        | `open`                   |
    /// | `PRIVILEGE_CACHE_TTL_SECS` | `300`                    |
    /// | `BOOTSTRAP_ADMIN_LOGIN`    | unset                    |
    /// | `BOOTSTRAP_ADMIN_PASSWORD` | unset                    |
    /// | `BOOTSTRAP_ADMIN_EMAIL`    | `<login>@localhost`      |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("HOST", "0.0.0.0");
        let port: u16 = parse_env("PORT", 3000)?;

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", 30)?;

        let store = match env_or("STORE", "postgres").to_ascii_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "postgres" => StoreBackend::Postgres {
                database_url: std::env::var("DATABASE_URL")
                    .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORE",
                    value: other.to_string(),
                })
            }
        };

        let jwt = JwtConfig::from_env()?;
        let password_min_length = parse_env("PASSWORD_MIN_LENGTH", DEFAULT_PASSWORD_MIN_LENGTH)?;

        let mode = env_or("REGISTRATION_MODE", "open");
        let registration_mode = mode.parse().map_err(|()| ConfigError::Invalid {
            name: "REGISTRATION_MODE",
            value: mode.clone(),
        })?;

        let privilege_cache_ttl_secs = parse_env("PRIVILEGE_CACHE_TTL_SECS", DEFAULT_TTL_SECS)?;

        let bootstrap_admin = match (
            std::env::var("BOOTSTRAP_ADMIN_LOGIN").ok(),
            std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
        ) {
            (Some(login), Some(password)) => Some(BootstrapAdmin {
                email: std::env::var("BOOTSTRAP_ADMIN_EMAIL")
                    .unwrap_or_else(|_| format!("{login}@localhost")),
                login,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            store,
            jwt,
            password_min_length,
            registration_mode,
            privilege_cache_ttl_secs,
            bootstrap_admin,
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

pub(crate) fn parse_env<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_mode_parsing() {
        assert_eq!("open".parse(), Ok(RegistrationMode::Open));
        assert_eq!(" Privileged ".parse(), Ok(RegistrationMode::Privileged));
        assert_eq!("closed".parse::<RegistrationMode>(), Err(()));
    }

    #[test]
    fn parse_env_falls_back_to_default() {
        let value: u64 = parse_env("SECLOCK_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
