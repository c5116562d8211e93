//! Server configuration
//!
//! Everything comes from environment variables (a `.env` file is loaded
//! first by the binary). Secrets fall back to throwaway values only in
//! development.

use chrono_tz::Tz;
use thiserror::Error;

use crate::auth::JwtConfig;
use crate::auth::jwt::generate_dev_secret;

const DEVELOPMENT: &str = "development";
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in {1} environment")]
    MissingSecret(&'static str, String),

    #[error("{0} must be at least {MIN_SECRET_LEN} characters")]
    WeakSecret(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Where uploaded objects are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite URL, e.g. `sqlite:timescale.db`
    pub database_url: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    /// Timezone that decides what "today" means for attendance
    pub business_timezone: Tz,
    pub jwt: JwtConfig,
    pub storage_backend: StorageBackend,
    /// Custom S3 endpoint (MinIO, LocalStack); AWS default when unset
    pub s3_endpoint: Option<String>,
    pub images_bucket: String,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = var("ENVIRONMENT").unwrap_or_else(|| DEVELOPMENT.into());
        let is_dev = environment == DEVELOPMENT;

        let business_timezone = match var("BUSINESS_TIMEZONE") {
            Some(name) => name.parse::<Tz>().map_err(|_| ConfigError::Invalid {
                name: "BUSINESS_TIMEZONE",
                value: name.clone(),
            })?,
            None => Tz::UTC,
        };

        let storage_backend = match var("STORAGE_BACKEND").as_deref() {
            Some("s3") => StorageBackend::S3,
            Some("memory") => StorageBackend::Memory,
            None if is_dev => StorageBackend::Memory,
            None => StorageBackend::S3,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| "sqlite:timescale.db".into()),
            http_port: parse_or("HTTP_PORT", 8080)?,
            business_timezone,
            jwt: JwtConfig {
                secret: Self::require_secret("JWT_SECRET", &environment)?,
                expiration_minutes: parse_or("JWT_EXPIRATION_MINUTES", 1440)?,
                issuer: var("JWT_ISSUER").unwrap_or_else(|| "timescale-server".into()),
                audience: var("JWT_AUDIENCE").unwrap_or_else(|| "timescale-clients".into()),
            },
            storage_backend,
            s3_endpoint: var("S3_ENDPOINT"),
            images_bucket: var("IMAGES_BUCKET").unwrap_or_else(|| "images".into()),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: var("LOG_DIR"),
            environment,
        })
    }

    /// A secret must be set and long enough outside development
    fn require_secret(name: &'static str, environment: &str) -> Result<String, ConfigError> {
        match var(name) {
            Some(secret) if secret.len() >= MIN_SECRET_LEN => Ok(secret),
            Some(_) if environment != DEVELOPMENT => Err(ConfigError::WeakSecret(name)),
            None if environment != DEVELOPMENT => {
                Err(ConfigError::MissingSecret(name, environment.to_string()))
            }
            _ => {
                tracing::warn!("{name} not set or too short, using a temporary development secret");
                Ok(generate_dev_secret())
            }
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == DEVELOPMENT
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_secret_outside_development() {
        // Name chosen so no real environment sets it
        let err = Config::require_secret("TIMESCALE_TEST_UNSET_SECRET", "production").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret(_, _)));

        let dev = Config::require_secret("TIMESCALE_TEST_UNSET_SECRET", DEVELOPMENT).unwrap();
        assert!(dev.len() >= MIN_SECRET_LEN);
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(parse_or("TIMESCALE_TEST_UNSET_PORT", 8080u16).unwrap(), 8080);
    }
}
