use crate::errors::AppError;
use std::env;
use std::str::FromStr;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24 * 7;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_CONFIRMATION_URL: &str = "http://localhost:8080/v1/auth/confirm";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub aws_region: Option<String>,
    pub s3_bucket: String,
    /// Base for public object URLs, e.g. a CDN in front of the bucket.
    pub public_storage_url: Option<String>,
    pub max_upload_bytes: usize,
    pub confirmation_url: String,
}

impl Config {
    /// Reads settings from the process environment. Call `dotenv()` first
    /// so that `.env` values are visible.
    pub fn from_env() -> Result<Self, AppError> {
        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.is_empty() {
            return Err(AppError::ConfigError("JWT_SECRET cannot be empty".to_string()));
        }

        Ok(Config {
            bind_address: optional("BIND_ADDRESS")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            database_url: required("DATABASE_URL")?,
            jwt_secret,
            jwt_expiration_hours: parsed("JWT_EXPIRATION_HOURS", DEFAULT_JWT_EXPIRATION_HOURS)?,
            aws_region: optional("AWS_REGION"),
            s3_bucket: required("AWS_S3_BUCKET")?,
            public_storage_url: optional("PUBLIC_STORAGE_URL"),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            confirmation_url: optional("CONFIRMATION_URL")
                .unwrap_or_else(|| DEFAULT_CONFIRMATION_URL.to_string()),
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::ConfigError(format!("{} must be set", key)))
}

fn parsed<T: FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match optional(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::ConfigError(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_falls_back_to_default_when_unset() {
        let value: usize = parsed("GALLERY_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn parsed_rejects_garbage() {
        env::set_var("GALLERY_TEST_BAD_NUMBER", "ten");
        let result: Result<usize, _> = parsed("GALLERY_TEST_BAD_NUMBER", 1);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
