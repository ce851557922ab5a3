use std::str::FromStr;

use axum::http::HeaderValue;
use sarathi_cloud::cloudinary::{CloudinaryConfig, DEFAULT_BASE_URL};
use sarathi_core::seed::SPECIAL_STAFF_EMAIL;

use crate::auth::jwt::JwtConfig;

/// Default folder for uploaded order images.
pub const DEFAULT_IMAGE_FOLDER: &str = "sarathi-orders";

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT signing configuration.
    pub jwt: JwtConfig,
    /// Image host credentials and upload folder.
    pub cloudinary: CloudinaryConfig,
    /// Email of the account whose assigned orders are flagged `iswithout`.
    pub special_staff_email: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                      |
    /// |-------------------------|------------------------------|
    /// | `HOST`                  | `0.0.0.0`                    |
    /// | `PORT`                  | `5000`                       |
    /// | `CORS_ORIGINS`          | `*`                          |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                         |
    /// | `CLOUDINARY_CLOUD_NAME` | empty (uploads disabled)     |
    /// | `CLOUDINARY_API_KEY`    | empty (uploads disabled)     |
    /// | `CLOUDINARY_API_SECRET` | empty (uploads disabled)     |
    /// | `CLOUDINARY_BASE_URL`   | `https://api.cloudinary.com` |
    /// | `IMAGE_FOLDER`          | `sarathi-orders`             |
    /// | `SPECIAL_STAFF_EMAIL`   | `special@electrical.com`     |
    ///
    /// JWT variables are documented on [`JwtConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("HOST", "0.0.0.0");
        let port: u16 = parse_env("PORT", "5000")?;

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in cors_origins.iter().filter(|o| o.as_str() != "*") {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                name: "CORS_ORIGINS",
                reason: format!("'{origin}': {e}"),
            })?;
        }

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", "30")?;

        let cloudinary = CloudinaryConfig {
            cloud_name: env_or("CLOUDINARY_CLOUD_NAME", ""),
            api_key: env_or("CLOUDINARY_API_KEY", ""),
            api_secret: env_or("CLOUDINARY_API_SECRET", ""),
            base_url: env_or("CLOUDINARY_BASE_URL", DEFAULT_BASE_URL),
            folder: env_or("IMAGE_FOLDER", DEFAULT_IMAGE_FOLDER),
        };
        if !cloudinary.is_configured() {
            tracing::warn!("Cloudinary credentials are not set; order image uploads will fail");
        }

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env()?,
            cloudinary,
            special_staff_email: env_or("SPECIAL_STAFF_EMAIL", SPECIAL_STAFF_EMAIL),
        })
    }

    /// `true` when CORS is configured to accept any origin.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

/// Read `name`, falling back to `default` when unset.
pub(crate) fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Read and parse `name`, falling back to `default` when unset.
pub(crate) fn parse_env<T>(name: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_or(name, default)
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        })
}
