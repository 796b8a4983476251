//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MADRESELVA_DATABASE_URL` - `PostgreSQL` connection string (falls back
//!   to the generic `DATABASE_URL`)
//! - `MADRESELVA_BASE_URL` - Public URL for the storefront
//! - `MADRESELVA_WHATSAPP_PHONE` - WhatsApp contact number for checkout
//!   handoff (international format, digits only)
//!
//! ## Optional
//! - `MADRESELVA_HOST` - Bind address (default: 127.0.0.1)
//! - `MADRESELVA_PORT` - Listen port (default: 3000)
//! - `MADRESELVA_STORE_NAME` - Display name used in checkout messages
//!   (default: Madreselva)
//! - `MADRESELVA_DISCOUNT` - Flat storewide discount percentage, 0-100,
//!   applied at presentation time only (default: 0)
//! - `MADRESELVA_DEFAULT_CURRENCY` - Currency for empty carts (default: ARS)
//! - `MADRESELVA_AVAILABILITY_POLICY` - `all` or `available-only`
//!   (default: available-only)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use madreselva_core::CurrencyCode;

use crate::catalog::AvailabilityPolicy;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Store display name used in checkout handoff messages
    pub store_name: String,
    /// WhatsApp contact number for checkout handoff
    pub whatsapp_phone: String,
    /// Flat storewide discount percentage (0-100), presentation-only
    pub discount_percent: u8,
    /// Currency used for carts with no lines
    pub default_currency: CurrencyCode,
    /// Which products appear in listings
    pub availability: AvailabilityPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any value
    /// fails validation. An out-of-range discount is a startup error, never
    /// a silent default.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("MADRESELVA_DATABASE_URL")?;
        let host = get_env_or_default("MADRESELVA_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("MADRESELVA_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("MADRESELVA_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("MADRESELVA_PORT".to_owned(), e.to_string()))?;
        let base_url = get_required_env("MADRESELVA_BASE_URL")?;
        let store_name = get_env_or_default("MADRESELVA_STORE_NAME", "Madreselva");
        let whatsapp_phone =
            parse_phone("MADRESELVA_WHATSAPP_PHONE", &get_required_env("MADRESELVA_WHATSAPP_PHONE")?)?;
        let discount_percent =
            parse_discount("MADRESELVA_DISCOUNT", &get_env_or_default("MADRESELVA_DISCOUNT", "0"))?;
        let default_currency = get_env_or_default("MADRESELVA_DEFAULT_CURRENCY", "ARS")
            .parse::<CurrencyCode>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("MADRESELVA_DEFAULT_CURRENCY".to_owned(), e.to_string())
            })?;
        let availability = get_env_or_default("MADRESELVA_AVAILABILITY_POLICY", "available-only")
            .parse::<AvailabilityPolicy>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "MADRESELVA_AVAILABILITY_POLICY".to_owned(),
                    e.to_string(),
                )
            })?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            store_name,
            whatsapp_phone,
            discount_percent,
            default_currency,
            availability,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse a discount percentage, requiring 0-100.
fn parse_discount(var_name: &str, raw: &str) -> Result<u8, ConfigError> {
    let value: u8 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvVar(var_name.to_owned(), format!("not a number: {raw}")))?;

    if value > 100 {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_owned(),
            format!("discount must be 0-100, got {value}"),
        ));
    }

    Ok(value)
}

/// Validate a WhatsApp phone number: non-empty, digits only.
fn parse_phone(var_name: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_owned(),
            "phone number cannot be empty".to_owned(),
        ));
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_owned(),
            format!("phone number must be digits only, got {trimmed}"),
        ));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_discount_valid() {
        assert_eq!(parse_discount("D", "0").unwrap(), 0);
        assert_eq!(parse_discount("D", "15").unwrap(), 15);
        assert_eq!(parse_discount("D", "100").unwrap(), 100);
    }

    #[test]
    fn test_parse_discount_rejects_out_of_range() {
        assert!(parse_discount("D", "101").is_err());
        assert!(parse_discount("D", "-5").is_err());
        assert!(parse_discount("D", "quince").is_err());
    }

    #[test]
    fn test_parse_phone() {
        assert_eq!(parse_phone("P", "5493544543637").unwrap(), "5493544543637");
        assert_eq!(parse_phone("P", " 549354 ").unwrap(), "549354");
        assert!(parse_phone("P", "").is_err());
        assert!(parse_phone("P", "+54 9 3544").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_owned(),
            store_name: "Madreselva".to_owned(),
            whatsapp_phone: "5493544543637".to_owned(),
            discount_percent: 15,
            default_currency: CurrencyCode::ARS,
            availability: AvailabilityPolicy::AvailableOnly,
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }
}
