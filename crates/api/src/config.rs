//! # API Configuration Module
//!
//! Loads settings for the salon API server from environment variables and
//! provides defaults where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `SLOT_STEP_MINUTES`: Granularity of offered start times (default: 30)
//! - `SALON_TIMEZONE`: IANA zone working hours are read in (default: "Europe/Moscow")

use chrono::Duration;
use chrono_tz::Tz;
use eyre::{Result, WrapErr, eyre};
use salon_core::booking::BookingSettings;
use std::env;
use tracing::Level;

/// Configuration for the salon API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use salon_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Minutes between offered slot start times
    pub slot_step_minutes: i64,

    /// Salon time zone
    pub timezone: Tz,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// - `DATABASE_URL` is not set
    /// - `API_PORT` is not a valid port
    /// - `SLOT_STEP_MINUTES` is not a positive integer
    /// - `SALON_TIMEZONE` is not a known IANA zone
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Network settings
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("API_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| eyre!("DATABASE_URL environment variable must be set"))?;

        // Logging settings
        let log_level = match lookup("LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = lookup("API_CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Performance settings
        let request_timeout = lookup("API_REQUEST_TIMEOUT_SECONDS")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(30);

        // Booking settings
        let slot_step_minutes: i64 = lookup("SLOT_STEP_MINUTES")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .wrap_err("Invalid SLOT_STEP_MINUTES value")?;
        if slot_step_minutes <= 0 {
            return Err(eyre!("SLOT_STEP_MINUTES must be positive"));
        }

        let timezone_name =
            lookup("SALON_TIMEZONE").unwrap_or_else(|| "Europe/Moscow".to_string());
        let timezone = timezone_name
            .parse::<Tz>()
            .map_err(|e| eyre!("Invalid SALON_TIMEZONE '{}': {}", timezone_name, e))?;

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            slot_step_minutes,
            timezone,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn booking_settings(&self) -> BookingSettings {
        BookingSettings {
            slot_step: Duration::minutes(self.slot_step_minutes),
            timezone: self.timezone,
        }
    }
}
