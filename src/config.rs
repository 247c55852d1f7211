//! Configuration management for Shelfmark

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

/// Renewal rules applied by the loan evaluator
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(default)]
pub struct LoanPolicy {
    /// A loan becomes renewable once this many days or fewer remain
    pub renewal_window_days: i64,
    /// Renewals allowed per loan
    pub max_renewals: i32,
}

/// Fallback images for the presentation layer
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, ToSchema)]
#[serde(default)]
pub struct AssetsConfig {
    pub default_cover_url: String,
    pub default_profile_image_url: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub loans: LoanPolicy,
    pub assets: AssetsConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (e.g. SHELFMARK_LOANS__MAX_RENEWALS)
            .add_source(
                Environment::with_prefix("SHELFMARK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // Override port from PORT env var if present
            .set_override_option("server.port", env::var("PORT").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            renewal_window_days: 3,
            max_renewals: 1,
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            default_cover_url: "https://placehold.co/200x300?text=No+Cover".to_string(),
            default_profile_image_url: "https://placehold.co/128x128?text=Reader".to_string(),
        }
    }
}
