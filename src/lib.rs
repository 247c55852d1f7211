//! Shelfmark
//!
//! Loan lifecycle evaluation for a library lending client: normalizes raw
//! borrow records, decides renewal eligibility and derives the status shown
//! to readers. Exposed as a library and as a small JSON API.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let services = services::Services::new(&config);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
