//! Business logic services

pub mod evaluator;
pub mod loans;

use crate::config::AppConfig;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub loans: loans::LoansService,
}

impl Services {
    /// Create all services from the application configuration
    pub fn new(config: &AppConfig) -> Self {
        Self {
            loans: loans::LoansService::new(config.loans, config.assets.clone()),
        }
    }
}
