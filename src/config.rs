use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use crate::domain::order::OrderStatus;

// ============================================================================
// Service Configuration
// ============================================================================
//
// Resolution order:
// 1. Built-in defaults
// 2. TOML file named by ORDER_SERVICE_CONFIG (if set)
// 3. Environment overrides (ORDER_SERVICE_*, RUST_LOG)
//
// ============================================================================

pub const CONFIG_PATH_ENV: &str = "ORDER_SERVICE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener for the callable and request intake routes.
    pub api_addr: SocketAddr,
    pub metrics_port: u16,
    /// Header the fronting auth layer fills with the verified caller uid.
    pub identity_header: String,
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub log_filter: String,
    /// Orders created at startup, standing in for the ordering flow that
    /// owns order creation.
    pub seed_orders: Vec<SeedOrder>,
}

/// One `[[seed_orders]]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedOrder {
    pub id: String,
    pub merchant_id: String,
    #[serde(default = "SeedOrder::initial_status")]
    pub status: OrderStatus,
}

impl SeedOrder {
    fn initial_status() -> OrderStatus {
        OrderStatus::Pending
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            metrics_port: 9090,
            identity_header: "x-verified-uid".to_string(),
            log_filter: "info,order_status_service=debug".to_string(),
            seed_orders: Vec::new(),
        }
    }
}

impl ServiceConfig {
    /// Load from the environment of the running process.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(addr) = lookup("ORDER_SERVICE_API_ADDR") {
            self.api_addr = addr
                .parse()
                .map_err(|e| ConfigError::Validation(format!("ORDER_SERVICE_API_ADDR: {}", e)))?;
        }
        if let Some(port) = lookup("ORDER_SERVICE_METRICS_PORT") {
            self.metrics_port = port
                .parse()
                .map_err(|e| ConfigError::Validation(format!("ORDER_SERVICE_METRICS_PORT: {}", e)))?;
        }
        if let Some(header) = lookup("ORDER_SERVICE_IDENTITY_HEADER") {
            self.identity_header = header;
        }
        if let Some(filter) = lookup("RUST_LOG") {
            self.log_filter = filter;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identity_header.trim().is_empty() {
            return Err(ConfigError::Validation("identity_header must not be empty".into()));
        }
        if actix_web::http::header::HeaderName::try_from(self.identity_header.as_str()).is_err() {
            return Err(ConfigError::Validation(format!(
                "identity_header is not a valid header name: {}",
                self.identity_header
            )));
        }
        if self.metrics_port == self.api_addr.port() {
            return Err(ConfigError::Validation(format!(
                "metrics_port {} collides with the API listener",
                self.metrics_port
            )));
        }

        let mut seen = HashSet::new();
        for seed in &self.seed_orders {
            if seed.id.trim().is_empty() || seed.merchant_id.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "seed_orders entries need a non-empty id and merchant_id".into(),
                ));
            }
            if !seen.insert(seed.id.as_str()) {
                return Err(ConfigError::Validation(format!("duplicate seed order: {}", seed.id)));
            }
        }
        Ok(())
    }
}
