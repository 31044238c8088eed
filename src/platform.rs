use std::sync::{Arc, OnceLock};

use crate::config::ServiceConfig;
use crate::domain::order::{OrderStatusCommandHandler, QueuedRequestHandler};
use crate::metrics::Metrics;
use crate::models::Order;
use crate::store::{DocumentStore, MemoryStore};

// ============================================================================
// Platform - process-wide state
// ============================================================================
//
// Initialised exactly once in `main` before any handler runs and kept for the
// lifetime of the process. There is no teardown.
//
// ============================================================================

static PLATFORM: OnceLock<Platform> = OnceLock::new();

pub struct Platform {
    pub config: ServiceConfig,
    pub store: Arc<dyn DocumentStore>,
    pub metrics: Arc<Metrics>,
}

impl Platform {
    pub fn new(config: ServiceConfig, store: Arc<dyn DocumentStore>) -> anyhow::Result<Self> {
        Ok(Self {
            config,
            store,
            metrics: Arc::new(Metrics::new()?),
        })
    }

    /// Install the process-wide platform backed by the in-memory store.
    /// Fails if called more than once.
    pub fn initialize(config: ServiceConfig) -> anyhow::Result<&'static Platform> {
        Self::install(Self::new(config, Arc::new(MemoryStore::new()))?)
    }

    pub fn install(platform: Platform) -> anyhow::Result<&'static Platform> {
        PLATFORM
            .set(platform)
            .map_err(|_| anyhow::anyhow!("Platform already initialized"))?;
        Self::get().ok_or_else(|| anyhow::anyhow!("Platform missing after initialization"))
    }

    pub fn get() -> Option<&'static Platform> {
        PLATFORM.get()
    }

    /// Create the configured seed orders. Fails on an id that already exists.
    pub async fn seed_orders(&self) -> anyhow::Result<usize> {
        for seed in &self.config.seed_orders {
            self.store
                .create_order(&seed.id, Order::new(&seed.merchant_id, seed.status))
                .await
                .map_err(|e| anyhow::anyhow!("Failed to seed order {}: {}", seed.id, e))?;
            tracing::debug!(order_id = %seed.id, merchant_id = %seed.merchant_id, status = %seed.status, "Seeded order");
        }
        Ok(self.config.seed_orders.len())
    }

    pub fn command_handler(&self) -> OrderStatusCommandHandler {
        OrderStatusCommandHandler::new(self.store.clone(), self.metrics.clone())
    }

    pub fn request_handler(&self) -> QueuedRequestHandler {
        QueuedRequestHandler::new(self.store.clone(), self.metrics.clone())
    }
}
