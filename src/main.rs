use actix::prelude::*;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_status_service::actors::RequestTriggerActor;
use order_status_service::api::{self, ApiState};
use order_status_service::config::ServiceConfig;
use order_status_service::metrics;
use order_status_service::platform::Platform;

#[actix::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load()?;

    // Initialize structured logging; the filter already reflects RUST_LOG
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🚀 Starting order status service");

    // === 1. Process-wide platform (store + metrics) ===
    let platform = Platform::initialize(config)?;
    let seeded = platform.seed_orders().await?;
    if seeded > 0 {
        tracing::info!(seeded, "Seeded orders from configuration");
    }

    // === 2. Metrics HTTP server in background thread ===
    let metrics_registry = Arc::new(platform.metrics.registry().clone());
    let metrics_store = platform.store.clone();
    let metrics_port = platform.config.metrics_port;
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("Failed to build metrics runtime: {}", e);
                return;
            }
        };
        rt.block_on(async {
            if let Err(e) = metrics::start_metrics_server(metrics_registry, metrics_store, metrics_port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    });

    // === 3. Trigger for queued status requests ===
    let _trigger = RequestTriggerActor::new(platform.store.clone(), platform.request_handler()).start();

    // === 4. Callable API ===
    let state = web::Data::new(ApiState {
        commands: platform.command_handler(),
        store: platform.store.clone(),
        identity_header: platform.config.identity_header.clone(),
    });

    tracing::info!(addr = %platform.config.api_addr, "📡 Serving callable API");

    HttpServer::new(move || App::new().app_data(state.clone()).configure(api::configure))
        .bind(platform.config.api_addr)?
        .run()
        .await?;

    tracing::info!("Order status service stopped");
    Ok(())
}
