// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `groundroute serve` command implementation.
//!
//! Builds the collaborators and routing layer, performs the startup refresh,
//! runs the periodic refresh task and the HTTP gateway until a shutdown
//! signal arrives, then waits for the refresh task to stop.

use std::time::Duration;

use groundroute_config::GroundrouteConfig;
use groundroute_core::RouterError;
use groundroute_gateway::{GatewayState, ServerConfig, start_server};
use groundroute_router::{RoutingLayer, spawn_refresh_task};
use tracing::{info, warn};

use crate::shutdown;

/// Runs the `groundroute serve` command.
pub async fn run_serve(config: GroundrouteConfig) -> Result<(), RouterError> {
    init_tracing(&config.service.log_level);

    info!(
        service = %config.service.name,
        region = %config.service.region,
        "starting groundroute serve"
    );

    let collaborators = groundroute_foundry::collaborators(&config)?;
    info!(
        discovery = collaborators.discovery.name(),
        executor = collaborators.executor.name(),
        weights = collaborators.weights.name(),
        "collaborators initialized"
    );
    let layer = RoutingLayer::new(&config, collaborators);

    // A failed startup refresh is not fatal; the periodic task or an admin
    // refresh can still populate the registry.
    match layer.refresh.refresh().await {
        Ok(report) => info!(
            generation = report.generation,
            routes = report.routes.len(),
            "startup refresh complete"
        ),
        Err(e) => warn!(error = %e, "startup refresh failed, serving with an empty registry"),
    }

    let cancel = shutdown::install_signal_handler();

    let refresh_task = if config.refresh.enabled {
        Some(spawn_refresh_task(
            layer.refresh.clone(),
            Duration::from_secs(config.refresh.interval_secs),
            cancel.clone(),
        ))
    } else {
        info!("periodic refresh disabled");
        None
    };

    let state = GatewayState::new(layer, &config);
    let result = start_server(&ServerConfig::from(&config.gateway), state, cancel.clone()).await;

    // Also stops the refresh task when the server exits on its own.
    cancel.cancel();
    if let Some(task) = refresh_task {
        if let Err(e) = task.await {
            warn!(error = %e, "refresh task ended abnormally");
        }
    }

    info!("groundroute stopped");
    result
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured
/// level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("groundroute={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
