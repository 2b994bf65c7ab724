// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::time::Instant;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use groundroute_config::GroundrouteConfig;
use groundroute_config::model::GatewayConfig;
use groundroute_core::RouterError;
use groundroute_router::RoutingLayer;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, admin_auth, api_auth};
use crate::handlers;

/// Service identity reported by the health endpoint.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub name: String,
    pub region: String,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub layer: RoutingLayer,
    pub service: ServiceInfo,
    pub auth: AuthConfig,
}

impl GatewayState {
    pub fn new(layer: RoutingLayer, config: &GroundrouteConfig) -> Self {
        Self {
            layer,
            service: ServiceInfo {
                name: config.service.name.clone(),
                region: config.service.region.clone(),
                start_time: Instant::now(),
            },
            auth: AuthConfig {
                api_token: config.gateway.api_token.clone(),
                admin_token: config.gateway.admin_token.clone(),
            },
        }
    }
}

/// Bind address of the gateway.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl From<&GatewayConfig> for ServerConfig {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Build the application router.
///
/// - GET /health (public)
/// - POST /v1/query, POST /v1/routes/{route}/query, GET /v1/routes,
///   GET /v1/status, GET /v1/status/{model} (api token)
/// - PUT /v1/admin/routes/{route}/weight, POST /v1/admin/refresh (admin token)
pub fn router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/query", post(handlers::post_query))
        .route("/v1/routes", get(handlers::get_routes))
        .route("/v1/routes/{route}/query", post(handlers::post_route_query))
        .route("/v1/status", get(handlers::get_status))
        .route("/v1/status/{model}", get(handlers::get_model_status))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state.clone(),
            api_auth,
        ))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route(
            "/v1/admin/routes/{route}/weight",
            put(handlers::put_route_weight),
        )
        .route("/v1/admin/refresh", post(handlers::post_refresh))
        .route_layer(axum_middleware::from_fn_with_state(auth_state, admin_auth))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve the gateway until `shutdown` is cancelled.
///
/// In-flight requests are allowed to finish after cancellation.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), RouterError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RouterError::Config(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!(%addr, "gateway listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| RouterError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_from_gateway_section() {
        let gateway = GatewayConfig {
            port: 9100,
            ..GatewayConfig::default()
        };
        let config = ServerConfig::from(&gateway);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9100);
    }
}
