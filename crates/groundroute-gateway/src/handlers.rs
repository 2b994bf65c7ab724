// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use groundroute_core::RouterError;
use groundroute_router::{
    HealthReport, ModelHealth, RefreshReport, RouteEntry, RoutedReply, Target, WeightChange,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Query string of `POST /v1/query`.
#[derive(Debug, Deserialize)]
pub struct QueryParams {
    /// Question text. Missing is treated as empty and rejected by validation.
    #[serde(default)]
    pub query: String,
    /// Requested model; the configured default model when absent.
    #[serde(default)]
    pub model: Option<String>,
}

/// Request body for `POST /v1/routes/{route}/query`.
#[derive(Debug, Deserialize)]
pub struct RouteQueryRequest {
    pub query: String,
}

/// Request body for `PUT /v1/admin/routes/{route}/weight`.
///
/// Signed so out-of-range values reach validation instead of failing to
/// decode.
#[derive(Debug, Deserialize)]
pub struct WeightRequest {
    pub weight: i64,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub region: String,
    pub routes_loaded: usize,
    pub routes: Vec<String>,
    pub uptime_secs: u64,
}

/// One row of `GET /v1/routes`.
#[derive(Debug, Serialize)]
pub struct RouteInfo {
    #[serde(flatten)]
    pub entry: RouteEntry,
    /// Path that queries this route directly.
    pub path: String,
}

/// Response body for `GET /v1/routes`.
#[derive(Debug, Serialize)]
pub struct RouteListResponse {
    pub total: usize,
    pub routes: Vec<RouteInfo>,
}

/// Response body for `GET /v1/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub region: String,
    #[serde(flatten)]
    pub report: HealthReport,
}

/// Response body for `GET /v1/status/{model}`.
#[derive(Debug, Serialize)]
pub struct ModelStatusResponse {
    pub region: String,
    #[serde(flatten)]
    pub health: ModelHealth,
}

/// Response body for `POST /v1/admin/refresh`.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub total: usize,
    #[serde(flatten)]
    pub report: RefreshReport,
}

/// Direct query path for a route.
pub fn route_path(route: &str) -> String {
    format!("/v1/routes/{route}/query")
}

/// GET /health
///
/// Liveness only; always 200 while the process serves requests, even with
/// an empty registry.
pub async fn get_public_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let routes = state.layer.registry.snapshot().route_names();
    Json(HealthResponse {
        status: "ok",
        service: state.service.name.clone(),
        region: state.service.region.clone(),
        routes_loaded: routes.len(),
        routes,
        uptime_secs: state.service.start_time.elapsed().as_secs(),
    })
}

/// POST /v1/query?query=..&model=..
pub async fn post_query(
    State(state): State<GatewayState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<RoutedReply>, ApiError> {
    let dispatcher = &state.layer.dispatcher;
    let model = params
        .model
        .unwrap_or_else(|| dispatcher.default_model().to_string());
    let reply = dispatcher
        .handle(Target::Model(model), &params.query)
        .await?;
    Ok(Json(reply))
}

/// POST /v1/routes/{route}/query
pub async fn post_route_query(
    State(state): State<GatewayState>,
    Path(route): Path<String>,
    Json(body): Json<RouteQueryRequest>,
) -> Result<Json<RoutedReply>, ApiError> {
    let reply = state
        .layer
        .dispatcher
        .handle(Target::Route(route), &body.query)
        .await?;
    Ok(Json(reply))
}

/// GET /v1/routes
pub async fn get_routes(State(state): State<GatewayState>) -> Json<RouteListResponse> {
    let routes: Vec<RouteInfo> = state
        .layer
        .registry
        .snapshot()
        .entries()
        .into_iter()
        .map(|entry| RouteInfo {
            path: route_path(&entry.route),
            entry,
        })
        .collect();
    Json(RouteListResponse {
        total: routes.len(),
        routes,
    })
}

/// GET /v1/status
pub async fn get_status(State(state): State<GatewayState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        region: state.service.region.clone(),
        report: state.layer.health.report(),
    })
}

/// GET /v1/status/{model}
///
/// Probe for an upstream gateway: 200 when the model can take traffic, 503
/// when all its backends are disabled, 404 when the model is unknown.
pub async fn get_model_status(
    State(state): State<GatewayState>,
    Path(model): Path<String>,
) -> Result<(StatusCode, Json<ModelStatusResponse>), ApiError> {
    let Some(health) = state.layer.health.model(&model) else {
        return Err(RouterError::NoBackendAvailable {
            default_model: state.layer.dispatcher.default_model().to_string(),
            model,
        }
        .into());
    };
    let status = if health.active {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    Ok((
        status,
        Json(ModelStatusResponse {
            region: state.service.region.clone(),
            health,
        }),
    ))
}

/// PUT /v1/admin/routes/{route}/weight
pub async fn put_route_weight(
    State(state): State<GatewayState>,
    Path(route): Path<String>,
    Json(body): Json<WeightRequest>,
) -> Result<Json<WeightChange>, ApiError> {
    let change = state.layer.weights.set_weight(&route, body.weight).await?;
    Ok(Json(change))
}

/// POST /v1/admin/refresh
pub async fn post_refresh(
    State(state): State<GatewayState>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let report = state.layer.refresh.refresh().await?;
    Ok(Json(RefreshResponse {
        total: report.routes.len(),
        report,
    }))
}
