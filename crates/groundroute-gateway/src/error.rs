// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of routing errors onto HTTP responses.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use groundroute_core::RouterError;
use groundroute_router::{DispatchError, RoutingMetadata};
use serde::Serialize;

/// Seconds an upstream caller should wait before retrying this instance.
const RETRY_AFTER_SECS: &str = "30";

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable machine code, e.g. `all_backends_disabled`.
    pub error: &'static str,
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RoutingMetadata>,
}

/// A handler failure.
#[derive(Debug)]
pub struct ApiError {
    pub error: RouterError,
    pub metadata: Option<RoutingMetadata>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        status_for(&self.error)
    }
}

impl From<RouterError> for ApiError {
    fn from(error: RouterError) -> Self {
        Self {
            error,
            metadata: None,
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(e: DispatchError) -> Self {
        Self {
            error: e.error,
            metadata: e.metadata,
        }
    }
}

/// HTTP status for a routing error.
pub fn status_for(error: &RouterError) -> StatusCode {
    match error {
        RouterError::NoBackendAvailable { .. }
        | RouterError::RouteNotFound { .. }
        | RouterError::UnknownRoute { .. } => StatusCode::NOT_FOUND,
        RouterError::InvalidWeight { .. } | RouterError::InvalidRequest { .. } => {
            StatusCode::BAD_REQUEST
        }
        RouterError::AllBackendsDisabled { .. } | RouterError::DiscoveryUnavailable { .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        RouterError::WeightPersistence { .. } | RouterError::BackendExecutionFailed { .. } => {
            StatusCode::BAD_GATEWAY
        }
        RouterError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        RouterError::Config(_) | RouterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(code = self.error.code(), error = %self.error, "request failed");
        } else {
            tracing::debug!(code = self.error.code(), error = %self.error, "request rejected");
        }

        let retryable = self.error.is_retryable();
        let body = ErrorResponse {
            error: self.error.code(),
            message: self.error.to_string(),
            retryable,
            metadata: self.metadata,
        };
        let mut response = (status, Json(body)).into_response();
        if retryable {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECS));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn status_mapping() {
        let cases = [
            (
                RouterError::NoBackendAvailable {
                    model: "gpt-5".into(),
                    default_model: "gpt-4o".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                RouterError::AllBackendsDisabled {
                    model: "gpt-4o".into(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (RouterError::InvalidWeight { weight: 101 }, StatusCode::BAD_REQUEST),
            (RouterError::execution("boom"), StatusCode::BAD_GATEWAY),
            (
                RouterError::Timeout {
                    duration: Duration::from_secs(1),
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (RouterError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(status_for(&error), status, "{error}");
        }
    }

    #[test]
    fn retryable_errors_carry_retry_after() {
        let response = ApiError::from(RouterError::AllBackendsDisabled {
            model: "gpt-4o".into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[RETRY_AFTER], RETRY_AFTER_SECS);

        let response = ApiError::from(RouterError::UnknownRoute {
            route: "gpt4o_9".into(),
        })
        .into_response();
        assert!(response.headers().get(RETRY_AFTER).is_none());
    }
}
