// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token middleware for the gateway.
//!
//! Two tiers:
//! 1. API routes (query, listing, status) check `api_token` when one is
//!    configured and are open otherwise.
//! 2. Admin routes check `admin_token`. With no admin token configured every
//!    admin request is rejected (fail-closed).

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

/// Tokens accepted by the gateway.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Token for API routes. `None` leaves them open.
    pub api_token: Option<String>,
    /// Token for admin routes. `None` disables admin routes.
    pub admin_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("admin_token", &self.admin_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Middleware for API routes.
pub async fn api_auth(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    match auth.api_token.as_deref() {
        None => Ok(next.run(request).await),
        Some(expected) if bearer(request.headers()) == Some(expected) => {
            Ok(next.run(request).await)
        }
        Some(_) => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Middleware for admin routes.
pub async fn admin_auth(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = auth.admin_token.as_deref() else {
        tracing::warn!(path = %request.uri().path(), "admin request rejected: no admin token configured");
        return Err(StatusCode::UNAUTHORIZED);
    };
    if bearer(request.headers()) == Some(expected) {
        Ok(next.run(request).await)
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}
