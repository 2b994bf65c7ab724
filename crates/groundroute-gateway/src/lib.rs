// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface for the groundroute routing layer.
//!
//! Exposes query-by-model, query-by-route, route listing, health and the
//! admin operations over axum, and maps routing errors onto HTTP statuses so
//! an upstream gateway can tell "retry elsewhere" from "no such model".

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use error::{ApiError, ErrorResponse, status_for};
pub use server::{GatewayState, ServerConfig, ServiceInfo, router, start_server};
