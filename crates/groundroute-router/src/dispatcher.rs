// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request dispatch: validate, resolve a handle, invoke, shape the reply.
//!
//! The dispatcher is the only component that calls a backend session. It
//! holds the resolved `Arc<BackendHandle>` for the whole invocation, so a
//! refresh that swaps the registry mid-call does not affect it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use groundroute_core::{Citation, RouterError};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::registry::{BackendHandle, Registry};
use crate::selector::Selector;
use crate::validation::RequestValidator;

/// How a request addresses its backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// An explicit route; must exist in the registry.
    Route(String),
    /// A model name; the selector picks the route.
    Model(String),
}

/// Routing facts attached to every reply and to post-resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingMetadata {
    pub route: String,
    /// Model of the backend that served the request.
    pub model: String,
    /// Model the caller asked for, when addressed by model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_model: Option<String>,
    pub backend_id: String,
    pub weight: u8,
    pub region: String,
    /// The default model stood in for an unknown requested model.
    pub fallback: bool,
}

/// A backend reply with routing metadata.
#[derive(Debug, Clone, Serialize)]
pub struct RoutedReply {
    pub content: String,
    pub citations: Vec<Citation>,
    pub debug: serde_json::Value,
    pub metadata: RoutingMetadata,
}

/// A dispatch failure, with routing metadata when a handle had been resolved.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct DispatchError {
    #[source]
    pub error: RouterError,
    pub metadata: Option<RoutingMetadata>,
}

impl From<RouterError> for DispatchError {
    fn from(error: RouterError) -> Self {
        Self {
            error,
            metadata: None,
        }
    }
}

/// Orchestrates one inbound query.
pub struct Dispatcher {
    registry: Arc<Registry>,
    selector: Arc<Selector>,
    validator: RequestValidator,
    region: String,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<Registry>,
        selector: Arc<Selector>,
        validator: RequestValidator,
        region: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            selector,
            validator,
            region: region.into(),
            timeout,
        }
    }

    /// Region tag attached to replies.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Model used when a request names none.
    pub fn default_model(&self) -> &str {
        self.selector.default_model()
    }

    /// Dispatch `query` to the backend addressed by `target`.
    pub async fn handle(&self, target: Target, query: &str) -> Result<RoutedReply, DispatchError> {
        match target {
            Target::Route(route) => self.query_route(&route, query).await,
            Target::Model(model) => self.query_model(&model, query).await,
        }
    }

    /// Query by model through weighted selection.
    pub async fn query_model(&self, model: &str, query: &str) -> Result<RoutedReply, DispatchError> {
        let snapshot = self.registry.snapshot();
        self.validator.check(query, model, snapshot.models())?;
        drop(snapshot);

        let selection = self.selector.select_handle(model).inspect_err(|e| {
            debug!(model, error = %e, "selection failed");
        })?;
        let metadata = self.metadata(&selection.handle, Some(model), selection.fallback);
        self.invoke(selection.handle, query, metadata).await
    }

    /// Query an explicit route.
    pub async fn query_route(&self, route: &str, query: &str) -> Result<RoutedReply, DispatchError> {
        let snapshot = self.registry.snapshot();
        if query.trim().is_empty() {
            return Err(RouterError::InvalidRequest {
                message: "query must not be empty".to_string(),
            }
            .into());
        }

        let handle = snapshot
            .get(route)
            .cloned()
            .ok_or_else(|| RouterError::RouteNotFound {
                route: route.to_string(),
                available: snapshot.route_names(),
            })?;
        drop(snapshot);

        let metadata = self.metadata(&handle, None, false);
        self.invoke(handle, query, metadata).await
    }

    async fn invoke(
        &self,
        handle: Arc<BackendHandle>,
        query: &str,
        metadata: RoutingMetadata,
    ) -> Result<RoutedReply, DispatchError> {
        let started = Instant::now();
        let result = tokio::time::timeout(self.timeout, handle.session().invoke(query)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let reply = match result {
            Ok(Ok(reply)) => reply,
            Ok(Err(error)) => {
                warn!(
                    route = %metadata.route,
                    backend_id = %metadata.backend_id,
                    elapsed_ms,
                    error = %error,
                    "backend invocation failed"
                );
                return Err(DispatchError {
                    error,
                    metadata: Some(metadata),
                });
            }
            Err(_) => {
                warn!(
                    route = %metadata.route,
                    timeout_secs = self.timeout.as_secs(),
                    "backend invocation timed out"
                );
                return Err(DispatchError {
                    error: RouterError::Timeout {
                        duration: self.timeout,
                    },
                    metadata: Some(metadata),
                });
            }
        };

        info!(
            route = %metadata.route,
            model = %metadata.model,
            weight = metadata.weight,
            citations = reply.citations.len(),
            elapsed_ms,
            "query served"
        );

        Ok(RoutedReply {
            content: reply.content,
            citations: reply.citations,
            debug: reply.debug,
            metadata,
        })
    }

    fn metadata(
        &self,
        handle: &BackendHandle,
        requested_model: Option<&str>,
        fallback: bool,
    ) -> RoutingMetadata {
        RoutingMetadata {
            route: handle.route().to_string(),
            model: handle.model().to_string(),
            requested_model: requested_model.map(str::to_string),
            backend_id: handle.backend_id().to_string(),
            weight: handle.weight().get(),
            region: self.region.clone(),
            fallback,
        }
    }
}
