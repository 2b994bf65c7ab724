// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for the routing layer.

use thiserror::Error;

/// The error type shared by the registry, selector, dispatcher and the
/// collaborator traits.
#[derive(Debug, Error)]
pub enum RouterError {
    /// No backend exists for the model, even after the default-model fallback.
    #[error("no backend available for model `{model}` or fallback model `{default_model}`")]
    NoBackendAvailable { model: String, default_model: String },

    /// Backends exist for the model but every one of them has weight 0.
    #[error("all backends for model `{model}` are disabled (weight 0)")]
    AllBackendsDisabled { model: String },

    /// Explicit route addressing missed the registry.
    #[error("route `{route}` not found (available: {})", available.join(", "))]
    RouteNotFound { route: String, available: Vec<String> },

    /// Admin operation named a route the registry does not hold.
    #[error("unknown route `{route}`")]
    UnknownRoute { route: String },

    /// Admin operation supplied a weight outside [0, 100].
    #[error("invalid weight {weight}: must be between 0 and 100")]
    InvalidWeight { weight: i64 },

    /// Request arguments failed sanity validation (empty or swapped).
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// The discovery collaborator failed or returned nothing usable.
    #[error("discovery unavailable: {message}")]
    DiscoveryUnavailable {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Persisting a weight to the metadata store failed.
    #[error("failed to persist weight for backend `{backend_id}`: {message}")]
    WeightPersistence {
        backend_id: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend execution collaborator reported a failure.
    #[error("backend execution failed: {message}")]
    BackendExecutionFailed {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Configuration errors detected at runtime.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RouterError {
    /// Whether an upstream caller may retry the request elsewhere.
    ///
    /// Retryable errors describe a transient condition of this instance
    /// (disabled backends, stale discovery, slow backend) rather than a
    /// malformed or unknown request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RouterError::AllBackendsDisabled { .. }
                | RouterError::DiscoveryUnavailable { .. }
                | RouterError::Timeout { .. }
        )
    }

    /// Stable machine-readable code for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            RouterError::NoBackendAvailable { .. } => "no_backend_available",
            RouterError::AllBackendsDisabled { .. } => "all_backends_disabled",
            RouterError::RouteNotFound { .. } => "route_not_found",
            RouterError::UnknownRoute { .. } => "unknown_route",
            RouterError::InvalidWeight { .. } => "invalid_weight",
            RouterError::InvalidRequest { .. } => "invalid_request",
            RouterError::DiscoveryUnavailable { .. } => "discovery_unavailable",
            RouterError::WeightPersistence { .. } => "weight_persistence_failed",
            RouterError::BackendExecutionFailed { .. } => "processing_error",
            RouterError::Timeout { .. } => "timeout",
            RouterError::Config(_) => "config_error",
            RouterError::Internal(_) => "internal_error",
        }
    }

    /// Shorthand for a discovery failure without an underlying source.
    pub fn discovery(message: impl Into<String>) -> Self {
        RouterError::DiscoveryUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for an execution failure without an underlying source.
    pub fn execution(message: impl Into<String>) -> Self {
        RouterError::BackendExecutionFailed {
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_split_matches_taxonomy() {
        assert!(
            RouterError::AllBackendsDisabled {
                model: "gpt-4o".into()
            }
            .is_retryable()
        );
        assert!(RouterError::discovery("down").is_retryable());
        assert!(
            RouterError::Timeout {
                duration: std::time::Duration::from_secs(1)
            }
            .is_retryable()
        );

        assert!(
            !RouterError::NoBackendAvailable {
                model: "x".into(),
                default_model: "gpt-4o".into()
            }
            .is_retryable()
        );
        assert!(
            !RouterError::RouteNotFound {
                route: "x".into(),
                available: vec![]
            }
            .is_retryable()
        );
        assert!(!RouterError::InvalidWeight { weight: 101 }.is_retryable());
        assert!(!RouterError::execution("boom").is_retryable());
    }

    #[test]
    fn route_not_found_lists_available_routes() {
        let err = RouterError::RouteNotFound {
            route: "gpt4o_9".into(),
            available: vec!["gpt4o_1".into(), "gpt4o_2".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("gpt4o_9"));
        assert!(msg.contains("gpt4o_1, gpt4o_2"));
    }

    #[test]
    fn codes_are_snake_case() {
        let errors = [
            RouterError::UnknownRoute { route: "r".into() },
            RouterError::InvalidWeight { weight: -1 },
            RouterError::Config("bad".into()),
            RouterError::Internal("bad".into()),
        ];
        for err in &errors {
            let code = err.code();
            assert!(code.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
