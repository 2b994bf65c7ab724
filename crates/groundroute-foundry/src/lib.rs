// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent project service collaborators for groundroute.
//!
//! Implements the three collaborator traits against the project's REST API:
//! - [`FoundryDiscovery`] lists agents and derives backend descriptors
//! - [`FoundryExecutor`] answers queries through thread runs
//! - [`FoundryWeightStore`] persists weights in agent metadata
//!
//! [`collaborators`] builds all three from configuration.

pub mod client;
pub mod discovery;
pub mod execution;
pub mod types;
pub mod weights;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use groundroute_config::GroundrouteConfig;
use groundroute_core::{
    BackendDescriptor, BackendExecutor, BackendSession, CollaboratorAdapter, DiscoverySource,
    RouterError, Weight, WeightStore,
};
use groundroute_router::Collaborators;
use tracing::{info, warn};

pub use client::{ClientError, FoundryClient};
pub use discovery::{AgentNamePattern, FoundryDiscovery, descriptors_from_agents};
pub use execution::{FoundryExecutor, FoundrySession, citations_from, strip_citation_markers};
pub use weights::FoundryWeightStore;

const NOT_CONFIGURED: &str = "discovery.endpoint not configured";

/// Build the collaborators described by `config`.
///
/// Without `discovery.endpoint` the service still starts: discovery reports
/// itself unavailable, so the registry stays empty and status is inactive.
pub fn collaborators(config: &GroundrouteConfig) -> Result<Collaborators, RouterError> {
    let Some(client) = FoundryClient::from_config(&config.discovery)? else {
        warn!("{NOT_CONFIGURED}, starting with an empty registry");
        return Ok(Collaborators {
            discovery: Arc::new(Unconfigured),
            executor: Arc::new(Unconfigured),
            weights: Arc::new(Unconfigured),
        });
    };

    let pattern = AgentNamePattern::new(&config.discovery.agent_prefix)?;
    let default_weight = Weight::new(i64::from(config.discovery.default_weight))?;
    info!(endpoint = client.base_url(), "agent service collaborators configured");

    Ok(Collaborators {
        discovery: Arc::new(FoundryDiscovery::new(client.clone(), pattern, default_weight)),
        executor: Arc::new(FoundryExecutor::new(
            client.clone(),
            Duration::from_millis(config.dispatch.poll_interval_ms),
        )),
        weights: Arc::new(FoundryWeightStore::new(client)),
    })
}

/// Stand-in for every collaborator when no endpoint is configured.
struct Unconfigured;

impl CollaboratorAdapter for Unconfigured {
    fn name(&self) -> &str {
        "unconfigured"
    }
}

#[async_trait]
impl DiscoverySource for Unconfigured {
    async fn list_backends(&self) -> Result<Vec<BackendDescriptor>, RouterError> {
        Err(RouterError::discovery(NOT_CONFIGURED))
    }
}

impl BackendExecutor for Unconfigured {
    fn open_session(
        &self,
        _backend: &BackendDescriptor,
    ) -> Result<Box<dyn BackendSession>, RouterError> {
        Err(RouterError::execution(NOT_CONFIGURED))
    }
}

#[async_trait]
impl WeightStore for Unconfigured {
    async fn set_backend_weight(&self, backend_id: &str, _weight: Weight) -> Result<(), RouterError> {
        Err(RouterError::WeightPersistence {
            backend_id: backend_id.to_string(),
            message: NOT_CONFIGURED.to_string(),
            source: None,
        })
    }
}
