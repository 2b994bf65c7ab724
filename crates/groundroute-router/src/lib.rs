// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing and weighting layer for groundroute.
//!
//! This crate provides:
//! - [`Registry`]: the route table, swapped atomically on refresh
//! - [`RefreshController`]: rebuilds the registry from discovery
//! - [`Selector`]: weighted random selection within a model group
//! - [`HealthAggregator`]: per-model and overall status
//! - [`WeightAdministrator`]: persisted weight changes
//! - [`Dispatcher`]: validates, resolves and invokes one query
//!
//! [`RoutingLayer`] wires them together around one shared registry.

pub mod dispatcher;
pub mod health;
pub mod refresh;
pub mod registry;
pub mod selector;
pub mod validation;
pub mod weights;

use std::sync::Arc;
use std::time::Duration;

use groundroute_config::GroundrouteConfig;
use groundroute_core::{BackendExecutor, DiscoverySource, WeightStore};

pub use dispatcher::{DispatchError, Dispatcher, RoutedReply, RoutingMetadata, Target};
pub use health::{HealthAggregator, HealthReport, ModelHealth, OverallStatus};
pub use refresh::{RefreshController, RefreshReport, spawn_refresh_task};
pub use registry::{BackendHandle, Registry, RegistrySnapshot, RouteEntry};
pub use selector::{Selection, Selector, weighted_pick};
pub use validation::RequestValidator;
pub use weights::{WeightAdministrator, WeightChange};

/// External collaborators the routing layer consumes.
#[derive(Clone)]
pub struct Collaborators {
    pub discovery: Arc<dyn DiscoverySource>,
    pub executor: Arc<dyn BackendExecutor>,
    pub weights: Arc<dyn WeightStore>,
}

/// Every routing component, sharing one registry.
#[derive(Clone)]
pub struct RoutingLayer {
    pub registry: Arc<Registry>,
    pub refresh: Arc<RefreshController>,
    pub selector: Arc<Selector>,
    pub health: HealthAggregator,
    pub weights: Arc<WeightAdministrator>,
    pub dispatcher: Arc<Dispatcher>,
}

impl RoutingLayer {
    /// Build the layer from configuration, seeding the RNG from
    /// `routing.rng_seed` when set.
    pub fn new(config: &GroundrouteConfig, collaborators: Collaborators) -> Self {
        let registry = Arc::new(Registry::new());
        let selector = Arc::new(Selector::new(registry.clone(), &config.routing));
        Self::assemble(config, collaborators, registry, selector)
    }

    /// Build the layer around an explicitly constructed selector.
    pub fn with_selector(
        config: &GroundrouteConfig,
        collaborators: Collaborators,
        registry: Arc<Registry>,
        selector: Arc<Selector>,
    ) -> Self {
        Self::assemble(config, collaborators, registry, selector)
    }

    fn assemble(
        config: &GroundrouteConfig,
        collaborators: Collaborators,
        registry: Arc<Registry>,
        selector: Arc<Selector>,
    ) -> Self {
        let refresh = Arc::new(RefreshController::new(
            collaborators.discovery,
            collaborators.executor,
            registry.clone(),
        ));
        let weights = Arc::new(WeightAdministrator::new(
            registry.clone(),
            collaborators.weights,
        ));
        let dispatcher = Arc::new(Dispatcher::new(
            registry.clone(),
            selector.clone(),
            RequestValidator::new(config.routing.known_models.iter().cloned()),
            config.service.region.clone(),
            Duration::from_secs(config.dispatch.timeout_secs),
        ));

        Self {
            health: HealthAggregator::new(registry.clone()),
            registry,
            refresh,
            selector,
            weights,
            dispatcher,
        }
    }
}
