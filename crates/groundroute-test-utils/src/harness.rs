// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end routing tests.
//!
//! `TestHarness` assembles a complete [`RoutingLayer`] over mock
//! collaborators with a seeded selection RNG, and performs the startup
//! refresh when backends were configured.

use std::sync::Arc;
use std::time::Duration;

use groundroute_config::GroundrouteConfig;
use groundroute_core::{BackendDescriptor, RouterError};
use groundroute_router::{Collaborators, DispatchError, Registry, RoutedReply, RoutingLayer, Selector};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::mock_discovery::MockDiscovery;
use crate::mock_executor::MockExecutor;
use crate::mock_weights::MockWeightStore;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    backends: Vec<BackendDescriptor>,
    seed: u64,
    config: GroundrouteConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = GroundrouteConfig::default();
        config.service.region = "test-region".to_string();
        Self {
            backends: Vec::new(),
            seed: 42,
            config,
        }
    }

    /// Backends reported by the mock discovery source.
    pub fn with_backends(mut self, backends: Vec<BackendDescriptor>) -> Self {
        self.backends = backends;
        self
    }

    /// Seed for the selection RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fallback model for unknown model requests.
    pub fn with_default_model(mut self, model: &str) -> Self {
        self.config.routing.default_model = model.to_string();
        self
    }

    /// Per-invocation dispatch timeout.
    pub fn with_dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.config.dispatch.timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: GroundrouteConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the harness. Runs one refresh if any backends were configured.
    pub async fn build(self) -> Result<TestHarness, RouterError> {
        let startup_refresh = !self.backends.is_empty();
        let discovery = Arc::new(MockDiscovery::with_backends(self.backends));
        let executor = Arc::new(MockExecutor::new());
        let weight_store = Arc::new(MockWeightStore::new());

        let registry = Arc::new(Registry::new());
        let selector = Arc::new(Selector::with_rng(
            registry.clone(),
            self.config.routing.default_model.clone(),
            StdRng::seed_from_u64(self.seed),
        ));
        let layer = RoutingLayer::with_selector(
            &self.config,
            Collaborators {
                discovery: discovery.clone(),
                executor: executor.clone(),
                weights: weight_store.clone(),
            },
            registry,
            selector,
        );

        let harness = TestHarness {
            discovery,
            executor,
            weight_store,
            layer,
            config: self.config,
        };
        if startup_refresh {
            harness.layer.refresh.refresh().await?;
        }
        Ok(harness)
    }
}

/// A complete routing stack over mock collaborators.
pub struct TestHarness {
    pub discovery: Arc<MockDiscovery>,
    pub executor: Arc<MockExecutor>,
    pub weight_store: Arc<MockWeightStore>,
    pub layer: RoutingLayer,
    pub config: GroundrouteConfig,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Query by model through the dispatcher.
    pub async fn query(&self, model: &str, query: &str) -> Result<RoutedReply, DispatchError> {
        self.layer.dispatcher.query_model(model, query).await
    }

    /// Route names currently in the registry.
    pub fn routes(&self) -> Vec<String> {
        self.layer.registry.snapshot().route_names()
    }
}
