// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for groundroute tests.
//!
//! Provides mock collaborators and a harness assembling the full routing
//! stack, for fast deterministic tests without a remote agent service.
//!
//! # Components
//!
//! - [`MockDiscovery`] - discovery source with a settable backend list
//! - [`MockExecutor`] - executor whose sessions record every query
//! - [`MockWeightStore`] - weight store that records writes or fails on demand
//! - [`TestHarness`] - seeded [`groundroute_router::RoutingLayer`] over the mocks

pub mod harness;
pub mod mock_discovery;
pub mod mock_executor;
pub mod mock_weights;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_discovery::{MockDiscovery, backend};
pub use mock_executor::{Invocation, MockExecutor};
pub use mock_weights::MockWeightStore;
