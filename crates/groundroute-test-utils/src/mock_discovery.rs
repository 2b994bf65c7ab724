// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock discovery source with a settable backend list.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use groundroute_core::{
    BackendDescriptor, CollaboratorAdapter, DiscoverySource, RouterError, Weight, route_name,
};

/// Build a descriptor following the usual naming conventions.
///
/// Panics if `weight` is above 100; intended for test fixtures only.
pub fn backend(model: &str, ordinal: u32, weight: u8) -> BackendDescriptor {
    let route = route_name(model, ordinal);
    let compact: String = model.chars().filter(|c| *c != '-' && *c != '.').collect();
    BackendDescriptor {
        backend_id: format!("asst_{route}"),
        model: model.to_string(),
        display_name: format!("agent_bing__{compact}__{ordinal}"),
        route,
        ordinal,
        weight: Weight::new(i64::from(weight)).expect("fixture weight must be within 0..=100"),
    }
}

/// A discovery source returning whatever the test last configured.
pub struct MockDiscovery {
    backends: Mutex<Vec<BackendDescriptor>>,
    failure: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl MockDiscovery {
    /// A source that reports no backends.
    pub fn new() -> Self {
        Self::with_backends(Vec::new())
    }

    pub fn with_backends(backends: Vec<BackendDescriptor>) -> Self {
        Self {
            backends: Mutex::new(backends),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Replace the reported backend list.
    pub fn set_backends(&self, backends: Vec<BackendDescriptor>) {
        *self.backends.lock().unwrap() = backends;
    }

    /// Make every subsequent call fail with `message`.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    /// Clear a failure set by [`fail_with`](Self::fail_with).
    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Number of `list_backends` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl CollaboratorAdapter for MockDiscovery {
    fn name(&self) -> &str {
        "mock-discovery"
    }
}

#[async_trait]
impl DiscoverySource for MockDiscovery {
    async fn list_backends(&self) -> Result<Vec<BackendDescriptor>, RouterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(RouterError::discovery(message));
        }
        Ok(self.backends.lock().unwrap().clone())
    }
}
