// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock weight metadata store.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use groundroute_core::{CollaboratorAdapter, RouterError, Weight, WeightStore};

/// Records persisted weights; can be switched to fail.
#[derive(Default)]
pub struct MockWeightStore {
    writes: Mutex<Vec<(String, u8)>>,
    failing: AtomicBool,
}

impl MockWeightStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Successful writes as `(backend_id, weight)`, in order.
    pub fn writes(&self) -> Vec<(String, u8)> {
        self.writes.lock().unwrap().clone()
    }
}

impl CollaboratorAdapter for MockWeightStore {
    fn name(&self) -> &str {
        "mock-weight-store"
    }
}

#[async_trait]
impl WeightStore for MockWeightStore {
    async fn set_backend_weight(&self, backend_id: &str, weight: Weight) -> Result<(), RouterError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RouterError::WeightPersistence {
                backend_id: backend_id.to_string(),
                message: "metadata store unavailable".to_string(),
                source: None,
            });
        }
        self.writes
            .lock()
            .unwrap()
            .push((backend_id.to_string(), weight.get()));
        Ok(())
    }
}
