// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weight persistence in agent metadata.

use std::collections::HashMap;

use async_trait::async_trait;
use groundroute_core::{CollaboratorAdapter, RouterError, Weight, WeightStore};
use serde_json::Value;
use tracing::debug;

use crate::client::FoundryClient;
use crate::discovery::WEIGHT_METADATA_KEY;
use crate::types::MetadataUpdate;

/// Writes weights back to the `weight` metadata entry of each agent, where
/// discovery reads them on the next refresh.
pub struct FoundryWeightStore {
    client: FoundryClient,
}

impl FoundryWeightStore {
    pub fn new(client: FoundryClient) -> Self {
        Self { client }
    }
}

impl CollaboratorAdapter for FoundryWeightStore {
    fn name(&self) -> &str {
        "foundry-weights"
    }
}

#[async_trait]
impl WeightStore for FoundryWeightStore {
    async fn set_backend_weight(&self, backend_id: &str, weight: Weight) -> Result<(), RouterError> {
        let body = MetadataUpdate {
            metadata: HashMap::from([(WEIGHT_METADATA_KEY.to_string(), weight.get().to_string())]),
        };
        let _: Value = self
            .client
            .post(&format!("assistants/{backend_id}"), &body)
            .await
            .map_err(|e| RouterError::WeightPersistence {
                backend_id: backend_id.to_string(),
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;
        debug!(backend_id, weight = weight.get(), "weight metadata written");
        Ok(())
    }
}
