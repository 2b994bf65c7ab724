// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metadata persistence collaborator for traffic weights.

use async_trait::async_trait;

use crate::error::RouterError;
use crate::traits::adapter::CollaboratorAdapter;
use crate::types::Weight;

/// Durable per-backend weight storage, normally the discovery catalog's
/// own metadata.
#[async_trait]
pub trait WeightStore: CollaboratorAdapter {
    /// Persist a backend's weight. On error nothing is assumed written.
    async fn set_backend_weight(&self, backend_id: &str, weight: Weight)
    -> Result<(), RouterError>;
}
