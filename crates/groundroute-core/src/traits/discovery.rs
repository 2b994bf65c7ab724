// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery collaborator: the external source of backend identities.

use async_trait::async_trait;

use crate::error::RouterError;
use crate::traits::adapter::CollaboratorAdapter;
use crate::types::BackendDescriptor;

/// Lists the backends currently configured in the external catalog.
///
/// An empty list is a valid answer; the refresh controller treats it as a
/// soft failure and keeps the previous registry.
#[async_trait]
pub trait DiscoverySource: CollaboratorAdapter {
    /// Fetch the full current backend set.
    async fn list_backends(&self) -> Result<Vec<BackendDescriptor>, RouterError>;
}
