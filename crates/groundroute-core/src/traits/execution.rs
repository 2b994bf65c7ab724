// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend execution collaborator.

use async_trait::async_trait;

use crate::error::RouterError;
use crate::traits::adapter::CollaboratorAdapter;
use crate::types::{AgentReply, BackendDescriptor};

/// Builds execution contexts for discovered backends.
///
/// Called once per backend on every refresh; the returned session is owned
/// by exactly one registry handle and dropped with it.
pub trait BackendExecutor: CollaboratorAdapter {
    /// Create the execution context for one backend.
    fn open_session(
        &self,
        backend: &BackendDescriptor,
    ) -> Result<Box<dyn BackendSession>, RouterError>;
}

/// Execution context for a single remote agent.
#[async_trait]
pub trait BackendSession: Send + Sync {
    /// Run one query against the backend.
    ///
    /// May take as long as the remote run takes; callers impose their own
    /// timeout.
    async fn invoke(&self, query: &str) -> Result<AgentReply, RouterError>;
}
