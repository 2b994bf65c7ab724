// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! All collaborators extend [`CollaboratorAdapter`] and use `#[async_trait]`
//! for dynamic dispatch compatibility.

pub mod adapter;
pub mod discovery;
pub mod execution;
pub mod weights;

pub use adapter::CollaboratorAdapter;
pub use discovery::DiscoverySource;
pub use execution::{BackendExecutor, BackendSession};
pub use weights::WeightStore;
