// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by every external collaborator.

/// Identity common to all collaborator adapters.
///
/// The name shows up in log lines and status output so operators can tell
/// which concrete adapter (HTTP client, mock, ...) is wired in.
pub trait CollaboratorAdapter: Send + Sync + 'static {
    /// Human-readable adapter name.
    fn name(&self) -> &str;
}
