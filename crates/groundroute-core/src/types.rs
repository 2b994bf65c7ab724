// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Value types shared across the routing layer and its collaborators.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::RouterError;

/// Traffic weight of one backend within its model group.
///
/// Always within `[0, 100]`; construction outside that range fails with
/// [`RouterError::InvalidWeight`]. A weight of zero marks a standby backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Weight(u8);

impl Weight {
    /// Upper bound (inclusive).
    pub const MAX: u8 = 100;

    /// Standby: the backend never receives weighted traffic.
    pub const ZERO: Weight = Weight(0);

    /// Full share.
    pub const FULL: Weight = Weight(Self::MAX);

    /// Validate a raw weight value.
    pub fn new(value: i64) -> Result<Self, RouterError> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            // Range checked above, the cast cannot truncate.
            Ok(Weight(value as u8))
        } else {
            Err(RouterError::InvalidWeight { weight: value })
        }
    }

    /// Raw weight value.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Whether the backend takes part in weighted selection.
    pub fn is_active(self) -> bool {
        self.0 > 0
    }
}

impl TryFrom<i64> for Weight {
    type Error = RouterError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Weight::new(value)
    }
}

impl From<Weight> for u8 {
    fn from(weight: Weight) -> Self {
        weight.0
    }
}

impl std::fmt::Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One backend as reported by the discovery collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDescriptor {
    /// Opaque identifier used to address the remote agent.
    pub backend_id: String,
    /// Model served by the backend.
    pub model: String,
    /// Stable external route name, unique within a registry.
    pub route: String,
    /// Slot number within the model, used for naming and display only.
    pub ordinal: u32,
    /// Durable traffic weight.
    pub weight: Weight,
    /// Human-readable agent name.
    pub display_name: String,
}

/// Derive a route name from a model and ordinal.
///
/// Punctuation is dropped from the model so routes stay path-friendly:
/// `gpt-4.1-mini` with ordinal 1 becomes `gpt41mini_1`.
pub fn route_name(model: &str, ordinal: u32) -> String {
    let compact: String = model.chars().filter(|c| *c != '-' && *c != '.').collect();
    format!("{compact}_{ordinal}")
}

/// Kind of source a citation points at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CitationKind {
    Url,
    File,
}

/// A numbered citation attached to a backend reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// One-based position in the reply's citation list.
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: CitationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
}

/// Result returned by the backend execution collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    /// Answer text with inline citation markers removed.
    pub content: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    /// Free-form diagnostics from the backend run.
    #[serde(default)]
    pub debug: serde_json::Value,
}
