// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-model and overall health derived from registry state.
//!
//! Pure reads of one snapshot; no backend is contacted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumString};

use crate::registry::{Registry, RegistrySnapshot};

/// Aggregate availability across all models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OverallStatus {
    /// Every model has positive total weight.
    Ok,
    /// Some models are active, some are not.
    Partial,
    /// No model is active, or the registry is empty.
    Inactive,
}

/// Health summary of one model group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelHealth {
    pub model: String,
    /// Handles registered for the model, weight 0 included.
    pub handles: usize,
    /// Handles with weight above 0.
    pub active_handles: usize,
    pub total_weight: u32,
    /// `total_weight > 0`.
    pub active: bool,
}

/// Health of the whole registry at one generation.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub overall: OverallStatus,
    pub generation: u64,
    /// When the reported generation was installed.
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Sorted by model name.
    pub models: Vec<ModelHealth>,
}

/// Derives health reports from the registry.
#[derive(Debug, Clone)]
pub struct HealthAggregator {
    registry: Arc<Registry>,
}

impl HealthAggregator {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Per-model summaries, sorted by model.
    pub fn status(&self) -> Vec<ModelHealth> {
        summarize(&self.registry.snapshot())
    }

    /// Overall status of the current registry.
    pub fn overall(&self) -> OverallStatus {
        overall_of(&self.status())
    }

    /// Health of a single model, `None` when the registry has no handle for it.
    pub fn model(&self, model: &str) -> Option<ModelHealth> {
        let snapshot = self.registry.snapshot();
        let group = snapshot.model_group(model);
        if group.is_empty() {
            return None;
        }
        Some(model_health(model, group.iter().map(|h| h.weight().get())))
    }

    /// Full report computed from one snapshot.
    pub fn report(&self) -> HealthReport {
        let snapshot = self.registry.snapshot();
        let models = summarize(&snapshot);
        HealthReport {
            overall: overall_of(&models),
            generation: snapshot.generation(),
            refreshed_at: snapshot.refreshed_at(),
            models,
        }
    }
}

fn summarize(snapshot: &RegistrySnapshot) -> Vec<ModelHealth> {
    snapshot
        .models()
        .into_iter()
        .map(|model| {
            let weights = snapshot.model_group(model).into_iter().map(|h| h.weight().get());
            model_health(model, weights)
        })
        .collect()
}

fn model_health(model: &str, weights: impl Iterator<Item = u8>) -> ModelHealth {
    let (handles, active_handles, total_weight) =
        weights.fold((0usize, 0usize, 0u32), |(n, active, total), w| {
            (n + 1, active + usize::from(w > 0), total + u32::from(w))
        });
    ModelHealth {
        model: model.to_string(),
        handles,
        active_handles,
        total_weight,
        active: total_weight > 0,
    }
}

/// Overall status of a set of model summaries.
pub fn overall_of(models: &[ModelHealth]) -> OverallStatus {
    let active = models.iter().filter(|m| m.active).count();
    if active == 0 {
        OverallStatus::Inactive
    } else if active == models.len() {
        OverallStatus::Ok
    } else {
        OverallStatus::Partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::registry_with;

    #[test]
    fn one_active_one_disabled_model_is_partial() {
        let health = HealthAggregator::new(registry_with(&[("gpt-4o", 1, 100), ("gpt-4.1-mini", 1, 0)]));
        let status = health.status();
        assert_eq!(status.len(), 2);
        let mini = status.iter().find(|m| m.model == "gpt-4.1-mini").unwrap();
        assert_eq!(mini.total_weight, 0);
        assert!(!mini.active);
        assert_eq!(health.overall(), OverallStatus::Partial);
    }

    #[test]
    fn all_active_is_ok() {
        let health = HealthAggregator::new(registry_with(&[
            ("gpt-4o", 1, 100),
            ("gpt-4o", 2, 0),
            ("gpt-4.1-mini", 1, 40),
        ]));
        let report = health.report();
        assert_eq!(report.overall, OverallStatus::Ok);
        let gpt4o = &report.models[1];
        assert_eq!(gpt4o.model, "gpt-4o");
        assert_eq!(gpt4o.handles, 2);
        assert_eq!(gpt4o.active_handles, 1);
        assert_eq!(gpt4o.total_weight, 100);
    }

    #[test]
    fn empty_registry_is_inactive() {
        let health = HealthAggregator::new(Arc::new(Registry::new()));
        assert!(health.status().is_empty());
        assert_eq!(health.overall(), OverallStatus::Inactive);
        assert_eq!(health.report().generation, 0);
    }

    #[test]
    fn all_disabled_is_inactive() {
        let health = HealthAggregator::new(registry_with(&[("gpt-4o", 1, 0), ("gpt-4", 1, 0)]));
        assert_eq!(health.overall(), OverallStatus::Inactive);
    }

    #[test]
    fn single_model_lookup() {
        let health = HealthAggregator::new(registry_with(&[("gpt-4o", 1, 70), ("gpt-4o", 2, 30)]));
        let gpt4o = health.model("gpt-4o").unwrap();
        assert_eq!(gpt4o.total_weight, 100);
        assert_eq!(gpt4o.active_handles, 2);
        assert!(health.model("gpt-4").is_none());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(OverallStatus::Partial.to_string(), "partial");
        assert_eq!(serde_json::to_string(&OverallStatus::Ok).unwrap(), "\"ok\"");
    }
}
