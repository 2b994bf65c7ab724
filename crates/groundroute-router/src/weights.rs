// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Administrative weight changes.
//!
//! Validate, persist to the durable metadata store, then update the live
//! handle. A persistence failure leaves the registry untouched.

use std::sync::Arc;

use groundroute_core::{RouterError, Weight, WeightStore};
use serde::Serialize;
use tracing::{info, warn};

use crate::registry::Registry;

/// Result of a successful weight change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightChange {
    pub route: String,
    pub backend_id: String,
    pub model: String,
    pub previous: u8,
    pub weight: u8,
}

/// Applies weight changes to persisted metadata and the live registry.
pub struct WeightAdministrator {
    registry: Arc<Registry>,
    store: Arc<dyn WeightStore>,
}

impl WeightAdministrator {
    pub fn new(registry: Arc<Registry>, store: Arc<dyn WeightStore>) -> Self {
        Self { registry, store }
    }

    /// Set the weight of `route`.
    ///
    /// # Errors
    ///
    /// `InvalidWeight` for values outside `[0, 100]`, `UnknownRoute` when the
    /// registry holds no such route, and `WeightPersistence` when the store
    /// rejects the write.
    pub async fn set_weight(&self, route: &str, weight: i64) -> Result<WeightChange, RouterError> {
        let weight = Weight::new(weight)?;

        let snapshot = self.registry.snapshot();
        let handle = snapshot
            .get(route)
            .cloned()
            .ok_or_else(|| RouterError::UnknownRoute {
                route: route.to_string(),
            })?;
        drop(snapshot);

        if let Err(e) = self.store.set_backend_weight(handle.backend_id(), weight).await {
            warn!(
                route,
                backend_id = handle.backend_id(),
                store = self.store.name(),
                error = %e,
                "weight persistence failed, registry unchanged"
            );
            return Err(match e {
                RouterError::WeightPersistence { .. } => e,
                other => RouterError::WeightPersistence {
                    backend_id: handle.backend_id().to_string(),
                    message: other.to_string(),
                    source: Some(Box::new(other)),
                },
            });
        }

        let previous = handle.weight().get();
        handle.store_weight(weight);
        info!(
            route,
            backend_id = handle.backend_id(),
            previous,
            weight = weight.get(),
            "backend weight updated"
        );

        Ok(WeightChange {
            route: route.to_string(),
            backend_id: handle.backend_id().to_string(),
            model: handle.model().to_string(),
            previous,
            weight: weight.get(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::registry_with;
    use crate::selector::Selector;
    use groundroute_test_utils::MockWeightStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[tokio::test]
    async fn out_of_range_weight_rejected_without_side_effects() {
        let registry = registry_with(&[("gpt-4o", 1, 100)]);
        let store = Arc::new(MockWeightStore::new());
        let admin = WeightAdministrator::new(registry.clone(), store.clone());

        for bad in [101, -1, 1_000] {
            let err = admin.set_weight("gpt4o_1", bad).await.unwrap_err();
            assert!(matches!(err, RouterError::InvalidWeight { weight } if weight == bad));
        }
        assert_eq!(registry.snapshot().get("gpt4o_1").unwrap().weight(), Weight::FULL);
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn unknown_route_rejected() {
        let registry = registry_with(&[("gpt-4o", 1, 100)]);
        let store = Arc::new(MockWeightStore::new());
        let admin = WeightAdministrator::new(registry, store.clone());
        let err = admin.set_weight("gpt4o_9", 10).await.unwrap_err();
        assert!(matches!(err, RouterError::UnknownRoute { ref route } if route == "gpt4o_9"));
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn persistence_failure_leaves_local_weight() {
        let registry = registry_with(&[("gpt-4o", 1, 100)]);
        let store = Arc::new(MockWeightStore::new());
        store.set_failing(true);
        let admin = WeightAdministrator::new(registry.clone(), store);

        let err = admin.set_weight("gpt4o_1", 0).await.unwrap_err();
        assert!(matches!(err, RouterError::WeightPersistence { .. }));
        assert_eq!(registry.snapshot().get("gpt4o_1").unwrap().weight(), Weight::FULL);
    }

    #[tokio::test]
    async fn successful_change_persists_then_applies() {
        let registry = registry_with(&[("gpt-4o", 1, 100), ("gpt-4o", 2, 0)]);
        let store = Arc::new(MockWeightStore::new());
        let admin = WeightAdministrator::new(registry.clone(), store.clone());

        let change = admin.set_weight("gpt4o_2", 10).await.unwrap();
        assert_eq!(change.previous, 0);
        assert_eq!(change.weight, 10);
        assert_eq!(store.writes(), vec![("asst_gpt4o_2".to_string(), 10)]);
        assert_eq!(registry.snapshot().get("gpt4o_2").unwrap().weight().get(), 10);
    }

    #[tokio::test]
    async fn ninety_ten_split_after_weight_change() {
        let registry = registry_with(&[("gpt-4o", 1, 90), ("gpt-4o", 2, 0)]);
        let admin = WeightAdministrator::new(registry.clone(), Arc::new(MockWeightStore::new()));
        admin.set_weight("gpt4o_2", 10).await.unwrap();

        let selector = Selector::with_rng(registry, "gpt-4o".into(), StdRng::seed_from_u64(7));
        let hits = (0..1_000)
            .filter(|_| selector.select("gpt-4o").unwrap() == "gpt4o_2")
            .count();
        assert!((60..=140).contains(&hits), "gpt4o_2 chosen {hits} times");
    }
}
