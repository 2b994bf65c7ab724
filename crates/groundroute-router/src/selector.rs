// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weighted random backend selection.
//!
//! Per request: take the model group's active handles, draw an integer in
//! `[1, total_weight]`, and walk the group accumulating weights until the
//! running sum reaches the draw. Stateless between calls; the RNG is the
//! only shared state and is injectable for deterministic tests.

use std::sync::{Arc, Mutex};

use groundroute_config::model::RoutingConfig;
use groundroute_core::RouterError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::registry::{BackendHandle, Registry, RegistrySnapshot};

/// Pick an index from `weights` with probability proportional to weight.
///
/// `draw` must lie in `[1, sum(weights)]`. Returns the first index whose
/// cumulative weight reaches the draw; zero weights can never be chosen.
pub fn weighted_pick(weights: &[u32], draw: u32) -> Option<usize> {
    let mut cumulative = 0u32;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if *weight > 0 && cumulative >= draw {
            return Some(index);
        }
    }
    None
}

/// Result of one selection.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Chosen handle, kept alive independent of later registry swaps.
    pub handle: Arc<BackendHandle>,
    /// Model the caller asked for.
    pub requested_model: String,
    /// Whether the default model was substituted for an unknown one.
    pub fallback: bool,
}

/// Chooses a backend for a model from the current registry snapshot.
pub struct Selector {
    registry: Arc<Registry>,
    default_model: String,
    rng: Mutex<StdRng>,
}

impl Selector {
    /// Build a selector from routing config; `rng_seed` fixes the RNG.
    pub fn new(registry: Arc<Registry>, config: &RoutingConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(registry, config.default_model.clone(), rng)
    }

    /// Build a selector with an explicit random source.
    pub fn with_rng(registry: Arc<Registry>, default_model: String, rng: StdRng) -> Self {
        Self {
            registry,
            default_model,
            rng: Mutex::new(rng),
        }
    }

    /// Model substituted for requests naming a model with no backends.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Select a route for `model`.
    pub fn select(&self, model: &str) -> Result<String, RouterError> {
        self.select_handle(model)
            .map(|selection| selection.handle.route().to_string())
    }

    /// Select a handle for `model`, falling back to the default model when
    /// `model` has no backends at all.
    ///
    /// # Errors
    ///
    /// - `AllBackendsDisabled` when the requested model has backends but all
    ///   of them carry weight 0.
    /// - `NoBackendAvailable` when the model has no backend and the default
    ///   model has no active one.
    pub fn select_handle(&self, model: &str) -> Result<Selection, RouterError> {
        let snapshot = self.registry.snapshot();

        if !snapshot.model_group(model).is_empty() {
            let handle = self.pick_from_group(&snapshot, model)?;
            return Ok(Selection {
                handle,
                requested_model: model.to_string(),
                fallback: false,
            });
        }

        let default_model = self.default_model.as_str();
        if model == default_model || snapshot.model_group(default_model).is_empty() {
            return Err(RouterError::NoBackendAvailable {
                model: model.to_string(),
                default_model: default_model.to_string(),
            });
        }

        debug!(
            requested = model,
            fallback = default_model,
            "model has no backends, using default model"
        );
        let handle = self
            .pick_from_group(&snapshot, default_model)
            .map_err(|e| match e {
                RouterError::AllBackendsDisabled { .. } => RouterError::NoBackendAvailable {
                    model: model.to_string(),
                    default_model: default_model.to_string(),
                },
                other => other,
            })?;
        Ok(Selection {
            handle,
            requested_model: model.to_string(),
            fallback: true,
        })
    }

    /// Weighted pick within one non-empty model group.
    fn pick_from_group(
        &self,
        snapshot: &RegistrySnapshot,
        model: &str,
    ) -> Result<Arc<BackendHandle>, RouterError> {
        let group = snapshot.model_group(model);
        let active: Vec<(&Arc<BackendHandle>, u32)> = group
            .into_iter()
            .map(|h| (h, u32::from(h.weight().get())))
            .filter(|(_, w)| *w > 0)
            .collect();

        let chosen = match active.as_slice() {
            [] => {
                return Err(RouterError::AllBackendsDisabled {
                    model: model.to_string(),
                });
            }
            [(only, _)] => Arc::clone(only),
            _ => {
                let weights: Vec<u32> = active.iter().map(|(_, w)| *w).collect();
                let total: u32 = weights.iter().sum();
                let draw = self.draw(total);
                let index = weighted_pick(&weights, draw).ok_or_else(|| {
                    RouterError::Internal(format!("draw {draw} outside total weight {total}"))
                })?;
                Arc::clone(active[index].0)
            }
        };

        debug!(
            model,
            route = chosen.route(),
            weight = chosen.weight().get(),
            "backend selected"
        );
        Ok(chosen)
    }

    fn draw(&self, total: u32) -> u32 {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rng.gen_range(1..=total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::registry_with;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn selector(registry: Arc<Registry>) -> Selector {
        Selector::with_rng(registry, "gpt-4o".into(), StdRng::seed_from_u64(42))
    }

    fn share(selector: &Selector, model: &str, runs: usize) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for _ in 0..runs {
            *counts.entry(selector.select(model).unwrap()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn weighted_pick_walks_cumulative_sum() {
        let weights = [50, 0, 50];
        assert_eq!(weighted_pick(&weights, 1), Some(0));
        assert_eq!(weighted_pick(&weights, 50), Some(0));
        assert_eq!(weighted_pick(&weights, 51), Some(2));
        assert_eq!(weighted_pick(&weights, 100), Some(2));
        assert_eq!(weighted_pick(&weights, 101), None);
    }

    #[test]
    fn full_and_standby_always_picks_full() {
        let sel = selector(registry_with(&[("gpt-4o", 1, 100), ("gpt-4o", 2, 0)]));
        for _ in 0..1_000 {
            assert_eq!(sel.select("gpt-4o").unwrap(), "gpt4o_1");
        }
    }

    #[test]
    fn even_split_converges() {
        let sel = selector(registry_with(&[("gpt-4o", 1, 50), ("gpt-4o", 2, 50)]));
        let counts = share(&sel, "gpt-4o", 10_000);
        for route in ["gpt4o_1", "gpt4o_2"] {
            let n = counts.get(route).copied().unwrap_or(0);
            assert!((4_800..=5_200).contains(&n), "{route} chosen {n} times");
        }
    }

    #[test]
    fn single_disabled_backend_is_all_disabled() {
        let sel = selector(registry_with(&[("gpt-4o", 1, 0)]));
        let err = sel.select("gpt-4o").unwrap_err();
        assert!(matches!(err, RouterError::AllBackendsDisabled { ref model } if model == "gpt-4o"));
        assert!(err.is_retryable());
    }

    #[test]
    fn single_active_backend_skips_rng() {
        let registry = registry_with(&[("gpt-4o", 1, 1), ("gpt-4o", 2, 0)]);
        let sel = selector(registry);
        let before = sel.rng.lock().unwrap().clone();
        sel.select("gpt-4o").unwrap();
        let after = sel.rng.lock().unwrap().clone();
        let (mut a, mut b) = (before, after);
        assert_eq!(a.r#gen::<u64>(), b.r#gen::<u64>());
    }

    #[test]
    fn unknown_model_falls_back_to_default() {
        let sel = selector(registry_with(&[("gpt-4o", 1, 100)]));
        let selection = sel.select_handle("gpt-5").unwrap();
        assert_eq!(selection.handle.route(), "gpt4o_1");
        assert!(selection.fallback);
        assert_eq!(selection.requested_model, "gpt-5");
    }

    #[test]
    fn unknown_model_without_default_backends_fails() {
        let sel = selector(registry_with(&[("gpt-4.1-mini", 1, 100)]));
        let err = sel.select("gpt-5").unwrap_err();
        assert!(matches!(err, RouterError::NoBackendAvailable { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn fallback_to_disabled_default_has_no_backend() {
        let sel = selector(registry_with(&[("gpt-4o", 1, 0)]));
        let err = sel.select("gpt-5").unwrap_err();
        assert!(matches!(
            err,
            RouterError::NoBackendAvailable { ref model, ref default_model }
                if model == "gpt-5" && default_model == "gpt-4o"
        ));
    }

    #[test]
    fn empty_registry_has_no_backend() {
        let sel = selector(Arc::new(Registry::new()));
        assert!(matches!(
            sel.select("gpt-4o"),
            Err(RouterError::NoBackendAvailable { .. })
        ));
    }

    #[test]
    fn disabled_requested_model_does_not_fall_back() {
        let sel = selector(registry_with(&[("gpt-4o", 1, 100), ("gpt-4.1-mini", 1, 0)]));
        assert!(matches!(
            sel.select("gpt-4.1-mini"),
            Err(RouterError::AllBackendsDisabled { .. })
        ));
    }

    #[test]
    fn seeded_selectors_agree() {
        let rows = [("gpt-4o", 1, 30), ("gpt-4o", 2, 30), ("gpt-4o", 3, 40)];
        let a = selector(registry_with(&rows));
        let b = selector(registry_with(&rows));
        for _ in 0..200 {
            assert_eq!(a.select("gpt-4o").unwrap(), b.select("gpt-4o").unwrap());
        }
    }

    proptest! {
        #[test]
        fn zero_weight_never_chosen(weights in proptest::collection::vec(0u32..=100, 1..8), seed in any::<u64>()) {
            let total: u32 = weights.iter().sum();
            prop_assume!(total > 0);
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..50 {
                let draw = rng.gen_range(1..=total);
                let index = weighted_pick(&weights, draw).unwrap();
                prop_assert!(weights[index] > 0);
            }
        }

        #[test]
        fn every_draw_in_range_resolves(weights in proptest::collection::vec(0u32..=100, 1..8)) {
            let total: u32 = weights.iter().sum();
            prop_assume!(total > 0);
            for draw in 1..=total {
                prop_assert!(weighted_pick(&weights, draw).is_some());
            }
        }

        #[test]
        fn selection_share_tracks_weight(w1 in 1u8..=100, w2 in 1u8..=100, seed in any::<u64>()) {
            let registry = registry_with(&[("gpt-4o", 1, w1), ("gpt-4o", 2, w2)]);
            let sel = Selector::with_rng(registry, "gpt-4o".into(), StdRng::seed_from_u64(seed));
            let runs = 4_000usize;
            let hits = (0..runs).filter(|_| sel.select("gpt-4o").unwrap() == "gpt4o_1").count();
            let expected = f64::from(w1) / f64::from(u32::from(w1) + u32::from(w2));
            let observed = hits as f64 / runs as f64;
            prop_assert!((observed - expected).abs() < 0.05, "expected {expected}, observed {observed}");
        }
    }
}
