// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route registry with lock-free snapshot reads.
//!
//! The registry holds an [`ArcSwap`] over an immutable [`RegistrySnapshot`].
//! A refresh builds a complete new snapshot and swaps it in with one pointer
//! store, so readers see either the previous generation or the next one in
//! full. Only traffic weights change between refreshes, through an atomic
//! on each [`BackendHandle`].

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use groundroute_core::{BackendDescriptor, BackendSession, Weight};
use serde::Serialize;
use tracing::warn;

/// One remote agent instance: fixed identity, mutable weight, and the
/// execution context used to invoke it.
pub struct BackendHandle {
    route: String,
    backend_id: String,
    model: String,
    ordinal: u32,
    display_name: String,
    weight: AtomicU8,
    session: Box<dyn BackendSession>,
}

impl BackendHandle {
    /// Build a handle from discovery data and its freshly opened session.
    pub fn new(descriptor: BackendDescriptor, session: Box<dyn BackendSession>) -> Self {
        Self {
            route: descriptor.route,
            backend_id: descriptor.backend_id,
            model: descriptor.model,
            ordinal: descriptor.ordinal,
            display_name: descriptor.display_name,
            weight: AtomicU8::new(descriptor.weight.get()),
            session,
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn backend_id(&self) -> &str {
        &self.backend_id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Current traffic weight.
    pub fn weight(&self) -> Weight {
        // Only validated weights are ever stored.
        Weight::new(i64::from(self.weight.load(Ordering::Acquire))).unwrap_or(Weight::ZERO)
    }

    /// Whether the handle takes part in weighted selection.
    pub fn is_active(&self) -> bool {
        self.weight().is_active()
    }

    /// Execution context owned by this handle.
    pub fn session(&self) -> &dyn BackendSession {
        self.session.as_ref()
    }

    pub(crate) fn store_weight(&self, weight: Weight) {
        self.weight.store(weight.get(), Ordering::Release);
    }

    /// Serializable view of this handle.
    pub fn entry(&self) -> RouteEntry {
        RouteEntry {
            route: self.route.clone(),
            model: self.model.clone(),
            ordinal: self.ordinal,
            weight: self.weight().get(),
            backend_id: self.backend_id.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

impl std::fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendHandle")
            .field("route", &self.route)
            .field("backend_id", &self.backend_id)
            .field("model", &self.model)
            .field("ordinal", &self.ordinal)
            .field("weight", &self.weight())
            .finish_non_exhaustive()
    }
}

/// Route table row as reported by listing and refresh endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub route: String,
    pub model: String,
    pub ordinal: u32,
    pub weight: u8,
    pub backend_id: String,
    pub display_name: String,
}

/// One immutable generation of the registry.
#[derive(Debug, Default)]
pub struct RegistrySnapshot {
    routes: HashMap<String, Arc<BackendHandle>>,
    generation: u64,
    refreshed_at: Option<DateTime<Utc>>,
}

impl RegistrySnapshot {
    /// Look up a handle by route.
    pub fn get(&self, route: &str) -> Option<&Arc<BackendHandle>> {
        self.routes.get(route)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Monotonic generation counter; 0 until the first successful refresh.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When this generation was installed.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// All route names, sorted.
    pub fn route_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.routes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Distinct model names, sorted.
    pub fn models(&self) -> BTreeSet<&str> {
        self.routes.values().map(|h| h.model()).collect()
    }

    /// Every handle serving `model`, weight 0 included, in ordinal order.
    pub fn model_group(&self, model: &str) -> Vec<&Arc<BackendHandle>> {
        let mut group: Vec<&Arc<BackendHandle>> =
            self.routes.values().filter(|h| h.model() == model).collect();
        group.sort_by(|a, b| a.ordinal().cmp(&b.ordinal()).then_with(|| a.route().cmp(b.route())));
        group
    }

    /// Route table sorted by model then ordinal.
    pub fn entries(&self) -> Vec<RouteEntry> {
        let mut entries: Vec<RouteEntry> = self.routes.values().map(|h| h.entry()).collect();
        entries.sort_by(|a, b| {
            a.model
                .cmp(&b.model)
                .then(a.ordinal.cmp(&b.ordinal))
                .then_with(|| a.route.cmp(&b.route))
        });
        entries
    }
}

/// The authoritative route table.
///
/// Owned explicitly and shared through `Arc`; every test can build its own.
#[derive(Debug)]
pub struct Registry {
    current: ArcSwap<RegistrySnapshot>,
}

impl Registry {
    /// An empty registry at generation 0.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(RegistrySnapshot::default()),
        }
    }

    /// Capture the current generation. Callers hold the returned `Arc` for
    /// the whole of one operation.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.current.load_full()
    }

    /// Swap in a new generation built from `handles`.
    ///
    /// Duplicate routes keep the first handle. Callers must serialize
    /// installs; the refresh controller does so with its own lock.
    pub(crate) fn install(&self, handles: Vec<BackendHandle>) -> u64 {
        let mut routes = HashMap::with_capacity(handles.len());
        for handle in handles {
            if routes.contains_key(handle.route()) {
                warn!(route = handle.route(), backend_id = handle.backend_id(), "duplicate route ignored");
                continue;
            }
            routes.insert(handle.route().to_string(), Arc::new(handle));
        }

        let generation = self.current.load().generation + 1;
        self.current.store(Arc::new(RegistrySnapshot {
            routes,
            generation,
            refreshed_at: Some(Utc::now()),
        }));
        generation
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
