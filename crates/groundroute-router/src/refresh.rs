// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry refresh from the discovery collaborator.
//!
//! A refresh lists every backend, opens a fresh execution context per
//! backend, and installs the result as a new registry generation. Refreshes
//! are serialized: a trigger that arrives while one is running waits for it
//! and then runs its own.

use std::sync::Arc;
use std::time::Duration;

use groundroute_core::{BackendExecutor, DiscoverySource, RouterError};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::registry::{BackendHandle, Registry, RouteEntry};

/// Outcome of a successful refresh.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    /// Generation now installed.
    pub generation: u64,
    /// Route table of the new generation.
    pub routes: Vec<RouteEntry>,
    /// Routes discovery reported that could not be opened.
    pub skipped: Vec<String>,
}

/// Rebuilds the registry from discovery.
pub struct RefreshController {
    discovery: Arc<dyn DiscoverySource>,
    executor: Arc<dyn BackendExecutor>,
    registry: Arc<Registry>,
    in_progress: tokio::sync::Mutex<()>,
}

impl RefreshController {
    pub fn new(
        discovery: Arc<dyn DiscoverySource>,
        executor: Arc<dyn BackendExecutor>,
        registry: Arc<Registry>,
    ) -> Self {
        Self {
            discovery,
            executor,
            registry,
            in_progress: tokio::sync::Mutex::new(()),
        }
    }

    /// The registry this controller writes to.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Run one refresh cycle.
    ///
    /// Returns `DiscoveryUnavailable` when discovery fails, reports no
    /// backends, or none of the reported backends could be opened. In every
    /// failure case the current registry stays installed.
    pub async fn refresh(&self) -> Result<RefreshReport, RouterError> {
        let _guard = self.in_progress.lock().await;

        let descriptors = self.discovery.list_backends().await.map_err(|e| {
            warn!(
                discovery = self.discovery.name(),
                error = %e,
                "discovery failed, keeping current registry"
            );
            match e {
                RouterError::DiscoveryUnavailable { .. } => e,
                other => RouterError::DiscoveryUnavailable {
                    message: other.to_string(),
                    source: Some(Box::new(other)),
                },
            }
        })?;

        if descriptors.is_empty() {
            warn!(
                discovery = self.discovery.name(),
                "discovery returned no backends, keeping current registry"
            );
            return Err(RouterError::discovery("discovery returned no backends"));
        }

        let mut handles = Vec::with_capacity(descriptors.len());
        let mut skipped = Vec::new();
        for descriptor in descriptors {
            match self.executor.open_session(&descriptor) {
                Ok(session) => {
                    debug!(
                        route = %descriptor.route,
                        model = %descriptor.model,
                        weight = descriptor.weight.get(),
                        "backend registered"
                    );
                    handles.push(BackendHandle::new(descriptor, session));
                }
                Err(e) => {
                    warn!(
                        route = %descriptor.route,
                        backend_id = %descriptor.backend_id,
                        error = %e,
                        "skipping backend without execution context"
                    );
                    skipped.push(descriptor.route);
                }
            }
        }

        if handles.is_empty() {
            warn!(
                skipped = skipped.len(),
                "no backend could be opened, keeping current registry"
            );
            return Err(RouterError::discovery(format!(
                "none of {} discovered backends could be opened",
                skipped.len()
            )));
        }

        let generation = self.registry.install(handles);
        let snapshot = self.registry.snapshot();
        info!(
            generation,
            routes = snapshot.len(),
            skipped = skipped.len(),
            "registry refreshed"
        );

        Ok(RefreshReport {
            generation,
            routes: snapshot.entries(),
            skipped,
        })
    }
}

/// Spawn the periodic refresh loop.
///
/// The first tick is skipped since the caller performs the startup refresh
/// itself. Failures are logged and never end the loop; cancellation does.
pub fn spawn_refresh_task(
    controller: Arc<RefreshController>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // Skip the first immediate tick.
        ticker.tick().await;

        info!(interval_secs = interval.as_secs(), "refresh task started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = controller.refresh().await {
                        debug!(error = %e, "periodic refresh failed (non-fatal)");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("refresh task shutting down");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundroute_core::{BackendDescriptor, Weight, route_name};
    use groundroute_test_utils::{MockDiscovery, MockExecutor};
    use tracing_test::traced_test;

    fn descriptor(model: &str, ordinal: u32, weight: u8) -> BackendDescriptor {
        BackendDescriptor {
            backend_id: format!("asst_{}", route_name(model, ordinal)),
            model: model.to_string(),
            route: route_name(model, ordinal),
            ordinal,
            weight: Weight::new(i64::from(weight)).unwrap(),
            display_name: format!("agent_bing__{}", route_name(model, ordinal)),
        }
    }

    fn controller(discovery: Arc<MockDiscovery>, executor: Arc<MockExecutor>) -> RefreshController {
        RefreshController::new(discovery, executor, Arc::new(Registry::new()))
    }

    #[tokio::test]
    async fn refresh_installs_discovered_backends() {
        let discovery = Arc::new(MockDiscovery::with_backends(vec![
            descriptor("gpt-4o", 1, 100),
            descriptor("gpt-4o", 2, 0),
        ]));
        let ctl = controller(discovery, Arc::new(MockExecutor::new()));

        let report = ctl.refresh().await.unwrap();
        assert_eq!(report.generation, 1);
        assert_eq!(report.routes.len(), 2);
        assert!(report.skipped.is_empty());
        assert_eq!(ctl.registry().snapshot().get("gpt4o_2").unwrap().weight(), Weight::ZERO);
    }

    #[tokio::test]
    async fn empty_discovery_keeps_registry() {
        let discovery = Arc::new(MockDiscovery::with_backends(vec![descriptor("gpt-4o", 1, 100)]));
        let ctl = controller(discovery.clone(), Arc::new(MockExecutor::new()));
        ctl.refresh().await.unwrap();
        let before = ctl.registry().snapshot().route_names();

        discovery.set_backends(Vec::new());
        let err = ctl.refresh().await.unwrap_err();
        assert!(matches!(err, RouterError::DiscoveryUnavailable { .. }));

        let after = ctl.registry().snapshot();
        assert_eq!(after.route_names(), before);
        assert_eq!(after.generation(), 1);
    }

    #[tokio::test]
    async fn failing_discovery_keeps_registry() {
        let discovery = Arc::new(MockDiscovery::with_backends(vec![descriptor("gpt-4o", 1, 100)]));
        let ctl = controller(discovery.clone(), Arc::new(MockExecutor::new()));
        ctl.refresh().await.unwrap();

        discovery.fail_with("catalog unreachable");
        let err = ctl.refresh().await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(ctl.registry().snapshot().len(), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn unopenable_backend_is_skipped() {
        let discovery = Arc::new(MockDiscovery::with_backends(vec![
            descriptor("gpt-4o", 1, 100),
            descriptor("gpt-4o", 2, 100),
        ]));
        let executor = Arc::new(MockExecutor::new());
        executor.refuse_backend("asst_gpt4o_2");
        let ctl = controller(discovery, executor);

        let report = ctl.refresh().await.unwrap();
        assert_eq!(report.skipped, vec!["gpt4o_2".to_string()]);
        assert_eq!(ctl.registry().snapshot().route_names(), vec!["gpt4o_1".to_string()]);
        assert!(logs_contain("skipping backend without execution context"));
    }

    #[tokio::test]
    async fn refresh_overwrites_local_weight_with_discovery_value() {
        let discovery = Arc::new(MockDiscovery::with_backends(vec![descriptor("gpt-4o", 1, 100)]));
        let ctl = controller(discovery, Arc::new(MockExecutor::new()));
        ctl.refresh().await.unwrap();
        ctl.registry()
            .snapshot()
            .get("gpt4o_1")
            .unwrap()
            .store_weight(Weight::new(5).unwrap());

        ctl.refresh().await.unwrap();
        assert_eq!(ctl.registry().snapshot().get("gpt4o_1").unwrap().weight(), Weight::FULL);
    }

    #[tokio::test]
    async fn concurrent_refreshes_install_in_order() {
        let discovery = Arc::new(MockDiscovery::with_backends(vec![descriptor("gpt-4o", 1, 100)]));
        let ctl = Arc::new(controller(discovery, Arc::new(MockExecutor::new())));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let ctl = ctl.clone();
                tokio::spawn(async move { ctl.refresh().await.map(|r| r.generation) })
            })
            .collect();
        let mut generations = Vec::new();
        for task in tasks {
            generations.push(task.await.unwrap().unwrap());
        }
        generations.sort();
        assert_eq!(generations, (1..=8).collect::<Vec<u64>>());
        assert_eq!(ctl.registry().snapshot().generation(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_task_ticks_and_stops_on_cancel() {
        let discovery = Arc::new(MockDiscovery::with_backends(vec![descriptor("gpt-4o", 1, 100)]));
        let ctl = Arc::new(controller(discovery.clone(), Arc::new(MockExecutor::new())));
        let cancel = CancellationToken::new();

        let task = spawn_refresh_task(ctl.clone(), Duration::from_secs(300), cancel.clone());
        tokio::time::sleep(Duration::from_secs(301)).await;
        tokio::task::yield_now().await;
        assert_eq!(discovery.calls(), 1);

        cancel.cancel();
        task.await.unwrap();
        assert_eq!(ctl.registry().snapshot().generation(), 1);
    }
}
