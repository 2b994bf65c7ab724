// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock backend executor.
//!
//! Sessions answer with a canned [`AgentReply`] whose content names the
//! backend that served the query, and record every invocation.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use groundroute_core::{
    AgentReply, BackendDescriptor, BackendExecutor, BackendSession, CollaboratorAdapter,
    RouterError,
};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub backend_id: String,
    pub query: String,
}

#[derive(Default)]
struct ExecutorState {
    refused: HashSet<String>,
    failing: HashMap<String, String>,
    delay: Option<Duration>,
    invocations: Vec<Invocation>,
    opened: usize,
}

/// Executor whose sessions never leave the process.
#[derive(Clone, Default)]
pub struct MockExecutor {
    state: Arc<Mutex<ExecutorState>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `open_session` for this backend id.
    pub fn refuse_backend(&self, backend_id: &str) {
        self.state.lock().unwrap().refused.insert(backend_id.to_string());
    }

    /// Make invocations of this backend fail with `message`.
    pub fn fail_backend(&self, backend_id: &str, message: &str) {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(backend_id.to_string(), message.to_string());
    }

    /// Delay every invocation by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    /// Every invocation so far, in call order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.state.lock().unwrap().invocations.clone()
    }

    /// Number of sessions opened across all refreshes.
    pub fn sessions_opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }
}

impl CollaboratorAdapter for MockExecutor {
    fn name(&self) -> &str {
        "mock-executor"
    }
}

impl BackendExecutor for MockExecutor {
    fn open_session(&self, backend: &BackendDescriptor) -> Result<Box<dyn BackendSession>, RouterError> {
        let mut state = self.state.lock().unwrap();
        if state.refused.contains(&backend.backend_id) {
            return Err(RouterError::execution(format!(
                "no execution context for {}",
                backend.backend_id
            )));
        }
        state.opened += 1;
        Ok(Box::new(MockSession {
            backend_id: backend.backend_id.clone(),
            route: backend.route.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockSession {
    backend_id: String,
    route: String,
    state: Arc<Mutex<ExecutorState>>,
}

#[async_trait]
impl BackendSession for MockSession {
    async fn invoke(&self, query: &str) -> Result<AgentReply, RouterError> {
        let (delay, failure) = {
            let mut state = self.state.lock().unwrap();
            state.invocations.push(Invocation {
                backend_id: self.backend_id.clone(),
                query: query.to_string(),
            });
            (state.delay, state.failing.get(&self.backend_id).cloned())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = failure {
            return Err(RouterError::execution(message));
        }

        Ok(AgentReply {
            content: format!("mock answer from {}", self.route),
            citations: Vec::new(),
            debug: serde_json::json!({ "run_status": "completed", "backend_id": self.backend_id }),
        })
    }
}
