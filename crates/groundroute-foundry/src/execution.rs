// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend execution through agent threads and runs.
//!
//! One query is one throwaway thread: create thread and run together, poll
//! the run to a terminal status, read the thread's messages, then delete
//! the thread. The answer is the last assistant text with inline citation
//! markers removed; annotations become numbered citations.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use groundroute_core::{
    AgentReply, BackendDescriptor, BackendExecutor, BackendSession, Citation, CitationKind,
    CollaboratorAdapter, RouterError,
};
use regex::Regex;
use serde_json::json;
use tracing::{debug, warn};

use crate::client::{ClientError, FoundryClient};
use crate::types::{
    Annotation, CreateThreadAndRun, MessagePage, NewMessage, NewThread, Run, TextPart,
};

/// Inline citation markers such as `【3:0†source】`.
static CITATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"【\d+:\d+†[^】]+】").expect("valid citation marker regex"));

/// Length of the raw answer excerpt kept in debug info.
const RAW_EXCERPT_CHARS: usize = 200;

/// Remove inline citation markers and surrounding whitespace.
pub fn strip_citation_markers(text: &str) -> String {
    CITATION_MARKER.replace_all(text, "").trim().to_string()
}

/// Numbered citations for a text part's annotations.
///
/// Numbering follows annotation position, so an annotation that carries no
/// usable citation leaves a gap rather than renumbering the rest.
pub fn citations_from(annotations: &[Annotation]) -> Vec<Citation> {
    annotations
        .iter()
        .zip(1u32..)
        .filter_map(|(annotation, id)| {
            if let Some(file) = &annotation.file_citation {
                return Some(Citation {
                    id,
                    kind: CitationKind::File,
                    url: None,
                    title: None,
                    quote: file.quote.clone(),
                });
            }
            if let Some(url) = &annotation.url_citation {
                return Some(Citation {
                    id,
                    kind: CitationKind::Url,
                    url: Some(url.url.clone()),
                    title: Some(url.title.clone().unwrap_or_else(|| url.url.clone())),
                    quote: None,
                });
            }
            annotation.url.as_ref().map(|url| Citation {
                id,
                kind: CitationKind::Url,
                url: Some(url.clone()),
                title: None,
                quote: None,
            })
        })
        .collect()
}

fn execution_error(context: &str, e: ClientError) -> RouterError {
    RouterError::BackendExecutionFailed {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Opens run-based sessions against the project service.
pub struct FoundryExecutor {
    client: FoundryClient,
    poll_interval: Duration,
}

impl FoundryExecutor {
    pub fn new(client: FoundryClient, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }
}

impl CollaboratorAdapter for FoundryExecutor {
    fn name(&self) -> &str {
        "foundry-executor"
    }
}

impl BackendExecutor for FoundryExecutor {
    fn open_session(
        &self,
        backend: &BackendDescriptor,
    ) -> Result<Box<dyn BackendSession>, RouterError> {
        if backend.backend_id.is_empty() {
            return Err(RouterError::execution(format!(
                "backend for route `{}` has no agent id",
                backend.route
            )));
        }
        Ok(Box::new(FoundrySession {
            client: self.client.clone(),
            agent_id: backend.backend_id.clone(),
            poll_interval: self.poll_interval,
        }))
    }
}

/// Execution context bound to one agent.
pub struct FoundrySession {
    client: FoundryClient,
    agent_id: String,
    poll_interval: Duration,
}

impl FoundrySession {
    async fn start_run(&self, query: &str) -> Result<Run, RouterError> {
        let body = CreateThreadAndRun {
            assistant_id: &self.agent_id,
            thread: NewThread {
                messages: vec![NewMessage {
                    role: "user",
                    content: query,
                }],
            },
        };
        self.client
            .post("threads/runs", &body)
            .await
            .map_err(|e| execution_error("failed to start run", e))
    }

    async fn wait_for_run(&self, mut run: Run) -> Result<Run, RouterError> {
        while !run.is_terminal() {
            tokio::time::sleep(self.poll_interval).await;
            run = self
                .client
                .get(&format!("threads/{}/runs/{}", run.thread_id, run.id), &[])
                .await
                .map_err(|e| execution_error("failed to poll run", e))?;
            debug!(run_id = %run.id, status = %run.status, "run polled");
        }
        Ok(run)
    }

    async fn read_reply(&self, run: &Run) -> Result<AgentReply, RouterError> {
        let page: MessagePage = self
            .client
            .get(&format!("threads/{}/messages", run.thread_id), &[("order", "asc")])
            .await
            .map_err(|e| execution_error("failed to read messages", e))?;

        let mut debug = json!({
            "run_status": run.status,
            "run_id": run.id,
            "thread_id": run.thread_id,
            "message_count": page.data.len(),
            "has_assistant_message": false,
            "annotations_count": 0,
        });

        let last_text: Option<&TextPart> = page
            .data
            .iter()
            .rev()
            .filter(|m| m.role == "assistant")
            .find_map(|m| m.last_text());

        let Some(text) = last_text else {
            debug["no_response_reason"] = json!("No assistant message in thread");
            return Ok(AgentReply {
                content: String::new(),
                citations: Vec::new(),
                debug,
            });
        };

        debug["has_assistant_message"] = json!(true);
        debug["annotations_count"] = json!(text.annotations.len());
        debug["raw_response"] = json!(excerpt(&text.value));

        Ok(AgentReply {
            content: strip_citation_markers(&text.value),
            citations: citations_from(&text.annotations),
            debug,
        })
    }

}

async fn delete_thread(client: &FoundryClient, thread_id: &str) {
    if let Err(e) = client.delete(&format!("threads/{thread_id}")).await {
        warn!(thread_id, error = %e, "failed to delete thread");
    }
}

/// Deletes the thread once the query is over.
///
/// When the invoke future is dropped mid-run (the dispatch timeout), the
/// delete is spawned onto the runtime instead.
struct ThreadCleanup {
    client: FoundryClient,
    thread_id: Option<String>,
}

impl ThreadCleanup {
    fn new(client: FoundryClient, thread_id: String) -> Self {
        Self {
            client,
            thread_id: Some(thread_id),
        }
    }

    async fn finish(mut self) {
        if let Some(thread_id) = self.thread_id.take() {
            delete_thread(&self.client, &thread_id).await;
        }
    }
}

impl Drop for ThreadCleanup {
    fn drop(&mut self) {
        let Some(thread_id) = self.thread_id.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                debug!(thread_id = %thread_id, "query abandoned, deleting thread in background");
                let client = self.client.clone();
                runtime.spawn(async move { delete_thread(&client, &thread_id).await });
            }
            Err(_) => warn!(thread_id = %thread_id, "no runtime left to delete abandoned thread"),
        }
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() > RAW_EXCERPT_CHARS {
        let head: String = text.chars().take(RAW_EXCERPT_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[async_trait]
impl BackendSession for FoundrySession {
    async fn invoke(&self, query: &str) -> Result<AgentReply, RouterError> {
        let run = self.start_run(query).await?;
        debug!(agent_id = %self.agent_id, run_id = %run.id, thread_id = %run.thread_id, "run started");
        let cleanup = ThreadCleanup::new(self.client.clone(), run.thread_id.clone());

        let result = match self.wait_for_run(run).await {
            Ok(run) if run.status == "completed" => self.read_reply(&run).await,
            Ok(run) => Err(RouterError::execution(format!(
                "run {} ended with status `{}`: {}",
                run.id,
                run.status,
                run.last_error
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "unknown error".to_string())
            ))),
            Err(e) => Err(e),
        };

        cleanup.finish().await;
        result
    }
}
