// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the agent project service.
//!
//! Only the fields the adapters read are modelled; unknown fields are
//! ignored so service-side additions do not break decoding.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One page of `GET assistants`.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentPage {
    #[serde(default)]
    pub data: Vec<AgentObject>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub last_id: Option<String>,
}

/// An agent definition.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentObject {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl AgentObject {
    /// A metadata value, if set.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key).map(String::as_str)
    }
}

/// Body of `POST assistants/{id}` when only metadata changes.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataUpdate {
    pub metadata: HashMap<String, String>,
}

/// Body of `POST threads/runs`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateThreadAndRun<'a> {
    pub assistant_id: &'a str,
    pub thread: NewThread<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewThread<'a> {
    pub messages: Vec<NewMessage<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// A thread run.
#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub id: String,
    pub thread_id: String,
    pub status: String,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

impl Run {
    /// Whether the run will not change status again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status.as_str(),
            "completed" | "failed" | "cancelled" | "expired" | "incomplete" | "requires_action"
        )
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => write!(f, "{code}: {message}"),
            (Some(code), None) => f.write_str(code),
            (None, Some(message)) => f.write_str(message),
            (None, None) => f.write_str("unknown error"),
        }
    }
}

/// `GET threads/{id}/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagePage {
    #[serde(default)]
    pub data: Vec<ThreadMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMessage {
    pub role: String,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl ThreadMessage {
    /// The last text part of the message.
    pub fn last_text(&self) -> Option<&TextPart> {
        self.content.iter().rev().find_map(|c| match c {
            MessageContent::Text { text } => Some(text),
            MessageContent::Other => None,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextPart },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextPart {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// An annotation attached to a span of answer text.
#[derive(Debug, Clone, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub url_citation: Option<UrlCitation>,
    #[serde(default)]
    pub file_citation: Option<FileCitation>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrlCitation {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileCitation {
    #[serde(default)]
    pub quote: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_page_decodes_text_and_skips_other_parts() {
        let json = r#"{
            "data": [{
                "role": "assistant",
                "content": [
                    {"type": "image_file", "image_file": {"file_id": "f1"}},
                    {"type": "text", "text": {"value": "Hi", "annotations": [
                        {"type": "url_citation", "text": "【3:0†source】",
                         "url_citation": {"url": "https://example.com", "title": "Example"}}
                    ]}}
                ]
            }]
        }"#;
        let page: MessagePage = serde_json::from_str(json).unwrap();
        let text = page.data[0].last_text().unwrap();
        assert_eq!(text.value, "Hi");
        assert_eq!(
            text.annotations[0].url_citation.as_ref().unwrap().title.as_deref(),
            Some("Example")
        );
    }

    #[test]
    fn run_error_display() {
        let err = RunError {
            code: Some("rate_limit_exceeded".into()),
            message: Some("slow down".into()),
        };
        assert_eq!(err.to_string(), "rate_limit_exceeded: slow down");
    }

    #[test]
    fn requires_action_is_terminal_for_routing() {
        let run: Run =
            serde_json::from_str(r#"{"id":"run_1","thread_id":"t","status":"requires_action"}"#).unwrap();
        assert!(run.is_terminal());
    }
}
