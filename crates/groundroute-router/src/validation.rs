// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request argument sanity checks run before dispatch.
//!
//! Catches the common client mistake of passing the question as `model` and
//! the model name as `query`.

use groundroute_core::RouterError;

/// Validates `(query, model)` pairs against a set of known model names.
#[derive(Debug, Clone, Default)]
pub struct RequestValidator {
    known_models: Vec<String>,
}

impl RequestValidator {
    pub fn new(known_models: impl IntoIterator<Item = String>) -> Self {
        Self {
            known_models: known_models.into_iter().collect(),
        }
    }

    /// Model names the swap check recognises.
    pub fn known_models(&self) -> &[String] {
        &self.known_models
    }

    /// Reject empty queries and swapped arguments.
    ///
    /// `extra_models` are checked alongside the configured names, so models
    /// only present in the current registry are recognised too.
    pub fn check<'a>(
        &self,
        query: &str,
        model: &str,
        extra_models: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), RouterError> {
        if query.trim().is_empty() {
            return Err(RouterError::InvalidRequest {
                message: "query must not be empty".to_string(),
            });
        }

        if looks_like_query(model) {
            return Err(swapped(query, model));
        }

        let known = self
            .known_models
            .iter()
            .any(|name| matches_model_name(query, name));
        if known || extra_models.into_iter().any(|name| matches_model_name(query, name)) {
            return Err(swapped(query, model));
        }

        Ok(())
    }
}

/// A model argument that reads like natural language.
pub fn looks_like_query(model: &str) -> bool {
    model.chars().any(|c| c.is_whitespace() || c == '?')
}

/// Whether `query` is the model name `name`, verbatim or in its compact
/// form (`GPT 4o`, `gpt4o`).
pub fn matches_model_name(query: &str, name: &str) -> bool {
    let query = query.trim();
    if query.eq_ignore_ascii_case(name) {
        return true;
    }
    compact(query) == compact(name)
}

fn compact(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '.')
        .flat_map(char::to_lowercase)
        .collect()
}

fn swapped(query: &str, model: &str) -> RouterError {
    RouterError::InvalidRequest {
        message: format!(
            "parameters look swapped: query=`{query}`, model=`{model}`; \
             pass the question as `query` and the model name as `model`"
        ),
    }
}
