// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend discovery from the project's agent catalog.
//!
//! Routable agents are named `{prefix}__{model}__{n}` (single underscores
//! also match). The model comes from the agent definition, the ordinal from
//! the name, and the traffic weight from the agent's `weight` metadata.

use std::collections::HashSet;

use async_trait::async_trait;
use groundroute_core::{
    BackendDescriptor, CollaboratorAdapter, DiscoverySource, RouterError, Weight, route_name,
};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::client::FoundryClient;
use crate::types::{AgentObject, AgentPage};

/// Metadata key holding an agent's traffic weight.
pub const WEIGHT_METADATA_KEY: &str = "weight";

/// Agents requested per catalog page.
const PAGE_LIMIT: &str = "100";

/// Upper bound on pages per listing.
const MAX_PAGES: usize = 100;

/// Parses agent names against the routing naming convention.
#[derive(Debug, Clone)]
pub struct AgentNamePattern {
    regex: Regex,
}

impl AgentNamePattern {
    /// Pattern for agents named with `prefix`.
    pub fn new(prefix: &str) -> Result<Self, RouterError> {
        let regex = Regex::new(&format!(
            r"^{}_+([A-Za-z0-9.\-]+)_+(\d+)$",
            regex::escape(prefix)
        ))
        .map_err(|e| RouterError::Config(format!("invalid agent prefix `{prefix}`: {e}")))?;
        Ok(Self { regex })
    }

    /// Ordinal encoded in `name`, if the name follows the convention.
    pub fn ordinal(&self, name: &str) -> Option<u32> {
        self.regex.captures(name)?.get(2)?.as_str().parse().ok()
    }
}

/// Turn catalog agents into descriptors.
///
/// Skips agents that do not follow the naming convention or have no model,
/// sorts by model then ordinal, and keeps the first of any duplicate route.
pub fn descriptors_from_agents(
    agents: &[AgentObject],
    pattern: &AgentNamePattern,
    default_weight: Weight,
) -> Vec<BackendDescriptor> {
    let mut descriptors: Vec<BackendDescriptor> = agents
        .iter()
        .filter_map(|agent| {
            let name = agent.name.as_deref().unwrap_or_default();
            let ordinal = pattern.ordinal(name)?;
            let Some(model) = agent.model.as_deref().filter(|m| !m.is_empty()) else {
                warn!(agent = name, agent_id = %agent.id, "skipping agent without model");
                return None;
            };
            Some(BackendDescriptor {
                backend_id: agent.id.clone(),
                model: model.to_string(),
                route: route_name(model, ordinal),
                ordinal,
                weight: agent_weight(agent, default_weight),
                display_name: name.to_string(),
            })
        })
        .collect();

    descriptors.sort_by(|a, b| a.model.cmp(&b.model).then(a.ordinal.cmp(&b.ordinal)));

    let mut seen = HashSet::new();
    descriptors.retain(|d| {
        let first = seen.insert(d.route.clone());
        if !first {
            warn!(route = %d.route, agent_id = %d.backend_id, "duplicate route, keeping first agent");
        }
        first
    });
    descriptors
}

/// Weight from metadata; missing or invalid values use `default_weight`.
fn agent_weight(agent: &AgentObject, default_weight: Weight) -> Weight {
    let Some(raw) = agent.metadata_value(WEIGHT_METADATA_KEY) else {
        return default_weight;
    };
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|value| Weight::new(value).ok())
        .unwrap_or_else(|| {
            warn!(agent_id = %agent.id, value = raw, "invalid weight metadata, using default");
            default_weight
        })
}

/// Discovery source backed by the agent catalog.
pub struct FoundryDiscovery {
    client: FoundryClient,
    pattern: AgentNamePattern,
    default_weight: Weight,
}

impl FoundryDiscovery {
    pub fn new(client: FoundryClient, pattern: AgentNamePattern, default_weight: Weight) -> Self {
        Self {
            client,
            pattern,
            default_weight,
        }
    }

    /// Every agent in the catalog, following pagination.
    async fn list_agents(&self) -> Result<Vec<AgentObject>, RouterError> {
        let mut agents = Vec::new();
        let mut after: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut query = vec![("limit", PAGE_LIMIT), ("order", "asc")];
            if let Some(cursor) = after.as_deref() {
                query.push(("after", cursor));
            }
            let page: AgentPage =
                self.client
                    .get("assistants", &query)
                    .await
                    .map_err(|e| RouterError::DiscoveryUnavailable {
                        message: format!("failed to list agents: {e}"),
                        source: Some(Box::new(e)),
                    })?;

            debug!(count = page.data.len(), has_more = page.has_more, "agent page received");
            let next = page.last_id.clone().or_else(|| page.data.last().map(|a| a.id.clone()));
            agents.extend(page.data);

            match (page.has_more, next) {
                (true, Some(cursor)) => after = Some(cursor),
                _ => return Ok(agents),
            }
        }

        warn!(pages = MAX_PAGES, "agent listing truncated");
        Ok(agents)
    }
}

impl CollaboratorAdapter for FoundryDiscovery {
    fn name(&self) -> &str {
        "foundry-discovery"
    }
}

#[async_trait]
impl DiscoverySource for FoundryDiscovery {
    async fn list_backends(&self) -> Result<Vec<BackendDescriptor>, RouterError> {
        let agents = self.list_agents().await?;
        let descriptors = descriptors_from_agents(&agents, &self.pattern, self.default_weight);
        info!(
            agents = agents.len(),
            backends = descriptors.len(),
            endpoint = self.client.base_url(),
            "agents discovered"
        );
        Ok(descriptors)
    }
}
