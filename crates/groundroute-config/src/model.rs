// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level groundroute configuration.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GroundrouteConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP surface settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Backend selection policy.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Periodic registry refresh.
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Discovery catalog connection.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Backend invocation limits.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Service name reported by the health endpoint.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Region tag attached to every routed response.
    ///
    /// Populated from `REGION_NAME` or `AZURE_REGION` when those are set.
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
            region: default_region(),
        }
    }
}

fn default_service_name() -> String {
    "groundroute".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_region() -> String {
    "local".to_string()
}

/// HTTP gateway configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token for query, listing and status routes. `None` leaves
    /// them open (an upstream gateway usually handles auth).
    #[serde(default)]
    pub api_token: Option<String>,

    /// Bearer token for admin routes. `None` rejects every admin call.
    #[serde(default)]
    pub admin_token: Option<String>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("admin_token", &self.admin_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_token: None,
            admin_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Backend selection policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Model used when a request names a model with no backends at all.
    #[serde(default = "default_default_model")]
    pub default_model: String,

    /// Model names recognised by the swapped-argument check.
    #[serde(default = "default_known_models")]
    pub known_models: Vec<String>,

    /// Fixed seed for the selection RNG. `None` seeds from the OS.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_model: default_default_model(),
            known_models: default_known_models(),
            rng_seed: None,
        }
    }
}

fn default_default_model() -> String {
    "gpt-4o".to_string()
}

fn default_known_models() -> Vec<String> {
    [
        "gpt-4o",
        "gpt-4",
        "gpt-4.1-mini",
        "gpt-4-turbo",
        "gpt-35-turbo",
        "gpt-3.5-turbo",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Periodic refresh configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshConfig {
    /// Run the periodic refresh task.
    #[serde(default = "default_refresh_enabled")]
    pub enabled: bool,

    /// Seconds between refreshes.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: default_refresh_enabled(),
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_refresh_enabled() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    300
}

/// Discovery catalog configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Project endpoint of the agent catalog. `None` starts with an empty
    /// registry.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer credential for the catalog.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API version query parameter sent with every catalog call.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Agent name prefix that marks routable agents.
    #[serde(default = "default_agent_prefix")]
    pub agent_prefix: String,

    /// Weight assigned to agents with no weight metadata.
    #[serde(default = "default_weight")]
    pub default_weight: u8,

    /// Timeout for individual catalog requests.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for DiscoveryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("api_version", &self.api_version)
            .field("agent_prefix", &self.agent_prefix)
            .field("default_weight", &self.default_weight)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            api_version: default_api_version(),
            agent_prefix: default_agent_prefix(),
            default_weight: default_weight(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_api_version() -> String {
    "2025-05-01".to_string()
}

fn default_agent_prefix() -> String {
    "agent_bing".to_string()
}

fn default_weight() -> u8 {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Backend invocation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Upper bound on a single backend invocation.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Delay between run status polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_poll_interval_ms() -> u64 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = GroundrouteConfig::default();
        assert_eq!(config.service.name, "groundroute");
        assert_eq!(config.service.region, "local");
        assert_eq!(config.gateway.port, 8000);
        assert_eq!(config.routing.default_model, "gpt-4o");
        assert!(config.routing.known_models.iter().any(|m| m == "gpt-4.1-mini"));
        assert_eq!(config.refresh.interval_secs, 300);
        assert!(config.refresh.enabled);
        assert_eq!(config.discovery.agent_prefix, "agent_bing");
        assert_eq!(config.discovery.default_weight, 100);
        assert_eq!(config.dispatch.timeout_secs, 120);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = GroundrouteConfig::default();
        config.gateway.admin_token = Some("super-secret".into());
        config.discovery.api_key = Some("catalog-key".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("catalog-key"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn unknown_section_is_rejected() {
        let result = toml::from_str::<GroundrouteConfig>("[telemetry]\nenabled = true\n");
        assert!(result.is_err());
    }
}
