// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express. All failures are
//! collected; validation does not stop at the first one.

use std::collections::HashSet;

use groundroute_core::Weight;

use crate::diagnostic::ConfigError;
use crate::model::GroundrouteConfig;

/// Validate a deserialized configuration.
pub fn validate_config(config: &GroundrouteConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("gateway.host must not be empty"));
    } else {
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_ip && !is_hostname {
            errors.push(ConfigError::validation(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            )));
        }
    }

    if config.gateway.port == 0 {
        errors.push(ConfigError::validation("gateway.port must not be 0"));
    }

    for (key, token) in [
        ("gateway.api_token", &config.gateway.api_token),
        ("gateway.admin_token", &config.gateway.admin_token),
    ] {
        if token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            errors.push(ConfigError::validation(format!(
                "{key} must not be blank; remove it to disable"
            )));
        }
    }

    let default_model = config.routing.default_model.trim();
    if default_model.is_empty() {
        errors.push(ConfigError::validation(
            "routing.default_model must not be empty",
        ));
    } else if default_model.contains(char::is_whitespace) {
        errors.push(ConfigError::validation(format!(
            "routing.default_model `{default_model}` must not contain whitespace"
        )));
    }

    let mut seen = HashSet::new();
    for model in &config.routing.known_models {
        if model.trim().is_empty() {
            errors.push(ConfigError::validation(
                "routing.known_models must not contain empty names",
            ));
        } else if !seen.insert(model.as_str()) {
            errors.push(ConfigError::validation(format!(
                "duplicate model `{model}` in routing.known_models"
            )));
        }
    }

    if config.refresh.interval_secs == 0 {
        errors.push(ConfigError::validation(
            "refresh.interval_secs must be at least 1",
        ));
    }

    if config.discovery.default_weight > Weight::MAX {
        errors.push(ConfigError::validation(format!(
            "discovery.default_weight must be between 0 and {}, got {}",
            Weight::MAX,
            config.discovery.default_weight
        )));
    }

    if let Some(endpoint) = &config.discovery.endpoint
        && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
    {
        errors.push(ConfigError::validation(format!(
            "discovery.endpoint `{endpoint}` must start with http:// or https://"
        )));
    }

    if config.discovery.agent_prefix.trim().is_empty() {
        errors.push(ConfigError::validation(
            "discovery.agent_prefix must not be empty",
        ));
    }

    if config.discovery.request_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "discovery.request_timeout_secs must be at least 1",
        ));
    }

    if config.dispatch.timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "dispatch.timeout_secs must be at least 1",
        ));
    }

    if config.dispatch.poll_interval_ms < 10 {
        errors.push(ConfigError::validation(format!(
            "dispatch.poll_interval_ms must be at least 10, got {}",
            config.dispatch.poll_interval_ms
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
