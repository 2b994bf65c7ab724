// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `groundroute check`: print a summary of a configuration that already
//! passed validation, and make sure the collaborators can be built from it.

use groundroute_config::GroundrouteConfig;
use groundroute_core::RouterError;

pub fn run_check(config: &GroundrouteConfig) -> Result<(), RouterError> {
    groundroute_foundry::collaborators(config)?;

    for line in summary(config) {
        println!("{line}");
    }
    Ok(())
}

fn summary(config: &GroundrouteConfig) -> Vec<String> {
    let on_off = |set: bool| if set { "set" } else { "unset" };
    vec![
        "groundroute: configuration OK".to_string(),
        format!("  service:   {} ({})", config.service.name, config.service.region),
        format!("  gateway:   {}:{}", config.gateway.host, config.gateway.port),
        format!(
            "  tokens:    api {}, admin {}",
            on_off(config.gateway.api_token.is_some()),
            on_off(config.gateway.admin_token.is_some())
        ),
        format!(
            "  discovery: {}",
            config.discovery.endpoint.as_deref().unwrap_or("not configured")
        ),
        format!(
            "  refresh:   {}",
            if config.refresh.enabled {
                format!("every {}s", config.refresh.interval_secs)
            } else {
                "disabled".to_string()
            }
        ),
        format!("  default:   {}", config.routing.default_model),
    ]
}
