// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `groundroute status` command implementation.
//!
//! Calls `GET /v1/status` on the configured gateway and prints the
//! per-model health table. Falls back gracefully when the service is not
//! running.

use std::io::IsTerminal;
use std::time::Duration;

use groundroute_config::GroundrouteConfig;
use groundroute_core::RouterError;
use serde::{Deserialize, Serialize};

/// Body of `GET /v1/status`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusBody {
    pub overall: String,
    pub region: String,
    pub generation: u64,
    #[serde(default)]
    pub refreshed_at: Option<String>,
    #[serde(default)]
    pub models: Vec<ModelRow>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelRow {
    pub model: String,
    pub handles: usize,
    pub active_handles: usize,
    pub total_weight: u32,
    pub active: bool,
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub running: bool,
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusBody>,
}

/// Base URL for reaching the gateway from this host.
fn gateway_base_url(config: &GroundrouteConfig) -> String {
    let host = match config.gateway.host.as_str() {
        "0.0.0.0" | "::" => "127.0.0.1",
        host => host,
    };
    format!("http://{host}:{}", config.gateway.port)
}

/// Run the `groundroute status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(
    config: &GroundrouteConfig,
    json: bool,
    plain: bool,
) -> Result<(), RouterError> {
    let endpoint = format!("{}/v1/status", gateway_base_url(config));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .map_err(|e| RouterError::Internal(format!("failed to create HTTP client: {e}")))?;

    let mut request = client.get(&endpoint);
    if let Some(token) = &config.gateway.api_token {
        request = request.bearer_auth(token);
    }

    let status = match request.send().await {
        Ok(resp) if resp.status().is_success() => Some(resp.json::<StatusBody>().await.map_err(|e| {
            RouterError::Internal(format!("failed to parse status response: {e}"))
        })?),
        Ok(resp) => {
            tracing::debug!(status = %resp.status(), "status endpoint returned an error");
            None
        }
        Err(e) => {
            tracing::debug!(error = %e, "status endpoint unreachable");
            None
        }
    };

    if json {
        let output = StatusOutput {
            running: status.is_some(),
            endpoint,
            status,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
        );
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    match status {
        Some(body) => print_status_running(&body, use_color),
        None => print_status_offline(&endpoint, use_color),
    }
    Ok(())
}

fn status_marker(active: bool, use_color: bool) -> String {
    use colored::Colorize;
    match (active, use_color) {
        (true, true) => "✓".green().to_string(),
        (false, true) => "✗".red().to_string(),
        (true, false) => "[OK]".to_string(),
        (false, false) => "[DOWN]".to_string(),
    }
}

fn overall_label(overall: &str, use_color: bool) -> String {
    use colored::Colorize;
    if !use_color {
        return overall.to_string();
    }
    match overall {
        "ok" => overall.green().to_string(),
        "partial" => overall.yellow().to_string(),
        _ => overall.red().to_string(),
    }
}

/// Per-model table lines.
fn model_lines(models: &[ModelRow], use_color: bool) -> Vec<String> {
    models
        .iter()
        .map(|m| {
            format!(
                "    {} {:<16} weight {:>3}  backends {}/{}",
                status_marker(m.active, use_color),
                m.model,
                m.total_weight,
                m.active_handles,
                m.handles
            )
        })
        .collect()
}

fn print_status_running(body: &StatusBody, use_color: bool) {
    println!();
    println!("  groundroute status");
    println!("  {}", "-".repeat(45));
    println!("    Overall:    {}", overall_label(&body.overall, use_color));
    println!("    Region:     {}", body.region);
    println!("    Generation: {}", body.generation);
    if let Some(at) = &body.refreshed_at {
        println!("    Refreshed:  {at}");
    }
    println!();
    if body.models.is_empty() {
        println!("    no routes loaded");
    }
    for line in model_lines(&body.models, use_color) {
        println!("{line}");
    }
    println!();
}

fn print_status_offline(endpoint: &str, use_color: bool) {
    println!();
    println!("  groundroute status");
    println!("  {}", "-".repeat(45));

    if use_color {
        use colored::Colorize;
        println!("    State:    {} {}", "✗".red(), "not running".red());
    } else {
        println!("    State:    [FAIL] not running");
    }

    println!("    Endpoint: {endpoint}");
    println!();
    println!("  Start with: groundroute serve");
    println!();
}
