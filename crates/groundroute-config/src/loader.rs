// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./groundroute.toml` > `~/.config/groundroute/groundroute.toml`
//! > `/etc/groundroute/groundroute.toml`, then `GROUNDROUTE_*` environment
//! overrides, then the platform region variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::GroundrouteConfig;

/// Top-level config sections, used to turn `GROUNDROUTE_SECTION_KEY` into
/// `section.key`.
const SECTIONS: &[&str] = &[
    "service",
    "gateway",
    "routing",
    "refresh",
    "discovery",
    "dispatch",
];

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/groundroute/groundroute.toml";

/// Config file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "groundroute.toml";

/// User config file under the XDG config directory, if one exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("groundroute").join("groundroute.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/groundroute/groundroute.toml`
/// 3. `~/.config/groundroute/groundroute.toml`
/// 4. `./groundroute.toml`
/// 5. `GROUNDROUTE_*` environment variables
/// 6. `AZURE_REGION`, then `REGION_NAME`, into `service.region`
pub fn load_config() -> Result<GroundrouteConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no environment).
pub fn load_config_from_str(toml_content: &str) -> Result<GroundrouteConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GroundrouteConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file plus environment overrides.
pub fn load_config_from_path(path: &Path) -> Result<GroundrouteConfig, figment::Error> {
    with_environment(
        Figment::new()
            .merge(Serialized::defaults(GroundrouteConfig::default()))
            .merge(Toml::file(path)),
    )
    .extract()
}

/// Build the Figment used for config loading without extracting it.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(GroundrouteConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    with_environment(figment.merge(Toml::file(LOCAL_CONFIG_PATH)))
}

fn with_environment(figment: Figment) -> Figment {
    figment
        .merge(env_provider())
        .merge(region_provider("AZURE_REGION"))
        .merge(region_provider("REGION_NAME"))
}

/// `GROUNDROUTE_*` variables, mapped section-first.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `GROUNDROUTE_DISCOVERY_API_KEY` must land on
/// `discovery.api_key`, not `discovery.api.key`.
fn env_provider() -> Env {
    Env::prefixed("GROUNDROUTE_").map(|key| {
        // Env keys keep their original case; sections are lower-case.
        let key_str = key.as_str().to_ascii_lowercase();
        SECTIONS
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or(key_str)
            .into()
    })
}

/// A single platform variable that sets the region tag.
fn region_provider(var: &'static str) -> Env {
    Env::raw()
        .only(&[var])
        .map(|_| "service.region".into())
}
