// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./safetrain.toml` > `~/.config/safetrain/safetrain.toml`
//! > `/etc/safetrain/safetrain.toml` with environment variable overrides via
//! `SAFETRAIN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SafetrainConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/safetrain/safetrain.toml` (system-wide)
/// 3. `~/.config/safetrain/safetrain.toml` (user XDG config)
/// 4. `./safetrain.toml` (local directory)
/// 5. `SAFETRAIN_*` environment variables
pub fn load_config() -> Result<SafetrainConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SafetrainConfig::default()))
        .merge(Toml::file("/etc/safetrain/safetrain.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("safetrain/safetrain.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("safetrain.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a specific TOML string only (no XDG lookup).
///
/// Used for testing and for callers that supply config content directly.
pub fn load_config_from_str(toml_content: &str) -> Result<SafetrainConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SafetrainConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SafetrainConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SafetrainConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `SAFETRAIN_PROGRESS_COMPLETION_THRESHOLD`
/// must map to `progress.completion_threshold`, not `progress.completion.threshold`.
fn env_provider() -> Env {
    Env::prefixed("SAFETRAIN_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: SAFETRAIN_STORAGE_DATABASE_PATH -> "storage_database_path"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("portal_", "portal.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("progress_", "progress.", 1)
            .replacen("points_", "points.", 1);
        mapped.into()
    })
}
