// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as percentage ranges and non-empty paths.

use crate::model::SafetrainConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<String>)` with all
/// collected validation messages (does not fail fast).
pub fn validate_config(config: &SafetrainConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push("storage.database_path must not be empty".to_string());
    }

    if config.progress.completion_threshold == 0 || config.progress.completion_threshold > 100 {
        errors.push(format!(
            "progress.completion_threshold must be in 1..=100, got {}",
            config.progress.completion_threshold
        ));
    }

    if config.progress.sampling_granularity == 0 || config.progress.sampling_granularity > 100 {
        errors.push(format!(
            "progress.sampling_granularity must be in 1..=100, got {}",
            config.progress.sampling_granularity
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.portal.log_level.as_str()) {
        errors.push(format!(
            "portal.log_level must be one of {valid_levels:?}, got `{}`",
            config.portal.log_level
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
