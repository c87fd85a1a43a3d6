// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Safetrain credentialing engine.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides. Policy knobs for the progress tracker and the
//! gamification ledger live here so thresholds can be tested and tuned
//! without touching control flow.
//!
//! # Usage
//!
//! ```no_run
//! use safetrain_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("quiz unlocks at {}%", config.progress.completion_threshold);
//! ```

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::SafetrainConfig;
pub use validation::validate_config;

use safetrain_core::SafetrainError;

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point that loads config from TOML files and
/// env vars via Figment, then runs post-deserialization validation. Both
/// failure paths collapse into [`SafetrainError::Config`].
pub fn load_and_validate() -> Result<SafetrainConfig, SafetrainError> {
    let config = loader::load_config().map_err(|e| SafetrainError::Config(e.to_string()))?;
    validation::validate_config(&config)
        .map_err(|errors| SafetrainError::Config(errors.join("; ")))?;
    Ok(config)
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<SafetrainConfig, SafetrainError> {
    let config = loader::load_config_from_str(toml_content)
        .map_err(|e| SafetrainError::Config(e.to_string()))?;
    validation::validate_config(&config)
        .map_err(|errors| SafetrainError::Config(errors.join("; ")))?;
    Ok(config)
}
