// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for typed operations on storage entities.

pub mod catalog;
pub mod certificates;
pub mod gamification;
pub mod profiles;
pub mod progress;
