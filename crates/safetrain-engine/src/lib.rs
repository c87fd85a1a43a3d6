// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lesson progress and credentialing engine for the Safetrain portal.
//!
//! Five cooperating components over the shared SQLite storage:
//!
//! - [`tracker`]: playback telemetry -> monotonic watch percentage
//! - [`quiz`]: threshold-gated comprehension quiz FSM
//! - [`completion`]: idempotent lesson/course completion resolution
//! - [`ledger`]: exactly-once point awards, levels, and badges
//! - [`certificate`]: at-most-one certificate per (user, course)
//!
//! [`session::LessonSession`] wires them together for one open lesson:
//! tracker -> quiz -> completion -> {ledger, certificate}.

pub mod certificate;
pub mod completion;
pub mod ledger;
pub mod quiz;
pub mod session;
pub mod tracker;

pub use certificate::{CertificateIssuer, IssuedCertificate};
pub use completion::{CompletionResolver, LessonCompletion};
pub use ledger::{BADGE_POLICIES, BadgePolicy, GamificationLedger};
pub use quiz::{AnswerOutcome, QuizGate, QuizQuestion, QuizState};
pub use session::{LessonSession, SessionAnswer};
pub use tracker::{ProgressSample, WatchTracker, watch_percentage};
