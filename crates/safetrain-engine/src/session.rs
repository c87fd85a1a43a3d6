// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-(user, lesson) session orchestration.
//!
//! Wires the data flow of one open lesson: progress tracker -> quiz gate ->
//! completion resolver -> {gamification ledger, certificate issuer}. Holds
//! no state beyond the current session's view; closing the UI simply drops
//! the session and abandons any in-flight quiz answers.

use std::sync::Arc;

use safetrain_config::SafetrainConfig;
use safetrain_core::{LessonProgress, SafetrainError};
use safetrain_storage::Database;
use safetrain_storage::queries::progress;
use tracing::info;

use crate::certificate::CertificateIssuer;
use crate::completion::{CompletionResolver, LessonCompletion};
use crate::ledger::GamificationLedger;
use crate::quiz::{AnswerOutcome, QuizGate};
use crate::tracker::{ProgressSample, WatchTracker};

/// Outcome of submitting a quiz answer through the session.
#[derive(Debug)]
pub enum SessionAnswer {
    /// Answer accepted; present the question at `next_index`.
    Advanced { next_index: usize },
    /// A wrong answer reset the quiz; learner retries from the top.
    Reset,
    /// Quiz passed; completion resolved and side effects applied.
    Completed(Box<LessonCompletion>),
}

/// One learner's open lesson.
pub struct LessonSession {
    user_id: String,
    lesson_id: String,
    db: Arc<Database>,
    tracker: WatchTracker,
    quiz: QuizGate,
    resolver: CompletionResolver,
}

impl LessonSession {
    /// Open a lesson for a learner, re-deriving session state from any
    /// persisted progress: a completed lesson resumes straight to `Passed`
    /// (no quiz replay), and a previously crossed watch threshold resumes
    /// with the quiz already unlocked.
    pub async fn open(
        db: Arc<Database>,
        config: &SafetrainConfig,
        user_id: &str,
        lesson_id: &str,
    ) -> Result<Self, SafetrainError> {
        let mut tracker = WatchTracker::new(user_id, lesson_id, &config.progress);
        let mut quiz = QuizGate::new(QuizGate::standard_questions())?;

        if let Some(persisted) = progress::get_lesson_progress(&db, user_id, lesson_id).await? {
            tracker.resume_from(&persisted);
            if persisted.completed {
                quiz.resume_completed();
            } else if persisted.watched_percentage >= config.progress.completion_threshold {
                quiz.unlock();
            }
        }

        let resolver = CompletionResolver::new(
            db.clone(),
            config.points.clone(),
            GamificationLedger::new(db.clone()),
            CertificateIssuer::new(db.clone(), config.portal.name.clone()),
        );

        Ok(Self {
            user_id: user_id.to_string(),
            lesson_id: lesson_id.to_string(),
            db,
            tracker,
            quiz,
            resolver,
        })
    }

    pub fn quiz(&self) -> &QuizGate {
        &self.quiz
    }

    /// Feed one playback telemetry sample; unlocks the quiz on the
    /// threshold-crossing edge.
    pub async fn observe(
        &mut self,
        observed_seconds: f64,
        duration_seconds: f64,
    ) -> Result<ProgressSample, SafetrainError> {
        let sample = self
            .tracker
            .record(&self.db, observed_seconds, duration_seconds)
            .await?;
        if sample.quiz_unlocked {
            self.quiz.unlock();
            info!(
                user_id = %self.user_id,
                lesson_id = %self.lesson_id,
                percentage = sample.percentage,
                "quiz unlocked"
            );
        }
        Ok(sample)
    }

    /// Submit a quiz answer. On a pass, resolves completion and returns the
    /// full completion result.
    pub async fn answer(
        &mut self,
        question_index: usize,
        value: bool,
    ) -> Result<SessionAnswer, SafetrainError> {
        match self.quiz.answer(question_index, value)? {
            AnswerOutcome::Advanced { next_index } => {
                Ok(SessionAnswer::Advanced { next_index })
            }
            AnswerOutcome::Reset => {
                info!(
                    user_id = %self.user_id,
                    lesson_id = %self.lesson_id,
                    "quiz failed; sequence reset for retry"
                );
                Ok(SessionAnswer::Reset)
            }
            AnswerOutcome::Passed => {
                let completion = self
                    .resolver
                    .complete_lesson(&self.user_id, &self.lesson_id)
                    .await?;
                Ok(SessionAnswer::Completed(Box::new(completion)))
            }
        }
    }

    /// Flush the latest observed percentage on lesson exit.
    pub async fn finish(&mut self) -> Result<Option<LessonProgress>, SafetrainError> {
        self.tracker.flush(&self.db).await
    }
}
