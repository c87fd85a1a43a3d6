// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-lesson comprehension quiz gate.
//!
//! A small FSM: `Locked -> Active -> Passed`. The gate unlocks when the
//! watch percentage crosses the completion threshold. Questions are a fixed
//! ordered sequence of yes/no affirmative-confidence prompts, answered one
//! at a time; all answers must be `true` to pass. A `false` anywhere resets
//! the sequence and the learner retries from the top -- unlimited retries,
//! no persisted record of failed attempts.

use safetrain_core::SafetrainError;

/// One yes/no comprehension question.
#[derive(Debug, Clone)]
pub struct QuizQuestion {
    pub prompt: String,
}

/// Gate state. `Passed` is terminal for the session.
///
/// There is no resting `Failed` state: a failed final answer resets the
/// sequence and the gate remains `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    /// Quiz not yet available; watch threshold not crossed.
    Locked,
    /// Questions are being presented.
    Active,
    /// All questions answered affirmatively.
    Passed,
}

impl std::fmt::Display for QuizState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizState::Locked => write!(f, "locked"),
            QuizState::Active => write!(f, "active"),
            QuizState::Passed => write!(f, "passed"),
        }
    }
}

/// Outcome of submitting one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Answer accepted; present the question at `next_index`.
    Advanced { next_index: usize },
    /// Final answer accepted and every answer was `true`.
    Passed,
    /// At least one answer was `false`: sequence reset to the start,
    /// gate remains active for a retry.
    Reset,
}

/// The quiz gate FSM for one lesson session.
#[derive(Debug, Clone)]
pub struct QuizGate {
    questions: Vec<QuizQuestion>,
    state: QuizState,
    next_index: usize,
    answers: Vec<bool>,
}

impl QuizGate {
    /// Create a locked gate over a fixed question sequence (at least one).
    pub fn new(questions: Vec<QuizQuestion>) -> Result<Self, SafetrainError> {
        if questions.is_empty() {
            return Err(SafetrainError::Internal(
                "quiz gate requires at least one question".to_string(),
            ));
        }
        Ok(Self {
            questions,
            state: QuizState::Locked,
            next_index: 0,
            answers: Vec::new(),
        })
    }

    /// The standard three-question comprehension check every lesson carries.
    pub fn standard_questions() -> Vec<QuizQuestion> {
        [
            "Did you understand the content presented?",
            "Was the information clear and objective?",
            "Do you feel confident applying this knowledge?",
        ]
        .iter()
        .map(|prompt| QuizQuestion {
            prompt: (*prompt).to_string(),
        })
        .collect()
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    /// The question the learner should answer next, while active.
    pub fn current_question(&self) -> Option<(usize, &QuizQuestion)> {
        if self.state == QuizState::Active {
            self.questions
                .get(self.next_index)
                .map(|q| (self.next_index, q))
        } else {
            None
        }
    }

    /// `Locked -> Active`. No-op when already active or passed.
    pub fn unlock(&mut self) {
        if self.state == QuizState::Locked {
            self.state = QuizState::Active;
        }
    }

    /// Re-derive `Passed` from a persisted completion flag, skipping the
    /// quiz when the learner re-enters an already completed lesson.
    pub fn resume_completed(&mut self) {
        self.state = QuizState::Passed;
    }

    /// Submit the answer for `question_index`.
    ///
    /// Valid only while `Active` and only for the expected index; anything
    /// else fails with [`SafetrainError::SequenceViolation`] and leaves the
    /// gate state untouched.
    pub fn answer(
        &mut self,
        question_index: usize,
        value: bool,
    ) -> Result<AnswerOutcome, SafetrainError> {
        if self.state != QuizState::Active || question_index != self.next_index {
            return Err(SafetrainError::SequenceViolation {
                expected: self.next_index,
                got: question_index,
            });
        }

        self.answers.push(value);
        self.next_index += 1;

        if self.next_index < self.questions.len() {
            return Ok(AnswerOutcome::Advanced {
                next_index: self.next_index,
            });
        }

        // Final answer: all-or-nothing evaluation.
        if self.answers.iter().all(|&a| a) {
            self.state = QuizState::Passed;
            Ok(AnswerOutcome::Passed)
        } else {
            self.next_index = 0;
            self.answers.clear();
            Ok(AnswerOutcome::Reset)
        }
    }
}
