// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Watch-progress tracking for one (user, lesson) viewing session.
//!
//! Converts raw playback telemetry (elapsed/duration) into a monotonic watch
//! percentage. The percentage math is a pure function callable from any
//! transport -- player polling, push events, or a test harness. Persistence
//! is throttled to multiples of the configured sampling granularity to bound
//! write volume; [`WatchTracker::flush`] writes the true latest value on
//! lesson exit.

use safetrain_config::model::ProgressConfig;
use safetrain_core::{LessonProgress, SafetrainError};
use safetrain_storage::queries::progress;
use safetrain_storage::Database;
use tracing::debug;

/// Outcome of feeding one telemetry sample to the tracker.
#[derive(Debug, Clone)]
pub struct ProgressSample {
    /// The computed watch percentage for this sample.
    pub percentage: u8,
    /// The persisted row, when this sample hit the sampling granularity.
    pub persisted: Option<LessonProgress>,
    /// True exactly once per session: the first sample at or above the
    /// completion threshold. The caller unlocks the quiz gate on this edge.
    pub quiz_unlocked: bool,
}

/// Compute a watch percentage from raw telemetry.
///
/// Floors the ratio and clamps to 0..=100. Fails with
/// [`SafetrainError::InvalidMediaState`] when the duration is not positive;
/// the caller drops the sample without persisting anything.
pub fn watch_percentage(
    observed_seconds: f64,
    duration_seconds: f64,
) -> Result<u8, SafetrainError> {
    if duration_seconds <= 0.0 || !duration_seconds.is_finite() || !observed_seconds.is_finite() {
        return Err(SafetrainError::InvalidMediaState {
            duration_seconds,
        });
    }
    let pct = (observed_seconds / duration_seconds * 100.0).floor();
    Ok(pct.clamp(0.0, 100.0) as u8)
}

/// Session-scoped progress tracker for one (user, lesson) pair.
pub struct WatchTracker {
    user_id: String,
    lesson_id: String,
    completion_threshold: u8,
    sampling_granularity: u8,
    /// Highest percentage observed this session.
    highest_observed: u8,
    /// Last percentage actually written, to skip redundant writes.
    last_persisted: Option<u8>,
    /// Whether the quiz-unlock edge already fired this session.
    unlock_fired: bool,
}

impl WatchTracker {
    pub fn new(user_id: &str, lesson_id: &str, config: &ProgressConfig) -> Self {
        Self {
            user_id: user_id.to_string(),
            lesson_id: lesson_id.to_string(),
            completion_threshold: config.completion_threshold,
            sampling_granularity: config.sampling_granularity,
            highest_observed: 0,
            last_persisted: None,
            unlock_fired: false,
        }
    }

    /// Restore session state from a persisted progress row, so reopening a
    /// partially watched lesson does not re-fire the unlock edge spuriously
    /// low or persist a lower percentage.
    pub fn resume_from(&mut self, persisted: &LessonProgress) {
        self.highest_observed = persisted.watched_percentage;
        self.last_persisted = Some(persisted.watched_percentage);
        if persisted.watched_percentage >= self.completion_threshold {
            self.unlock_fired = true;
        }
    }

    /// Highest percentage observed this session.
    pub fn highest_observed(&self) -> u8 {
        self.highest_observed
    }

    /// Feed one playback telemetry sample.
    ///
    /// Persists when the percentage lands on the sampling granularity and
    /// advances past the last write. Reports the quiz-unlock edge the first
    /// time the completion threshold is crossed this session.
    pub async fn record(
        &mut self,
        db: &Database,
        observed_seconds: f64,
        duration_seconds: f64,
    ) -> Result<ProgressSample, SafetrainError> {
        let percentage = watch_percentage(observed_seconds, duration_seconds)?;
        if percentage > self.highest_observed {
            self.highest_observed = percentage;
        }

        let should_persist = percentage % self.sampling_granularity == 0
            && self.last_persisted != Some(self.highest_observed);
        let persisted = if should_persist {
            let row = progress::upsert_watched(
                db,
                &self.user_id,
                &self.lesson_id,
                self.highest_observed,
            )
            .await?;
            self.last_persisted = Some(self.highest_observed);
            Some(row)
        } else {
            debug!(
                user_id = %self.user_id,
                lesson_id = %self.lesson_id,
                percentage,
                "sample throttled"
            );
            None
        };

        let quiz_unlocked = percentage >= self.completion_threshold && !self.unlock_fired;
        if quiz_unlocked {
            self.unlock_fired = true;
        }

        Ok(ProgressSample {
            percentage,
            persisted,
            quiz_unlocked,
        })
    }

    /// Persist the highest observed percentage regardless of granularity.
    ///
    /// Called on lesson exit so the stored row reflects the true latest
    /// progress even when the last sample fell between sampling points.
    pub async fn flush(&mut self, db: &Database) -> Result<Option<LessonProgress>, SafetrainError> {
        if self.last_persisted == Some(self.highest_observed) || self.highest_observed == 0 {
            return Ok(None);
        }
        let row = progress::upsert_watched(
            db,
            &self.user_id,
            &self.lesson_id,
            self.highest_observed,
        )
        .await?;
        self.last_persisted = Some(self.highest_observed);
        Ok(Some(row))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn config() -> ProgressConfig {
        ProgressConfig::default()
    }

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[test]
    fn zero_duration_is_invalid_media_state() {
        let err = watch_percentage(10.0, 0.0).unwrap_err();
        assert!(matches!(err, SafetrainError::InvalidMediaState { .. }));
        assert!(watch_percentage(10.0, -3.0).is_err());
    }

    #[test]
    fn percentage_floors_and_clamps() {
        assert_eq!(watch_percentage(0.0, 120.0).unwrap(), 0);
        assert_eq!(watch_percentage(59.9, 120.0).unwrap(), 49);
        assert_eq!(watch_percentage(120.0, 120.0).unwrap(), 100);
        // Player reports can overshoot the duration slightly.
        assert_eq!(watch_percentage(125.0, 120.0).unwrap(), 100);
        assert_eq!(watch_percentage(-1.0, 120.0).unwrap(), 0);
    }

    proptest! {
        #[test]
        fn percentage_always_in_range(observed in 0.0f64..100_000.0, duration in 0.001f64..100_000.0) {
            let pct = watch_percentage(observed, duration).unwrap();
            prop_assert!(pct <= 100);
        }
    }

    #[tokio::test]
    async fn persists_only_on_granularity_multiples() {
        let (db, _dir) = setup_db().await;
        let mut tracker = WatchTracker::new("u-1", "l-1", &config());

        // 3% is off-granularity: nothing written.
        let sample = tracker.record(&db, 3.0, 100.0).await.unwrap();
        assert!(sample.persisted.is_none());
        assert!(
            progress::get_lesson_progress(&db, "u-1", "l-1")
                .await
                .unwrap()
                .is_none()
        );

        // 5% lands on the granularity.
        let sample = tracker.record(&db, 5.0, 100.0).await.unwrap();
        assert_eq!(sample.persisted.unwrap().watched_percentage, 5);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn repeated_sample_at_same_percentage_writes_once() {
        let (db, _dir) = setup_db().await;
        let mut tracker = WatchTracker::new("u-1", "l-1", &config());

        let first = tracker.record(&db, 10.0, 100.0).await.unwrap();
        assert!(first.persisted.is_some());
        let second = tracker.record(&db, 10.2, 100.0).await.unwrap();
        assert!(second.persisted.is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unlock_edge_fires_exactly_once() {
        let (db, _dir) = setup_db().await;
        let mut tracker = WatchTracker::new("u-1", "l-1", &config());

        let below = tracker.record(&db, 89.0, 100.0).await.unwrap();
        assert!(!below.quiz_unlocked);

        let at = tracker.record(&db, 90.0, 100.0).await.unwrap();
        assert!(at.quiz_unlocked);

        let after = tracker.record(&db, 95.0, 100.0).await.unwrap();
        assert!(!after.quiz_unlocked);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn flush_persists_off_granularity_value() {
        let (db, _dir) = setup_db().await;
        let mut tracker = WatchTracker::new("u-1", "l-1", &config());

        tracker.record(&db, 40.0, 100.0).await.unwrap();
        tracker.record(&db, 43.0, 100.0).await.unwrap();

        let flushed = tracker.flush(&db).await.unwrap().unwrap();
        assert_eq!(flushed.watched_percentage, 43);

        // Nothing new to write: flush is a no-op.
        assert!(tracker.flush(&db).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn resume_does_not_refire_unlock() {
        let (db, _dir) = setup_db().await;
        let persisted = progress::upsert_watched(&db, "u-1", "l-1", 92).await.unwrap();

        let mut tracker = WatchTracker::new("u-1", "l-1", &config());
        tracker.resume_from(&persisted);

        let sample = tracker.record(&db, 95.0, 100.0).await.unwrap();
        assert!(!sample.quiz_unlocked);
        assert_eq!(tracker.highest_observed(), 95);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn bad_telemetry_drops_sample_without_persisting() {
        let (db, _dir) = setup_db().await;
        let mut tracker = WatchTracker::new("u-1", "l-1", &config());

        assert!(tracker.record(&db, 10.0, 0.0).await.is_err());
        assert!(
            progress::get_lesson_progress(&db, "u-1", "l-1")
                .await
                .unwrap()
                .is_none()
        );
        db.close().await.unwrap();
    }
}
