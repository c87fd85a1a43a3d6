// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gamification ledger: idempotent point awards, level recompute, badges.
//!
//! An award is keyed by (user, activity, subject); a repeated call with the
//! same key is a silent no-op returning the unchanged account. The ledger is
//! purely additive -- it never decreases points or removes badges.

use std::sync::Arc;

use safetrain_core::{
    ActivityType, GamificationAccount, PointAward, SafetrainError, now_iso,
};
use safetrain_storage::Database;
use safetrain_storage::queries::gamification;
use tracing::{debug, info};

/// Badge name for five distinct lesson completions.
pub const LEARNER_BADGE: &str = "learner";
/// Badge name for the first course completion.
pub const EXPERT_BADGE: &str = "expert";

/// One row of the badge threshold table: grant `badge` once the count of
/// recorded `activity` awards reaches `min_count`.
#[derive(Debug, Clone, Copy)]
pub struct BadgePolicy {
    pub badge: &'static str,
    pub activity: ActivityType,
    pub min_count: u32,
}

/// The badge policy table, evaluated after every applied award.
pub const BADGE_POLICIES: &[BadgePolicy] = &[
    BadgePolicy {
        badge: LEARNER_BADGE,
        activity: ActivityType::LessonCompleted,
        min_count: 5,
    },
    BadgePolicy {
        badge: EXPERT_BADGE,
        activity: ActivityType::CourseCompleted,
        min_count: 1,
    },
];

/// Persistent, idempotent point ledger over the shared database.
pub struct GamificationLedger {
    db: Arc<Database>,
}

impl GamificationLedger {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Award points for a qualifying event, exactly once per
    /// (user, activity, subject) occurrence.
    ///
    /// On a duplicate the account is returned unchanged -- idempotent by
    /// construction, not by error. The award record and the points credit
    /// commit atomically in storage, so a crash can never leave the key
    /// without its points. On an applied award the badge policy table is
    /// evaluated afterwards.
    pub async fn award(
        &self,
        user_id: &str,
        activity_type: ActivityType,
        points: u32,
        subject_id: &str,
    ) -> Result<GamificationAccount, SafetrainError> {
        let award = PointAward {
            user_id: user_id.to_string(),
            activity_type,
            subject_id: subject_id.to_string(),
            points,
            created_at: now_iso(),
        };

        let (mut account, applied) = gamification::apply_award(&self.db, &award).await?;
        if !applied {
            debug!(
                user_id,
                activity = %activity_type,
                subject_id,
                "duplicate award ignored"
            );
            return Ok(account);
        }

        info!(
            user_id,
            activity = %activity_type,
            subject_id,
            points,
            total = account.points,
            level = account.level,
            "points awarded"
        );

        for policy in BADGE_POLICIES {
            if policy.activity != activity_type {
                continue;
            }
            let count =
                gamification::count_awards(&self.db, user_id, policy.activity).await?;
            if count >= policy.min_count && !account.badges.contains(policy.badge) {
                account = gamification::grant_badge(&self.db, user_id, policy.badge).await?;
                info!(user_id, badge = policy.badge, "badge granted");
            }
        }

        Ok(account)
    }

    /// Current account snapshot, or a fresh zero account if none exists yet.
    pub async fn account(&self, user_id: &str) -> Result<GamificationAccount, SafetrainError> {
        Ok(gamification::get_account(&self.db, user_id)
            .await?
            .unwrap_or_else(|| GamificationAccount::new(user_id.to_string())))
    }

    /// Leaderboard snapshot: top accounts by points.
    pub async fn leaderboard(
        &self,
        limit: u32,
    ) -> Result<Vec<GamificationAccount>, SafetrainError> {
        gamification::top_accounts(&self.db, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (GamificationLedger, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Arc::new(Database::open(db_path.to_str().unwrap()).await.unwrap());
        (GamificationLedger::new(db), dir)
    }

    #[tokio::test]
    async fn repeated_award_credits_once() {
        let (ledger, _dir) = setup().await;

        let first = ledger
            .award("u-1", ActivityType::LessonCompleted, 10, "l-1")
            .await
            .unwrap();
        assert_eq!(first.points, 10);

        let second = ledger
            .award("u-1", ActivityType::LessonCompleted, 10, "l-1")
            .await
            .unwrap();
        assert_eq!(second.points, 10);
    }

    #[tokio::test]
    async fn distinct_subjects_accumulate() {
        let (ledger, _dir) = setup().await;
        ledger
            .award("u-1", ActivityType::LessonCompleted, 10, "l-1")
            .await
            .unwrap();
        let account = ledger
            .award("u-1", ActivityType::LessonCompleted, 10, "l-2")
            .await
            .unwrap();
        assert_eq!(account.points, 20);
    }

    #[tokio::test]
    async fn learner_badge_at_five_distinct_lessons() {
        let (ledger, _dir) = setup().await;
        for i in 1..=4 {
            let account = ledger
                .award("u-1", ActivityType::LessonCompleted, 10, &format!("l-{i}"))
                .await
                .unwrap();
            assert!(!account.badges.contains(LEARNER_BADGE));
        }

        let account = ledger
            .award("u-1", ActivityType::LessonCompleted, 10, "l-5")
            .await
            .unwrap();
        assert!(account.badges.contains(LEARNER_BADGE));

        // A sixth completion does not duplicate the badge.
        let account = ledger
            .award("u-1", ActivityType::LessonCompleted, 10, "l-6")
            .await
            .unwrap();
        assert_eq!(
            account.badges.iter().filter(|b| *b == LEARNER_BADGE).count(),
            1
        );
    }

    #[tokio::test]
    async fn expert_badge_on_first_course_completion() {
        let (ledger, _dir) = setup().await;
        let account = ledger
            .award("u-1", ActivityType::CourseCompleted, 50, "c-1")
            .await
            .unwrap();
        assert!(account.badges.contains(EXPERT_BADGE));
        assert_eq!(account.points, 50);
    }

    #[tokio::test]
    async fn checklist_and_video_awards_flow_through_same_path() {
        let (ledger, _dir) = setup().await;
        ledger
            .award("u-1", ActivityType::ChecklistCompleted, 15, "chk-1")
            .await
            .unwrap();
        let account = ledger
            .award("u-1", ActivityType::VideoLiked, 2, "vid-1")
            .await
            .unwrap();
        assert_eq!(account.points, 17);
        assert!(account.badges.is_empty());
    }

    #[tokio::test]
    async fn account_for_unknown_user_is_fresh() {
        let (ledger, _dir) = setup().await;
        let account = ledger.account("nobody").await.unwrap();
        assert_eq!(account.points, 0);
        assert_eq!(account.level, 1);
    }
}
