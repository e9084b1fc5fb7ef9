use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::prediction::Prediction;
use crate::models::stats::{GroupStatistics, UserStatistics};
use crate::scoring::errors::{RefreshScope, ScoringError};
use crate::scoring::locks::KeyedLocks;
use crate::scoring::store::{StoreError, TournamentStore};

/// Aggregate a user's scored predictions into a statistics row.
///
/// Pure function over the authoritative prediction set: totals are summed
/// from scratch, never derived from a previous row. A prediction of a
/// finished match that the engine has not reached yet (crash window)
/// contributes zero points and false flags, which reads the same as a
/// scored zero-point guess and is internally consistent either way.
pub fn compute_user_statistics(
    user_id: Uuid,
    finished_predictions: &[Prediction],
    bonus_points: i32,
    now: DateTime<Utc>,
) -> UserStatistics {
    let prediction_points: i32 = finished_predictions
        .iter()
        .filter_map(|prediction| prediction.points_earned)
        .sum();
    let exact_score_count = finished_predictions
        .iter()
        .filter(|prediction| prediction.is_exact_score == Some(true))
        .count() as i32;
    let correct_outcome_count = finished_predictions
        .iter()
        .filter(|prediction| prediction.is_correct_outcome == Some(true))
        .count() as i32;

    UserStatistics {
        user_id,
        total_points: prediction_points + bonus_points,
        exact_score_count,
        correct_outcome_count,
        predictions_made: finished_predictions.len() as i32,
        bonus_points,
        updated_at: now,
    }
}

/// Aggregate the members' statistics rows into a group row. Division is
/// guarded: an empty group averages to zero instead of erroring.
pub fn compute_group_statistics(
    group_id: Uuid,
    member_stats: &[UserStatistics],
    now: DateTime<Utc>,
) -> GroupStatistics {
    let participant_count = member_stats.len() as i32;
    let total_points: i32 = member_stats.iter().map(|stats| stats.total_points).sum();
    let average_points = if participant_count == 0 {
        0.0
    } else {
        total_points as f64 / participant_count as f64
    };

    GroupStatistics {
        group_id,
        total_points,
        average_points,
        participant_count,
        updated_at: now,
    }
}

/// Recomputes user and group statistics from the authoritative scored
/// prediction set and replaces the stored rows.
///
/// Refreshes of the same user (or group) are serialized through a per-key
/// mutex; refreshes of unrelated keys run in parallel.
pub struct StatisticsMaintainer {
    store: Arc<dyn TournamentStore>,
    user_locks: KeyedLocks,
    group_locks: KeyedLocks,
}

impl StatisticsMaintainer {
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self {
            store,
            user_locks: KeyedLocks::new(),
            group_locks: KeyedLocks::new(),
        }
    }

    #[tracing::instrument(name = "Refresh user statistics", skip(self))]
    pub async fn refresh_user_statistics(
        &self,
        user_id: Uuid,
    ) -> Result<UserStatistics, ScoringError> {
        let lock = self.user_locks.lock_for(user_id).await;
        let _guard = lock.lock().await;

        let finished = self
            .store
            .finished_predictions_for_user(user_id)
            .await
            .map_err(|source| refresh_failure(RefreshScope::User(user_id), source))?;
        let bonus_points = self
            .store
            .bonus_points_for_user(user_id)
            .await
            .map_err(|source| refresh_failure(RefreshScope::User(user_id), source))?;

        let stats = compute_user_statistics(user_id, &finished, bonus_points, Utc::now());
        self.store
            .replace_user_statistics(&stats)
            .await
            .map_err(|source| refresh_failure(RefreshScope::User(user_id), source))?;

        tracing::debug!(
            "Refreshed statistics for user {}: {} points over {} predictions",
            user_id,
            stats.total_points,
            stats.predictions_made
        );
        Ok(stats)
    }

    #[tracing::instrument(name = "Refresh group statistics", skip(self))]
    pub async fn refresh_group_statistics(
        &self,
        group_id: Uuid,
    ) -> Result<GroupStatistics, ScoringError> {
        let lock = self.group_locks.lock_for(group_id).await;
        let _guard = lock.lock().await;

        let members = self
            .store
            .member_statistics_for_group(group_id)
            .await
            .map_err(|source| refresh_failure(RefreshScope::Group(group_id), source))?;

        let stats = compute_group_statistics(group_id, &members, Utc::now());
        self.store
            .replace_group_statistics(&stats)
            .await
            .map_err(|source| refresh_failure(RefreshScope::Group(group_id), source))?;

        tracing::debug!(
            "Refreshed statistics for group {}: {} points across {} participants",
            group_id,
            stats.total_points,
            stats.participant_count
        );
        Ok(stats)
    }
}

fn refresh_failure(scope: RefreshScope, source: StoreError) -> ScoringError {
    ScoringError::AggregateRefreshFailure { scope, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::prediction::Prediction;

    fn scored_prediction(user_id: Uuid, points: i32, exact: bool, correct: bool) -> Prediction {
        let now = Utc::now();
        Prediction {
            id: Uuid::new_v4(),
            user_id,
            match_id: Uuid::new_v4(),
            predicted_home: 1,
            predicted_away: 0,
            points_earned: Some(points),
            is_exact_score: Some(exact),
            is_correct_outcome: Some(correct),
            created_at: now,
            updated_at: now,
        }
    }

    fn stats_row(user_id: Uuid, total_points: i32) -> UserStatistics {
        UserStatistics {
            user_id,
            total_points,
            exact_score_count: 0,
            correct_outcome_count: 0,
            predictions_made: 0,
            bonus_points: 0,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn user_statistics_sum_from_scratch() {
        let user_id = Uuid::new_v4();
        let predictions = vec![
            scored_prediction(user_id, 5, true, true),
            scored_prediction(user_id, 3, false, true),
            scored_prediction(user_id, 0, false, false),
        ];

        let stats = compute_user_statistics(user_id, &predictions, 10, Utc::now());
        assert_eq!(stats.total_points, 18);
        assert_eq!(stats.exact_score_count, 1);
        assert_eq!(stats.correct_outcome_count, 2);
        assert_eq!(stats.predictions_made, 3);
        assert_eq!(stats.bonus_points, 10);
    }

    #[test]
    fn unscored_prediction_contributes_nothing_but_is_counted() {
        let user_id = Uuid::new_v4();
        let mut pending = scored_prediction(user_id, 0, false, false);
        pending.points_earned = None;
        pending.is_exact_score = None;
        pending.is_correct_outcome = None;
        let predictions = vec![scored_prediction(user_id, 5, true, true), pending];

        let stats = compute_user_statistics(user_id, &predictions, 0, Utc::now());
        assert_eq!(stats.total_points, 5);
        assert_eq!(stats.exact_score_count, 1);
        assert_eq!(stats.predictions_made, 2);
    }

    #[test]
    fn empty_group_averages_to_zero() {
        let stats = compute_group_statistics(Uuid::new_v4(), &[], Utc::now());
        assert_eq!(stats.total_points, 0);
        assert_eq!(stats.average_points, 0.0);
        assert_eq!(stats.participant_count, 0);
    }

    #[test]
    fn group_average_is_total_over_participants() {
        let group_id = Uuid::new_v4();
        let members = vec![
            stats_row(Uuid::new_v4(), 10),
            stats_row(Uuid::new_v4(), 5),
            stats_row(Uuid::new_v4(), 0),
        ];

        let stats = compute_group_statistics(group_id, &members, Utc::now());
        assert_eq!(stats.total_points, 15);
        assert_eq!(stats.participant_count, 3);
        assert!((stats.average_points - 5.0).abs() < f64::EPSILON);
    }
}
