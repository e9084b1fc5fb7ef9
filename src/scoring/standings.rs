use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::stats::{GroupStandingRow, UserStandingRow};
use crate::scoring::errors::ScoringError;
use crate::scoring::store::TournamentStore;

/// Individual leaderboard entry with its absolute rank.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RankedUser {
    pub rank: i32,
    pub user_id: Uuid,
    pub username: String,
    pub total_points: i32,
    pub exact_score_count: i32,
    pub correct_outcome_count: i32,
    pub predictions_made: i32,
    pub bonus_points: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RankedGroup {
    pub rank: i32,
    pub group_id: Uuid,
    pub group_name: String,
    pub total_points: i32,
    pub average_points: f64,
    pub participant_count: i32,
}

/// One page of the individual leaderboard. Rank numbers are positions in the
/// fully sorted sequence, not positions within the page.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserLeaderboard {
    pub entries: Vec<RankedUser>,
    pub total_count: usize,
    pub limit: i64,
    pub offset: i64,
}

/// Sort users by the fixed tie-break order and assign dense 1-based ranks.
///
/// Keys, descending unless noted: total points, exact-score count,
/// correct-outcome count, then registration time ascending so that
/// equal-everything users keep a stable, reproducible order. User id is the
/// last resort for simultaneous registrations; tied keys still get distinct
/// consecutive ranks.
pub fn rank_users(mut rows: Vec<UserStandingRow>) -> Vec<RankedUser> {
    rows.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| b.exact_score_count.cmp(&a.exact_score_count))
            .then_with(|| b.correct_outcome_count.cmp(&a.correct_outcome_count))
            .then_with(|| a.registered_at.cmp(&b.registered_at))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| RankedUser {
            rank: (index + 1) as i32,
            user_id: row.user_id,
            username: row.username,
            total_points: row.total_points,
            exact_score_count: row.exact_score_count,
            correct_outcome_count: row.correct_outcome_count,
            predictions_made: row.predictions_made,
            bonus_points: row.bonus_points,
        })
        .collect()
}

/// Sort groups (total points, average points, participant count, all
/// descending; group id ascending last) and assign dense ranks.
pub fn rank_groups(mut rows: Vec<GroupStandingRow>) -> Vec<RankedGroup> {
    rows.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| {
                b.average_points
                    .partial_cmp(&a.average_points)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| b.participant_count.cmp(&a.participant_count))
            .then_with(|| a.group_id.cmp(&b.group_id))
    });

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| RankedGroup {
            rank: (index + 1) as i32,
            group_id: row.group_id,
            group_name: row.group_name,
            total_points: row.total_points,
            average_points: row.average_points,
            participant_count: row.participant_count,
        })
        .collect()
}

/// Produces ordered leaderboards over the maintained aggregates. Always
/// reads current rows; holds no state of its own.
pub struct StandingsRanker {
    store: Arc<dyn TournamentStore>,
}

impl StandingsRanker {
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self { store }
    }

    /// Ranked individuals, optionally filtered by a case-insensitive
    /// username substring. Ranks are assigned before the filter and the
    /// pagination, so a filtered view keeps global rank numbers.
    pub async fn rank_individuals(
        &self,
        name_filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<UserLeaderboard, ScoringError> {
        let rows = self.store.user_standing_rows().await?;
        let ranked = rank_users(rows);

        let filtered: Vec<RankedUser> = match name_filter {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                ranked
                    .into_iter()
                    .filter(|entry| entry.username.to_lowercase().contains(&needle))
                    .collect()
            }
            _ => ranked,
        };

        let total_count = filtered.len();
        let entries = filtered
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok(UserLeaderboard {
            entries,
            total_count,
            limit,
            offset,
        })
    }

    pub async fn rank_groups(&self) -> Result<Vec<RankedGroup>, ScoringError> {
        let rows = self.store.group_standing_rows().await?;
        Ok(rank_groups(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn row(
        username: &str,
        total: i32,
        exact: i32,
        correct: i32,
        registered_offset_hours: i64,
    ) -> UserStandingRow {
        UserStandingRow {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            group_id: None,
            registered_at: Utc::now() + Duration::hours(registered_offset_hours),
            total_points: total,
            exact_score_count: exact,
            correct_outcome_count: correct,
            predictions_made: 0,
            bonus_points: 0,
        }
    }

    #[test]
    fn orders_by_points_then_exact_then_outcome() {
        let ranked = rank_users(vec![
            row("carol", 10, 1, 2, 0),
            row("alice", 12, 0, 0, 0),
            row("bob", 10, 2, 2, 0),
        ]);

        let names: Vec<&str> = ranked.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
        assert_eq!(
            ranked.iter().map(|e| e.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn full_ties_fall_back_to_registration_time() {
        let early = row("early", 10, 1, 1, 0);
        let late = row("late", 10, 1, 1, 5);
        let ranked = rank_users(vec![late, early]);

        assert_eq!(ranked[0].username, "early");
        assert_eq!(ranked[1].username, "late");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn tied_users_still_get_distinct_consecutive_ranks() {
        let ranked = rank_users(vec![
            row("a", 7, 1, 1, 0),
            row("b", 7, 1, 1, 1),
            row("c", 7, 1, 1, 2),
        ]);
        assert_eq!(
            ranked.iter().map(|e| e.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn group_ranking_uses_average_as_second_key() {
        let smaller = GroupStandingRow {
            group_id: Uuid::new_v4(),
            group_name: "smaller".to_string(),
            total_points: 20,
            average_points: 10.0,
            participant_count: 2,
        };
        let larger = GroupStandingRow {
            group_id: Uuid::new_v4(),
            group_name: "larger".to_string(),
            total_points: 20,
            average_points: 5.0,
            participant_count: 4,
        };

        let ranked = rank_groups(vec![larger, smaller]);
        assert_eq!(ranked[0].group_name, "smaller");
        assert_eq!(ranked[1].group_name, "larger");
    }
}
