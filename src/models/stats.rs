use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Derived per-user aggregate. Always equals the aggregation of the user's
/// scored predictions plus bonus points; replaced wholesale on refresh.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserStatistics {
    pub user_id: Uuid,
    pub total_points: i32,
    pub exact_score_count: i32,
    pub correct_outcome_count: i32,
    pub predictions_made: i32,
    pub bonus_points: i32,
    pub updated_at: DateTime<Utc>,
}

/// Derived per-group aggregate over the members' UserStatistics rows.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct GroupStatistics {
    pub group_id: Uuid,
    pub total_points: i32,
    pub average_points: f64,
    pub participant_count: i32,
    pub updated_at: DateTime<Utc>,
}

/// Leaderboard input row: a user's profile joined with their (possibly
/// absent, then all-zero) statistics.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct UserStandingRow {
    pub user_id: Uuid,
    pub username: String,
    pub group_id: Option<Uuid>,
    pub registered_at: DateTime<Utc>,
    pub total_points: i32,
    pub exact_score_count: i32,
    pub correct_outcome_count: i32,
    pub predictions_made: i32,
    pub bonus_points: i32,
}

/// Leaderboard input row for groups.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct GroupStandingRow {
    pub group_id: Uuid,
    pub group_name: String,
    pub total_points: i32,
    pub average_points: f64,
    pub participant_count: i32,
}
