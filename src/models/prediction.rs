use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user's score guess for one match. The derived columns are owned by the
/// scoring engine once the match finishes; until then they are NULL and the
/// prediction reads as "not yet scored".
#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct Prediction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub match_id: Uuid,
    pub predicted_home: i32,
    pub predicted_away: i32,
    pub points_earned: Option<i32>,
    pub is_exact_score: Option<bool>,
    pub is_correct_outcome: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Prediction {
    pub fn is_scored(&self) -> bool {
        self.points_earned.is_some()
    }
}

/// Freshly computed derived values for one prediction. Written over whatever
/// is currently stored, never added to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredFields {
    pub points_earned: i32,
    pub is_exact_score: bool,
    pub is_correct_outcome: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitPredictionRequest {
    pub match_id: Uuid,
    pub predicted_home: i32,
    pub predicted_away: i32,
}
