use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::matches::Stage;

/// Per-stage scoring rule: points for a spot-on scoreline and points for
/// merely picking the right winner/draw.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct ScoringRule {
    pub stage: Stage,
    pub exact_score_points: i32,
    pub correct_outcome_points: i32,
    pub updated_at: DateTime<Utc>,
}

impl ScoringRule {
    /// Rule table invariant: exact >= correct >= 0.
    pub fn is_valid(&self) -> bool {
        self.exact_score_points >= self.correct_outcome_points && self.correct_outcome_points >= 0
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpsertRuleRequest {
    pub exact_score_points: i32,
    pub correct_outcome_points: i32,
}
