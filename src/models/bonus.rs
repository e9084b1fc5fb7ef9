use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Bonus question ("who lifts the trophy?"). Settled once by an admin;
/// settlement awards the question's points to every matching answer.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct BonusQuestion {
    pub id: Uuid,
    pub question: String,
    pub points: i32,
    pub correct_option: Option<String>,
    pub settled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct BonusAnswer {
    pub id: Uuid,
    pub question_id: Uuid,
    pub user_id: Uuid,
    pub chosen_option: String,
    pub awarded_points: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettleBonusRequest {
    pub correct_option: String,
}
