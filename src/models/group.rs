use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Organizational group (department). Membership is managed externally via
/// users.group_id.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
