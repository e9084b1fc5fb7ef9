// src/models/matches.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Tournament stages in bracket order. The ordering matters: rule lookup is
/// keyed by stage and the UI sorts fixtures by stage progression.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type,
)]
#[sqlx(type_name = "varchar", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Group,
    RoundOf32,
    RoundOf16,
    Quarter,
    Semi,
    ThirdPlace,
    Final,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Group => "group",
            Stage::RoundOf32 => "round-of-32",
            Stage::RoundOf16 => "round-of-16",
            Stage::Quarter => "quarter",
            Stage::Semi => "semi",
            Stage::ThirdPlace => "third-place",
            Stage::Final => "final",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "group" => Some(Stage::Group),
            "round-of-32" => Some(Stage::RoundOf32),
            "round-of-16" => Some(Stage::RoundOf16),
            "quarter" => Some(Stage::Quarter),
            "semi" => Some(Stage::Semi),
            "third-place" => Some(Stage::ThirdPlace),
            "final" => Some(Stage::Final),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One-way status progression: scheduled -> live -> finished. Finished is
/// terminal for scoring purposes.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Finished,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Finished => "finished",
        }
    }
}

/// Fixture row. Team references are nullable because knockout participants
/// may still be undetermined; scores are non-null exactly when status is
/// finished.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct Match {
    pub id: Uuid,
    pub stage: Stage,
    pub home_team_id: Option<Uuid>,
    pub away_team_id: Option<Uuid>,
    pub kickoff_time: DateTime<Utc>,
    pub status: MatchStatus,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    /// The recorded result, present only for finished matches.
    pub fn result(&self) -> Option<(i32, i32)> {
        match (self.status, self.home_score, self.away_score) {
            (MatchStatus::Finished, Some(home), Some(away)) => Some((home, away)),
            _ => None,
        }
    }
}

/// Fixture with resolved team names for the listing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct MatchWithTeams {
    #[serde(flatten)]
    pub fixture: Match,
    pub home_team_name: Option<String>,
    pub away_team_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordResultRequest {
    pub home_score: i32,
    pub away_score: i32,
}
