use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::bonus::{BonusAnswer, BonusQuestion};
use crate::models::matches::{Match, MatchWithTeams, Stage};
use crate::models::prediction::{Prediction, ScoredFields};
use crate::models::rule::ScoringRule;
use crate::models::stats::{
    GroupStandingRow, GroupStatistics, UserStandingRow, UserStatistics,
};
use crate::models::user::User;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} not found")]
    NotFound(&'static str),
}

/// Persistence seam for the scoring and standings pipeline.
///
/// The production implementation is Postgres-backed; the in-memory
/// implementation backs the test suite so the engine, maintainer and ranker
/// are exercised without a database.
#[async_trait]
pub trait TournamentStore: Send + Sync {
    // Matches (reference data: read, plus the admin result write)
    async fn match_by_id(&self, match_id: Uuid) -> Result<Option<Match>, StoreError>;
    async fn list_matches(&self) -> Result<Vec<MatchWithTeams>, StoreError>;
    /// Ids of all finished matches, ordered by kickoff time.
    async fn finished_match_ids(&self) -> Result<Vec<Uuid>, StoreError>;
    /// Record a final result and move the match to finished (one-way; a
    /// finished match may be corrected by recording again).
    async fn record_match_result(
        &self,
        match_id: Uuid,
        home_score: i32,
        away_score: i32,
    ) -> Result<Option<Match>, StoreError>;

    // Scoring rules
    async fn rule_for_stage(&self, stage: Stage) -> Result<Option<ScoringRule>, StoreError>;
    async fn list_rules(&self) -> Result<Vec<ScoringRule>, StoreError>;
    async fn upsert_rule(&self, rule: &ScoringRule) -> Result<(), StoreError>;

    // Predictions
    async fn predictions_for_match(&self, match_id: Uuid) -> Result<Vec<Prediction>, StoreError>;
    async fn predictions_for_user(&self, user_id: Uuid) -> Result<Vec<Prediction>, StoreError>;
    /// The user's predictions whose match has finished — the authoritative
    /// input set for statistics recomputation.
    async fn finished_predictions_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Prediction>, StoreError>;
    /// Overwrite the engine-owned derived columns of one prediction.
    async fn write_scored_fields(
        &self,
        prediction_id: Uuid,
        fields: &ScoredFields,
    ) -> Result<(), StoreError>;
    async fn upsert_prediction(
        &self,
        user_id: Uuid,
        match_id: Uuid,
        predicted_home: i32,
        predicted_away: i32,
    ) -> Result<Prediction, StoreError>;

    // Users, groups, aggregates
    async fn user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;
    async fn user_statistics(&self, user_id: Uuid) -> Result<Option<UserStatistics>, StoreError>;
    async fn group_statistics(
        &self,
        group_id: Uuid,
    ) -> Result<Option<GroupStatistics>, StoreError>;
    /// Statistics rows of the group's members (members never refreshed have
    /// no row and are absent here).
    async fn member_statistics_for_group(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<UserStatistics>, StoreError>;
    /// Replace-not-merge write of a user's aggregate row.
    async fn replace_user_statistics(&self, stats: &UserStatistics) -> Result<(), StoreError>;
    /// Replace-not-merge write of a group's aggregate row.
    async fn replace_group_statistics(&self, stats: &GroupStatistics) -> Result<(), StoreError>;

    // Leaderboard reads
    async fn user_standing_rows(&self) -> Result<Vec<UserStandingRow>, StoreError>;
    async fn group_standing_rows(&self) -> Result<Vec<GroupStandingRow>, StoreError>;

    // Bonus questions
    async fn bonus_question(&self, question_id: Uuid)
        -> Result<Option<BonusQuestion>, StoreError>;
    async fn answers_for_question(
        &self,
        question_id: Uuid,
    ) -> Result<Vec<BonusAnswer>, StoreError>;
    /// Overwrite the awarded points of one answer.
    async fn write_bonus_award(&self, answer_id: Uuid, points: i32) -> Result<(), StoreError>;
    async fn mark_bonus_question_settled(
        &self,
        question_id: Uuid,
        correct_option: &str,
        settled_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
    /// Sum of the user's awarded bonus points.
    async fn bonus_points_for_user(&self, user_id: Uuid) -> Result<i32, StoreError>;
}
