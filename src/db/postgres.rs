use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::bonus::{BonusAnswer, BonusQuestion};
use crate::models::matches::{Match, MatchStatus, MatchWithTeams, Stage};
use crate::models::prediction::{Prediction, ScoredFields};
use crate::models::rule::ScoringRule;
use crate::models::stats::{
    GroupStandingRow, GroupStatistics, UserStandingRow, UserStatistics,
};
use crate::models::user::User;
use crate::scoring::store::{StoreError, TournamentStore};

/// Postgres-backed tournament store.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MatchTeamRow {
    id: Uuid,
    stage: Stage,
    home_team_id: Option<Uuid>,
    away_team_id: Option<Uuid>,
    kickoff_time: DateTime<Utc>,
    status: MatchStatus,
    home_score: Option<i32>,
    away_score: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    home_team_name: Option<String>,
    away_team_name: Option<String>,
}

#[async_trait]
impl TournamentStore for PostgresStore {
    async fn match_by_id(&self, match_id: Uuid) -> Result<Option<Match>, StoreError> {
        let fixture = sqlx::query_as::<_, Match>(
            r#"
            SELECT id, stage, home_team_id, away_team_id, kickoff_time,
                   status, home_score, away_score, created_at, updated_at
            FROM matches
            WHERE id = $1
            "#,
        )
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(fixture)
    }

    async fn list_matches(&self) -> Result<Vec<MatchWithTeams>, StoreError> {
        let rows = sqlx::query_as::<_, MatchTeamRow>(
            r#"
            SELECT
                m.id, m.stage, m.home_team_id, m.away_team_id, m.kickoff_time,
                m.status, m.home_score, m.away_score, m.created_at, m.updated_at,
                ht.name AS home_team_name,
                at.name AS away_team_name
            FROM matches m
            LEFT JOIN teams ht ON m.home_team_id = ht.id
            LEFT JOIN teams at ON m.away_team_id = at.id
            ORDER BY m.kickoff_time
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| MatchWithTeams {
                fixture: Match {
                    id: row.id,
                    stage: row.stage,
                    home_team_id: row.home_team_id,
                    away_team_id: row.away_team_id,
                    kickoff_time: row.kickoff_time,
                    status: row.status,
                    home_score: row.home_score,
                    away_score: row.away_score,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                },
                home_team_name: row.home_team_name,
                away_team_name: row.away_team_name,
            })
            .collect())
    }

    async fn finished_match_ids(&self) -> Result<Vec<Uuid>, StoreError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM matches WHERE status = 'finished' ORDER BY kickoff_time",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn record_match_result(
        &self,
        match_id: Uuid,
        home_score: i32,
        away_score: i32,
    ) -> Result<Option<Match>, StoreError> {
        let fixture = sqlx::query_as::<_, Match>(
            r#"
            UPDATE matches
            SET home_score = $2,
                away_score = $3,
                status = 'finished',
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, stage, home_team_id, away_team_id, kickoff_time,
                      status, home_score, away_score, created_at, updated_at
            "#,
        )
        .bind(match_id)
        .bind(home_score)
        .bind(away_score)
        .fetch_optional(&self.pool)
        .await?;
        Ok(fixture)
    }

    async fn rule_for_stage(&self, stage: Stage) -> Result<Option<ScoringRule>, StoreError> {
        let rule = sqlx::query_as::<_, ScoringRule>(
            r#"
            SELECT stage, exact_score_points, correct_outcome_points, updated_at
            FROM scoring_rules
            WHERE stage = $1
            "#,
        )
        .bind(stage)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rule)
    }

    async fn list_rules(&self) -> Result<Vec<ScoringRule>, StoreError> {
        let rules = sqlx::query_as::<_, ScoringRule>(
            r#"
            SELECT stage, exact_score_points, correct_outcome_points, updated_at
            FROM scoring_rules
            ORDER BY stage
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rules)
    }

    async fn upsert_rule(&self, rule: &ScoringRule) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO scoring_rules (stage, exact_score_points, correct_outcome_points, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (stage) DO UPDATE SET
                exact_score_points = EXCLUDED.exact_score_points,
                correct_outcome_points = EXCLUDED.correct_outcome_points,
                updated_at = NOW()
            "#,
        )
        .bind(rule.stage)
        .bind(rule.exact_score_points)
        .bind(rule.correct_outcome_points)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn predictions_for_match(&self, match_id: Uuid) -> Result<Vec<Prediction>, StoreError> {
        let predictions = sqlx::query_as::<_, Prediction>(
            r#"
            SELECT id, user_id, match_id, predicted_home, predicted_away,
                   points_earned, is_exact_score, is_correct_outcome,
                   created_at, updated_at
            FROM predictions
            WHERE match_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(predictions)
    }

    async fn predictions_for_user(&self, user_id: Uuid) -> Result<Vec<Prediction>, StoreError> {
        let predictions = sqlx::query_as::<_, Prediction>(
            r#"
            SELECT id, user_id, match_id, predicted_home, predicted_away,
                   points_earned, is_exact_score, is_correct_outcome,
                   created_at, updated_at
            FROM predictions
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(predictions)
    }

    async fn finished_predictions_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Prediction>, StoreError> {
        let predictions = sqlx::query_as::<_, Prediction>(
            r#"
            SELECT p.id, p.user_id, p.match_id, p.predicted_home, p.predicted_away,
                   p.points_earned, p.is_exact_score, p.is_correct_outcome,
                   p.created_at, p.updated_at
            FROM predictions p
            JOIN matches m ON m.id = p.match_id
            WHERE p.user_id = $1 AND m.status = 'finished'
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(predictions)
    }

    async fn write_scored_fields(
        &self,
        prediction_id: Uuid,
        fields: &ScoredFields,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE predictions
            SET points_earned = $2,
                is_exact_score = $3,
                is_correct_outcome = $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(prediction_id)
        .bind(fields.points_earned)
        .bind(fields.is_exact_score)
        .bind(fields.is_correct_outcome)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_prediction(
        &self,
        user_id: Uuid,
        match_id: Uuid,
        predicted_home: i32,
        predicted_away: i32,
    ) -> Result<Prediction, StoreError> {
        let prediction = sqlx::query_as::<_, Prediction>(
            r#"
            INSERT INTO predictions (user_id, match_id, predicted_home, predicted_away)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, match_id) DO UPDATE SET
                predicted_home = EXCLUDED.predicted_home,
                predicted_away = EXCLUDED.predicted_away,
                updated_at = NOW()
            RETURNING id, user_id, match_id, predicted_home, predicted_away,
                      points_earned, is_exact_score, is_correct_outcome,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(match_id)
        .bind(predicted_home)
        .bind(predicted_away)
        .fetch_one(&self.pool)
        .await?;
        Ok(prediction)
    }

    async fn user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, role, status, group_id, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_statistics(&self, user_id: Uuid) -> Result<Option<UserStatistics>, StoreError> {
        let stats = sqlx::query_as::<_, UserStatistics>(
            r#"
            SELECT user_id, total_points, exact_score_count, correct_outcome_count,
                   predictions_made, bonus_points, updated_at
            FROM user_statistics
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn group_statistics(
        &self,
        group_id: Uuid,
    ) -> Result<Option<GroupStatistics>, StoreError> {
        let stats = sqlx::query_as::<_, GroupStatistics>(
            r#"
            SELECT group_id, total_points, average_points, participant_count, updated_at
            FROM group_statistics
            WHERE group_id = $1
            "#,
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn member_statistics_for_group(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<UserStatistics>, StoreError> {
        let stats = sqlx::query_as::<_, UserStatistics>(
            r#"
            SELECT s.user_id, s.total_points, s.exact_score_count, s.correct_outcome_count,
                   s.predictions_made, s.bonus_points, s.updated_at
            FROM user_statistics s
            JOIN users u ON u.id = s.user_id
            WHERE u.group_id = $1
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn replace_user_statistics(&self, stats: &UserStatistics) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_statistics (
                user_id, total_points, exact_score_count, correct_outcome_count,
                predictions_made, bonus_points, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                total_points = EXCLUDED.total_points,
                exact_score_count = EXCLUDED.exact_score_count,
                correct_outcome_count = EXCLUDED.correct_outcome_count,
                predictions_made = EXCLUDED.predictions_made,
                bonus_points = EXCLUDED.bonus_points,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(stats.user_id)
        .bind(stats.total_points)
        .bind(stats.exact_score_count)
        .bind(stats.correct_outcome_count)
        .bind(stats.predictions_made)
        .bind(stats.bonus_points)
        .bind(stats.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn replace_group_statistics(&self, stats: &GroupStatistics) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO group_statistics (
                group_id, total_points, average_points, participant_count, updated_at
            ) VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (group_id) DO UPDATE SET
                total_points = EXCLUDED.total_points,
                average_points = EXCLUDED.average_points,
                participant_count = EXCLUDED.participant_count,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(stats.group_id)
        .bind(stats.total_points)
        .bind(stats.average_points)
        .bind(stats.participant_count)
        .bind(stats.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn user_standing_rows(&self) -> Result<Vec<UserStandingRow>, StoreError> {
        let rows = sqlx::query_as::<_, UserStandingRow>(
            r#"
            SELECT
                u.id AS user_id,
                u.username,
                u.group_id,
                u.created_at AS registered_at,
                COALESCE(s.total_points, 0) AS total_points,
                COALESCE(s.exact_score_count, 0) AS exact_score_count,
                COALESCE(s.correct_outcome_count, 0) AS correct_outcome_count,
                COALESCE(s.predictions_made, 0) AS predictions_made,
                COALESCE(s.bonus_points, 0) AS bonus_points
            FROM users u
            LEFT JOIN user_statistics s ON s.user_id = u.id
            WHERE u.status = 'active'
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn group_standing_rows(&self) -> Result<Vec<GroupStandingRow>, StoreError> {
        let rows = sqlx::query_as::<_, GroupStandingRow>(
            r#"
            SELECT
                g.id AS group_id,
                g.name AS group_name,
                COALESCE(s.total_points, 0) AS total_points,
                COALESCE(s.average_points, 0) AS average_points,
                COALESCE(s.participant_count, 0) AS participant_count
            FROM groups g
            LEFT JOIN group_statistics s ON s.group_id = g.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn bonus_question(
        &self,
        question_id: Uuid,
    ) -> Result<Option<BonusQuestion>, StoreError> {
        let question = sqlx::query_as::<_, BonusQuestion>(
            r#"
            SELECT id, question, points, correct_option, settled_at, created_at
            FROM bonus_questions
            WHERE id = $1
            "#,
        )
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(question)
    }

    async fn answers_for_question(
        &self,
        question_id: Uuid,
    ) -> Result<Vec<BonusAnswer>, StoreError> {
        let answers = sqlx::query_as::<_, BonusAnswer>(
            r#"
            SELECT id, question_id, user_id, chosen_option, awarded_points,
                   created_at, updated_at
            FROM bonus_answers
            WHERE question_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(answers)
    }

    async fn write_bonus_award(&self, answer_id: Uuid, points: i32) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE bonus_answers
            SET awarded_points = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(answer_id)
        .bind(points)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_bonus_question_settled(
        &self,
        question_id: Uuid,
        correct_option: &str,
        settled_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE bonus_questions
            SET correct_option = $2,
                settled_at = $3
            WHERE id = $1
            "#,
        )
        .bind(question_id)
        .bind(correct_option)
        .bind(settled_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn bonus_points_for_user(&self, user_id: Uuid) -> Result<i32, StoreError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(awarded_points), 0) FROM bonus_answers WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total as i32)
    }
}
