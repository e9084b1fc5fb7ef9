use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::bonus::{BonusAnswer, BonusQuestion};
use crate::models::group::Group;
use crate::models::matches::{Match, MatchStatus, MatchWithTeams, Stage};
use crate::models::prediction::{Prediction, ScoredFields};
use crate::models::rule::ScoringRule;
use crate::models::stats::{
    GroupStandingRow, GroupStatistics, UserStandingRow, UserStatistics,
};
use crate::models::user::{User, UserRole, UserStatus};
use crate::scoring::store::{StoreError, TournamentStore};

#[derive(Debug, Default)]
struct StoreState {
    users: HashMap<Uuid, User>,
    groups: HashMap<Uuid, Group>,
    teams: HashMap<Uuid, String>,
    matches: HashMap<Uuid, Match>,
    rules: HashMap<Stage, ScoringRule>,
    predictions: HashMap<Uuid, Prediction>,
    user_stats: HashMap<Uuid, UserStatistics>,
    group_stats: HashMap<Uuid, GroupStatistics>,
    bonus_questions: HashMap<Uuid, BonusQuestion>,
    bonus_answers: HashMap<Uuid, BonusAnswer>,
}

/// In-memory tournament store. Backs the test suite; the seeding methods
/// below stand in for the fixture data the production store reads from
/// Postgres.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_group(&self, name: &str) -> Group {
        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.state
            .write()
            .await
            .groups
            .insert(group.id, group.clone());
        group
    }

    pub async fn insert_user(&self, username: &str, group_id: Option<Uuid>) -> User {
        self.insert_user_registered_at(username, group_id, Utc::now())
            .await
    }

    pub async fn insert_user_registered_at(
        &self,
        username: &str,
        group_id: Option<Uuid>,
        registered_at: DateTime<Utc>,
    ) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            role: UserRole::User,
            status: UserStatus::Active,
            group_id,
            created_at: registered_at,
            updated_at: registered_at,
        };
        self.state.write().await.users.insert(user.id, user.clone());
        user
    }

    pub async fn insert_team(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state.write().await.teams.insert(id, name.to_string());
        id
    }

    pub async fn insert_match(&self, stage: Stage, kickoff_time: DateTime<Utc>) -> Match {
        let now = Utc::now();
        let fixture = Match {
            id: Uuid::new_v4(),
            stage,
            home_team_id: None,
            away_team_id: None,
            kickoff_time,
            status: MatchStatus::Scheduled,
            home_score: None,
            away_score: None,
            created_at: now,
            updated_at: now,
        };
        self.state
            .write()
            .await
            .matches
            .insert(fixture.id, fixture.clone());
        fixture
    }

    pub async fn set_match_live(&self, match_id: Uuid) {
        if let Some(fixture) = self.state.write().await.matches.get_mut(&match_id) {
            fixture.status = MatchStatus::Live;
            fixture.updated_at = Utc::now();
        }
    }

    pub async fn insert_rule(&self, stage: Stage, exact: i32, outcome: i32) {
        let rule = ScoringRule {
            stage,
            exact_score_points: exact,
            correct_outcome_points: outcome,
            updated_at: Utc::now(),
        };
        self.state.write().await.rules.insert(stage, rule);
    }

    pub async fn insert_bonus_question(&self, question: &str, points: i32) -> BonusQuestion {
        let entry = BonusQuestion {
            id: Uuid::new_v4(),
            question: question.to_string(),
            points,
            correct_option: None,
            settled_at: None,
            created_at: Utc::now(),
        };
        self.state
            .write()
            .await
            .bonus_questions
            .insert(entry.id, entry.clone());
        entry
    }

    pub async fn insert_bonus_answer(
        &self,
        question_id: Uuid,
        user_id: Uuid,
        chosen_option: &str,
    ) -> BonusAnswer {
        let now = Utc::now();
        let answer = BonusAnswer {
            id: Uuid::new_v4(),
            question_id,
            user_id,
            chosen_option: chosen_option.to_string(),
            awarded_points: None,
            created_at: now,
            updated_at: now,
        };
        self.state
            .write()
            .await
            .bonus_answers
            .insert(answer.id, answer.clone());
        answer
    }

    pub async fn prediction_by_id(&self, prediction_id: Uuid) -> Option<Prediction> {
        self.state
            .read()
            .await
            .predictions
            .get(&prediction_id)
            .cloned()
    }
}

#[async_trait]
impl TournamentStore for InMemoryStore {
    async fn match_by_id(&self, match_id: Uuid) -> Result<Option<Match>, StoreError> {
        Ok(self.state.read().await.matches.get(&match_id).cloned())
    }

    async fn list_matches(&self) -> Result<Vec<MatchWithTeams>, StoreError> {
        let state = self.state.read().await;
        let mut fixtures: Vec<MatchWithTeams> = state
            .matches
            .values()
            .cloned()
            .map(|fixture| {
                let home_team_name = fixture
                    .home_team_id
                    .and_then(|id| state.teams.get(&id).cloned());
                let away_team_name = fixture
                    .away_team_id
                    .and_then(|id| state.teams.get(&id).cloned());
                MatchWithTeams {
                    fixture,
                    home_team_name,
                    away_team_name,
                }
            })
            .collect();
        fixtures.sort_by_key(|entry| entry.fixture.kickoff_time);
        Ok(fixtures)
    }

    async fn finished_match_ids(&self) -> Result<Vec<Uuid>, StoreError> {
        let state = self.state.read().await;
        let mut finished: Vec<&Match> = state
            .matches
            .values()
            .filter(|fixture| fixture.status == MatchStatus::Finished)
            .collect();
        finished.sort_by_key(|fixture| fixture.kickoff_time);
        Ok(finished.into_iter().map(|fixture| fixture.id).collect())
    }

    async fn record_match_result(
        &self,
        match_id: Uuid,
        home_score: i32,
        away_score: i32,
    ) -> Result<Option<Match>, StoreError> {
        let mut state = self.state.write().await;
        match state.matches.get_mut(&match_id) {
            Some(fixture) => {
                fixture.home_score = Some(home_score);
                fixture.away_score = Some(away_score);
                fixture.status = MatchStatus::Finished;
                fixture.updated_at = Utc::now();
                Ok(Some(fixture.clone()))
            }
            None => Ok(None),
        }
    }

    async fn rule_for_stage(&self, stage: Stage) -> Result<Option<ScoringRule>, StoreError> {
        Ok(self.state.read().await.rules.get(&stage).cloned())
    }

    async fn list_rules(&self) -> Result<Vec<ScoringRule>, StoreError> {
        let mut rules: Vec<ScoringRule> =
            self.state.read().await.rules.values().cloned().collect();
        rules.sort_by_key(|rule| rule.stage);
        Ok(rules)
    }

    async fn upsert_rule(&self, rule: &ScoringRule) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .rules
            .insert(rule.stage, rule.clone());
        Ok(())
    }

    async fn predictions_for_match(&self, match_id: Uuid) -> Result<Vec<Prediction>, StoreError> {
        let state = self.state.read().await;
        let mut predictions: Vec<Prediction> = state
            .predictions
            .values()
            .filter(|prediction| prediction.match_id == match_id)
            .cloned()
            .collect();
        predictions.sort_by_key(|prediction| prediction.created_at);
        Ok(predictions)
    }

    async fn predictions_for_user(&self, user_id: Uuid) -> Result<Vec<Prediction>, StoreError> {
        let state = self.state.read().await;
        let mut predictions: Vec<Prediction> = state
            .predictions
            .values()
            .filter(|prediction| prediction.user_id == user_id)
            .cloned()
            .collect();
        predictions.sort_by_key(|prediction| prediction.created_at);
        Ok(predictions)
    }

    async fn finished_predictions_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Prediction>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .predictions
            .values()
            .filter(|prediction| {
                prediction.user_id == user_id
                    && state
                        .matches
                        .get(&prediction.match_id)
                        .map(|fixture| fixture.status == MatchStatus::Finished)
                        .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn write_scored_fields(
        &self,
        prediction_id: Uuid,
        fields: &ScoredFields,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let prediction = state
            .predictions
            .get_mut(&prediction_id)
            .ok_or(StoreError::NotFound("prediction"))?;
        prediction.points_earned = Some(fields.points_earned);
        prediction.is_exact_score = Some(fields.is_exact_score);
        prediction.is_correct_outcome = Some(fields.is_correct_outcome);
        prediction.updated_at = Utc::now();
        Ok(())
    }

    async fn upsert_prediction(
        &self,
        user_id: Uuid,
        match_id: Uuid,
        predicted_home: i32,
        predicted_away: i32,
    ) -> Result<Prediction, StoreError> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        if let Some(prediction) = state
            .predictions
            .values_mut()
            .find(|prediction| prediction.user_id == user_id && prediction.match_id == match_id)
        {
            prediction.predicted_home = predicted_home;
            prediction.predicted_away = predicted_away;
            prediction.updated_at = now;
            return Ok(prediction.clone());
        }

        let prediction = Prediction {
            id: Uuid::new_v4(),
            user_id,
            match_id,
            predicted_home,
            predicted_away,
            points_earned: None,
            is_exact_score: None,
            is_correct_outcome: None,
            created_at: now,
            updated_at: now,
        };
        state.predictions.insert(prediction.id, prediction.clone());
        Ok(prediction)
    }

    async fn user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn user_statistics(&self, user_id: Uuid) -> Result<Option<UserStatistics>, StoreError> {
        Ok(self.state.read().await.user_stats.get(&user_id).cloned())
    }

    async fn group_statistics(
        &self,
        group_id: Uuid,
    ) -> Result<Option<GroupStatistics>, StoreError> {
        Ok(self.state.read().await.group_stats.get(&group_id).cloned())
    }

    async fn member_statistics_for_group(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<UserStatistics>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|user| user.group_id == Some(group_id))
            .filter_map(|user| state.user_stats.get(&user.id).cloned())
            .collect())
    }

    async fn replace_user_statistics(&self, stats: &UserStatistics) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .user_stats
            .insert(stats.user_id, stats.clone());
        Ok(())
    }

    async fn replace_group_statistics(&self, stats: &GroupStatistics) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .group_stats
            .insert(stats.group_id, stats.clone());
        Ok(())
    }

    async fn user_standing_rows(&self) -> Result<Vec<UserStandingRow>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .map(|user| {
                let stats = state.user_stats.get(&user.id);
                UserStandingRow {
                    user_id: user.id,
                    username: user.username.clone(),
                    group_id: user.group_id,
                    registered_at: user.created_at,
                    total_points: stats.map(|s| s.total_points).unwrap_or(0),
                    exact_score_count: stats.map(|s| s.exact_score_count).unwrap_or(0),
                    correct_outcome_count: stats.map(|s| s.correct_outcome_count).unwrap_or(0),
                    predictions_made: stats.map(|s| s.predictions_made).unwrap_or(0),
                    bonus_points: stats.map(|s| s.bonus_points).unwrap_or(0),
                }
            })
            .collect())
    }

    async fn group_standing_rows(&self) -> Result<Vec<GroupStandingRow>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .groups
            .values()
            .map(|group| {
                let stats = state.group_stats.get(&group.id);
                GroupStandingRow {
                    group_id: group.id,
                    group_name: group.name.clone(),
                    total_points: stats.map(|s| s.total_points).unwrap_or(0),
                    average_points: stats.map(|s| s.average_points).unwrap_or(0.0),
                    participant_count: stats.map(|s| s.participant_count).unwrap_or(0),
                }
            })
            .collect())
    }

    async fn bonus_question(
        &self,
        question_id: Uuid,
    ) -> Result<Option<BonusQuestion>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .bonus_questions
            .get(&question_id)
            .cloned())
    }

    async fn answers_for_question(
        &self,
        question_id: Uuid,
    ) -> Result<Vec<BonusAnswer>, StoreError> {
        let state = self.state.read().await;
        let mut answers: Vec<BonusAnswer> = state
            .bonus_answers
            .values()
            .filter(|answer| answer.question_id == question_id)
            .cloned()
            .collect();
        answers.sort_by_key(|answer| answer.created_at);
        Ok(answers)
    }

    async fn write_bonus_award(&self, answer_id: Uuid, points: i32) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let answer = state
            .bonus_answers
            .get_mut(&answer_id)
            .ok_or(StoreError::NotFound("bonus answer"))?;
        answer.awarded_points = Some(points);
        answer.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_bonus_question_settled(
        &self,
        question_id: Uuid,
        correct_option: &str,
        settled_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let question = state
            .bonus_questions
            .get_mut(&question_id)
            .ok_or(StoreError::NotFound("bonus question"))?;
        question.correct_option = Some(correct_option.to_string());
        question.settled_at = Some(settled_at);
        Ok(())
    }

    async fn bonus_points_for_user(&self, user_id: Uuid) -> Result<i32, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .bonus_answers
            .values()
            .filter(|answer| answer.user_id == user_id)
            .filter_map(|answer| answer.awarded_points)
            .sum())
    }
}
