use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::scoring::aggregates::StatisticsMaintainer;
use crate::scoring::engine::ScoringEngine;
use crate::scoring::errors::ScoringError;
use crate::scoring::locks::KeyedLocks;
use crate::scoring::store::{StoreError, TournamentStore};
use crate::services::CacheInvalidator;

/// Orchestrates one logical scoring transaction: score the match's
/// predictions, refresh every touched user, refresh every group containing
/// a touched user, then notify the cache collaborator.
///
/// Each stage is an idempotent recompute, so a cycle that dies half-way is
/// recovered by running it again; nothing is ever double-applied. Cycles for
/// the same match are serialized, cycles for different matches run freely.
pub struct ScoringPipeline {
    store: Arc<dyn TournamentStore>,
    engine: ScoringEngine,
    maintainer: StatisticsMaintainer,
    invalidator: CacheInvalidator,
    match_locks: KeyedLocks,
}

/// Result of one match's scoring+refresh cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub match_id: Uuid,
    pub predictions_scored: usize,
    pub users_refreshed: Vec<Uuid>,
    pub groups_refreshed: Vec<Uuid>,
}

/// Result of a full recompute pass over every finished match.
#[derive(Debug, Clone, Default)]
pub struct RecalculationReport {
    pub matches_scored: usize,
    pub users_refreshed: usize,
    pub groups_refreshed: usize,
    pub errors: Vec<String>,
}

/// Result of settling a bonus question.
#[derive(Debug, Clone)]
pub struct BonusSettlementReport {
    pub question_id: Uuid,
    pub answers_awarded: usize,
    pub users_refreshed: Vec<Uuid>,
    pub groups_refreshed: Vec<Uuid>,
}

impl ScoringPipeline {
    pub fn new(store: Arc<dyn TournamentStore>, invalidator: CacheInvalidator) -> Self {
        Self {
            engine: ScoringEngine::new(store.clone()),
            maintainer: StatisticsMaintainer::new(store.clone()),
            store,
            invalidator,
            match_locks: KeyedLocks::new(),
        }
    }

    /// Score one finished match and refresh all downstream aggregates.
    #[tracing::instrument(name = "Run scoring cycle", skip(self))]
    pub async fn run_for_match(&self, match_id: Uuid) -> Result<CycleReport, ScoringError> {
        let lock = self.match_locks.lock_for(match_id).await;
        let _guard = lock.lock().await;

        let outcome = self.engine.score_match(match_id).await?;
        let (users_refreshed, groups_refreshed) =
            self.refresh_users_and_groups(&outcome.affected_users).await?;

        self.invalidator
            .match_scored(match_id, &users_refreshed, &groups_refreshed)
            .await;

        tracing::info!(
            "Scoring cycle for match {} complete: {} predictions, {} users, {} groups",
            match_id,
            outcome.predictions_scored,
            users_refreshed.len(),
            groups_refreshed.len()
        );

        Ok(CycleReport {
            match_id,
            predictions_scored: outcome.predictions_scored,
            users_refreshed,
            groups_refreshed,
        })
    }

    /// Walk every finished match and re-run its cycle. The designated
    /// disaster-recovery operation: safe to run repeatedly or after an
    /// interruption, and meant for an out-of-band maintenance trigger
    /// rather than a user-facing request.
    #[tracing::instrument(name = "Recalculate all", skip(self))]
    pub async fn recalculate_all(&self) -> Result<RecalculationReport, ScoringError> {
        let match_ids = self.store.finished_match_ids().await?;
        tracing::info!("Full recompute over {} finished matches", match_ids.len());

        let mut report = RecalculationReport::default();
        let mut all_users: Vec<Uuid> = Vec::new();
        let mut all_groups: Vec<Uuid> = Vec::new();

        for match_id in match_ids {
            match self.run_for_match(match_id).await {
                Ok(cycle) => {
                    report.matches_scored += 1;
                    all_users.extend(cycle.users_refreshed);
                    all_groups.extend(cycle.groups_refreshed);
                }
                Err(e) => {
                    // A misconfigured stage must not stall the rest of the
                    // pass; the error is surfaced in the report instead.
                    tracing::error!("Recompute failed for match {}: {}", match_id, e);
                    report.errors.push(format!("match {}: {}", match_id, e));
                }
            }
        }

        all_users.sort();
        all_users.dedup();
        all_groups.sort();
        all_groups.dedup();
        report.users_refreshed = all_users.len();
        report.groups_refreshed = all_groups.len();

        tracing::info!(
            "Full recompute done: {} matches, {} users, {} groups, {} errors",
            report.matches_scored,
            report.users_refreshed,
            report.groups_refreshed,
            report.errors.len()
        );
        Ok(report)
    }

    /// Settle a bonus question: overwrite every answer's award (question
    /// points for the correct option, zero otherwise), then refresh the
    /// answering users and their groups. Re-settling with a corrected
    /// option is safe for the same reason re-scoring a match is.
    #[tracing::instrument(name = "Settle bonus question", skip(self))]
    pub async fn settle_bonus_question(
        &self,
        question_id: Uuid,
        correct_option: &str,
    ) -> Result<BonusSettlementReport, ScoringError> {
        let question = self
            .store
            .bonus_question(question_id)
            .await?
            .ok_or(StoreError::NotFound("bonus question"))?;

        let answers = self.store.answers_for_question(question_id).await?;
        let mut affected_users = Vec::with_capacity(answers.len());
        let mut answers_awarded = 0;

        for answer in &answers {
            let points = if answer.chosen_option.eq_ignore_ascii_case(correct_option) {
                answers_awarded += 1;
                question.points
            } else {
                0
            };
            self.store.write_bonus_award(answer.id, points).await?;
            affected_users.push(answer.user_id);
        }

        self.store
            .mark_bonus_question_settled(question_id, correct_option, Utc::now())
            .await?;

        affected_users.sort();
        affected_users.dedup();
        let (users_refreshed, groups_refreshed) =
            self.refresh_users_and_groups(&affected_users).await?;

        self.invalidator
            .bonus_question_settled(question_id, &users_refreshed, &groups_refreshed)
            .await;

        tracing::info!(
            "Settled bonus question {}: {} of {} answers awarded {} points",
            question_id,
            answers_awarded,
            answers.len(),
            question.points
        );

        Ok(BonusSettlementReport {
            question_id,
            answers_awarded,
            users_refreshed,
            groups_refreshed,
        })
    }

    /// Refresh the given users and every group containing one of them.
    /// Returns the distinct refreshed user and group ids.
    async fn refresh_users_and_groups(
        &self,
        user_ids: &[Uuid],
    ) -> Result<(Vec<Uuid>, Vec<Uuid>), ScoringError> {
        let mut groups: Vec<Uuid> = Vec::new();

        for user_id in user_ids {
            self.maintainer.refresh_user_statistics(*user_id).await?;
            if let Some(user) = self.store.user_by_id(*user_id).await? {
                if let Some(group_id) = user.group_id {
                    groups.push(group_id);
                }
            }
        }

        groups.sort();
        groups.dedup();
        for group_id in &groups {
            self.maintainer.refresh_group_statistics(*group_id).await?;
        }

        Ok((user_ids.to_vec(), groups))
    }
}
