use std::sync::Arc;
use uuid::Uuid;

use crate::models::matches::MatchStatus;
use crate::scoring::errors::{NotScorableReason, ScoringError};
use crate::scoring::rules::evaluate_prediction;
use crate::scoring::store::TournamentStore;

/// Converts a finished match result plus its submitted predictions into
/// per-prediction point awards under the stage's rule.
///
/// Re-running `score_match` with unchanged inputs rewrites every derived
/// field with the same values: the write is an overwrite, never an
/// accumulation, so a partially failed earlier run is recovered by simply
/// running again.
pub struct ScoringEngine {
    store: Arc<dyn TournamentStore>,
}

/// What a scoring pass touched, handed to the caller so downstream
/// aggregates can be refreshed.
#[derive(Debug, Clone)]
pub struct MatchScoringOutcome {
    pub match_id: Uuid,
    pub predictions_scored: usize,
    pub affected_users: Vec<Uuid>,
}

impl ScoringEngine {
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self { store }
    }

    /// Score every prediction attached to a finished match.
    ///
    /// Fails with `MatchNotScorable` or `RuleMissing` before any write when
    /// the preconditions do not hold; does not touch user or group
    /// statistics.
    #[tracing::instrument(name = "Score match", skip(self))]
    pub async fn score_match(&self, match_id: Uuid) -> Result<MatchScoringOutcome, ScoringError> {
        let fixture = self.store.match_by_id(match_id).await?.ok_or(
            ScoringError::MatchNotScorable {
                match_id,
                reason: NotScorableReason::NotFound,
            },
        )?;

        if fixture.status != MatchStatus::Finished {
            return Err(ScoringError::MatchNotScorable {
                match_id,
                reason: NotScorableReason::NotFinished(fixture.status),
            });
        }

        let actual = match (fixture.home_score, fixture.away_score) {
            (Some(home), Some(away)) => (home, away),
            _ => {
                return Err(ScoringError::MatchNotScorable {
                    match_id,
                    reason: NotScorableReason::MissingScores,
                })
            }
        };

        let rule = self
            .store
            .rule_for_stage(fixture.stage)
            .await?
            .ok_or(ScoringError::RuleMissing {
                stage: fixture.stage,
            })?;

        let predictions = self.store.predictions_for_match(match_id).await?;
        let mut affected_users = Vec::with_capacity(predictions.len());

        for prediction in &predictions {
            let fields = evaluate_prediction(
                &rule,
                actual,
                (prediction.predicted_home, prediction.predicted_away),
            );
            self.store.write_scored_fields(prediction.id, &fields).await?;
            affected_users.push(prediction.user_id);
        }

        affected_users.sort();
        affected_users.dedup();

        tracing::info!(
            "Scored {} predictions for match {} ({} - {}, stage {})",
            predictions.len(),
            match_id,
            actual.0,
            actual.1,
            fixture.stage
        );

        Ok(MatchScoringOutcome {
            match_id,
            predictions_scored: predictions.len(),
            affected_users,
        })
    }
}
