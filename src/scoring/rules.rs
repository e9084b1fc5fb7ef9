use crate::models::common::MatchOutcome;
use crate::models::prediction::ScoredFields;
use crate::models::rule::ScoringRule;

/// Evaluate one prediction against the actual result under a stage rule.
///
/// Two-tier award: the full exact-score value for a spot-on scoreline, the
/// outcome value for the right winner/draw with a wrong scoreline, zero
/// otherwise. An exact score always implies a correct outcome.
pub fn evaluate_prediction(
    rule: &ScoringRule,
    actual: (i32, i32),
    predicted: (i32, i32),
) -> ScoredFields {
    let is_exact_score = predicted == actual;
    let is_correct_outcome =
        MatchOutcome::of(predicted.0, predicted.1) == MatchOutcome::of(actual.0, actual.1);

    let points_earned = if is_exact_score {
        rule.exact_score_points
    } else if is_correct_outcome {
        rule.correct_outcome_points
    } else {
        0
    };

    ScoredFields {
        points_earned,
        is_exact_score,
        is_correct_outcome,
    }
}
