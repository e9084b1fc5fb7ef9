use chrono::Utc;
use uuid::Uuid;

use scorecast_backend::models::matches::Stage;
use scorecast_backend::scoring::{
    NotScorableReason, ScoringEngine, ScoringError, TournamentStore,
};

mod common;
use common::harness;

#[tokio::test]
async fn group_stage_scenario_awards_two_tier_points() {
    let rig = harness();
    rig.store.insert_rule(Stage::Group, 5, 3).await;

    let alice = rig.store.insert_user("alice", None).await;
    let bob = rig.store.insert_user("bob", None).await;
    let carol = rig.store.insert_user("carol", None).await;

    let fixture = rig.store.insert_match(Stage::Group, Utc::now()).await;
    let exact = rig
        .store_dyn
        .upsert_prediction(alice.id, fixture.id, 2, 1)
        .await
        .unwrap();
    let outcome_only = rig
        .store_dyn
        .upsert_prediction(bob.id, fixture.id, 1, 0)
        .await
        .unwrap();
    let wrong = rig
        .store_dyn
        .upsert_prediction(carol.id, fixture.id, 1, 1)
        .await
        .unwrap();

    rig.store_dyn
        .record_match_result(fixture.id, 2, 1)
        .await
        .unwrap();

    let engine = ScoringEngine::new(rig.store_dyn.clone());
    let report = engine.score_match(fixture.id).await.unwrap();
    assert_eq!(report.predictions_scored, 3);
    assert_eq!(report.affected_users.len(), 3);

    let exact = rig.store.prediction_by_id(exact.id).await.unwrap();
    assert_eq!(exact.points_earned, Some(5));
    assert_eq!(exact.is_exact_score, Some(true));
    assert_eq!(exact.is_correct_outcome, Some(true));

    let outcome_only = rig.store.prediction_by_id(outcome_only.id).await.unwrap();
    assert_eq!(outcome_only.points_earned, Some(3));
    assert_eq!(outcome_only.is_exact_score, Some(false));
    assert_eq!(outcome_only.is_correct_outcome, Some(true));

    let wrong = rig.store.prediction_by_id(wrong.id).await.unwrap();
    assert_eq!(wrong.points_earned, Some(0));
    assert_eq!(wrong.is_exact_score, Some(false));
    assert_eq!(wrong.is_correct_outcome, Some(false));
}

#[tokio::test]
async fn rescoring_leaves_derived_fields_identical() {
    let rig = harness();
    rig.store.insert_rule(Stage::Group, 5, 3).await;
    let user = rig.store.insert_user("resa", None).await;
    let fixture = rig.store.insert_match(Stage::Group, Utc::now()).await;
    let prediction = rig
        .store_dyn
        .upsert_prediction(user.id, fixture.id, 2, 1)
        .await
        .unwrap();
    rig.store_dyn
        .record_match_result(fixture.id, 2, 1)
        .await
        .unwrap();

    let engine = ScoringEngine::new(rig.store_dyn.clone());
    engine.score_match(fixture.id).await.unwrap();
    let first = rig.store.prediction_by_id(prediction.id).await.unwrap();

    engine.score_match(fixture.id).await.unwrap();
    let second = rig.store.prediction_by_id(prediction.id).await.unwrap();

    assert_eq!(first.points_earned, second.points_earned);
    assert_eq!(first.is_exact_score, second.is_exact_score);
    assert_eq!(first.is_correct_outcome, second.is_correct_outcome);
    assert_eq!(second.points_earned, Some(5));
}

#[tokio::test]
async fn missing_rule_fails_without_touching_predictions() {
    let rig = harness();
    // No rule configured for the final
    let user = rig.store.insert_user("nora", None).await;
    let fixture = rig.store.insert_match(Stage::Final, Utc::now()).await;
    let prediction = rig
        .store_dyn
        .upsert_prediction(user.id, fixture.id, 1, 0)
        .await
        .unwrap();
    rig.store_dyn
        .record_match_result(fixture.id, 1, 0)
        .await
        .unwrap();

    let engine = ScoringEngine::new(rig.store_dyn.clone());
    let error = engine.score_match(fixture.id).await.unwrap_err();
    assert!(matches!(
        error,
        ScoringError::RuleMissing {
            stage: Stage::Final
        }
    ));

    let untouched = rig.store.prediction_by_id(prediction.id).await.unwrap();
    assert_eq!(untouched.points_earned, None);
    assert_eq!(untouched.is_exact_score, None);
    assert_eq!(untouched.is_correct_outcome, None);
}

#[tokio::test]
async fn unfinished_match_is_not_scorable() {
    let rig = harness();
    rig.store.insert_rule(Stage::Group, 5, 3).await;
    let fixture = rig.store.insert_match(Stage::Group, Utc::now()).await;

    let engine = ScoringEngine::new(rig.store_dyn.clone());
    let error = engine.score_match(fixture.id).await.unwrap_err();
    assert!(matches!(
        error,
        ScoringError::MatchNotScorable {
            reason: NotScorableReason::NotFinished(_),
            ..
        }
    ));

    rig.store.set_match_live(fixture.id).await;
    let error = engine.score_match(fixture.id).await.unwrap_err();
    assert!(matches!(
        error,
        ScoringError::MatchNotScorable {
            reason: NotScorableReason::NotFinished(_),
            ..
        }
    ));
}

#[tokio::test]
async fn unknown_match_is_not_scorable() {
    let rig = harness();
    let engine = ScoringEngine::new(rig.store_dyn.clone());
    let error = engine.score_match(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(
        error,
        ScoringError::MatchNotScorable {
            reason: NotScorableReason::NotFound,
            ..
        }
    ));
}
