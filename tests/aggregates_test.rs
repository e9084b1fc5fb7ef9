use chrono::Utc;

use scorecast_backend::models::matches::Stage;
use scorecast_backend::scoring::{ScoringEngine, StatisticsMaintainer, TournamentStore};

mod common;
use common::harness;

#[tokio::test]
async fn refresh_reflects_scored_predictions_and_bonus() {
    let rig = harness();
    rig.store.insert_rule(Stage::Group, 5, 3).await;
    let user = rig.store.insert_user("pia", None).await;

    let first = rig.store.insert_match(Stage::Group, Utc::now()).await;
    let second = rig.store.insert_match(Stage::Group, Utc::now()).await;
    rig.store_dyn
        .upsert_prediction(user.id, first.id, 2, 1)
        .await
        .unwrap();
    rig.store_dyn
        .upsert_prediction(user.id, second.id, 0, 2)
        .await
        .unwrap();
    rig.store_dyn
        .record_match_result(first.id, 2, 1)
        .await
        .unwrap();
    rig.store_dyn
        .record_match_result(second.id, 1, 3)
        .await
        .unwrap();

    let question = rig.store.insert_bonus_question("Winner?", 10).await;
    let answer = rig
        .store
        .insert_bonus_answer(question.id, user.id, "Home Nation")
        .await;
    rig.store_dyn
        .write_bonus_award(answer.id, 10)
        .await
        .unwrap();

    let engine = ScoringEngine::new(rig.store_dyn.clone());
    engine.score_match(first.id).await.unwrap();
    engine.score_match(second.id).await.unwrap();

    let maintainer = StatisticsMaintainer::new(rig.store_dyn.clone());
    let stats = maintainer.refresh_user_statistics(user.id).await.unwrap();

    // 5 for the exact guess, 3 for the right outcome, plus the bonus
    assert_eq!(stats.total_points, 18);
    assert_eq!(stats.exact_score_count, 1);
    assert_eq!(stats.correct_outcome_count, 2);
    assert_eq!(stats.predictions_made, 2);
    assert_eq!(stats.bonus_points, 10);
}

#[tokio::test]
async fn rerunning_refresh_does_not_accumulate() {
    let rig = harness();
    rig.store.insert_rule(Stage::Group, 5, 3).await;
    let user = rig.store.insert_user("max", None).await;
    let fixture = rig.store.insert_match(Stage::Group, Utc::now()).await;
    rig.store_dyn
        .upsert_prediction(user.id, fixture.id, 2, 1)
        .await
        .unwrap();
    rig.store_dyn
        .record_match_result(fixture.id, 2, 1)
        .await
        .unwrap();

    let engine = ScoringEngine::new(rig.store_dyn.clone());
    engine.score_match(fixture.id).await.unwrap();

    let maintainer = StatisticsMaintainer::new(rig.store_dyn.clone());
    let first = maintainer.refresh_user_statistics(user.id).await.unwrap();
    let second = maintainer.refresh_user_statistics(user.id).await.unwrap();

    assert_eq!(first.total_points, 5);
    // Not doubled to 10 by the second run
    assert_eq!(second.total_points, 5);
    assert_eq!(second.predictions_made, first.predictions_made);
}

#[tokio::test]
async fn predictions_on_unfinished_matches_are_excluded() {
    let rig = harness();
    rig.store.insert_rule(Stage::Group, 5, 3).await;
    let user = rig.store.insert_user("ines", None).await;

    let finished = rig.store.insert_match(Stage::Group, Utc::now()).await;
    let upcoming = rig.store.insert_match(Stage::Group, Utc::now()).await;
    rig.store_dyn
        .upsert_prediction(user.id, finished.id, 1, 0)
        .await
        .unwrap();
    rig.store_dyn
        .upsert_prediction(user.id, upcoming.id, 3, 0)
        .await
        .unwrap();
    rig.store_dyn
        .record_match_result(finished.id, 1, 0)
        .await
        .unwrap();

    let engine = ScoringEngine::new(rig.store_dyn.clone());
    engine.score_match(finished.id).await.unwrap();

    let maintainer = StatisticsMaintainer::new(rig.store_dyn.clone());
    let stats = maintainer.refresh_user_statistics(user.id).await.unwrap();

    assert_eq!(stats.predictions_made, 1);
    assert_eq!(stats.total_points, 5);
}

#[tokio::test]
async fn group_refresh_aggregates_member_statistics() {
    let rig = harness();
    let group = rig.store.insert_group("Engineering").await;
    let anna = rig.store.insert_user("anna", Some(group.id)).await;
    let ben = rig.store.insert_user("ben", Some(group.id)).await;
    // Not in the group, must not count
    let outsider = rig.store.insert_user("outsider", None).await;

    let maintainer = StatisticsMaintainer::new(rig.store_dyn.clone());

    rig.store.insert_rule(Stage::Group, 5, 3).await;
    let fixture = rig.store.insert_match(Stage::Group, Utc::now()).await;
    rig.store_dyn
        .upsert_prediction(anna.id, fixture.id, 2, 0)
        .await
        .unwrap();
    rig.store_dyn
        .upsert_prediction(ben.id, fixture.id, 1, 0)
        .await
        .unwrap();
    rig.store_dyn
        .upsert_prediction(outsider.id, fixture.id, 2, 0)
        .await
        .unwrap();
    rig.store_dyn
        .record_match_result(fixture.id, 2, 0)
        .await
        .unwrap();

    let engine = ScoringEngine::new(rig.store_dyn.clone());
    engine.score_match(fixture.id).await.unwrap();
    maintainer.refresh_user_statistics(anna.id).await.unwrap();
    maintainer.refresh_user_statistics(ben.id).await.unwrap();
    maintainer
        .refresh_user_statistics(outsider.id)
        .await
        .unwrap();

    let stats = maintainer
        .refresh_group_statistics(group.id)
        .await
        .unwrap();
    assert_eq!(stats.total_points, 8);
    assert_eq!(stats.participant_count, 2);
    assert!((stats.average_points - 4.0).abs() < 1e-9);
}

#[tokio::test]
async fn empty_group_refreshes_to_zero_average() {
    let rig = harness();
    let group = rig.store.insert_group("Empty Desk").await;

    let maintainer = StatisticsMaintainer::new(rig.store_dyn.clone());
    let stats = maintainer
        .refresh_group_statistics(group.id)
        .await
        .unwrap();

    assert_eq!(stats.total_points, 0);
    assert_eq!(stats.participant_count, 0);
    assert_eq!(stats.average_points, 0.0);
}
