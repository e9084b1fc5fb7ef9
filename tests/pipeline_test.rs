use chrono::Utc;

use scorecast_backend::models::matches::Stage;
use scorecast_backend::models::stats::UserStatistics;
use scorecast_backend::scoring::TournamentStore;

mod common;
use common::harness;

#[tokio::test]
async fn full_cycle_scores_predictions_and_refreshes_aggregates() {
    let rig = harness();
    rig.store.insert_rule(Stage::Group, 5, 3).await;
    let group = rig.store.insert_group("Sales").await;
    let anna = rig.store.insert_user("anna", Some(group.id)).await;
    let ben = rig.store.insert_user("ben", Some(group.id)).await;

    let fixture = rig.store.insert_match(Stage::Group, Utc::now()).await;
    rig.store_dyn
        .upsert_prediction(anna.id, fixture.id, 2, 1)
        .await
        .unwrap();
    rig.store_dyn
        .upsert_prediction(ben.id, fixture.id, 0, 0)
        .await
        .unwrap();
    rig.store_dyn
        .record_match_result(fixture.id, 2, 1)
        .await
        .unwrap();

    let report = rig.pipeline.run_for_match(fixture.id).await.unwrap();
    assert_eq!(report.predictions_scored, 2);
    assert_eq!(report.users_refreshed.len(), 2);
    assert_eq!(report.groups_refreshed, vec![group.id]);

    let anna_stats = rig.store_dyn.user_statistics(anna.id).await.unwrap().unwrap();
    assert_eq!(anna_stats.total_points, 5);
    let ben_stats = rig.store_dyn.user_statistics(ben.id).await.unwrap().unwrap();
    assert_eq!(ben_stats.total_points, 0);

    let group_stats = rig
        .store_dyn
        .group_statistics(group.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(group_stats.total_points, 5);
    assert_eq!(group_stats.participant_count, 2);
    assert!((group_stats.average_points - 2.5).abs() < 1e-9);
}

#[tokio::test]
async fn rerunning_the_cycle_changes_nothing() {
    let rig = harness();
    rig.store.insert_rule(Stage::Group, 5, 3).await;
    let group = rig.store.insert_group("Support").await;
    let user = rig.store.insert_user("jo", Some(group.id)).await;

    let fixture = rig.store.insert_match(Stage::Group, Utc::now()).await;
    rig.store_dyn
        .upsert_prediction(user.id, fixture.id, 1, 0)
        .await
        .unwrap();
    rig.store_dyn
        .record_match_result(fixture.id, 3, 0)
        .await
        .unwrap();

    rig.pipeline.run_for_match(fixture.id).await.unwrap();
    let first_user = rig.store_dyn.user_statistics(user.id).await.unwrap().unwrap();
    let first_group = rig
        .store_dyn
        .group_statistics(group.id)
        .await
        .unwrap()
        .unwrap();

    rig.pipeline.run_for_match(fixture.id).await.unwrap();
    let second_user = rig.store_dyn.user_statistics(user.id).await.unwrap().unwrap();
    let second_group = rig
        .store_dyn
        .group_statistics(group.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first_user.total_points, 3);
    assert_eq!(second_user.total_points, 3);
    assert_eq!(second_user.exact_score_count, first_user.exact_score_count);
    assert_eq!(second_group.total_points, first_group.total_points);
}

#[tokio::test]
async fn recalculate_all_repairs_corrupted_statistics() {
    let rig = harness();
    rig.store.insert_rule(Stage::Group, 5, 3).await;
    let user = rig.store.insert_user("vera", None).await;

    let fixture = rig.store.insert_match(Stage::Group, Utc::now()).await;
    rig.store_dyn
        .upsert_prediction(user.id, fixture.id, 2, 2)
        .await
        .unwrap();
    rig.store_dyn
        .record_match_result(fixture.id, 2, 2)
        .await
        .unwrap();
    rig.pipeline.run_for_match(fixture.id).await.unwrap();

    // Corrupt the derived row
    rig.store_dyn
        .replace_user_statistics(&UserStatistics {
            user_id: user.id,
            total_points: 999,
            exact_score_count: 7,
            correct_outcome_count: 7,
            predictions_made: 7,
            bonus_points: 3,
            updated_at: Utc::now(),
        })
        .await
        .unwrap();

    let report = rig.pipeline.recalculate_all().await.unwrap();
    assert_eq!(report.matches_scored, 1);
    assert!(report.errors.is_empty());

    let repaired = rig.store_dyn.user_statistics(user.id).await.unwrap().unwrap();
    assert_eq!(repaired.total_points, 5);
    assert_eq!(repaired.exact_score_count, 1);
    assert_eq!(repaired.predictions_made, 1);
    assert_eq!(repaired.bonus_points, 0);
}

#[tokio::test]
async fn recalculate_all_reports_misconfigured_stages_and_continues() {
    let rig = harness();
    rig.store.insert_rule(Stage::Group, 5, 3).await;
    // No rule for the final
    let user = rig.store.insert_user("timo", None).await;

    let group_match = rig.store.insert_match(Stage::Group, Utc::now()).await;
    let final_match = rig.store.insert_match(Stage::Final, Utc::now()).await;
    rig.store_dyn
        .upsert_prediction(user.id, group_match.id, 1, 0)
        .await
        .unwrap();
    rig.store_dyn
        .upsert_prediction(user.id, final_match.id, 1, 0)
        .await
        .unwrap();
    rig.store_dyn
        .record_match_result(group_match.id, 1, 0)
        .await
        .unwrap();
    rig.store_dyn
        .record_match_result(final_match.id, 1, 0)
        .await
        .unwrap();

    let report = rig.pipeline.recalculate_all().await.unwrap();
    assert_eq!(report.matches_scored, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("final"));

    // Running again is safe and yields the same picture
    let again = rig.pipeline.recalculate_all().await.unwrap();
    assert_eq!(again.matches_scored, 1);
    assert_eq!(again.errors.len(), 1);
}

#[tokio::test]
async fn bonus_settlement_awards_and_is_resettleable() {
    let rig = harness();
    let group = rig.store.insert_group("Finance").await;
    let right = rig.store.insert_user("right", Some(group.id)).await;
    let wrong = rig.store.insert_user("wrong", Some(group.id)).await;

    let question = rig.store.insert_bonus_question("Top scorer?", 10).await;
    rig.store
        .insert_bonus_answer(question.id, right.id, "Player A")
        .await;
    rig.store
        .insert_bonus_answer(question.id, wrong.id, "Player B")
        .await;

    let report = rig
        .pipeline
        .settle_bonus_question(question.id, "Player A")
        .await
        .unwrap();
    assert_eq!(report.answers_awarded, 1);
    assert_eq!(report.users_refreshed.len(), 2);
    assert_eq!(report.groups_refreshed, vec![group.id]);

    let right_stats = rig.store_dyn.user_statistics(right.id).await.unwrap().unwrap();
    assert_eq!(right_stats.bonus_points, 10);
    assert_eq!(right_stats.total_points, 10);
    let wrong_stats = rig.store_dyn.user_statistics(wrong.id).await.unwrap().unwrap();
    assert_eq!(wrong_stats.bonus_points, 0);

    // An admin correction flips the award instead of stacking it
    let corrected = rig
        .pipeline
        .settle_bonus_question(question.id, "Player B")
        .await
        .unwrap();
    assert_eq!(corrected.answers_awarded, 1);

    let right_stats = rig.store_dyn.user_statistics(right.id).await.unwrap().unwrap();
    assert_eq!(right_stats.bonus_points, 0);
    let wrong_stats = rig.store_dyn.user_statistics(wrong.id).await.unwrap().unwrap();
    assert_eq!(wrong_stats.bonus_points, 10);
    assert_eq!(wrong_stats.total_points, 10);
}

#[tokio::test]
async fn cycles_for_disjoint_matches_do_not_interfere() {
    let rig = harness();
    rig.store.insert_rule(Stage::Group, 5, 3).await;
    let ada = rig.store.insert_user("ada", None).await;
    let lin = rig.store.insert_user("lin", None).await;

    let first = rig.store.insert_match(Stage::Group, Utc::now()).await;
    let second = rig.store.insert_match(Stage::Group, Utc::now()).await;
    rig.store_dyn
        .upsert_prediction(ada.id, first.id, 1, 0)
        .await
        .unwrap();
    rig.store_dyn
        .upsert_prediction(lin.id, second.id, 2, 2)
        .await
        .unwrap();
    rig.store_dyn
        .record_match_result(first.id, 1, 0)
        .await
        .unwrap();
    rig.store_dyn
        .record_match_result(second.id, 2, 2)
        .await
        .unwrap();

    let (first_report, second_report) = tokio::join!(
        rig.pipeline.run_for_match(first.id),
        rig.pipeline.run_for_match(second.id)
    );
    first_report.unwrap();
    second_report.unwrap();

    let ada_stats = rig.store_dyn.user_statistics(ada.id).await.unwrap().unwrap();
    let lin_stats = rig.store_dyn.user_statistics(lin.id).await.unwrap().unwrap();
    assert_eq!(ada_stats.total_points, 5);
    assert_eq!(lin_stats.total_points, 5);
}
