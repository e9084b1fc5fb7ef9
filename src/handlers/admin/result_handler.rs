use actix_web::{web, HttpResponse, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::common::ApiResponse;
use crate::models::matches::RecordResultRequest;
use crate::scoring::{ScoringPipeline, TournamentStore};

#[derive(Debug, Serialize)]
pub struct RecordResultResponse {
    pub match_id: Uuid,
    pub home_score: i32,
    pub away_score: i32,
    pub predictions_scored: usize,
    pub users_refreshed: usize,
    pub groups_refreshed: usize,
}

/// POST /admin/matches/{id}/result - Record a final result and run the
/// scoring cycle for the match.
///
/// Re-posting a result for an already finished match overwrites it and
/// re-runs the cycle, which the overwrite semantics absorb.
#[tracing::instrument(name = "Record match result", skip(store, pipeline, body))]
pub async fn record_result(
    store: web::Data<Arc<dyn TournamentStore>>,
    pipeline: web::Data<ScoringPipeline>,
    path: web::Path<Uuid>,
    body: web::Json<RecordResultRequest>,
) -> Result<HttpResponse> {
    let match_id = path.into_inner();

    if body.home_score < 0 || body.away_score < 0 {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error("Scores must be non-negative")));
    }

    info!(
        "Recording result {} - {} for match {}",
        body.home_score, body.away_score, match_id
    );

    let updated = match store
        .record_match_result(match_id, body.home_score, body.away_score)
        .await
    {
        Ok(Some(fixture)) => fixture,
        Ok(None) => {
            return Ok(
                HttpResponse::NotFound().json(ApiResponse::<()>::error("Match not found"))
            );
        }
        Err(e) => {
            error!("Failed to record result for match {}: {}", match_id, e);
            return Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to record result")));
        }
    };

    match pipeline.run_for_match(match_id).await {
        Ok(cycle) => {
            let response = RecordResultResponse {
                match_id,
                home_score: body.home_score,
                away_score: body.away_score,
                predictions_scored: cycle.predictions_scored,
                users_refreshed: cycle.users_refreshed.len(),
                groups_refreshed: cycle.groups_refreshed.len(),
            };
            info!(
                "Result recorded for match {} ({}): {} predictions scored",
                match_id,
                updated.stage,
                cycle.predictions_scored
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                "Result recorded and predictions scored",
                response,
            )))
        }
        Err(e) => {
            error!("Scoring cycle failed for match {}: {}", match_id, e);
            Ok(crate::handlers::scoring_error_response(&e))
        }
    }
}
