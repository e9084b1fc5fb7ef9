use actix_web::{web, HttpResponse, Result};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::bonus::SettleBonusRequest;
use crate::models::common::ApiResponse;
use crate::scoring::ScoringPipeline;

#[derive(Debug, Serialize)]
pub struct SettleBonusResponse {
    pub question_id: Uuid,
    pub answers_awarded: usize,
    pub users_refreshed: usize,
    pub groups_refreshed: usize,
}

/// POST /admin/bonus-questions/{id}/settle - Record the correct option for a
/// bonus question and award its points to every matching answer.
///
/// Settlement overwrites each answer's award, so re-settling with a
/// corrected option is safe and never double-applies.
#[tracing::instrument(name = "Settle bonus question", skip(pipeline, body))]
pub async fn settle_bonus_question(
    pipeline: web::Data<ScoringPipeline>,
    path: web::Path<Uuid>,
    body: web::Json<SettleBonusRequest>,
) -> Result<HttpResponse> {
    let question_id = path.into_inner();

    if body.correct_option.trim().is_empty() {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error("correct_option must not be empty")));
    }

    match pipeline
        .settle_bonus_question(question_id, body.correct_option.trim())
        .await
    {
        Ok(report) => {
            info!(
                "Bonus question {} settled: {} answers awarded",
                question_id, report.answers_awarded
            );
            let response = SettleBonusResponse {
                question_id,
                answers_awarded: report.answers_awarded,
                users_refreshed: report.users_refreshed.len(),
                groups_refreshed: report.groups_refreshed.len(),
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success("Bonus question settled", response)))
        }
        Err(e) => {
            error!("Failed to settle bonus question {}: {}", question_id, e);
            Ok(crate::handlers::scoring_error_response(&e))
        }
    }
}
