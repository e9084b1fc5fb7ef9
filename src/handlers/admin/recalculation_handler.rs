use actix_web::{web, HttpResponse, Result};
use serde::Serialize;
use tracing::{error, info};

use crate::models::common::ApiResponse;
use crate::scoring::ScoringPipeline;

#[derive(Debug, Serialize)]
pub struct RecalculationResponse {
    pub matches_scored: usize,
    pub users_refreshed: usize,
    pub groups_refreshed: usize,
    pub errors: Vec<String>,
}

/// POST /admin/recalculate - Re-score every finished match and rebuild all
/// statistics from scratch.
///
/// The blanket recovery tool for stale or suspect scores; meant to be
/// triggered out-of-band, not from a user-facing flow.
#[tracing::instrument(name = "Trigger full recalculation", skip(pipeline))]
pub async fn trigger_recalculation(
    pipeline: web::Data<ScoringPipeline>,
) -> Result<HttpResponse> {
    info!("Manual full recalculation triggered");

    match pipeline.recalculate_all().await {
        Ok(report) => {
            let message = format!(
                "Recalculated {} matches ({} users, {} groups refreshed, {} errors)",
                report.matches_scored,
                report.users_refreshed,
                report.groups_refreshed,
                report.errors.len()
            );
            info!("{}", message);
            let response = RecalculationResponse {
                matches_scored: report.matches_scored,
                users_refreshed: report.users_refreshed,
                groups_refreshed: report.groups_refreshed,
                errors: report.errors,
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(message, response)))
        }
        Err(e) => {
            error!("Full recalculation failed: {}", e);
            Ok(crate::handlers::scoring_error_response(&e))
        }
    }
}
