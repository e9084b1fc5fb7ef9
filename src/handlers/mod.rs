pub mod admin;
pub mod leaderboard_handler;
pub mod match_handler;
pub mod prediction_handler;

use actix_web::HttpResponse;

use crate::models::common::ApiResponse;
use crate::scoring::errors::{NotScorableReason, ScoringError};
use crate::scoring::store::StoreError;

/// Map a scoring pipeline failure to an HTTP response: precondition problems
/// are the caller's to fix, configuration gaps surface as conflicts, store
/// failures stay opaque.
pub(crate) fn scoring_error_response(error: &ScoringError) -> HttpResponse {
    match error {
        ScoringError::MatchNotScorable {
            reason: NotScorableReason::NotFound,
            ..
        } => HttpResponse::NotFound().json(ApiResponse::<()>::error("Match not found")),
        ScoringError::MatchNotScorable { .. } => {
            HttpResponse::BadRequest().json(ApiResponse::<()>::error(error.to_string()))
        }
        ScoringError::RuleMissing { .. } => {
            HttpResponse::Conflict().json(ApiResponse::<()>::error(error.to_string()))
        }
        ScoringError::Store(StoreError::NotFound(what)) => {
            HttpResponse::NotFound().json(ApiResponse::<()>::error(format!("{} not found", what)))
        }
        ScoringError::AggregateRefreshFailure { .. } | ScoringError::Store(_) => {
            HttpResponse::InternalServerError().json(ApiResponse::<()>::error("Internal error"))
        }
    }
}
