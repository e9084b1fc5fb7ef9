use actix_web::{web, HttpResponse, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::error;

use crate::middleware::auth::Claims;
use crate::models::common::ApiResponse;
use crate::models::matches::MatchStatus;
use crate::models::prediction::SubmitPredictionRequest;
use crate::scoring::TournamentStore;

/// POST /predictions - Create or update the caller's guess for a match.
///
/// Allowed only while the match is still scheduled and before kickoff; once
/// the match leaves 'scheduled' the guess is locked in.
#[tracing::instrument(
    name = "Submit prediction",
    skip(store, claims, body),
    fields(username = %claims.username)
)]
pub async fn submit_prediction(
    store: web::Data<Arc<dyn TournamentStore>>,
    claims: web::ReqData<Claims>,
    body: web::Json<SubmitPredictionRequest>,
) -> Result<HttpResponse> {
    let Some(user_id) = claims.user_id() else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error("Invalid user ID")));
    };

    if body.predicted_home < 0 || body.predicted_away < 0 {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error("Predicted scores must be non-negative")));
    }

    let fixture = match store.match_by_id(body.match_id).await {
        Ok(Some(fixture)) => fixture,
        Ok(None) => {
            return Ok(
                HttpResponse::NotFound().json(ApiResponse::<()>::error("Match not found"))
            );
        }
        Err(e) => {
            error!("Failed to load match {}: {}", body.match_id, e);
            return Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to load match")));
        }
    };

    if fixture.status != MatchStatus::Scheduled || Utc::now() >= fixture.kickoff_time {
        return Ok(HttpResponse::Conflict().json(ApiResponse::<()>::error(
            "Predictions for this match are closed",
        )));
    }

    match store
        .upsert_prediction(
            user_id,
            body.match_id,
            body.predicted_home,
            body.predicted_away,
        )
        .await
    {
        Ok(prediction) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success("Prediction saved", prediction)))
        }
        Err(e) => {
            error!(
                "Failed to save prediction for user {} on match {}: {}",
                user_id, body.match_id, e
            );
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to save prediction")))
        }
    }
}

/// GET /predictions/mine - The caller's predictions. Derived fields stay
/// null until the match is finished and scored.
#[tracing::instrument(
    name = "Get own predictions",
    skip(store, claims),
    fields(username = %claims.username)
)]
pub async fn get_my_predictions(
    store: web::Data<Arc<dyn TournamentStore>>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let Some(user_id) = claims.user_id() else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error("Invalid user ID")));
    };

    match store.predictions_for_user(user_id).await {
        Ok(predictions) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success("Your predictions", predictions)))
        }
        Err(e) => {
            error!("Failed to load predictions for user {}: {}", user_id, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to load predictions")))
        }
    }
}
