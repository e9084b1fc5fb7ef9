use actix_web::{web, HttpResponse, Result};
use std::sync::Arc;
use tracing::error;

use crate::middleware::auth::Claims;
use crate::models::common::ApiResponse;
use crate::scoring::TournamentStore;

/// GET /matches - All fixtures with team names, ordered by kickoff. Team
/// names are null for knockout slots still to be determined.
#[tracing::instrument(
    name = "List matches",
    skip(store, claims),
    fields(username = %claims.username)
)]
pub async fn list_matches(
    store: web::Data<Arc<dyn TournamentStore>>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match store.list_matches().await {
        Ok(matches) => Ok(HttpResponse::Ok().json(ApiResponse::success("Fixtures", matches))),
        Err(e) => {
            error!("Failed to list matches: {}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to list matches")))
        }
    }
}
