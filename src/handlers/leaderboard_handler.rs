use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use tracing::error;

use crate::middleware::auth::Claims;
use crate::models::common::ApiResponse;
use crate::scoring::StandingsRanker;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub name: Option<String>,
}

/// GET /leaderboard/users - Ranked individual standings.
///
/// `limit`/`offset` page through the fully sorted sequence; rank numbers
/// stay absolute. `name` filters by a case-insensitive username substring
/// without renumbering.
#[tracing::instrument(
    name = "Get user leaderboard",
    skip(ranker, claims, query),
    fields(username = %claims.username)
)]
pub async fn get_user_leaderboard(
    ranker: web::Data<StandingsRanker>,
    claims: web::ReqData<Claims>,
    query: web::Query<LeaderboardQuery>,
) -> Result<HttpResponse> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    match ranker
        .rank_individuals(query.name.as_deref(), limit, offset)
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success("User leaderboard", page))),
        Err(e) => {
            error!("Failed to build user leaderboard: {}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to build leaderboard")))
        }
    }
}

/// GET /leaderboard/groups - Ranked group standings.
#[tracing::instrument(
    name = "Get group leaderboard",
    skip(ranker, claims),
    fields(username = %claims.username)
)]
pub async fn get_group_leaderboard(
    ranker: web::Data<StandingsRanker>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match ranker.rank_groups().await {
        Ok(groups) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success("Group leaderboard", groups)))
        }
        Err(e) => {
            error!("Failed to build group leaderboard: {}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to build leaderboard")))
        }
    }
}
