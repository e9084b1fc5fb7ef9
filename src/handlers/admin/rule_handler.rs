use actix_web::{web, HttpResponse, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

use crate::models::common::ApiResponse;
use crate::models::matches::Stage;
use crate::models::rule::{ScoringRule, UpsertRuleRequest};
use crate::scoring::TournamentStore;

/// GET /admin/rules - List the configured per-stage scoring rules.
pub async fn get_rules(store: web::Data<Arc<dyn TournamentStore>>) -> Result<HttpResponse> {
    match store.list_rules().await {
        Ok(rules) => Ok(HttpResponse::Ok().json(ApiResponse::success("Scoring rules", rules))),
        Err(e) => {
            error!("Failed to list scoring rules: {}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to list scoring rules")))
        }
    }
}

/// PUT /admin/rules/{stage} - Create or replace the rule for one stage.
/// Takes effect on the next scoring pass; already scored matches keep their
/// awards until re-scored.
#[tracing::instrument(name = "Upsert scoring rule", skip(store, body))]
pub async fn upsert_rule(
    store: web::Data<Arc<dyn TournamentStore>>,
    path: web::Path<String>,
    body: web::Json<UpsertRuleRequest>,
) -> Result<HttpResponse> {
    let stage = match Stage::parse(&path.into_inner()) {
        Some(stage) => stage,
        None => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
                "Unknown stage; expected one of: group, round-of-32, round-of-16, quarter, semi, third-place, final",
            )));
        }
    };

    let rule = ScoringRule {
        stage,
        exact_score_points: body.exact_score_points,
        correct_outcome_points: body.correct_outcome_points,
        updated_at: Utc::now(),
    };

    if !rule.is_valid() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
            "Rule must satisfy exact_score_points >= correct_outcome_points >= 0",
        )));
    }

    match store.upsert_rule(&rule).await {
        Ok(()) => {
            info!(
                "Scoring rule for stage '{}' set to exact={}, outcome={}",
                stage, rule.exact_score_points, rule.correct_outcome_points
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success("Scoring rule saved", rule)))
        }
        Err(e) => {
            error!("Failed to save scoring rule for stage '{}': {}", stage, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to save scoring rule")))
        }
    }
}
