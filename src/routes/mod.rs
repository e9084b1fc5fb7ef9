use actix_web::web;

pub mod backend_health;

use crate::handlers::admin::{
    bonus_handler, recalculation_handler, result_handler, rule_handler,
};
use crate::handlers::{leaderboard_handler, match_handler, prediction_handler};
use crate::middleware::admin::AdminMiddleware;
use crate::middleware::auth::AuthMiddleware;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(backend_health::backend_health);

    // Fixture and prediction routes (require authentication)
    cfg.service(
        web::scope("/matches")
            .wrap(AuthMiddleware)
            .service(web::resource("").route(web::get().to(match_handler::list_matches))),
    );
    cfg.service(
        web::scope("/predictions")
            .wrap(AuthMiddleware)
            .service(
                web::resource("").route(web::post().to(prediction_handler::submit_prediction)),
            )
            .service(
                web::resource("/mine")
                    .route(web::get().to(prediction_handler::get_my_predictions)),
            ),
    );

    // Leaderboard routes (require authentication)
    cfg.service(
        web::scope("/leaderboard")
            .wrap(AuthMiddleware)
            .service(
                web::resource("/users")
                    .route(web::get().to(leaderboard_handler::get_user_leaderboard)),
            )
            .service(
                web::resource("/groups")
                    .route(web::get().to(leaderboard_handler::get_group_leaderboard)),
            ),
    );

    // Administrative routes (require an active admin account)
    cfg.service(
        web::scope("/admin")
            .wrap(AdminMiddleware)
            .service(
                web::resource("/matches/{id}/result")
                    .route(web::post().to(result_handler::record_result)),
            )
            .service(
                web::resource("/recalculate")
                    .route(web::post().to(recalculation_handler::trigger_recalculation)),
            )
            .service(web::resource("/rules").route(web::get().to(rule_handler::get_rules)))
            .service(
                web::resource("/rules/{stage}").route(web::put().to(rule_handler::upsert_rule)),
            )
            .service(
                web::resource("/bonus-questions/{id}/settle")
                    .route(web::post().to(bonus_handler::settle_bonus_question)),
            ),
    );
}
