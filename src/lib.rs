use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{http, web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub mod config;
pub mod db;
mod handlers;
mod middleware;
pub mod models;
mod routes;
pub mod scoring;
pub mod services;
pub mod telemetry;

use crate::config::jwt::JwtSettings;
use crate::db::PostgresStore;
use crate::routes::init_routes;
use crate::scoring::{ScoringPipeline, StandingsRanker, TournamentStore};
use crate::services::CacheInvalidator;

pub fn run(
    listener: TcpListener,
    db_pool: PgPool,
    jwt_settings: JwtSettings,
    redis_client: Option<Arc<redis::Client>>,
) -> Result<Server, std::io::Error> {
    let store: Arc<dyn TournamentStore> = Arc::new(PostgresStore::new(db_pool.clone()));
    let invalidator = CacheInvalidator::new(redis_client);

    // Wrap using web::Data, which boils down to an Arc smart pointer
    let pipeline = web::Data::new(ScoringPipeline::new(store.clone(), invalidator));
    let ranker = web::Data::new(StandingsRanker::new(store.clone()));
    let store_data = web::Data::new(store);
    let db_pool_data = web::Data::new(db_pool);
    let jwt_settings = web::Data::new(jwt_settings);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:3001")
            .allowed_origin("https://scorecast.internal.example.com")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH"])
            .allowed_headers(vec![
                http::header::AUTHORIZATION,
                http::header::ACCEPT,
                http::header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(db_pool_data.clone())
            .app_data(jwt_settings.clone())
            .app_data(store_data.clone())
            .app_data(pipeline.clone())
            .app_data(ranker.clone())
            .configure(init_routes)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
