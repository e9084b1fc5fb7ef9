use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use scorecast_backend::config::settings::{get_config, get_jwt_settings, get_redis_url};
use scorecast_backend::run;
use scorecast_backend::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Panic if we can't read the config
    let config = get_config().expect("Failed to read the config.");

    let subscriber = get_subscriber(
        "scorecast-backend".into(),
        config.application.log_level.clone(),
        std::io::stdout,
    );
    init_subscriber(subscriber);

    let jwt_settings = get_jwt_settings(&config);

    // The cache collaborator is optional: without Redis the scoring cycle
    // still runs, invalidation notices are just skipped.
    let redis_client = match redis::Client::open(get_redis_url(&config).expose_secret()) {
        Ok(client) => {
            tracing::info!("Redis client created successfully");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(
                "Failed to create Redis client: {}. Cache invalidation notices are disabled.",
                e
            );
            None
        }
    };

    // Only try to establish connection when actually used
    let connection_pool = PgPoolOptions::new()
        .max_connections(32)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect_lazy(&config.database.connection_string().expose_secret())
        .expect("Failed to create Postgres connection pool");

    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = TcpListener::bind(&address)?;

    run(listener, connection_pool, jwt_settings, redis_client)?.await
}
