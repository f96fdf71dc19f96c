use std::time::Duration;

use sea_orm::{ConnectOptions, Database};
use tracing::info;

use rately_api::config::ApiConfig;
use rately_api::router::build_router;
use rately_api::state::AppState;

#[tokio::main]
async fn main() {
    rately_core::tracing::init_tracing();

    let config = ApiConfig::from_env();

    // Bounded pool: waiters queue until the acquire timeout, then the
    // request fails instead of piling up.
    let mut options = ConnectOptions::new(&config.database_url);
    options
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(8));
    let db = Database::connect(options)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        jwt_secret: config.jwt_secret,
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("api service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
