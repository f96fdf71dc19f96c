use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use rately_core::health::healthz;
use rately_core::middleware::{propagate_request_id_layer, set_request_id_layer};

use crate::handlers::{
    auth::{login, register},
    rating::{list_store_ratings, submit_rating},
    store::{create_store, get_store, list_stores, owner_dashboard, platform_stats},
    user::{create_user, get_user, list_users, update_password},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        // Users
        .route("/users", get(list_users))
        .route("/users", post(create_user))
        .route("/users/password", put(update_password))
        .route("/users/{id}", get(get_user))
        // Stores
        .route("/stores", get(list_stores))
        .route("/stores", post(create_store))
        .route("/stores/stats/dashboard", get(platform_stats))
        .route("/stores/owner/dashboard", get(owner_dashboard))
        .route("/stores/{id}", get(get_store))
        // Ratings
        .route("/ratings", post(submit_rating))
        .route("/ratings/store/{store_id}", get(list_store_ratings))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(set_request_id_layer())
        .layer(cors_layer())
        .with_state(state)
}

/// Readiness: ready once the database answers a ping.
async fn readyz(State(state): State<AppState>) -> StatusCode {
    match state.db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// The browser frontend is served from a different origin and sends
/// credentialed requests.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(HeaderValue::from_static("http://localhost:3000"))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
