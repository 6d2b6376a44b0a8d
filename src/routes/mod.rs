pub mod assets;
pub mod events;
pub mod health;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// Base64 images travel inside JSON bodies.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::hello))
        .route("/health", get(health::health))
        .route("/api/users/", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/:email/",
            get(users::get_user).delete(users::delete_user),
        )
        .route("/api/events/:id/", get(events::get_event))
        .route("/api/upload/", post(assets::upload_asset))
        .route("/api/:sender_email/events/", post(events::create_event))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
