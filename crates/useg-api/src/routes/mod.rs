//! Route definitions
//!
//! Methods not listed for a path are answered with `405 Method Not Allowed`.

use axum::{routing::get, routing::post, Router};

use crate::handlers::{health, segments, user_segments, users};
use crate::state::AppState;

/// Create the main router with all routes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(segment_routes())
        .merge(health_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// User and user-segment routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::create_users))
        .route(
            "/users/segments",
            get(user_segments::get_user_segments)
                .post(user_segments::assign_user_segments)
                .delete(user_segments::remove_user_segments),
        )
}

/// Segment routes
fn segment_routes() -> Router<AppState> {
    Router::new().route(
        "/segments",
        post(segments::create_segment).delete(segments::delete_segment),
    )
}
