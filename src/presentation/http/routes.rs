//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::track_metrics;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .route("/metrics", get(metrics_handler))
        // route_layer so the matched route template is visible to the recorder
        .route_layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics::gather_metrics(),
    )
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", user_routes())
        .nest("/events", event_routes())
        .nest("/clubs", club_routes())
        .nest("/listings", listing_routes())
        .nest("/posts", post_routes())
        .route("/uploads/signature", post(handlers::upload::create_signature))
}

fn user_routes() -> Router<AppState> {
    use handlers::user;

    Router::new()
        .route("/", get(user::list_users).post(user::create_user))
        .route(
            "/{id}",
            get(user::get_user)
                .put(user::update_user)
                .patch(user::update_user)
                .delete(user::delete_user),
        )
        .route("/{id}/profile", get(user::get_profile))
}

fn event_routes() -> Router<AppState> {
    use handlers::event;

    Router::new()
        .route("/", get(event::list_events).post(event::create_event))
        .route(
            "/{id}",
            get(event::get_event)
                .put(event::update_event)
                .patch(event::update_event)
                .delete(event::delete_event),
        )
        .route(
            "/{id}/attend",
            post(event::attend_event).delete(event::leave_event),
        )
}

fn club_routes() -> Router<AppState> {
    use handlers::club;

    Router::new()
        .route("/", get(club::list_clubs).post(club::create_club))
        .route(
            "/{id}",
            get(club::get_club)
                .put(club::update_club)
                .patch(club::update_club)
                .delete(club::delete_club),
        )
        .route("/{id}/join", post(club::join_club))
        .route("/{id}/leave", delete(club::leave_club))
        .route(
            "/{id}/members/{user_id}",
            delete(club::remove_member),
        )
        .route("/{id}/officers", post(club::add_officer))
        .route(
            "/{id}/officers/{user_id}",
            delete(club::remove_officer),
        )
}

fn listing_routes() -> Router<AppState> {
    use handlers::listing;

    Router::new()
        .route("/", get(listing::list_listings).post(listing::create_listing))
        .route(
            "/{id}",
            get(listing::get_listing)
                .put(listing::update_listing)
                .patch(listing::update_listing)
                .delete(listing::delete_listing),
        )
        .route("/{id}/sold", post(listing::mark_sold))
        .route("/{id}/available", post(listing::mark_available))
}

fn post_routes() -> Router<AppState> {
    use handlers::post as posts;

    Router::new()
        .route("/", get(posts::list_posts).post(posts::create_post))
        .route(
            "/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .patch(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/{id}/like", post(posts::toggle_like))
        .route("/{id}/comments", post(posts::add_comment))
        .route(
            "/{id}/comments/{comment_id}",
            delete(posts::remove_comment),
        )
}
