use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::{make_span_with_request_id, request_id_middleware};

pub mod books;
pub mod bookshelf;
pub mod favorites;
pub mod profile;
pub mod recommendations;
pub mod state;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/genres", get(profile::list_genres))
        .route("/users", post(profile::create_user))
        .route("/user/profile", get(profile::get_profile))
        .route("/user/interests", put(profile::update_interests))
        .route("/user/genre-count", put(profile::increment_genre_count))
        .route(
            "/user/favorites",
            get(favorites::list).post(favorites::add),
        )
        .route("/user/favorites/:isbn", delete(favorites::remove))
        .route("/user/bookshelf", get(bookshelf::show))
        .route("/books/:isbn", get(books::show))
        .route("/sessions", post(recommendations::create_session))
        .route(
            "/sessions/:id",
            get(recommendations::get_session).delete(recommendations::delete_session),
        )
        .route("/sessions/:id/refresh", post(recommendations::refresh_session))
        .route("/sessions/:id/genres/:genre", get(recommendations::get_genre))
        .route("/sessions/:id/genres/:genre/next", post(recommendations::next))
        .route("/sessions/:id/genres/:genre/prev", post(recommendations::prev))
        .route("/sessions/:id/genres/:genre/hide", post(recommendations::hide))
        .route(
            "/sessions/:id/genres/:genre/refresh",
            post(recommendations::refresh_genre),
        )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
