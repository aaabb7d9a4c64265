// API module - HTTP endpoints

pub mod admin;
pub mod health;
pub mod middleware;
pub mod user;
pub mod views;

use axum::{
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, get_service},
    Router,
};
use std::path::Path;
use tower_http::{services::ServeDir, trace::TraceLayer};

use middleware::session::{create_session_layer, AppState};

/// Builds the full dashboard router: admin and user pages, health and static assets.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config.cookie_secure);

    // Serve static assets from web/static
    let static_routes = Router::new().nest_service(
        "/static",
        get_service(ServeDir::new(Path::new("web").join("static"))),
    );

    Router::new()
        .route("/", get(|| async { Redirect::to("/user") }))
        .route("/health", get(health::health_check))
        .merge(admin::router())
        .merge(user::router())
        .merge(static_routes)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
