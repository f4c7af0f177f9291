use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use common::types::Health;

pub mod admin;
pub mod articles;
pub mod auth;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public pages, login/logout, and the
/// session-gated admin routes.
pub fn build_router(state: auth::ServerState) -> Router {
    let public = Router::new()
        .route("/", get(articles::home))
        .route("/health", get(health))
        .route("/article/:filename", get(articles::article));

    let session = Router::new()
        .route(auth::LOGIN_PATH, get(auth::login_form).post(auth::login))
        .route("/admin/logout", get(auth::logout));

    // Admin routes; every one of them requires an authenticated session
    let admin_routes = Router::new()
        .route(auth::DASHBOARD_PATH, get(admin::dashboard))
        .route("/admin/add", post(admin::add_article))
        .route("/admin/edit/:filename", get(admin::edit_form).post(admin::edit_article))
        .route("/admin/delete/:filename", post(admin::delete_article))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_session));

    public
        .merge(session)
        .merge(admin_routes)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
