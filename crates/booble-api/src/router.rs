//! Route definitions for the BoobleDrive HTTP API.
//!
//! All routes are organized by resource and mounted under `/api/v1`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let cors = middleware::build_cors_layer(&state.config.server.cors);

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(user_routes())
        .merge(file_routes())
        .merge(upload_routes())
        .merge(tag_routes())
        .merge(thumbnail_routes())
        .merge(public_routes());

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::request_logging))
        .with_state(state)
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Registration, tokens, and profile
fn user_routes() -> Router<AppState> {
    use handlers::user;

    Router::new()
        .route("/users/register", post(user::register))
        .route("/users/login", post(user::login))
        .route("/users/refresh-token", post(user::refresh_token))
        .route("/users/logout", post(user::logout))
        .route("/users/me", get(user::me).delete(user::delete_me))
        .route("/users/{id}", get(user::get_user).delete(user::delete_user))
}

/// File CRUD, versions, sharing, tags, and favorites
fn file_routes() -> Router<AppState> {
    use handlers::file;

    Router::new()
        .route("/files", get(file::search_files))
        .route("/files/shared", get(file::shared_files))
        .route("/files/favorites", get(file::favorite_files))
        .route("/files/upload", post(file::upload_file))
        .route(
            "/files/{id}",
            get(file::get_file)
                .put(file::update_file)
                .delete(file::delete_file),
        )
        .route("/files/{id}/restore", post(file::restore_file))
        .route("/files/{id}/download", get(file::download_file))
        .route(
            "/files/{id}/versions",
            get(file::list_versions).post(file::upload_version),
        )
        .route(
            "/files/{id}/versions/{version}/download",
            get(file::download_version),
        )
        .route("/files/{id}/share", post(file::share_file))
        .route("/files/{id}/share/{user_id}", delete(file::revoke_share))
        .route("/files/{id}/visibility", put(file::set_visibility))
        .route(
            "/files/{id}/transfer-ownership",
            post(file::transfer_ownership),
        )
        .route(
            "/files/{id}/share-link",
            get(file::list_share_links)
                .post(file::create_share_link)
                .delete(file::delete_share_links),
        )
        .route("/files/{id}/tags", put(file::update_tags))
        .route(
            "/files/{id}/favorite",
            post(file::add_favorite).delete(file::remove_favorite),
        )
}

/// Chunked uploads
fn upload_routes() -> Router<AppState> {
    use handlers::upload;

    Router::new()
        .route("/uploads/initiate", post(upload::initiate_upload))
        .route(
            "/uploads/{upload_id}",
            post(upload::upload_chunk).delete(upload::cancel_upload),
        )
        .route("/uploads/{upload_id}/complete", post(upload::complete_upload))
}

fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(handlers::tag::list_tags))
        .route("/tags/search", get(handlers::tag::search_tags))
}

fn thumbnail_routes() -> Router<AppState> {
    Router::new()
        .route("/thumbnails/{file_id}", get(handlers::thumbnail::get_thumbnail))
        .route(
            "/thumbnails/public/{token}",
            get(handlers::thumbnail::public_thumbnail),
        )
}

/// Unauthenticated public link access
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/public/{token}", get(handlers::public::public_file))
        .route("/public/{token}/download", get(handlers::public::public_download))
}
