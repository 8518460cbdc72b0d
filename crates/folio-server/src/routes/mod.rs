//! HTTP route handlers for Folio.
//!
//! Routes are organized by concern:
//! - `documents`: list, show, create, edit, update, delete
//! - `users`: sign-in and sign-out

pub mod documents;
pub mod users;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Maximum concurrent sign-in requests; each one runs an Argon2 verification.
const SIGNIN_CONCURRENCY_LIMIT: usize = 8;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let signin_routes =
        users::router().layer(tower::limit::ConcurrencyLimitLayer::new(SIGNIN_CONCURRENCY_LIMIT));

    Router::new()
        .merge(signin_routes)
        .merge(documents::router())
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

async fn fallback(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_owned())
}

/// `302 Found` back to the document list.
pub(crate) fn redirect_home() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}
