//! HTTP error types for the Folio server.
//!
//! Expected outcomes (missing document, bad file name, failed sign-in,
//! anonymous mutation) are handled inside the handlers with a flash and a
//! redirect or a `422` form. [`AppError`] covers the rest: anything that
//! reaches it becomes a generic HTML error page, and internal details go to
//! the log, never to the client.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use folio_core::error::{CredentialError, DocumentError};

use crate::views;

/// Application-level error returned from HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No route matched the request.
    #[error("not found: {0}")]
    NotFound(String),

    /// Filesystem, credential file, or task failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(path) => {
                tracing::debug!(path = %path, "no route matched");
                (StatusCode::NOT_FOUND, "The page you requested does not exist.")
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.",
                )
            }
        };

        (status, Html(views::error_page(status, message))).into_response()
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::from(CredentialError::Read {
            path: "/etc/folio/users.json".to_owned(),
            reason: "permission denied".to_owned(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = AppError::NotFound("/a/b/c".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
