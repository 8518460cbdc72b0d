//! Document routes: `/`, `/new`, `/{filename}`, `/{filename}/edit`,
//! `/{filename}/delete`.
//!
//! Every mutating handler starts with the sign-in guard. Expected failures
//! (missing document, bad name) end in a flash plus a redirect or a `422`
//! form; only unexpected filesystem errors become [`AppError`]s.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;
use tracing::info;

use folio_core::auth::AuthState;
use folio_core::document::{ContentKind, Document, DocumentName};
use folio_core::error::DocumentError;

use super::redirect_home;
use crate::error::AppError;
use crate::session::ActiveSession;
use crate::state::AppState;
use crate::views;

/// Shown when a new document name is missing or has the wrong extension.
pub const INVALID_NAME_MESSAGE: &str = "Please enter a valid file name.";

/// Build the document router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/new", get(new_form).post(create_document))
        .route("/{filename}", get(show_document).post(update_document))
        .route("/{filename}/edit", get(edit_form))
        .route("/{filename}/delete", post(delete_document))
}

// ── Request types ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewDocumentForm {
    #[serde(default)]
    pub new_file: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDocumentForm {
    #[serde(default)]
    pub content: String,
}

// ── Handlers ─────────────────────────────────────────────────────────

/// List all documents.
async fn index(State(state): State<Arc<AppState>>, mut session: ActiveSession) -> Response {
    let files = state.documents.list().await;
    let flash = session.take_flash();
    let user = match session.auth_state() {
        AuthState::Authenticated(username) => Some(username),
        AuthState::Anonymous => None,
    };
    let page = views::index_page(&files, flash.as_deref(), user.as_deref());
    session.respond(&state, Html(page)).await
}

/// Show a document: rendered markdown, or the raw text.
async fn show_document(
    State(state): State<Arc<AppState>>,
    session: ActiveSession,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let Some(name) = DocumentName::parse(&filename) else {
        return Ok(does_not_exist(&state, session, &filename).await);
    };

    match state.documents.read(&name).await {
        Ok(document) => {
            let response = render_document(&state, &document);
            Ok(session.respond(&state, response).await)
        }
        Err(DocumentError::NotFound { .. }) => {
            Ok(does_not_exist(&state, session, name.as_str()).await)
        }
        Err(e) => Err(e.into()),
    }
}

/// Render the new-document form.
async fn new_form(State(state): State<Arc<AppState>>, mut session: ActiveSession) -> Response {
    if session.signed_in_user().is_none() {
        return sign_in_required(&state, session).await;
    }

    let flash = session.take_flash();
    let page = views::new_document_page(flash.as_deref(), "");
    session.respond(&state, Html(page)).await
}

/// Create an empty document named by the `new_file` form field.
async fn create_document(
    State(state): State<Arc<AppState>>,
    mut session: ActiveSession,
    Form(form): Form<NewDocumentForm>,
) -> Result<Response, AppError> {
    let Some(user) = session.signed_in_user() else {
        return Ok(sign_in_required(&state, session).await);
    };

    let attempted = form.new_file.trim();
    let Some(name) = DocumentName::parse(attempted) else {
        return Ok(rejected_name(&state, session, attempted, INVALID_NAME_MESSAGE).await);
    };

    match state.documents.create(&name, b"").await {
        Ok(()) => {
            info!(document = %name, user = %user, "document created");
            session.set_flash(format!("{name} was created."));
            Ok(session.respond(&state, redirect_home()).await)
        }
        Err(DocumentError::InvalidName { .. }) => {
            Ok(rejected_name(&state, session, attempted, INVALID_NAME_MESSAGE).await)
        }
        Err(DocumentError::AlreadyExists { .. }) => {
            let message = format!("{name} already exists.");
            Ok(rejected_name(&state, session, attempted, &message).await)
        }
        Err(e) => Err(e.into()),
    }
}

/// Render the edit form pre-filled with the document's content.
async fn edit_form(
    State(state): State<Arc<AppState>>,
    mut session: ActiveSession,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    if session.signed_in_user().is_none() {
        return Ok(sign_in_required(&state, session).await);
    }
    let Some(name) = DocumentName::parse(&filename) else {
        return Ok(does_not_exist(&state, session, &filename).await);
    };

    match state.documents.read(&name).await {
        Ok(document) => {
            let flash = session.take_flash();
            let page = views::edit_page(&name, &document.text(), flash.as_deref());
            Ok(session.respond(&state, Html(page)).await)
        }
        Err(DocumentError::NotFound { .. }) => {
            Ok(does_not_exist(&state, session, name.as_str()).await)
        }
        Err(e) => Err(e.into()),
    }
}

/// Overwrite a document with the `content` form field.
async fn update_document(
    State(state): State<Arc<AppState>>,
    mut session: ActiveSession,
    Path(filename): Path<String>,
    Form(form): Form<UpdateDocumentForm>,
) -> Result<Response, AppError> {
    let Some(user) = session.signed_in_user() else {
        return Ok(sign_in_required(&state, session).await);
    };
    let Some(name) = DocumentName::parse(&filename) else {
        return Ok(does_not_exist(&state, session, &filename).await);
    };

    match state.documents.write(&name, form.content.as_bytes()).await {
        Ok(()) => {
            info!(document = %name, user = %user, bytes = form.content.len(), "document updated");
            session.set_flash(format!("{name} has been updated."));
            Ok(session.respond(&state, redirect_home()).await)
        }
        Err(DocumentError::NotFound { .. }) => {
            Ok(does_not_exist(&state, session, name.as_str()).await)
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a document.
async fn delete_document(
    State(state): State<Arc<AppState>>,
    mut session: ActiveSession,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let Some(user) = session.signed_in_user() else {
        return Ok(sign_in_required(&state, session).await);
    };
    let Some(name) = DocumentName::parse(&filename) else {
        return Ok(does_not_exist(&state, session, &filename).await);
    };

    match state.documents.delete(&name).await {
        Ok(()) => {
            info!(document = %name, user = %user, "document deleted");
            session.set_flash(format!("{name} has been deleted."));
            Ok(session.respond(&state, redirect_home()).await)
        }
        Err(DocumentError::NotFound { .. }) => {
            Ok(does_not_exist(&state, session, name.as_str()).await)
        }
        Err(e) => Err(e.into()),
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn render_document(state: &AppState, document: &Document) -> Response {
    match document.kind {
        ContentKind::Markdown => {
            let rendered = state.renderer.render(&document.text());
            Html(views::markdown_page(&document.name, &rendered)).into_response()
        }
        ContentKind::Plain => (
            [(header::CONTENT_TYPE, "text/plain")],
            document.content.clone(),
        )
            .into_response(),
        ContentKind::Unknown => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            document.content.clone(),
        )
            .into_response(),
    }
}

/// The guard already set the flash; send the client home.
async fn sign_in_required(state: &AppState, session: ActiveSession) -> Response {
    session.respond(state, redirect_home()).await
}

async fn does_not_exist(state: &AppState, mut session: ActiveSession, name: &str) -> Response {
    session.set_flash(format!("{name} does not exist."));
    session.respond(state, redirect_home()).await
}

async fn rejected_name(
    state: &AppState,
    session: ActiveSession,
    attempted: &str,
    message: &str,
) -> Response {
    let page = views::new_document_page(Some(message), attempted);
    session
        .respond(state, (StatusCode::UNPROCESSABLE_ENTITY, Html(page)))
        .await
}
