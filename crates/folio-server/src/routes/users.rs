//! Sign-in routes: `/users/signin`, `/users/signout`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;
use tracing::{info, warn};

use folio_core::auth::AuthState;

use super::redirect_home;
use crate::error::AppError;
use crate::session::ActiveSession;
use crate::state::AppState;
use crate::views;

/// Shown on the re-rendered form after a failed sign-in.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// Build the sign-in router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/signin", get(signin_form).post(signin))
        .route("/users/signout", post(signout))
}

#[derive(Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for SignInForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInForm")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Render the sign-in form.
async fn signin_form(State(state): State<Arc<AppState>>, mut session: ActiveSession) -> Response {
    let flash = session.take_flash();
    let page = views::signin_page(flash.as_deref(), "");
    session.respond(&state, Html(page)).await
}

/// Validate credentials and sign the session in.
async fn signin(
    State(state): State<Arc<AppState>>,
    mut session: ActiveSession,
    Form(form): Form<SignInForm>,
) -> Result<Response, AppError> {
    let username = form.username.as_str();

    if !state.credentials.validate(username, &form.password).await? {
        warn!(username = %username, "rejected sign-in");
        let page = views::signin_page(Some(INVALID_CREDENTIALS_MESSAGE), username);
        return Ok(session
            .respond(&state, (StatusCode::UNPROCESSABLE_ENTITY, Html(page)))
            .await);
    }

    info!(username = %username, "signed in");
    session.sign_in(username);
    session.set_flash("Welcome!");
    session.rotate();
    Ok(session.respond(&state, redirect_home()).await)
}

/// Sign the session out.
async fn signout(State(state): State<Arc<AppState>>, mut session: ActiveSession) -> Response {
    if let AuthState::Authenticated(username) = session.auth_state() {
        info!(username = %username, "signed out");
    }
    session.sign_out();
    session.set_flash("You have been signed out.");
    session.rotate();
    session.respond(&state, redirect_home()).await
}
