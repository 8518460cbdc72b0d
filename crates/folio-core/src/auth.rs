//! Per-client session state and the sign-in guard.
//!
//! A [`Session`] is passed explicitly to every handler. It carries at most a
//! signed-in username and one flash message. Mutating operations call
//! [`Session::require_signed_in`] first and bail out early when it fails.

use serde::{Deserialize, Serialize};

use crate::error::Unauthenticated;

/// Flash shown when an anonymous client attempts a mutating operation.
pub const SIGN_IN_REQUIRED: &str = "You must be signed in to do that.";

/// Whether the client has signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated(String),
}

/// Session data for one client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: Option<String>,
    pub flash: Option<String>,
}

impl Session {
    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        match &self.username {
            Some(name) => AuthState::Authenticated(name.clone()),
            None => AuthState::Anonymous,
        }
    }

    /// `Anonymous -> Authenticated`. Call only after credentials validated.
    pub fn sign_in(&mut self, username: impl Into<String>) {
        self.username = Some(username.into());
    }

    /// `Authenticated -> Anonymous`.
    pub fn sign_out(&mut self) {
        self.username = None;
    }

    /// Replace the pending flash message.
    pub fn set_flash(&mut self, message: impl Into<String>) {
        self.flash = Some(message.into());
    }

    /// Take the pending flash message, clearing it.
    pub fn take_flash(&mut self) -> Option<String> {
        self.flash.take()
    }

    /// Guard for mutating operations.
    ///
    /// On success returns the signed-in username. On failure the
    /// "must be signed in" flash is already set, so the caller only needs to
    /// redirect.
    ///
    /// # Errors
    ///
    /// Returns [`Unauthenticated`] when no user is signed in.
    pub fn require_signed_in(&mut self) -> Result<String, Unauthenticated> {
        match self.auth_state() {
            AuthState::Authenticated(username) => Ok(username),
            AuthState::Anonymous => {
                self.set_flash(SIGN_IN_REQUIRED);
                Err(Unauthenticated)
            }
        }
    }
}
