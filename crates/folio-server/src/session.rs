//! Cookie-keyed session storage.
//!
//! The client holds only an opaque random token in the `folio_session`
//! cookie; the [`Session`] itself lives server-side in a [`SessionStore`].
//! Handlers receive the session explicitly through the [`ActiveSession`]
//! extractor and hand it back with their response, which persists it and
//! attaches the cookie.
//!
//! Tokens the store does not recognise are never adopted: a fresh token is
//! issued instead, so a client cannot pick its own session id. Signing in or
//! out rotates the token.

use std::collections::HashMap;
use std::convert::Infallible;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use folio_core::auth::Session;

use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "folio_session";

/// Server-side session storage keyed by cookie token.
///
/// Implementations must be safe to share across async tasks.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Fetch a live session. Expired or unknown tokens yield `None`.
    async fn load(&self, token: &str) -> Option<Session>;

    /// Store a session under `token`, refreshing its expiry.
    async fn save(&self, token: &str, session: Session);

    /// Forget a session. Removing an unknown token is not an error.
    async fn remove(&self, token: &str);

    /// Drop every expired session and return how many were removed.
    async fn prune_expired(&self) -> usize;

    /// Number of sessions currently held, expired or not.
    async fn count(&self) -> usize;
}

struct SessionRecord {
    session: Session,
    expires_at: DateTime<Utc>,
}

/// In-memory session store with an idle timeout.
///
/// Sessions are lost when the process exits.
pub struct MemorySessionStore {
    records: RwLock<HashMap<String, SessionRecord>>,
    ttl: chrono::Duration,
}

impl MemorySessionStore {
    /// Create an empty store whose sessions expire after `ttl` without use.
    #[must_use]
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(365)),
        }
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl std::fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySessionStore")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, token: &str) -> Option<Session> {
        let mut records = self.records.write().await;
        let now = Utc::now();
        match records.get(token) {
            Some(record) if record.expires_at > now => Some(record.session.clone()),
            Some(_) => {
                records.remove(token);
                None
            }
            None => None,
        }
    }

    async fn save(&self, token: &str, session: Session) {
        let expires_at = self.expiry_from(Utc::now());
        let mut records = self.records.write().await;
        records.insert(token.to_owned(), SessionRecord { session, expires_at });
    }

    async fn remove(&self, token: &str) {
        let mut records = self.records.write().await;
        records.remove(token);
    }

    async fn prune_expired(&self) -> usize {
        let mut records = self.records.write().await;
        let now = Utc::now();
        let before = records.len();
        records.retain(|_, record| record.expires_at > now);
        before.saturating_sub(records.len())
    }

    async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

/// The session for the current request.
///
/// Dereferences to [`Session`]. Finish every handler with
/// [`respond`](Self::respond) so changes are persisted.
pub struct ActiveSession {
    jar: CookieJar,
    token: Option<String>,
    data: Session,
    rotate: bool,
}

impl ActiveSession {
    /// The signed-in username, or `None` after setting the
    /// "must be signed in" flash.
    pub fn signed_in_user(&mut self) -> Option<String> {
        self.data.require_signed_in().ok()
    }

    /// Issue a new token when this session is persisted.
    pub fn rotate(&mut self) {
        self.rotate = true;
    }

    /// Persist the session and attach the cookie to `response`.
    pub async fn respond(self, state: &AppState, response: impl IntoResponse) -> Response {
        let jar = self.persist(state).await;
        (jar, response).into_response()
    }

    async fn persist(self, state: &AppState) -> CookieJar {
        let Self {
            jar,
            mut token,
            data,
            rotate,
        } = self;

        if rotate {
            if let Some(old) = token.take() {
                state.sessions.remove(&old).await;
            }
        }

        // Anonymous sessions with nothing to show are not worth storing.
        if data == Session::default() {
            if let Some(token) = token {
                state.sessions.remove(&token).await;
            }
            if jar.get(SESSION_COOKIE).is_none() {
                return jar;
            }
            return jar.remove(Cookie::build(SESSION_COOKIE).path("/").build());
        }

        let token = token.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        state.sessions.save(&token, data).await;

        let cookie = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .secure(state.secure_cookie)
            .same_site(SameSite::Lax)
            .build();
        jar.add(cookie)
    }
}

impl Deref for ActiveSession {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl DerefMut for ActiveSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl FromRequestParts<Arc<AppState>> for ActiveSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let mut token = None;
        let mut data = Session::default();
        if let Some(cookie) = jar.get(SESSION_COOKIE) {
            if let Some(session) = state.sessions.load(cookie.value()).await {
                token = Some(cookie.value().to_owned());
                data = session;
            }
        }

        Ok(Self {
            jar,
            token,
            data,
            rotate: false,
        })
    }
}
