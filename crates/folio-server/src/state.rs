//! Shared application state for the Folio server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`.

use std::sync::Arc;
use std::time::Duration;

use folio_core::credentials::CredentialStore;
use folio_core::document::DocumentStore;
use folio_core::markdown::Renderer;

use crate::config::ServerConfig;
use crate::session::{MemorySessionStore, SessionStore};

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Flat directory of documents.
    pub documents: DocumentStore,
    /// Username to password-hash file.
    pub credentials: CredentialStore,
    /// Markdown renderer with the configured raw HTML policy.
    pub renderer: Renderer,
    /// Per-client session records.
    pub sessions: Arc<dyn SessionStore>,
    /// Whether the session cookie is marked `Secure`.
    pub secure_cookie: bool,
}

impl AppState {
    /// Build state from configuration with an in-memory session store.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            documents: DocumentStore::new(&config.data_dir),
            credentials: CredentialStore::new(&config.users_file),
            renderer: Renderer::new(config.raw_html),
            sessions: Arc::new(MemorySessionStore::new(Duration::from_secs(
                config.session_ttl_secs,
            ))),
            secure_cookie: config.secure_cookie,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("documents", &self.documents.root())
            .field("credentials", &self.credentials.path())
            .finish_non_exhaustive()
    }
}
