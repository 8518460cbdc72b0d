//! Error types for `folio-core`.
//!
//! Each error variant carries enough context to diagnose the problem without
//! a debugger. Credential errors never include password material, only the
//! file path or the operation that failed.

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The name does not end in `.md` or `.txt`, or is empty.
    #[error("invalid document name '{name}': must end in .md or .txt")]
    InvalidName { name: String },

    /// A document with this name already exists.
    #[error("document '{name}' already exists")]
    AlreadyExists { name: String },

    /// No regular file with this name exists in the storage directory.
    #[error("document '{name}' does not exist")]
    NotFound { name: String },

    /// The filesystem returned an unexpected error.
    #[error("document store I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the credential store.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The credentials file could not be read.
    #[error("failed to read credentials file '{path}': {reason}")]
    Read { path: String, reason: String },

    /// The credentials file is not a JSON object of username to hash.
    #[error("failed to parse credentials file '{path}': {reason}")]
    Parse { path: String, reason: String },

    /// The credentials file could not be serialized or written.
    #[error("failed to write credentials file '{path}': {reason}")]
    Write { path: String, reason: String },

    /// Password hashing failed.
    #[error("password hashing failed: {reason}")]
    Hash { reason: String },

    /// The blocking verification task panicked or was cancelled.
    #[error("password verification task failed: {reason}")]
    Join { reason: String },
}

/// A mutating operation was attempted without a signed-in session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("You must be signed in to do that.")]
pub struct Unauthenticated;
