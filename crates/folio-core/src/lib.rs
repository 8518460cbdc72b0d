//! Core library for Folio.
//!
//! Contains the document store, the markdown renderer, the credential store,
//! and the session auth guard. This crate knows nothing about HTTP; the
//! `folio-server` crate wires these pieces into routes.

pub mod auth;
pub mod credentials;
pub mod document;
pub mod error;
pub mod markdown;
