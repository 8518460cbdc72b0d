//! Folio HTTP server.
//!
//! Wires the core document store, credential store, and renderer into an
//! Axum router with cookie sessions and server-rendered pages.

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;
pub mod views;
