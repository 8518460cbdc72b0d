//! Server configuration for Folio.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `FOLIO_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use folio_core::markdown::RawHtml;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Directory holding the documents.
    pub data_dir: PathBuf,
    /// JSON file mapping usernames to password hashes.
    pub users_file: PathBuf,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// Idle lifetime of a session, in seconds.
    pub session_ttl_secs: u64,
    /// Seconds between expired-session sweeps.
    pub session_scan_interval_secs: u64,
    /// What the markdown renderer does with embedded HTML.
    pub raw_html: RawHtml,
    /// Whether the session cookie carries the `Secure` attribute.
    pub secure_cookie: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable, for local development.
    Pretty,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 4567)),
            data_dir: PathBuf::from("./data"),
            users_file: PathBuf::from("./users.json"),
            log_level: "info".to_owned(),
            log_format: LogFormat::Json,
            session_ttl_secs: 86_400,
            session_scan_interval_secs: 300,
            raw_html: RawHtml::Escape,
            secure_cookie: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT` — port to bind on, binds to `0.0.0.0`
    /// - `FOLIO_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:4567`)
    /// - `FOLIO_DATA_DIR` — documents directory (default: `./data`)
    /// - `FOLIO_USERS_FILE` — credentials file (default: `./users.json`)
    /// - `FOLIO_LOG_LEVEL` — log filter when `RUST_LOG` is unset (default: `info`)
    /// - `FOLIO_LOG_FORMAT` — `json` or `pretty` (default: `json`)
    /// - `FOLIO_SESSION_TTL` — session idle lifetime in seconds (default: `86400`)
    /// - `FOLIO_SESSION_SCAN_INTERVAL` — seconds between session sweeps (default: `300`)
    /// - `FOLIO_RAW_HTML` — `escape` or `allow` (default: `escape`)
    /// - `FOLIO_SECURE_COOKIE` — mark the session cookie `Secure` (default: `false`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to the default for that setting.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        // Priority: FOLIO_BIND_ADDR > PORT > default 127.0.0.1:4567
        let bind_addr = if let Some(addr) = lookup("FOLIO_BIND_ADDR") {
            addr.parse().unwrap_or(defaults.bind_addr)
        } else if let Some(port) = lookup("PORT") {
            let port: u16 = port.parse().unwrap_or(defaults.bind_addr.port());
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            defaults.bind_addr
        };

        let data_dir = lookup("FOLIO_DATA_DIR").map_or(defaults.data_dir, PathBuf::from);
        let users_file = lookup("FOLIO_USERS_FILE").map_or(defaults.users_file, PathBuf::from);
        let log_level = lookup("FOLIO_LOG_LEVEL").unwrap_or(defaults.log_level);

        let log_format = match lookup("FOLIO_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "pretty" | "text" => LogFormat::Pretty,
            _ => LogFormat::Json,
        };

        let session_ttl_secs = lookup("FOLIO_SESSION_TTL")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(defaults.session_ttl_secs);

        let session_scan_interval_secs = lookup("FOLIO_SESSION_SCAN_INTERVAL")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(defaults.session_scan_interval_secs);

        let raw_html = lookup("FOLIO_RAW_HTML")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.raw_html);

        let secure_cookie = lookup("FOLIO_SECURE_COOKIE")
            .is_some_and(|v| v == "true" || v == "1");

        Self {
            bind_addr,
            data_dir,
            users_file,
            log_level,
            log_format,
            session_ttl_secs,
            session_scan_interval_secs,
            raw_html,
            secure_cookie,
        }
    }
}
