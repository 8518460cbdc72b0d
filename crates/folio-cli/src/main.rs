//! `folio` operator CLI.
//!
//! Works directly on the files the server reads: the JSON credentials file
//! and the documents directory. No server needs to be running.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use folio_core::credentials::{CredentialStore, hash_password};
use folio_core::document::{ContentKind, DocumentStore};

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";

// ── CLI structure ────────────────────────────────────────────────────

/// Folio: a tiny file-backed markdown CMS.
#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "Folio CLI: manage users and inspect documents",
    long_about = None,
    after_help = format!(
        "{DIM}Examples:{RESET}\n  \
         folio user add --file users.json admin\n  \
         folio hash-password --password secret\n  \
         folio docs --dir ./data"
    ),
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an Argon2id hash for a password (read from stdin if omitted).
    HashPassword {
        #[arg(long)]
        password: Option<String>,
    },
    /// Manage the credentials file.
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// List the documents the server would show.
    Docs {
        /// Documents directory.
        #[arg(long, env = "FOLIO_DATA_DIR", default_value = "./data")]
        dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Add a user, or replace an existing user's password.
    Add {
        /// Credentials file (created if missing).
        #[arg(long, env = "FOLIO_USERS_FILE", default_value = "./users.json")]
        file: PathBuf,
        username: String,
        /// Password (read from stdin if omitted).
        #[arg(long)]
        password: Option<String>,
    },
    /// Remove a user.
    Remove {
        #[arg(long, env = "FOLIO_USERS_FILE", default_value = "./users.json")]
        file: PathBuf,
        username: String,
    },
    /// List usernames.
    List {
        #[arg(long, env = "FOLIO_USERS_FILE", default_value = "./users.json")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{RED}{BOLD}✗ Error:{RESET} {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::HashPassword { password } => cmd_hash_password(password).await,
        Commands::User { action } => match action {
            UserCommands::Add {
                file,
                username,
                password,
            } => cmd_user_add(&file, &username, password).await,
            UserCommands::Remove { file, username } => cmd_user_remove(&file, &username).await,
            UserCommands::List { file } => cmd_user_list(&file).await,
        },
        Commands::Docs { dir } => cmd_docs(&dir).await,
    }
}

fn success(msg: &str) {
    eprintln!("{GREEN}{BOLD}✓{RESET} {msg}");
}

// ── Commands ─────────────────────────────────────────────────────────

async fn cmd_hash_password(password: Option<String>) -> Result<()> {
    let password = resolve_password(password).await?;
    let hash = hash_blocking(password).await?;
    println!("{hash}");
    Ok(())
}

async fn cmd_user_add(file: &Path, username: &str, password: Option<String>) -> Result<()> {
    if username.is_empty() || username.chars().any(char::is_whitespace) {
        bail!("username must be non-empty and contain no whitespace");
    }

    let store = CredentialStore::new(file);
    let mut users = store
        .load_or_empty()
        .await
        .with_context(|| format!("failed to load {}", file.display()))?;

    let password = resolve_password(password).await?;
    let hash = hash_blocking(password).await?;
    let replaced = users.insert(username.to_owned(), hash).is_some();

    store
        .save(&users)
        .await
        .with_context(|| format!("failed to write {}", file.display()))?;

    if replaced {
        success(&format!("updated password for {username}"));
    } else {
        success(&format!("added {username}"));
    }
    Ok(())
}

async fn cmd_user_remove(file: &Path, username: &str) -> Result<()> {
    let store = CredentialStore::new(file);
    let mut users = store
        .load()
        .await
        .with_context(|| format!("failed to load {}", file.display()))?;

    if users.remove(username).is_none() {
        bail!("no such user: {username}");
    }

    store
        .save(&users)
        .await
        .with_context(|| format!("failed to write {}", file.display()))?;
    success(&format!("removed {username}"));
    Ok(())
}

async fn cmd_user_list(file: &Path) -> Result<()> {
    let users = CredentialStore::new(file)
        .load()
        .await
        .with_context(|| format!("failed to load {}", file.display()))?;

    for username in users.keys() {
        println!("{username}");
    }
    Ok(())
}

async fn cmd_docs(dir: &Path) -> Result<()> {
    if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
        bail!("documents directory not found: {}", dir.display());
    }

    for name in DocumentStore::new(dir).list().await {
        let kind = match ContentKind::from_name(&name) {
            ContentKind::Markdown => "markdown",
            ContentKind::Plain => "text",
            ContentKind::Unknown => "other",
        };
        println!("{name}\t{kind}");
    }
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Use the flag value, or read one line from stdin.
async fn resolve_password(flag: Option<String>) -> Result<String> {
    if let Some(password) = flag {
        return Ok(password);
    }

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read password from stdin")?;

    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        bail!("password must not be empty");
    }
    Ok(password.to_owned())
}

async fn hash_blocking(password: String) -> Result<String> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("hashing task failed")??;
    Ok(hash)
}
