//! Flat-directory document store.
//!
//! Every document is one regular file directly inside the storage root. The
//! store never follows a name outside that root: all names pass through
//! [`DocumentName`], which keeps only the final path component, and reads
//! refuse anything that is not a regular file (directories, symlinks).
//!
//! Concurrent writers to the same document are not coordinated; the last
//! write wins.

use std::borrow::Cow;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::DocumentError;

/// Distinguishes concurrent writers' temporary files.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A document file name reduced to its base name.
///
/// Construction strips any directory components, so `../../etc/passwd`
/// becomes `passwd` and `notes/a.md` becomes `a.md`. Empty names, `.`, `..`,
/// hidden names (leading `.`) and names containing control characters
/// (including NUL) are rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentName(String);

impl DocumentName {
    /// Sanitize a raw, user-supplied name.
    ///
    /// Returns `None` when nothing usable remains after sanitization.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        // Treat both separators as directory boundaries regardless of platform.
        let last = raw.rsplit(['/', '\\']).next()?;
        let base = Path::new(last).file_name()?.to_str()?;
        if base.is_empty() || base.starts_with('.') || base.chars().any(char::is_control) {
            return None;
        }
        Some(Self(base.to_owned()))
    }

    /// The sanitized name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Content kind implied by the extension.
    #[must_use]
    pub fn kind(&self) -> ContentKind {
        ContentKind::from_name(&self.0)
    }

    /// Whether this name may be used to create a new document.
    #[must_use]
    pub fn is_creatable(&self) -> bool {
        self.kind() != ContentKind::Unknown
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How a document's content should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `.md` — rendered to HTML.
    Markdown,
    /// `.txt` — served verbatim as `text/plain`.
    Plain,
    /// Anything else that happens to live in the directory.
    Unknown,
}

impl ContentKind {
    /// Infer the kind from a file name's extension (case-sensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match Path::new(name).extension().and_then(|ext| ext.to_str()) {
            Some("md") => Self::Markdown,
            Some("txt") => Self::Plain,
            _ => Self::Unknown,
        }
    }
}

/// A document read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: DocumentName,
    pub kind: ContentKind,
    pub content: Vec<u8>,
}

impl Document {
    /// Content decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Documents stored as files in one flat directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory is not touched until the first operation; call
    /// [`ensure_root`](Self::ensure_root) at startup to create it.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The storage directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage directory (and parents) if missing.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Io`] if the directory cannot be created.
    pub async fn ensure_root(&self) -> Result<(), DocumentError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| DocumentError::Io {
                path: self.root.display().to_string(),
                source,
            })
    }

    /// All visible regular files in the storage directory, sorted ascending.
    ///
    /// Never fails. An unreadable or missing directory yields what could be
    /// read so far (usually nothing) and logs a warning.
    pub async fn list(&self) -> Vec<String> {
        let mut names = Vec::new();

        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "failed to read document directory");
                return names;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(root = %self.root.display(), error = %e, "document listing interrupted");
                    break;
                }
            };

            let is_file = entry.file_type().await.is_ok_and(|ft| ft.is_file());
            if !is_file {
                continue;
            }

            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            names.push(name);
        }

        names.sort();
        names
    }

    /// Read a document's bytes and infer its kind.
    ///
    /// # Errors
    ///
    /// - [`DocumentError::NotFound`] if no regular file has this name.
    /// - [`DocumentError::Io`] on any other filesystem failure.
    pub async fn read(&self, name: &DocumentName) -> Result<Document, DocumentError> {
        let path = self.ensure_regular_file(name).await?;
        let content = fs::read(&path)
            .await
            .map_err(|e| io_error(&path, name, e))?;

        Ok(Document {
            name: name.clone(),
            kind: name.kind(),
            content,
        })
    }

    /// Create a new document with the given initial content.
    ///
    /// # Errors
    ///
    /// - [`DocumentError::InvalidName`] unless the name ends in `.md` or `.txt`.
    /// - [`DocumentError::AlreadyExists`] if a file with this name exists.
    /// - [`DocumentError::Io`] on any other filesystem failure.
    pub async fn create(&self, name: &DocumentName, content: &[u8]) -> Result<(), DocumentError> {
        if !name.is_creatable() {
            return Err(DocumentError::InvalidName {
                name: name.to_string(),
            });
        }

        let path = self.path_for(name);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => DocumentError::AlreadyExists {
                    name: name.to_string(),
                },
                _ => io_error(&path, name, e),
            })?;

        file.write_all(content)
            .await
            .map_err(|e| io_error(&path, name, e))?;
        file.flush().await.map_err(|e| io_error(&path, name, e))?;

        debug!(document = %name, bytes = content.len(), "document created");
        Ok(())
    }

    /// Replace the content of an existing document.
    ///
    /// The new content goes to a hidden temporary file in the root which is
    /// then renamed over the document, so a failed write leaves the old
    /// content in place.
    ///
    /// # Errors
    ///
    /// - [`DocumentError::NotFound`] if no regular file has this name.
    /// - [`DocumentError::Io`] on any other filesystem failure.
    pub async fn write(&self, name: &DocumentName, content: &[u8]) -> Result<(), DocumentError> {
        let path = self.ensure_regular_file(name).await?;
        let temp = self.temp_path_for(name);

        if let Err(e) = replace_with(&temp, &path, content).await {
            if let Err(cleanup) = fs::remove_file(&temp).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(path = %temp.display(), error = %cleanup, "failed to remove temporary file");
                }
            }
            return Err(DocumentError::Io {
                path: path.display().to_string(),
                source: e,
            });
        }

        debug!(document = %name, bytes = content.len(), "document written");
        Ok(())
    }

    /// Remove a document.
    ///
    /// # Errors
    ///
    /// - [`DocumentError::NotFound`] if no regular file has this name.
    /// - [`DocumentError::Io`] on any other filesystem failure.
    pub async fn delete(&self, name: &DocumentName) -> Result<(), DocumentError> {
        let path = self.ensure_regular_file(name).await?;
        fs::remove_file(&path)
            .await
            .map_err(|e| io_error(&path, name, e))?;

        debug!(document = %name, "document deleted");
        Ok(())
    }

    fn path_for(&self, name: &DocumentName) -> PathBuf {
        self.root.join(name.as_str())
    }

    /// Hidden, so listings never show it.
    fn temp_path_for(&self, name: &DocumentName) -> PathBuf {
        let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(".{name}.{}.{seq}.tmp", std::process::id()))
    }

    /// Resolve the path and confirm it is a regular file, not a symlink or
    /// directory.
    async fn ensure_regular_file(&self, name: &DocumentName) -> Result<PathBuf, DocumentError> {
        let path = self.path_for(name);
        let meta = fs::symlink_metadata(&path)
            .await
            .map_err(|e| io_error(&path, name, e))?;

        if meta.is_file() {
            Ok(path)
        } else {
            Err(DocumentError::NotFound {
                name: name.to_string(),
            })
        }
    }
}

async fn replace_with(temp: &Path, target: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp)
        .await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(temp, target).await
}

fn io_error(path: &Path, name: &DocumentName, source: std::io::Error) -> DocumentError {
    if source.kind() == ErrorKind::NotFound {
        DocumentError::NotFound {
            name: name.to_string(),
        }
    } else {
        DocumentError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
