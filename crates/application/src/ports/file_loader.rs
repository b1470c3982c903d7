//! File loader port
//!
//! Defines how `file(...)` references reach the file system.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nimbus_domain::Value;

/// Errors that can occur while loading a referenced file.
#[derive(Debug, thiserror::Error)]
pub enum FileLoadError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file content does not match its format.
    #[error("Failed to parse {}: {message}", path.display())]
    Parse {
        /// Path of the file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// An executable file could not be run or returned an error.
    #[error("{0}")]
    Invocation(String),
}

/// A loaded file, classified by its format.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedFile {
    /// A structured document (YAML, JSON) parsed into a value tree.
    Structured(Value),

    /// Raw text content.
    Text(String),

    /// Executable code; values come from invoking its exports through a
    /// [`ValueProvider`](super::ValueProvider).
    Executable,
}

/// Port for reading referenced files.
#[async_trait]
pub trait FileLoader: Send + Sync {
    /// Loads the file at `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist; a missing file is not an
    /// error for the resolver.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    async fn load(&self, path: &Path) -> Result<Option<LoadedFile>, FileLoadError>;
}
