//! Dynamic value provider port
//!
//! Executable files referenced with `file(./script):export` are never run by
//! the resolver itself; it only asks this port for the export's value.

use std::path::Path;

use async_trait::async_trait;
use nimbus_domain::Value;

use super::FileLoadError;

/// Port for invoking exports of executable files.
#[async_trait]
pub trait ValueProvider: Send + Sync {
    /// Invokes `export` of the file at `path` with no arguments and returns its
    /// value. `None` as export means the file's default entry point.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be run or the export fails.
    async fn invoke(
        &self,
        path: &Path,
        export: Option<&str>,
    ) -> Result<Option<Value>, FileLoadError>;
}

/// A provider that refuses every invocation.
///
/// Used when no interpreter is configured for executable files.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValueProvider;

#[async_trait]
impl ValueProvider for NoValueProvider {
    async fn invoke(
        &self,
        path: &Path,
        _export: Option<&str>,
    ) -> Result<Option<Value>, FileLoadError> {
        Err(FileLoadError::Invocation(format!(
            "no interpreter is configured to run {}",
            path.display()
        )))
    }
}
