//! Resolution context for variable substitution
//!
//! Holds every in-process source a reference can be resolved against.

use std::path::{Path, PathBuf};

use crate::value::{Mapping, Value};

/// Holds the sources for one resolution pass:
/// - `env:` reads `environment`
/// - `opt:` reads `options`
/// - `self:` reads `document`
/// - `file(...)` paths are relative to `service_path` (`~` expands to `home_dir`)
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    /// Snapshot of the process environment.
    pub environment: Mapping,

    /// Caller supplied options (CLI flags).
    pub options: Mapping,

    /// The unresolved configuration document.
    pub document: Value,

    /// Directory containing the configuration document.
    pub service_path: PathBuf,

    /// Home directory used to expand `~` in file references.
    pub home_dir: Option<PathBuf>,
}

impl ResolutionContext {
    /// Creates a new empty resolution context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the environment source.
    #[must_use]
    pub fn with_environment(mut self, environment: Mapping) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the options source.
    #[must_use]
    pub fn with_options(mut self, options: Mapping) -> Self {
        self.options = options;
        self
    }

    /// Sets the document used by `self:` references.
    #[must_use]
    pub fn with_document(mut self, document: Value) -> Self {
        self.document = document;
        self
    }

    /// Sets the service directory.
    #[must_use]
    pub fn with_service_path(mut self, service_path: impl Into<PathBuf>) -> Self {
        self.service_path = service_path.into();
        self
    }

    /// Sets the home directory.
    #[must_use]
    pub fn with_home_dir(mut self, home_dir: Option<PathBuf>) -> Self {
        self.home_dir = home_dir;
        self
    }

    /// The `stage` option, forwarded to provider requests.
    #[must_use]
    pub fn stage(&self) -> Option<&str> {
        self.options.get("stage").and_then(Value::as_str)
    }

    /// The `region` option, forwarded to provider requests.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.options.get("region").and_then(Value::as_str)
    }

    /// Resolves a `file(...)` path: `~` is the home directory, absolute paths
    /// are kept, anything else is relative to the service directory.
    #[must_use]
    pub fn resolve_file_path(&self, path: &str) -> PathBuf {
        let expanded = match (path.strip_prefix('~'), &self.home_dir) {
            (Some(rest), Some(home)) => home.join(rest.trim_start_matches('/')),
            _ => PathBuf::from(path),
        };

        if expanded.is_absolute() {
            expanded
        } else {
            self.service_path.join(strip_current_dir(&expanded))
        }
    }
}

fn strip_current_dir(path: &Path) -> &Path {
    path.strip_prefix(".").unwrap_or(path)
}
