//! Application error types

use std::path::PathBuf;

use nimbus_domain::DomainError;
use thiserror::Error;

use crate::ports::{FileLoadError, ProviderError};

/// Errors that abort a resolution pass.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A reference could not be classified (invalid source, malformed file reference).
    #[error(transparent)]
    Reference(#[from] DomainError),

    /// The variable syntax override does not compile.
    #[error("invalid variable syntax '{pattern}': {message}")]
    Syntax {
        /// The rejected pattern.
        pattern: String,
        /// Why it was rejected.
        message: String,
    },

    /// Strict resolution found no acceptable value.
    #[error("A valid {kind} to satisfy the declaration '{reference}' could not be found.")]
    NotFound {
        /// Description of the source kind ("option", "file", ...).
        kind: &'static str,
        /// The reference as written, without delimiters.
        reference: String,
    },

    /// A non-scalar value was embedded inside a larger string.
    #[error(
        "Trying to populate non string value into a string for variable {expression}. Please make sure the value of the property is a string (found {found})."
    )]
    SubstitutionType {
        /// The delimited expression being replaced.
        expression: String,
        /// Type of the offending value.
        found: &'static str,
    },

    /// A stack has no output with the requested key.
    #[error(
        "Trying to request a non exported variable from CloudFormation. Stack name: \"{stack}\" Requested variable: \"{output}\"."
    )]
    NonExportedOutput {
        /// Stack name.
        stack: String,
        /// Requested output key.
        output: String,
    },

    /// An object store fetch failed.
    #[error("Error getting value for {reference}. {message}")]
    ObjectStore {
        /// The `s3:` reference.
        reference: String,
        /// Upstream error text.
        message: String,
    },

    /// A provider request failed.
    #[error("Error getting value for {reference}. {source}")]
    Provider {
        /// The reference that triggered the request.
        reference: String,
        /// Upstream error.
        #[source]
        source: ProviderError,
    },

    /// A reference depends on itself.
    #[error("Circular variable reference detected: {chain}")]
    CycleDetected {
        /// The references forming the cycle, joined by `->`.
        chain: String,
    },

    /// A referenced file exists but could not be loaded.
    #[error("Failed to load file {}: {source}", path.display())]
    File {
        /// Absolute path of the file.
        path: PathBuf,
        /// Loader error.
        #[source]
        source: FileLoadError,
    },

    /// Invoking an export of an executable file failed.
    #[error("Failed to invoke export '{export}' of {}: {source}", path.display())]
    Export {
        /// Absolute path of the file.
        path: PathBuf,
        /// Export name (`default` when none was given).
        export: String,
        /// Provider error.
        #[source]
        source: FileLoadError,
    },
}

/// Result type alias for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
