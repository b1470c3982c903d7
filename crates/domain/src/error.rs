//! Domain error types

use thiserror::Error;

/// Errors raised while classifying a variable reference.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The reference does not start with a known source prefix.
    #[error(
        "Invalid variable reference syntax for variable {reference}. You can only reference env vars, options, self attributes, files, stack outputs and object store values."
    )]
    InvalidSource {
        /// The offending reference, without delimiters.
        reference: String,
    },

    /// A `file(...)` reference is followed by something other than `:`.
    #[error(
        "Invalid variable syntax when referencing file \"{path}\". Please use the \":\" syntax to reference a specific key."
    )]
    MalformedFileReference {
        /// The referenced file path.
        path: String,
    },
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
