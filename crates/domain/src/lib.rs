//! Nimbus Domain - Core document types
//!
//! This crate defines the document model and the classification of variable
//! references. All types here are pure Rust with no I/O dependencies.

pub mod context;
pub mod document;
pub mod error;
pub mod reference;
pub mod value;

pub use context::ResolutionContext;
pub use document::prune_null_environment;
pub use error::{DomainError, DomainResult};
pub use reference::{SourceKind, VariableSource, path_segments};
pub use value::{Mapping, Value};
