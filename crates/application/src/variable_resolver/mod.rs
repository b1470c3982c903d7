//! Variable resolution module
//!
//! Resolves `${source:path}` references inside configuration documents.
//!
//! Supported sources:
//! - `env:NAME` - environment variables
//! - `opt:NAME` - command-line options
//! - `self:PATH` - other parts of the same document
//! - `file(PATH)[:PROPERTY]` - structured, text or executable files
//! - `cf:STACK.OUTPUT` - cloud stack outputs
//! - `s3:BUCKET/KEY` - object store values
//!
//! References can be nested (`${env:${opt:name}}`) and chained with commas
//! (`${opt:stage, self:provider.stage}`); the first acceptable value wins.

pub mod chain;
pub mod engine;
mod sources;
pub mod syntax;


pub use chain::{is_acceptable, split_chain};
pub use engine::{VariableResolver, ensure_found, substitute};
pub use syntax::{DEFAULT_VARIABLE_SYNTAX, VariableMatch, VariableSyntax};
