//! Document serialization.
//!
//! Reads service documents from YAML or JSON and writes them back:
//! - YAML as emitted by `serde_yaml`
//! - JSON with 2-space indentation and a trailing newline
//!
//! Key order is the document's own order in both formats.

mod document;

pub use document::*;
