//! Document loading and output helpers.

use std::io;
use std::path::{Path, PathBuf};

use nimbus_domain::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde::Serialize;
use tokio::fs;

/// Error type for document serialization.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The document could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path of the document.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// YAML parsing or emitting failed.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing or emitting failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Output format for resolved documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    /// YAML output.
    #[default]
    Yaml,
    /// Stable, pretty-printed JSON output.
    Json,
}

impl DocumentFormat {
    /// Picks the format from a file extension; anything but `json` is YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Parses YAML text into a document value.
///
/// # Errors
///
/// Returns an error if the YAML is invalid.
pub fn from_yaml_str(text: &str) -> Result<Value, DocumentError> {
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    Ok(Value::from(value))
}

/// Parses JSON text into a document value.
///
/// # Errors
///
/// Returns an error if the JSON is invalid.
pub fn from_json_str(text: &str) -> Result<Value, DocumentError> {
    Ok(serde_json::from_str(text)?)
}

/// Reads a document from disk, parsing it according to its extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load_document(path: &Path) -> Result<Value, DocumentError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    match DocumentFormat::from_path(path) {
        DocumentFormat::Json => from_json_str(&text),
        DocumentFormat::Yaml => from_yaml_str(&text),
    }
}

/// Serializes a document to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_yaml_string(value: &Value) -> Result<String, DocumentError> {
    Ok(serde_yaml::to_string(value)?)
}

/// Serializes a document to deterministic JSON.
///
/// Output format:
/// - 2-space indentation
/// - Trailing newline
/// - Keys in document order
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable(value: &Value) -> Result<String, DocumentError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

/// Serializes a document in the requested format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_document(value: &Value, format: DocumentFormat) -> Result<String, DocumentError> {
    match format {
        DocumentFormat::Yaml => to_yaml_string(value),
        DocumentFormat::Json => to_json_stable(value),
    }
}
