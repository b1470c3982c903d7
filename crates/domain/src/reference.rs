//! Variable reference classification
//!
//! A reference is the text inside one delimited expression, e.g. `opt:stage`
//! or `file(./config.yml):db.host`. [`VariableSource::parse`] turns it into a
//! closed set of sources, one per resolver.

use std::fmt;

use crate::error::{DomainError, DomainResult};

const ENV_PREFIX: &str = "env:";
const OPT_PREFIX: &str = "opt:";
const SELF_PREFIX: &str = "self:";
const FILE_PREFIX: &str = "file(";
const CF_PREFIX: &str = "cf:";
const S3_PREFIX: &str = "s3:";

/// The kind of source a reference draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// `env:` - process environment.
    Environment,
    /// `opt:` - caller supplied options.
    Option,
    /// `self:` - the configuration document itself.
    SelfAttribute,
    /// `file(...)` - another file.
    File,
    /// `cf:` - a cloud stack output.
    StackOutput,
    /// `s3:` - an object store value.
    ObjectStore,
}

impl SourceKind {
    /// Classifies a reference by its prefix alone.
    #[must_use]
    pub fn of(reference: &str) -> Option<Self> {
        [
            (ENV_PREFIX, Self::Environment),
            (OPT_PREFIX, Self::Option),
            (SELF_PREFIX, Self::SelfAttribute),
            (FILE_PREFIX, Self::File),
            (CF_PREFIX, Self::StackOutput),
            (S3_PREFIX, Self::ObjectStore),
        ]
        .into_iter()
        .find_map(|(prefix, kind)| reference.starts_with(prefix).then_some(kind))
    }

    /// Human readable name used in "could not be found" messages.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Environment => "environment variable",
            Self::Option => "option",
            Self::SelfAttribute => "service attribute",
            Self::File => "file",
            Self::StackOutput => "cloud stack output",
            Self::ObjectStore => "object store value",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A classified variable reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableSource {
    /// `env:NAME`; an empty name selects the whole environment.
    Environment {
        /// Variable name.
        name: String,
    },
    /// `opt:NAME`; an empty name selects every option.
    Option {
        /// Option name.
        name: String,
    },
    /// `self:PATH`; dotted path into the document.
    SelfAttribute {
        /// Dotted path, possibly empty.
        path: String,
    },
    /// `file(PATH)` or `file(PATH):PROPERTY`.
    File {
        /// Path relative to the service directory (or absolute, or `~/...`).
        path: String,
        /// Dotted property path applied to the loaded file.
        property: Option<String>,
    },
    /// `cf:STACK.OUTPUT`.
    StackOutput {
        /// Stack name.
        stack: String,
        /// Output key.
        output: String,
    },
    /// `s3:BUCKET/KEY`.
    ObjectStore {
        /// Bucket name.
        bucket: String,
        /// Object key; may contain `/`.
        key: String,
    },
}

impl VariableSource {
    /// Classifies a reference.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidSource`] for unknown prefixes or
    /// incomplete `file(`/`s3:` forms, and
    /// [`DomainError::MalformedFileReference`] when a `file(...)` reference is
    /// followed by anything but `:`.
    pub fn parse(reference: &str) -> DomainResult<Self> {
        let invalid = || DomainError::InvalidSource {
            reference: reference.to_string(),
        };

        if let Some(name) = reference.strip_prefix(ENV_PREFIX) {
            return Ok(Self::Environment {
                name: name.to_string(),
            });
        }
        if let Some(name) = reference.strip_prefix(OPT_PREFIX) {
            return Ok(Self::Option {
                name: name.to_string(),
            });
        }
        if let Some(path) = reference.strip_prefix(SELF_PREFIX) {
            return Ok(Self::SelfAttribute {
                path: path.to_string(),
            });
        }
        if let Some(rest) = reference.strip_prefix(FILE_PREFIX) {
            let (path, tail) = rest.split_once(')').ok_or_else(invalid)?;
            let path = path.trim();
            if path.is_empty() {
                return Err(invalid());
            }
            let property = match tail {
                "" => None,
                _ => match tail.strip_prefix(':') {
                    Some("") => None,
                    Some(property) => Some(property.to_string()),
                    None => {
                        return Err(DomainError::MalformedFileReference {
                            path: path.to_string(),
                        });
                    }
                },
            };
            return Ok(Self::File {
                path: path.to_string(),
                property,
            });
        }
        if let Some(rest) = reference.strip_prefix(CF_PREFIX) {
            let (stack, output) = rest.split_once('.').unwrap_or((rest, ""));
            return Ok(Self::StackOutput {
                stack: stack.to_string(),
                output: output.to_string(),
            });
        }
        if let Some(rest) = reference.strip_prefix(S3_PREFIX) {
            return match rest.split_once('/') {
                Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => {
                    Ok(Self::ObjectStore {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    })
                }
                _ => Err(invalid()),
            };
        }

        Err(invalid())
    }

    /// The source kind of this reference.
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        match self {
            Self::Environment { .. } => SourceKind::Environment,
            Self::Option { .. } => SourceKind::Option,
            Self::SelfAttribute { .. } => SourceKind::SelfAttribute,
            Self::File { .. } => SourceKind::File,
            Self::StackOutput { .. } => SourceKind::StackOutput,
            Self::ObjectStore { .. } => SourceKind::ObjectStore,
        }
    }
}

/// Splits a dotted path into segments. An empty path is one empty segment,
/// which traversal treats as "stay on the current node".
#[must_use]
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('.').collect()
}
