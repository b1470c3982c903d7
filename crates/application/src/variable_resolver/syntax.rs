//! Variable syntax for `${...}` expressions
//!
//! Compiles the delimiter pattern and extracts delimited expressions with
//! their positions.

use std::ops::Range;

use regex::Regex;

use crate::error::{ResolveError, ResolveResult};

/// Default delimiter pattern: `${...}` whose content is restricted to the
/// characters references are made of. `$`, `{` and `}` are excluded, so for
/// `${env:${opt:name}}` the inner expression is matched first.
pub const DEFAULT_VARIABLE_SYNTAX: &str = r#"\$\{([ ~:a-zA-Z0-9._'",\-/()]+?)\}"#;

/// A delimited expression found in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableMatch {
    /// The whole expression, delimiters included (`${opt:stage}`).
    pub expression: String,

    /// The captured content, trimmed (`opt:stage`).
    pub content: String,

    /// Byte range of the expression in the scanned string.
    pub span: Range<usize>,
}

/// A compiled variable syntax.
#[derive(Debug, Clone)]
pub struct VariableSyntax {
    regex: Regex,
}

impl VariableSyntax {
    /// Compiles a delimiter pattern. The first capture group must hold the
    /// reference content.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Syntax`] if the pattern does not compile or has
    /// no capture group.
    pub fn new(pattern: &str) -> ResolveResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| ResolveError::Syntax {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        if regex.captures_len() < 2 {
            return Err(ResolveError::Syntax {
                pattern: pattern.to_string(),
                message: "the pattern must capture the reference in a group".to_string(),
            });
        }

        Ok(Self { regex })
    }

    /// Compiles `pattern` when given, the default syntax otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Syntax`] if the override does not compile.
    pub fn from_override(pattern: Option<&str>) -> ResolveResult<Self> {
        pattern.map_or_else(|| Ok(Self::default()), Self::new)
    }

    /// The source pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns true if `input` contains at least one delimited expression.
    #[must_use]
    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    /// Extracts all delimited expressions, left to right.
    ///
    /// ```
    /// use nimbus_application::variable_resolver::VariableSyntax;
    ///
    /// let syntax = VariableSyntax::default();
    /// let found = syntax.matches("my stage is ${opt:stage}");
    /// assert_eq!(found.len(), 1);
    /// assert_eq!(found[0].expression, "${opt:stage}");
    /// assert_eq!(found[0].content, "opt:stage");
    /// ```
    #[must_use]
    pub fn matches(&self, input: &str) -> Vec<VariableMatch> {
        self.regex
            .captures_iter(input)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let content = caps.get(1)?;
                Some(VariableMatch {
                    expression: whole.as_str().to_string(),
                    content: content.as_str().trim().to_string(),
                    span: whole.range(),
                })
            })
            .collect()
    }
}

impl Default for VariableSyntax {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self::new(DEFAULT_VARIABLE_SYNTAX).expect("default variable syntax compiles")
    }
}
