//! Variable resolution engine
//!
//! Resolves `${...}` references in documents. The walk is:
//! object walker -> property resolver -> (fallback chain ->) source dispatch,
//! and structured values coming back from a source are walked again.

use futures::future::{BoxFuture, FutureExt, try_join_all};
use nimbus_domain::{ResolutionContext, SourceKind, Value};
use tracing::debug;

use super::chain::{is_acceptable, split_chain};
use super::syntax::{VariableMatch, VariableSyntax};
use crate::error::{ResolveError, ResolveResult};
use crate::ports::ResolverPorts;

/// References currently being resolved, outermost first.
///
/// Each branch of the walk carries its own trail, so siblings resolving the
/// same reference concurrently never see each other.
#[derive(Debug, Clone, Default)]
pub(super) struct Trail {
    references: Vec<String>,
}

impl Trail {
    fn enter(&self, reference: &str) -> ResolveResult<Self> {
        if let Some(start) = self.references.iter().position(|r| r == reference) {
            let mut chain: Vec<&str> = self.references[start..]
                .iter()
                .map(String::as_str)
                .collect();
            chain.push(reference);
            return Err(ResolveError::CycleDetected {
                chain: chain.join(" -> "),
            });
        }

        let mut references = self.references.clone();
        references.push(reference.to_string());
        Ok(Self { references })
    }
}

/// The variable resolution engine.
///
/// # Usage
///
/// ```
/// use std::sync::Arc;
/// use nimbus_application::ports::{FileLoadError, FileLoader, LoadedFile, ResolverPorts};
/// use nimbus_application::variable_resolver::VariableResolver;
/// use nimbus_domain::{Mapping, ResolutionContext, Value};
///
/// struct NoFiles;
///
/// #[async_trait::async_trait]
/// impl FileLoader for NoFiles {
///     async fn load(&self, _: &std::path::Path) -> Result<Option<LoadedFile>, FileLoadError> {
///         Ok(None)
///     }
/// }
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let mut options = Mapping::new();
/// options.insert("stage".into(), Value::from("prod"));
///
/// let resolver = VariableResolver::new(
///     ResolutionContext::new().with_options(options),
///     ResolverPorts::new(Arc::new(NoFiles)),
/// );
///
/// let value = resolver
///     .resolve_property(&Value::from("my stage is ${opt:stage}"), false)
///     .await
///     .unwrap();
/// assert_eq!(value, Some(Value::from("my stage is prod")));
/// # });
/// ```
#[derive(Debug)]
pub struct VariableResolver {
    pub(super) syntax: VariableSyntax,
    pub(super) context: ResolutionContext,
    pub(super) ports: ResolverPorts,
    strict: bool,
}

impl VariableResolver {
    /// Creates a resolver using the default `${...}` syntax.
    #[must_use]
    pub fn new(context: ResolutionContext, ports: ResolverPorts) -> Self {
        Self {
            syntax: VariableSyntax::default(),
            context,
            ports,
            strict: false,
        }
    }

    /// Replaces the variable syntax. Must happen before resolution starts.
    #[must_use]
    pub fn with_syntax(mut self, syntax: VariableSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Makes the object walker resolve every leaf strictly.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Returns the compiled variable syntax.
    #[must_use]
    pub const fn syntax(&self) -> &VariableSyntax {
        &self.syntax
    }

    /// Returns a reference to the resolution context.
    #[must_use]
    pub const fn context(&self) -> &ResolutionContext {
        &self.context
    }

    /// Resolves the whole document held by the context.
    ///
    /// # Errors
    ///
    /// Returns the first error met anywhere in the document.
    pub async fn resolve_document(&self) -> ResolveResult<Value> {
        self.resolve_value(&self.context.document).await
    }

    /// Resolves an arbitrary sub-structure against the context, e.g. a
    /// late-bound per-function value.
    ///
    /// # Errors
    ///
    /// Returns the first error met anywhere in `value`.
    pub async fn resolve_value(&self, value: &Value) -> ResolveResult<Value> {
        Ok(self
            .populate_object(value, &Trail::default())
            .await?
            .unwrap_or_default())
    }

    /// Resolves one property value. `None` means the references found nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if a reference is invalid, a source fails, a
    /// non-scalar is embedded in a string, or `strict` is set and a reference
    /// found nothing.
    pub async fn resolve_property(
        &self,
        value: &Value,
        strict: bool,
    ) -> ResolveResult<Option<Value>> {
        self.populate_property(value, strict, &Trail::default())
            .await
    }

    /// Resolves a fallback chain (`opt:stage,env:STAGE`) in order, stopping at
    /// the first acceptable value.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by an evaluated member.
    pub async fn overwrite(&self, chain: &str) -> ResolveResult<Option<Value>> {
        let chain: String = chain.chars().filter(|c| !c.is_whitespace()).collect();
        self.overwrite_members(&split_chain(&chain), &Trail::default())
            .await
    }

    /// Resolves a single reference (`opt:stage`, `file(./a.yml):key`).
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is invalid or its source fails.
    pub async fn get_value_from_source(&self, reference: &str) -> ResolveResult<Option<Value>> {
        self.resolve_source(reference, &Trail::default()).await
    }

    /// Walks `segments` into `root`, resolving reference nodes on the way.
    ///
    /// # Errors
    ///
    /// Returns an error only if resolving an intermediate reference fails;
    /// missing segments are not errors.
    pub async fn get_deep_value(
        &self,
        segments: &[&str],
        root: &Value,
    ) -> ResolveResult<Option<Value>> {
        self.traverse(segments, Some(root), &Trail::default())
            .await
    }

    /// Object walker.
    fn populate_object<'a>(
        &'a self,
        value: &'a Value,
        trail: &'a Trail,
    ) -> BoxFuture<'a, ResolveResult<Option<Value>>> {
        async move {
            match value {
                Value::Mapping(map) => {
                    let entries = try_join_all(map.iter().map(|(key, child)| async move {
                        self.populate_object(child, trail)
                            .await
                            .map(|resolved| (key, resolved))
                    }))
                    .await?;

                    // Absent values drop their key, as they would on serialization.
                    Ok(Some(Value::Mapping(
                        entries
                            .into_iter()
                            .filter_map(|(key, resolved)| resolved.map(|v| (key.clone(), v)))
                            .collect(),
                    )))
                }
                Value::Sequence(items) => {
                    let resolved =
                        try_join_all(items.iter().map(|item| self.populate_object(item, trail)))
                            .await?;

                    Ok(Some(Value::Sequence(
                        resolved
                            .into_iter()
                            .map(Option::unwrap_or_default)
                            .collect(),
                    )))
                }
                Value::Tagged { tag, value } => Ok(self
                    .populate_object(value, trail)
                    .await?
                    .map(|payload| Value::tagged(tag.clone(), payload))),
                Value::String(_) | Value::Integer(_) | Value::Float(_) => {
                    self.populate_property(value, self.strict, trail).await
                }
                Value::Bool(_) | Value::Null => Ok(Some(value.clone())),
            }
        }
        .boxed()
    }

    /// Property resolver.
    pub(super) fn populate_property<'a>(
        &'a self,
        value: &'a Value,
        strict: bool,
        trail: &'a Trail,
    ) -> BoxFuture<'a, ResolveResult<Option<Value>>> {
        async move {
            let Value::String(text) = value else {
                return Ok(Some(value.clone()));
            };

            let mut property = text.clone();
            loop {
                let found = self.syntax.matches(&property);
                if found.is_empty() {
                    return Ok(Some(Value::String(property)));
                }

                let mut resolved = Vec::with_capacity(found.len());
                for variable in &found {
                    resolved.push(self.populate_match(variable, strict, trail).await?);
                }

                // Right to left, so the spans still left to apply stay valid.
                for (variable, value) in found.iter().zip(resolved).rev() {
                    match substitute(&property, variable, value)? {
                        Some(Value::String(next)) => property = next,
                        terminal => return Ok(terminal),
                    }
                }
            }
        }
        .boxed()
    }

    async fn populate_match(
        &self,
        variable: &VariableMatch,
        strict: bool,
        trail: &Trail,
    ) -> ResolveResult<Option<Value>> {
        // Inside-out: content that still holds expressions is resolved first.
        let content = if self.syntax.is_match(&variable.content) {
            let nested = self
                .populate_property(&Value::String(variable.content.clone()), strict, trail)
                .await?;
            nested
                .as_ref()
                .and_then(Value::substitution_text)
                .ok_or_else(|| ResolveError::SubstitutionType {
                    expression: variable.expression.clone(),
                    found: nested.as_ref().map_or("undefined", Value::type_name),
                })?
        } else {
            variable.content.clone()
        };

        let reference: String = content.chars().filter(|c| !c.is_whitespace()).collect();
        let members = split_chain(&reference);

        let value = if members.len() > 1 {
            self.overwrite_members(&members, trail).await?
        } else {
            self.resolve_source(&reference, trail).await?
        };

        if strict {
            ensure_found(&reference, value.as_ref())?;
        }

        Ok(value)
    }

    /// Fallback-chain resolver. Members are evaluated one at a time; nothing
    /// after the first acceptable value is evaluated.
    async fn overwrite_members(
        &self,
        members: &[&str],
        trail: &Trail,
    ) -> ResolveResult<Option<Value>> {
        let mut last = None;
        for member in members {
            let value = self.resolve_source(member, trail).await?;
            if is_acceptable(value.as_ref()) {
                return Ok(value);
            }
            last = value;
        }
        Ok(last)
    }

    /// Dispatches one reference and fully resolves what comes back.
    pub(super) async fn resolve_source(
        &self,
        reference: &str,
        trail: &Trail,
    ) -> ResolveResult<Option<Value>> {
        let trail = trail.enter(reference)?;
        debug!(reference, "resolving variable reference");

        match self.dispatch(reference, &trail).await? {
            Some(value) if value.is_structure() => self.populate_object(&value, &trail).await,
            Some(value) if value.as_str().is_some_and(|s| self.syntax.is_match(s)) => {
                self.populate_property(&value, false, &trail).await
            }
            other => Ok(other),
        }
    }
}

/// Substitutes `value` for the matched expression, at its span in `property`.
///
/// When the property is exactly the expression the value is returned as is,
/// keeping its type. Otherwise only strings and numbers can be embedded.
///
/// # Errors
///
/// Returns [`ResolveError::SubstitutionType`] when a value other than a
/// string or number (absent included) would be embedded in a larger string.
pub fn substitute(
    property: &str,
    variable: &VariableMatch,
    value: Option<Value>,
) -> ResolveResult<Option<Value>> {
    let expression = variable.expression.as_str();
    if property == expression {
        return Ok(value);
    }

    let text = value
        .as_ref()
        .and_then(Value::substitution_text)
        .ok_or_else(|| ResolveError::SubstitutionType {
            expression: expression.to_string(),
            found: value.as_ref().map_or("undefined", Value::type_name),
        })?;

    let mut substituted = property.to_string();
    substituted.replace_range(variable.span.clone(), &text);
    Ok(Some(Value::String(substituted)))
}

/// Fails when a strictly resolved reference found nothing: absent or `{}`.
/// `null` and every other value (`0`, `false`, `""` included) pass.
///
/// # Errors
///
/// Returns [`ResolveError::NotFound`] naming the kind of source.
pub fn ensure_found(reference: &str, value: Option<&Value>) -> ResolveResult<()> {
    match value {
        Some(v) if !v.is_empty_mapping() => Ok(()),
        _ => Err(ResolveError::NotFound {
            kind: SourceKind::of(reference).map_or("value", SourceKind::description),
            reference: reference.to_string(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn matched(property: &str, index: usize) -> VariableMatch {
        VariableSyntax::default().matches(property).swap_remove(index)
    }

    #[test]
    fn test_substitute_string_as_sub_string() {
        let property = "my stage is ${opt:stage}";
        let result = substitute(property, &matched(property, 0), Some("dev".into()));
        assert_eq!(result.unwrap(), Some(Value::from("my stage is dev")));
    }

    #[test]
    fn test_substitute_number_as_sub_string() {
        let property = "your account number is ${opt:number}";
        let result = substitute(property, &matched(property, 0), Some(Value::Integer(5)));
        assert_eq!(result.unwrap(), Some(Value::from("your account number is 5")));
    }

    #[test]
    fn test_substitute_whole_property_keeps_type() {
        let result = substitute(
            "${opt:number}",
            &matched("${opt:number}", 0),
            Some(Value::Integer(5)),
        );
        assert_eq!(result.unwrap(), Some(Value::Integer(5)));

        let result = substitute("${opt:missing}", &matched("${opt:missing}", 0), None);
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_substitute_rejects_non_scalars_in_strings() {
        for value in [
            Some(Value::empty_mapping()),
            Some(Value::Sequence(vec![])),
            Some(Value::Bool(true)),
            Some(Value::Null),
            None,
        ] {
            let property = "your account is ${opt:object}";
            let err = substitute(property, &matched(property, 0), value).unwrap_err();
            assert!(matches!(err, ResolveError::SubstitutionType { .. }));
        }
    }

    #[test]
    fn test_substitute_replaces_the_matched_occurrence() {
        let property = "${opt:a}-${opt:a}";
        let result = substitute(property, &matched(property, 1), Some("x".into()));
        assert_eq!(result.unwrap(), Some(Value::from("${opt:a}-x")));
    }

    #[test]
    fn test_ensure_found_accepts_values() {
        assert!(ensure_found("self:service", Some(&Value::from("a-valid-value"))).is_ok());
        assert!(ensure_found("self:service", Some(&Value::Integer(0))).is_ok());
        assert!(ensure_found("self:service", Some(&Value::Bool(false))).is_ok());
        assert!(ensure_found("self:service", Some(&Value::from(""))).is_ok());
        assert!(ensure_found("self:service", Some(&Value::Null)).is_ok());
    }

    #[test]
    fn test_ensure_found_rejects_absent_and_empty_mapping() {
        assert!(ensure_found("self:service", None).is_err());
        assert!(ensure_found("self:service", Some(&Value::empty_mapping())).is_err());
    }

    #[test]
    fn test_ensure_found_names_the_source_kind() {
        let cases = [
            (
                "env:service",
                "A valid environment variable to satisfy the declaration 'env:service' could not be found.",
            ),
            (
                "opt:service",
                "A valid option to satisfy the declaration 'opt:service' could not be found.",
            ),
            (
                "self:service",
                "A valid service attribute to satisfy the declaration 'self:service' could not be found.",
            ),
            (
                "file(service)",
                "A valid file to satisfy the declaration 'file(service)' could not be found.",
            ),
        ];

        for (reference, message) in cases {
            let err = ensure_found(reference, None).unwrap_err();
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn test_trail_detects_cycles() {
        let trail = Trail::default()
            .enter("self:a")
            .unwrap()
            .enter("self:b")
            .unwrap();
        let err = trail.enter("self:a").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Circular variable reference detected: self:a -> self:b -> self:a"
        );
    }
}
