//! Resolve service use case

use std::path::PathBuf;

use nimbus_domain::{Mapping, ResolutionContext, Value};
use tracing::info;

use crate::error::ResolveResult;
use crate::ports::ResolverPorts;
use crate::variable_resolver::{VariableResolver, VariableSyntax};

const VARIABLE_SYNTAX_KEY: &str = "variableSyntax";

/// Input for a full resolution pass.
#[derive(Debug, Clone, Default)]
pub struct ResolveServiceInput {
    /// The parsed service document.
    pub document: Value,
    /// Invocation options (`opt:`).
    pub options: Mapping,
    /// Environment snapshot (`env:`).
    pub environment: Mapping,
    /// Directory containing the document.
    pub service_path: PathBuf,
    /// Home directory used for `~` in file references.
    pub home_dir: Option<PathBuf>,
}

/// Output of a resolution pass.
#[derive(Debug)]
pub struct ResolveServiceOutput {
    /// The resolved document.
    pub document: Value,
    /// The resolver used for the pass, kept for late-bound fragments.
    pub resolver: VariableResolver,
}

impl ResolveServiceOutput {
    /// Resolves a sub-structure against the same context as the document.
    ///
    /// # Errors
    ///
    /// Returns the first error met anywhere in `fragment`.
    pub async fn resolve_fragment(&self, fragment: &Value) -> ResolveResult<Value> {
        self.resolver.resolve_value(fragment).await
    }
}

/// Resolves every variable of a service document.
///
/// `provider.variableSyntax`, when it is a string, replaces the default
/// syntax. The key is detached for the pass and put back unchanged.
pub struct ResolveService {
    ports: ResolverPorts,
    strict: bool,
}

impl ResolveService {
    /// Creates a new `ResolveService` use case.
    #[must_use]
    pub const fn new(ports: ResolverPorts) -> Self {
        Self {
            ports,
            strict: false,
        }
    }

    /// Fails on any reference that finds nothing.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Executes the use case.
    ///
    /// # Errors
    ///
    /// Returns an error if the syntax override does not compile or any
    /// reference fails to resolve.
    pub async fn execute(&self, input: ResolveServiceInput) -> ResolveResult<ResolveServiceOutput> {
        let mut document = input.document;
        let detached = detach_variable_syntax(&mut document);

        let syntax = VariableSyntax::from_override(
            detached.as_ref().and_then(|(_, pattern)| pattern.as_str()),
        )?;
        if detached.is_some() {
            info!(pattern = syntax.pattern(), "using custom variable syntax");
        }

        info!(
            service_path = %input.service_path.display(),
            strict = self.strict,
            "resolving document variables"
        );

        let context = ResolutionContext::new()
            .with_document(document)
            .with_options(input.options)
            .with_environment(input.environment)
            .with_service_path(input.service_path)
            .with_home_dir(input.home_dir);

        let resolver = VariableResolver::new(context, self.ports.clone())
            .with_syntax(syntax)
            .with_strict(self.strict);

        let mut document = resolver.resolve_document().await?;
        if let Some((index, pattern)) = detached {
            reattach_variable_syntax(&mut document, index, pattern);
        }

        info!("document variables resolved");

        Ok(ResolveServiceOutput { document, resolver })
    }
}

fn provider_mut(document: &mut Value) -> Option<&mut Mapping> {
    document
        .as_mapping_mut()?
        .get_mut("provider")?
        .as_mapping_mut()
}

fn detach_variable_syntax(document: &mut Value) -> Option<(usize, Value)> {
    provider_mut(document)?
        .shift_remove_full(VARIABLE_SYNTAX_KEY)
        .map(|(index, _, pattern)| (index, pattern))
}

fn reattach_variable_syntax(document: &mut Value, index: usize, pattern: Value) {
    if let Some(provider) = provider_mut(document) {
        let index = index.min(provider.len());
        provider.shift_insert(index, VARIABLE_SYNTAX_KEY.to_string(), pattern);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::test_support::{MemoryFiles, mapping, yaml};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn service() -> ResolveService {
        ResolveService::new(ResolverPorts::new(Arc::new(MemoryFiles::default())))
    }

    fn input(document: &str) -> ResolveServiceInput {
        ResolveServiceInput {
            document: yaml(document),
            options: mapping("stage: dev\n"),
            environment: mapping("USER: alice\n"),
            service_path: PathBuf::from("/service"),
            home_dir: None,
        }
    }

    #[tokio::test]
    async fn test_resolves_document() {
        let output = service()
            .execute(input("service: demo\nstage: '${opt:stage}'\nuser: '${env:USER}'\n"))
            .await
            .unwrap();

        assert_eq!(
            output.document,
            yaml("service: demo\nstage: dev\nuser: alice\n")
        );
    }

    #[tokio::test]
    async fn test_custom_syntax_from_provider() {
        let document = "provider:\n  name: aws\n  variableSyntax: '\\$\\{\\{([ ~:a-zA-Z0-9._\\-]+?)\\}\\}'\n  stage: '${{opt:stage}}'\nother: '${opt:stage}'\n";
        let output = service().execute(input(document)).await.unwrap();

        let provider = output.document.get("provider").unwrap();
        let keys: Vec<&str> = provider
            .as_mapping()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();

        assert_eq!(keys, vec!["name", "variableSyntax", "stage"]);
        assert_eq!(provider.get("stage"), Some(&Value::from("dev")));
        assert_eq!(
            provider.get("variableSyntax"),
            yaml(document).get("provider").unwrap().get("variableSyntax")
        );
        assert_eq!(output.document.get("other"), Some(&Value::from("${opt:stage}")));
    }

    #[tokio::test]
    async fn test_invalid_syntax_override_fails() {
        let err = service()
            .execute(input("provider:\n  variableSyntax: '\\$\\{(unclosed'\n"))
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::Syntax { .. }));
    }

    #[tokio::test]
    async fn test_strict_pass() {
        let err = service()
            .with_strict(true)
            .execute(input("stage: '${opt:missing}'\n"))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "A valid option to satisfy the declaration 'opt:missing' could not be found."
        );
    }

    #[tokio::test]
    async fn test_resolve_fragment_uses_same_context() {
        let output = service()
            .execute(input("service: demo\n"))
            .await
            .unwrap();

        let fragment = output
            .resolve_fragment(&yaml("name: '${self:service}-${opt:stage}'\n"))
            .await
            .unwrap();

        assert_eq!(fragment, yaml("name: demo-dev\n"));
    }
}
