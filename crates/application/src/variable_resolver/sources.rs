//! Source resolvers
//!
//! One resolver per reference prefix. Each returns the raw value found at the
//! source; the engine takes care of resolving references inside it.

use std::borrow::Cow;

use nimbus_domain::{Mapping, Value, VariableSource, path_segments};
use tracing::{debug, trace};

use super::engine::{Trail, VariableResolver};
use crate::error::{ResolveError, ResolveResult};
use crate::ports::LoadedFile;

impl VariableResolver {
    /// Classifies `reference` and reads its source.
    pub(super) async fn dispatch(
        &self,
        reference: &str,
        trail: &Trail,
    ) -> ResolveResult<Option<Value>> {
        match VariableSource::parse(reference)? {
            VariableSource::Environment { name } => {
                Ok(lookup(&self.context.environment, &name))
            }
            VariableSource::Option { name } => Ok(lookup(&self.context.options, &name)),
            VariableSource::SelfAttribute { path } => {
                self.traverse(&path_segments(&path), Some(&self.context.document), trail)
                    .await
            }
            VariableSource::File { path, property } => {
                self.get_value_from_file(&path, property.as_deref(), trail)
                    .await
            }
            VariableSource::StackOutput { stack, output } => {
                self.get_value_from_stack(reference, &stack, &output).await
            }
            VariableSource::ObjectStore { bucket, key } => {
                self.get_value_from_object_store(reference, &bucket, &key)
                    .await
            }
        }
    }

    /// Deep-path traversal.
    ///
    /// A missing final segment yields absent; walking past an absent node
    /// yields `{}`. An empty segment keeps the current node unless it has an
    /// empty key. Reference strings met on the way are resolved first.
    pub(super) async fn traverse(
        &self,
        segments: &[&str],
        root: Option<&Value>,
        trail: &Trail,
    ) -> ResolveResult<Option<Value>> {
        let mut current: Option<Cow<'_, Value>> = root.map(Cow::Borrowed);

        for segment in segments {
            current = match current {
                None => Some(Cow::Owned(Value::empty_mapping())),
                Some(node) if segment.is_empty() && !node.has_key("") => Some(node),
                Some(Cow::Borrowed(node)) => node.get(segment).map(Cow::Borrowed),
                Some(Cow::Owned(node)) => node.get(segment).cloned().map(Cow::Owned),
            };

            if let Some(node) = current.as_deref()
                && node.as_str().is_some_and(|s| self.syntax.is_match(s))
            {
                trace!(segment, "resolving reference met during traversal");
                current = self
                    .populate_property(node, false, trail)
                    .await?
                    .map(Cow::Owned);
            }
        }

        Ok(current.map(Cow::into_owned))
    }

    async fn get_value_from_file(
        &self,
        path: &str,
        property: Option<&str>,
        trail: &Trail,
    ) -> ResolveResult<Option<Value>> {
        let full_path = self.context.resolve_file_path(path);

        let loaded = self
            .ports
            .files
            .load(&full_path)
            .await
            .map_err(|source| ResolveError::File {
                path: full_path.clone(),
                source,
            })?;

        let Some(loaded) = loaded else {
            debug!(path = %full_path.display(), "referenced file does not exist");
            return Ok(None);
        };

        let segments = property.map(path_segments).unwrap_or_default();

        match loaded {
            LoadedFile::Structured(value) => self.traverse_file(&segments, value, trail).await,
            LoadedFile::Text(text) => {
                self.traverse_file(&segments, Value::String(text.trim_end().to_string()), trail)
                    .await
            }
            LoadedFile::Executable => {
                let (export, rest) = match segments.split_first() {
                    Some((first, rest)) if !first.is_empty() => (Some(*first), rest),
                    _ => (None, &[][..]),
                };

                let value = self
                    .ports
                    .values
                    .invoke(&full_path, export)
                    .await
                    .map_err(|source| ResolveError::Export {
                        path: full_path.clone(),
                        export: export.unwrap_or("default").to_string(),
                        source,
                    })?;

                match value {
                    Some(value) => self.traverse_file(rest, value, trail).await,
                    None => Ok(None),
                }
            }
        }
    }

    async fn traverse_file(
        &self,
        segments: &[&str],
        value: Value,
        trail: &Trail,
    ) -> ResolveResult<Option<Value>> {
        if segments.is_empty() {
            Ok(Some(value))
        } else {
            self.traverse(segments, Some(&value), trail).await
        }
    }

    async fn get_value_from_stack(
        &self,
        reference: &str,
        stack: &str,
        output: &str,
    ) -> ResolveResult<Option<Value>> {
        let mut params = Mapping::new();
        params.insert("StackName".to_string(), Value::from(stack));

        let response = self
            .ports
            .provider
            .request(
                "CloudFormation",
                "describeStacks",
                Value::Mapping(params),
                self.context.stage(),
                self.context.region(),
            )
            .await
            .map_err(|source| ResolveError::Provider {
                reference: reference.to_string(),
                source,
            })?;

        let outputs = response
            .get("Stacks")
            .and_then(|stacks| stacks.get("0"))
            .and_then(|first| first.get("Outputs"))
            .and_then(Value::as_sequence)
            .unwrap_or_default();

        outputs
            .iter()
            .find(|entry| entry.get("OutputKey").and_then(Value::as_str) == Some(output))
            .map(|entry| entry.get("OutputValue").cloned())
            .ok_or_else(|| ResolveError::NonExportedOutput {
                stack: stack.to_string(),
                output: output.to_string(),
            })
    }

    async fn get_value_from_object_store(
        &self,
        reference: &str,
        bucket: &str,
        key: &str,
    ) -> ResolveResult<Option<Value>> {
        let mut params = Mapping::new();
        params.insert("Bucket".to_string(), Value::from(bucket));
        params.insert("Key".to_string(), Value::from(key));

        let response = self
            .ports
            .provider
            .request(
                "S3",
                "getObject",
                Value::Mapping(params),
                self.context.stage(),
                self.context.region(),
            )
            .await
            .map_err(|e| ResolveError::ObjectStore {
                reference: reference.to_string(),
                message: e.to_string(),
            })?;

        Ok(response.get("Body").cloned())
    }
}

/// `env:` and `opt:` lookup. An empty name selects the whole mapping.
fn lookup(values: &Mapping, name: &str) -> Option<Value> {
    if name.is_empty() {
        Some(Value::Mapping(values.clone()))
    } else {
        values.get(name).cloned()
    }
}
