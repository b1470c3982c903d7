//! In-memory port implementations for tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use nimbus_domain::{Mapping, Value};

use crate::ports::{FileLoadError, FileLoader, LoadedFile, ProviderClient, ProviderError, ValueProvider};

/// Parses a YAML snippet into a document value.
pub fn yaml(text: &str) -> Value {
    Value::from(serde_yaml::from_str::<serde_yaml::Value>(text).unwrap())
}

/// Parses a YAML snippet that must be a mapping.
pub fn mapping(text: &str) -> Mapping {
    yaml(text).as_mapping().cloned().unwrap()
}

/// File loader backed by a map of absolute paths.
#[derive(Default)]
pub struct MemoryFiles {
    files: HashMap<PathBuf, LoadedFile>,
    loads: Mutex<Vec<PathBuf>>,
}

impl MemoryFiles {
    pub fn with_file(mut self, path: &str, file: LoadedFile) -> Self {
        self.files.insert(PathBuf::from(path), file);
        self
    }

    pub fn load_count(&self) -> usize {
        self.loads.lock().unwrap().len()
    }
}

#[async_trait]
impl FileLoader for MemoryFiles {
    async fn load(&self, path: &Path) -> Result<Option<LoadedFile>, FileLoadError> {
        self.loads.lock().unwrap().push(path.to_path_buf());
        Ok(self.files.get(path).cloned())
    }
}

/// Value provider returning fixed values per export.
#[derive(Default)]
pub struct StaticValues {
    values: HashMap<Option<String>, Value>,
    pub invocations: Mutex<Vec<(PathBuf, Option<String>)>>,
}

impl StaticValues {
    pub fn with_export(mut self, export: Option<&str>, value: Value) -> Self {
        self.values.insert(export.map(str::to_string), value);
        self
    }
}

#[async_trait]
impl ValueProvider for StaticValues {
    async fn invoke(
        &self,
        path: &Path,
        export: Option<&str>,
    ) -> Result<Option<Value>, FileLoadError> {
        self.invocations
            .lock()
            .unwrap()
            .push((path.to_path_buf(), export.map(str::to_string)));
        Ok(self.values.get(&export.map(str::to_string)).cloned())
    }
}

/// A recorded provider request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCall {
    pub service: String,
    pub operation: String,
    pub params: Value,
    pub stage: Option<String>,
    pub region: Option<String>,
}

/// Provider client answering every request with the same response.
pub struct RecordingProvider {
    response: Result<Value, String>,
    pub calls: Mutex<Vec<ProviderCall>>,
}

impl RecordingProvider {
    pub fn responding(response: Value) -> Self {
        Self {
            response: Ok(response),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ProviderClient for RecordingProvider {
    async fn request(
        &self,
        service: &str,
        operation: &str,
        params: Value,
        stage: Option<&str>,
        region: Option<&str>,
    ) -> Result<Value, ProviderError> {
        self.calls.lock().unwrap().push(ProviderCall {
            service: service.to_string(),
            operation: operation.to_string(),
            params,
            stage: stage.map(str::to_string),
            region: region.map(str::to_string),
        });
        self.response.clone().map_err(ProviderError::Request)
    }
}
