//! Value provider running executable files in a child process.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use nimbus_application::ports::{FileLoadError, ValueProvider};
use nimbus_domain::Value;
use tokio::process::Command;
use tracing::debug;

/// Runs `<interpreter> <file> [export]` and reads the value from stdout.
///
/// Stdout is parsed as JSON; if that fails, the trimmed text is the value.
/// Empty output is an absent value.
#[derive(Debug, Clone, Default)]
pub struct ProcessValueProvider {
    interpreters: HashMap<String, String>,
}

impl ProcessValueProvider {
    /// Creates a provider from an extension to interpreter command map.
    #[must_use]
    pub fn new(interpreters: HashMap<String, String>) -> Self {
        Self {
            interpreters: interpreters
                .into_iter()
                .map(|(ext, cmd)| (ext.to_ascii_lowercase(), cmd))
                .collect(),
        }
    }

    /// File extensions this provider can run.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.interpreters.keys().map(String::as_str)
    }

    fn command_for(&self, path: &Path) -> Result<Command, FileLoadError> {
        let no_interpreter = || {
            FileLoadError::Invocation(format!(
                "no interpreter is configured to run {}",
                path.display()
            ))
        };

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(no_interpreter)?;
        let interpreter = self.interpreters.get(&extension).ok_or_else(no_interpreter)?;

        let mut words = interpreter.split_whitespace();
        let program = words.next().ok_or_else(no_interpreter)?;

        let mut command = Command::new(program);
        command.args(words).arg(path);
        if let Some(dir) = path.parent() {
            command.current_dir(dir);
        }
        Ok(command)
    }
}

#[async_trait]
impl ValueProvider for ProcessValueProvider {
    async fn invoke(
        &self,
        path: &Path,
        export: Option<&str>,
    ) -> Result<Option<Value>, FileLoadError> {
        let mut command = self.command_for(path)?;
        if let Some(export) = export {
            command.arg(export);
        }

        debug!(path = %path.display(), export, "invoking executable file");
        let output = command.output().await?;

        if !output.status.success() {
            return Err(FileLoadError::Invocation(format!(
                "{} exited with {}: {}",
                path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = stdout.trim();
        if text.is_empty() {
            return Ok(None);
        }

        Ok(Some(
            serde_json::from_str(text).unwrap_or_else(|_| Value::from(text)),
        ))
    }
}
