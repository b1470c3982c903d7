//! File loader implementation using `tokio::fs`.

use std::collections::HashSet;
use std::io;
use std::path::Path;

use async_trait::async_trait;
use nimbus_application::ports::{FileLoadError, FileLoader, LoadedFile};
use tokio::fs;
use tracing::debug;

use crate::serialization::{DocumentError, from_json_str, from_yaml_str};

/// Loads referenced files from disk.
///
/// `.yml`, `.yaml` and `.json` files are parsed, files with an executable
/// extension are handed to the value provider, anything else is text.
#[derive(Debug, Clone, Default)]
pub struct TokioFileLoader {
    executable_extensions: HashSet<String>,
}

impl TokioFileLoader {
    /// Creates a loader that treats no file as executable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the extensions (without dot) of executable files.
    #[must_use]
    pub fn with_executable_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.executable_extensions = extensions
            .into_iter()
            .map(|ext| ext.into().to_ascii_lowercase())
            .collect();
        self
    }

    fn is_executable(&self, extension: Option<&str>) -> bool {
        extension.is_some_and(|ext| self.executable_extensions.contains(ext))
    }
}

#[async_trait]
impl FileLoader for TokioFileLoader {
    async fn load(&self, path: &Path) -> Result<Option<LoadedFile>, FileLoadError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        if self.is_executable(extension.as_deref()) {
            return match fs::metadata(path).await {
                Ok(_) => Ok(Some(LoadedFile::Executable)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            };
        }

        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "file not found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), bytes = bytes.len(), "loaded file");

        let parse_error = |e: DocumentError| FileLoadError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        let structured =
            |bytes: Vec<u8>| String::from_utf8(bytes).map_err(|e| parse_error(e.into()));

        let loaded = match extension.as_deref() {
            Some("yml" | "yaml") => {
                LoadedFile::Structured(from_yaml_str(&structured(bytes)?).map_err(parse_error)?)
            }
            Some("json") => {
                LoadedFile::Structured(from_json_str(&structured(bytes)?).map_err(parse_error)?)
            }
            // Plain text is taken as is, invalid UTF-8 included.
            _ => LoadedFile::Text(String::from_utf8_lossy(&bytes).into_owned()),
        };

        Ok(Some(loaded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_domain::Value;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).expect("write should work");
        path
    }

    #[tokio::test]
    async fn test_load_yaml() {
        let dir = TempDir::new().expect("tempdir should be created");
        let path = write(&dir, "config.yml", "db:\n  host: localhost\n");

        let loaded = TokioFileLoader::new().load(&path).await.expect("load should work");

        let Some(LoadedFile::Structured(value)) = loaded else {
            panic!("expected structured file, got {loaded:?}");
        };
        assert_eq!(
            value.get("db").and_then(|db| db.get("host")),
            Some(&Value::from("localhost"))
        );
    }

    #[tokio::test]
    async fn test_load_json() {
        let dir = TempDir::new().expect("tempdir should be created");
        let path = write(&dir, "config.json", r#"{"port": 5432}"#);

        let loaded = TokioFileLoader::new().load(&path).await.expect("load should work");
        assert_eq!(
            loaded,
            Some(LoadedFile::Structured(
                from_json_str(r#"{"port": 5432}"#).expect("json should parse")
            ))
        );
    }

    #[tokio::test]
    async fn test_load_text() {
        let dir = TempDir::new().expect("tempdir should be created");
        let path = write(&dir, "notes.txt", "hello\n");

        let loaded = TokioFileLoader::new().load(&path).await.expect("load should work");
        assert_eq!(loaded, Some(LoadedFile::Text("hello\n".to_string())));
    }

    #[tokio::test]
    async fn test_load_text_with_invalid_utf8() {
        let dir = TempDir::new().expect("tempdir should be created");
        let path = dir.path().join("banner.txt");
        std::fs::write(&path, b"caf\xe9 menu\n").expect("write should work");

        let loaded = TokioFileLoader::new().load(&path).await.expect("load should work");
        assert_eq!(loaded, Some(LoadedFile::Text("caf\u{fffd} menu\n".to_string())));
    }

    #[tokio::test]
    async fn test_invalid_utf8_yaml_is_parse_error() {
        let dir = TempDir::new().expect("tempdir should be created");
        let path = dir.path().join("broken.yml");
        std::fs::write(&path, b"name: caf\xe9\n").expect("write should work");

        let err = TokioFileLoader::new().load(&path).await.unwrap_err();
        assert!(matches!(err, FileLoadError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = TempDir::new().expect("tempdir should be created");

        let loader = TokioFileLoader::new().with_executable_extensions(["sh"]);
        for name in ["missing.yml", "missing.sh"] {
            let loaded = loader.load(&dir.path().join(name)).await.expect("load should work");
            assert_eq!(loaded, None);
        }
    }

    #[tokio::test]
    async fn test_executable_extension() {
        let dir = TempDir::new().expect("tempdir should be created");
        let path = write(&dir, "values.SH", "echo 1\n");

        let loaded = TokioFileLoader::new()
            .with_executable_extensions(["sh"])
            .load(&path)
            .await
            .expect("load should work");
        assert_eq!(loaded, Some(LoadedFile::Executable));
    }

    #[tokio::test]
    async fn test_invalid_yaml_is_parse_error() {
        let dir = TempDir::new().expect("tempdir should be created");
        let path = write(&dir, "broken.yml", "key: [unclosed");

        let err = TokioFileLoader::new().load(&path).await.unwrap_err();
        assert!(matches!(err, FileLoadError::Parse { .. }));
    }
}
