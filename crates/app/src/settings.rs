//! Layered settings.
//!
//! Built-in defaults, then an optional settings file (`nimbus.yml` in the
//! working directory or `--config`), then `NIMBUS_*` environment variables.

use std::collections::HashMap;
use std::path::Path;

use config::{Config, Environment, File};
use nimbus_infrastructure::DocumentFormat;
use serde::Deserialize;

/// Errors raised while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A source could not be read or the values do not fit [`Settings`].
    #[error("Invalid settings: {0}")]
    Config(#[from] config::ConfigError),
}

/// Output format of the resolved document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// YAML.
    #[default]
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

impl From<OutputFormat> for DocumentFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Yaml => Self::Yaml,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// Resolver settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// URL of the provider gateway serving `cf:` and `s3:` references.
    pub provider_endpoint: Option<String>,

    /// File extension to interpreter command for executable files.
    pub interpreters: HashMap<String, String>,

    /// Fail on any reference that finds nothing.
    pub strict: bool,

    /// Drop `null` environment entries after resolution.
    pub prune_null_environment: bool,

    /// Output format.
    pub output_format: OutputFormat,
}

impl Settings {
    /// Loads settings from all layers.
    ///
    /// # Errors
    ///
    /// Returns an error if `config_file` is given but unreadable, or a value
    /// has the wrong type.
    pub fn load(config_file: Option<&Path>) -> Result<Self, SettingsError> {
        let file = config_file.map_or_else(
            || File::with_name("nimbus").required(false),
            |path| File::from(path).required(true),
        );

        let settings = Config::builder()
            .set_default("strict", false)?
            .set_default("prune_null_environment", false)?
            .set_default("output_format", "yaml")?
            .set_default("interpreters.sh", "sh")?
            .set_default("interpreters.py", "python3")?
            .add_source(file)
            .add_source(Environment::with_prefix("NIMBUS").try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("empty.yml");
        std::fs::write(&path, "{}\n").expect("write should work");

        let settings = Settings::load(Some(&path)).expect("settings should load");

        assert_eq!(settings.interpreters.get("sh"), Some(&"sh".to_string()));
        assert_eq!(settings.interpreters.get("py"), Some(&"python3".to_string()));
        assert_eq!(settings.output_format, OutputFormat::Yaml);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("nimbus.yml");
        std::fs::write(
            &path,
            "provider_endpoint: http://localhost:4566\nstrict: true\noutput_format: json\ninterpreters:\n  js: node\n",
        )
        .expect("write should work");

        let settings = Settings::load(Some(&path)).expect("settings should load");

        assert_eq!(
            settings.provider_endpoint.as_deref(),
            Some("http://localhost:4566")
        );
        assert!(settings.strict);
        assert_eq!(settings.output_format, OutputFormat::Json);
        assert_eq!(settings.interpreters.get("js"), Some(&"node".to_string()));
        assert_eq!(settings.interpreters.get("sh"), Some(&"sh".to_string()));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let result = Settings::load(Some(Path::new("/definitely/not/here.yml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_type_fails() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("nimbus.yml");
        std::fs::write(&path, "output_format: xml\n").expect("write should work");

        assert!(Settings::load(Some(&path)).is_err());
    }
}
