//! Nimbus - resolves variable references in deployment configuration
//! documents.
//!
//! Wires the infrastructure adapters into the resolve service and renders
//! the result.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use nimbus_application::ports::{ProviderClient, ResolverPorts, UnconfiguredProviderClient};
use nimbus_application::{ResolveError, ResolveService, ResolveServiceInput};
use nimbus_domain::{Mapping, Value, prune_null_environment};
use nimbus_infrastructure::{
    DocumentError, HttpProviderClient, ProcessValueProvider, TokioFileLoader, home_dir,
    load_document, render_document, system_environment,
};
use tracing::{debug, info, warn};

pub mod cli;
pub mod settings;

pub use cli::Cli;
pub use settings::{OutputFormat, Settings, SettingsError};

/// Errors surfaced by the binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Settings could not be loaded.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The document could not be read or written.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The output could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Output {
        /// Output path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Builds the port set from settings.
///
/// An unusable provider endpoint is logged and replaced by a client that
/// fails every request, so documents without `cf:`/`s3:` still resolve.
#[must_use]
pub fn build_ports(settings: &Settings) -> ResolverPorts {
    let values = ProcessValueProvider::new(settings.interpreters.clone());
    let files = TokioFileLoader::new().with_executable_extensions(values.extensions());

    let provider: Arc<dyn ProviderClient> = match settings.provider_endpoint.as_deref() {
        Some(endpoint) => match HttpProviderClient::new(endpoint) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                warn!(endpoint, error = %e, "provider endpoint unusable, cloud references will fail");
                Arc::new(UnconfiguredProviderClient)
            }
        },
        None => Arc::new(UnconfiguredProviderClient),
    };

    ResolverPorts::new(Arc::new(files))
        .with_values(Arc::new(values))
        .with_provider(provider)
}

/// Collects `--opt`, `--stage` and `--region` into the options mapping.
#[must_use]
pub fn cli_options(cli: &Cli) -> Mapping {
    let mut options: Mapping = cli.options.iter().cloned().collect();
    if let Some(stage) = &cli.stage {
        options.insert("stage".to_string(), Value::from(stage.as_str()));
    }
    if let Some(region) = &cli.region {
        options.insert("region".to_string(), Value::from(region.as_str()));
    }
    options
}

fn service_path(document: &Path) -> PathBuf {
    document
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Loads, resolves and renders the document named on the command line.
///
/// # Errors
///
/// Returns an error if the document cannot be loaded, resolution fails, or
/// the result cannot be serialized.
pub async fn run(cli: &Cli, settings: &Settings) -> Result<String, AppError> {
    let document = load_document(&cli.document).await?;
    info!(document = %cli.document.display(), "loaded service document");

    let input = ResolveServiceInput {
        document,
        options: cli_options(cli),
        environment: system_environment(),
        service_path: service_path(&cli.document),
        home_dir: home_dir(),
    };

    let output = ResolveService::new(build_ports(settings))
        .with_strict(cli.strict || settings.strict)
        .execute(input)
        .await?;

    let mut document = output.document;
    if cli.prune_null_env || settings.prune_null_environment {
        let removed = prune_null_environment(&mut document);
        debug!(removed, "pruned null environment entries");
    }

    let format = cli.format.unwrap_or(settings.output_format);
    Ok(render_document(&document, format.into())?)
}

/// Writes the rendered document to `path`, or stdout when `None`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub async fn write_output(path: Option<&Path>, rendered: &str) -> Result<(), AppError> {
    let Some(path) = path else {
        use std::io::Write;
        return std::io::stdout()
            .write_all(rendered.as_bytes())
            .map_err(|source| AppError::Output {
                path: PathBuf::from("<stdout>"),
                source,
            });
    };

    tokio::fs::write(path, rendered)
        .await
        .map_err(|source| AppError::Output {
            path: path.to_path_buf(),
            source,
        })?;
    info!(output = %path.display(), "wrote resolved document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_options_include_stage_and_region() {
        let cli = Cli::try_parse_from([
            "nimbus", "a.yml", "--opt", "stage=prod", "-s", "dev", "-r", "eu-west-1",
        ])
        .expect("arguments should parse");

        let options = cli_options(&cli);
        assert_eq!(options.get("stage"), Some(&Value::from("dev")));
        assert_eq!(options.get("region"), Some(&Value::from("eu-west-1")));
    }

    #[test]
    fn test_service_path() {
        assert_eq!(service_path(Path::new("serverless.yml")), PathBuf::from("."));
        assert_eq!(
            service_path(Path::new("/srv/app/serverless.yml")),
            PathBuf::from("/srv/app")
        );
    }
}
