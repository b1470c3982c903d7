//! Nimbus binary.

use clap::Parser;
use nimbus::{Cli, Settings};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries the document
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    tracing::debug!(?settings, "loaded settings");

    let rendered = nimbus::run(&cli, &settings).await?;
    nimbus::write_output(cli.output.as_deref(), &rendered).await?;

    Ok(())
}
