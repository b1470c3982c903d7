//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;
use nimbus_domain::Value;

use crate::settings::OutputFormat;

/// Resolve variable references in a service document.
#[derive(Parser, Debug, Clone)]
#[command(name = "nimbus", version)]
#[command(about = "Resolve ${...} variable references in a service document")]
pub struct Cli {
    /// Service document (YAML or JSON)
    pub document: PathBuf,

    /// Option available as `${opt:KEY}`; repeatable. A bare KEY is `true`
    #[arg(long = "opt", value_name = "KEY=VALUE", value_parser = parse_option)]
    pub options: Vec<(String, Value)>,

    /// Stage, available as `${opt:stage}`
    #[arg(short, long)]
    pub stage: Option<String>,

    /// Region, available as `${opt:region}`
    #[arg(short, long)]
    pub region: Option<String>,

    /// Output format [default: from settings, else yaml]
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the resolved document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fail on any reference that finds nothing
    #[arg(long)]
    pub strict: bool,

    /// Drop null environment entries after resolution
    #[arg(long)]
    pub prune_null_env: bool,

    /// Settings file [default: ./nimbus.yml if present]
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_option(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .map_or((raw, Value::Bool(true)), |(key, value)| (key, Value::from(value)));

    if key.is_empty() {
        return Err(format!("invalid option '{raw}': expected KEY=VALUE"));
    }
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_options() {
        let cli = Cli::try_parse_from([
            "nimbus",
            "serverless.yml",
            "--opt",
            "stage=prod",
            "--opt",
            "verbose",
            "-r",
            "eu-west-1",
            "--format",
            "json",
        ])
        .expect("arguments should parse");

        assert_eq!(
            cli.options,
            vec![
                ("stage".to_string(), Value::from("prod")),
                ("verbose".to_string(), Value::Bool(true)),
            ]
        );
        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(!cli.strict);
    }

    #[test]
    fn test_value_may_contain_equals() {
        assert_eq!(
            parse_option("filter=a=b"),
            Ok(("filter".to_string(), Value::from("a=b")))
        );
    }

    #[test]
    fn test_empty_key_is_rejected() {
        assert!(parse_option("=value").is_err());
        assert!(Cli::try_parse_from(["nimbus", "a.yml", "--opt", "=x"]).is_err());
    }
}
