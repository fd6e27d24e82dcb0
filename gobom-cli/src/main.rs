//! Gobom CLI entry point
//!
//! Parses arguments, loads configuration, initialises logging, and
//! dispatches to the subcommand handlers. Logging goes to stderr so that
//! SBOM documents printed on stdout stay machine-readable.

mod cli;
mod commands;
mod error;
mod output;

use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gobom_core::config::GobomConfig;
use gobom_core::error::{ConfigError, GobomError};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

/// Default configuration file name used when `--config` is not given.
const DEFAULT_CONFIG_PATH: &str = "gobom.toml";

fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("gobom: {e}");
            std::process::exit(e.exit_code());
        }
    };

    init_logging(cli.log_level.as_deref(), &config);

    let writer = OutputWriter::new(cli.output);
    let result = match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, &config, &writer),
        Commands::Modules(args) => commands::modules::execute(args, &config, &writer),
        Commands::Buildinfo(args) => commands::buildinfo::execute(args, &config, &writer),
        Commands::Config(args) => {
            commands::config::execute(args, &config, &cli.config, &writer)
        }
    };

    if let Err(e) = result {
        eprintln!("gobom: {e}");
        std::process::exit(e.exit_code());
    }
}

/// Load configuration from the given path.
///
/// A missing file at the *default* path falls back to defaults plus
/// environment overrides; a missing file at an explicitly given path is an
/// error.
fn load_config(path: &Path) -> Result<GobomConfig, CliError> {
    match GobomConfig::load(path) {
        Ok(config) => Ok(config),
        Err(GobomError::Config(ConfigError::FileNotFound { .. }))
            if path == Path::new(DEFAULT_CONFIG_PATH) =>
        {
            let mut config = GobomConfig::default();
            config.apply_env_overrides();
            config
                .validate()
                .map_err(|e| CliError::Config(e.to_string()))?;
            Ok(config)
        }
        Err(e) => Err(CliError::Config(e.to_string())),
    }
}

/// Initialise tracing with the CLI override or the configured level.
fn init_logging(cli_level: Option<&str>, config: &GobomConfig) {
    let level = cli_level.unwrap_or(&config.general.log_level);
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
