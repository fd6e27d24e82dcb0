//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's
//! derive macros. It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Gobom -- module dependency graph resolution and SBOM generation.
///
/// Use `gobom <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "gobom", version, about, long_about = None)]
pub struct Cli {
    /// Path to the gobom.toml configuration file.
    #[arg(short, long, default_value = "gobom.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format for command reports.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported report output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the module graph and emit SBOM documents.
    Generate(GenerateArgs),

    /// Resolve the module graph and list the selected modules.
    Modules(ModulesArgs),

    /// Decode the build-metadata manifest embedded in a compiled binary.
    Buildinfo(BuildinfoArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- generate ----

/// Resolve the module graph and emit SBOM documents.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Module directory to resolve (default: current directory).
    #[arg(short = 'C', long)]
    pub dir: Option<PathBuf>,

    /// Compiled binary to read the embedded build manifest from.
    ///
    /// Without `--dir`, no transitive edge listing is available and the
    /// main module's dependency list is the flattened manifest dep list.
    #[arg(long)]
    pub binary: Option<PathBuf>,

    /// Load modules from the vendor tree instead of the module listing.
    #[arg(long)]
    pub vendor: bool,

    /// SBOM format to emit (spdx, cyclonedx, both).
    #[arg(long, default_value = "both")]
    pub format: String,

    /// Directory to write SBOM files into (default: print to stdout).
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Include test-only dependencies in the resolved set.
    #[arg(long)]
    pub include_tests: bool,
}

// ---- modules ----

/// Resolve the module graph and list the selected modules.
#[derive(Args, Debug)]
pub struct ModulesArgs {
    /// Module directory to resolve (default: current directory).
    #[arg(short = 'C', long)]
    pub dir: Option<PathBuf>,

    /// Load modules from the vendor tree instead of the module listing.
    #[arg(long)]
    pub vendor: bool,

    /// Include test-only dependencies in the resolved set.
    #[arg(long)]
    pub include_tests: bool,

    /// Show dependency edges and package counts per module.
    #[arg(short, long)]
    pub verbose: bool,
}

// ---- buildinfo ----

/// Decode the build-metadata manifest embedded in a compiled binary.
#[derive(Args, Debug)]
pub struct BuildinfoArgs {
    /// Compiled binary, or a file containing the raw manifest text.
    pub input: PathBuf,
}

// ---- config ----

/// Manage gobom configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show,
}
