//! `gobom buildinfo` command handler

use std::io::Write;

use serde::Serialize;

use gobom_core::config::GobomConfig;
use gobom_core::types::{BuildInfo, Module};
use gobom_resolver::toolchain::{GoCommand, GoToolchain};
use gobom_resolver::parse_build_info;

use crate::cli::BuildinfoArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `buildinfo` command.
///
/// The input may be a file containing the raw manifest text (useful for
/// testing and piping), or a compiled binary whose embedded manifest is
/// dumped through the toolchain.
pub fn execute(
    args: BuildinfoArgs,
    config: &GobomConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let bytes = std::fs::read(&args.input)?;

    let info = match std::str::from_utf8(&bytes)
        .ok()
        .and_then(|text| parse_build_info(text).ok())
    {
        Some(info) => info,
        None => {
            let toolchain = GoCommand::new(&config.resolve.go_binary);
            let blob = toolchain.binary_manifest(&args.input)?;
            parse_build_info(&blob)?
        }
    };

    writer.render(&BuildinfoReport::from(info))?;
    Ok(())
}

/// One dependency row in the report.
#[derive(Serialize)]
struct DepRow {
    path: String,
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replaced_by: Option<String>,
}

impl From<&Module> for DepRow {
    fn from(module: &Module) -> Self {
        Self {
            path: module.path.clone(),
            version: module.version.clone(),
            sum: module.sum.clone(),
            replaced_by: module.replace.as_ref().map(|r| {
                if r.path().is_empty() {
                    r.version().to_owned()
                } else {
                    format!("{}@{}", r.path(), r.version())
                }
            }),
        }
    }
}

/// Decoded build-metadata manifest report.
#[derive(Serialize)]
struct BuildinfoReport {
    path: String,
    main: String,
    deps: Vec<DepRow>,
    settings: Vec<(String, String)>,
}

impl From<BuildInfo> for BuildinfoReport {
    fn from(info: BuildInfo) -> Self {
        Self {
            path: info.path.clone(),
            main: info.main.coordinate(),
            deps: info.deps.iter().map(DepRow::from).collect(),
            settings: info.settings,
        }
    }
}

impl Render for BuildinfoReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Path: {}", self.path)?;
        writeln!(w, "Main: {}", self.main)?;
        writeln!(w, "Deps: {}", self.deps.len())?;
        for dep in &self.deps {
            match &dep.replaced_by {
                Some(replaced) => writeln!(w, "  {} {} => {}", dep.path, dep.version, replaced)?,
                None => writeln!(w, "  {} {}", dep.path, dep.version)?,
            }
        }
        writeln!(w, "Settings: {}", self.settings.len())?;
        for (key, value) in &self.settings {
            writeln!(w, "  {key}={value}")?;
        }
        Ok(())
    }
}
