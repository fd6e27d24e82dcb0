//! `gobom modules` command handler

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use gobom_core::config::GobomConfig;
use gobom_core::types::ModuleSet;
use gobom_resolver::ResolverBuilder;

use crate::cli::ModulesArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `modules` command.
pub fn execute(
    args: ModulesArgs,
    config: &GobomConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let mut resolve_config = config.resolve.clone();
    if args.include_tests {
        resolve_config.include_test_deps = true;
    }
    let resolver = ResolverBuilder::new().config(resolve_config).build();

    let dir = args.dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let set = if args.vendor {
        resolver.resolve_vendor(&dir)?
    } else {
        resolver.resolve_directory(&dir)?
    };

    writer.render(&build_report(&set, args.verbose))?;
    Ok(())
}

fn build_report(set: &ModuleSet, verbose: bool) -> ModulesReport {
    let main = set
        .main()
        .map(|m| m.coordinate())
        .unwrap_or_else(|| "?".to_owned());

    let mut rows: Vec<ModuleRow> = set
        .dependencies()
        .map(|module| ModuleRow {
            path: module.path.clone(),
            version: module.effective_version().to_owned(),
            replaced_by: module
                .replace
                .as_ref()
                .filter(|r| !r.path().is_empty())
                .map(|r| r.path().to_owned()),
            test_only: module.test_only,
            vendored: module.vendored,
            packages: module.packages.len(),
            dependencies: module.dependencies.clone(),
        })
        .collect();
    rows.sort_by(|a, b| a.path.cmp(&b.path));

    ModulesReport {
        main,
        modules: rows,
        verbose,
    }
}

/// One resolved module in the report.
#[derive(Serialize)]
struct ModuleRow {
    path: String,
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    replaced_by: Option<String>,
    test_only: bool,
    vendored: bool,
    packages: usize,
    dependencies: Vec<String>,
}

/// Report listing the resolved module set.
#[derive(Serialize)]
struct ModulesReport {
    main: String,
    modules: Vec<ModuleRow>,
    #[serde(skip)]
    verbose: bool,
}

impl Render for ModulesReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Main module: {}", self.main)?;
        writeln!(w, "Dependencies: {}", self.modules.len())?;
        for module in &self.modules {
            let mut flags = Vec::new();
            if module.test_only {
                flags.push("test-only");
            }
            if module.vendored {
                flags.push("vendored");
            }
            let flags = if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            };
            match &module.replaced_by {
                Some(replaced) => writeln!(
                    w,
                    "  {} {} => {}{}",
                    module.path, module.version, replaced, flags,
                )?,
                None => writeln!(w, "  {} {}{}", module.path, module.version, flags)?,
            }
            if self.verbose {
                writeln!(w, "    packages: {}", module.packages)?;
                for dependency in &module.dependencies {
                    writeln!(w, "    -> {dependency}")?;
                }
            }
        }
        Ok(())
    }
}
