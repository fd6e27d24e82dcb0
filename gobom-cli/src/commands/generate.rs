//! `gobom generate` command handler

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use gobom_core::config::GobomConfig;
use gobom_core::types::ModuleSet;
use gobom_resolver::ResolverBuilder;
use gobom_sbom::types::{SbomFormat, SbomOptions};

use crate::cli::GenerateArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `generate` command.
pub fn execute(
    args: GenerateArgs,
    config: &GobomConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let mut resolve_config = config.resolve.clone();
    if args.include_tests {
        resolve_config.include_test_deps = true;
    }
    let resolver = ResolverBuilder::new().config(resolve_config).build();

    let dir = args.dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let (set, build) = if let Some(binary) = &args.binary {
        info!(binary = %binary.display(), "resolving from embedded build manifest");
        let (info, set) = resolver.resolve_binary(binary, args.dir.as_deref())?;
        (set, Some(info))
    } else if args.vendor {
        info!(dir = %dir.display(), "resolving from vendor tree");
        (resolver.resolve_vendor(&dir)?, None)
    } else {
        info!(dir = %dir.display(), "resolving from module listing");
        (resolver.resolve_directory(&dir)?, None)
    };

    // Artifact digests are best-effort enrichment for the CycloneDX metadata.
    let artifact = args.binary.as_ref().and_then(|binary| {
        match gobom_sbom::artifact_digests(binary) {
            Ok(digests) => Some(digests),
            Err(e) => {
                warn!(error = %e, "failed to digest artifact, omitting binary properties");
                None
            }
        }
    });

    let options = SbomOptions::from_config(&config.sbom);
    let mut documents = Vec::new();
    for format in parse_formats(&args.format)? {
        let document = match format {
            SbomFormat::Spdx => gobom_sbom::spdx::generate(&set, &options)?,
            SbomFormat::CycloneDx => {
                gobom_sbom::cyclonedx::generate(&set, build.as_ref(), artifact.as_ref(), &options)?
            }
        };
        documents.push(document);
    }

    match &args.out_dir {
        Some(out_dir) => {
            std::fs::create_dir_all(out_dir)?;
            let stem = document_stem(&set);
            let mut summaries = Vec::new();
            for document in &documents {
                let file_name = match document.format {
                    SbomFormat::Spdx => format!("{stem}.spdx.json"),
                    SbomFormat::CycloneDx => format!("{stem}.cdx.json"),
                };
                let path = out_dir.join(file_name);
                std::fs::write(&path, &document.content)?;
                summaries.push(DocumentSummary {
                    format: document.format.to_string(),
                    components: document.component_count,
                    path: path.display().to_string(),
                });
            }
            writer.render(&GenerateReport {
                modules: set.len(),
                documents: summaries,
            })?;
        }
        None => {
            // Documents go to stdout verbatim; reports would only get in the way.
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            for document in &documents {
                writeln!(handle, "{}", document.content)?;
            }
        }
    }
    Ok(())
}

/// Parse the `--format` flag into a list of formats to emit.
fn parse_formats(value: &str) -> Result<Vec<SbomFormat>, CliError> {
    match value.to_lowercase().as_str() {
        "both" => Ok(vec![SbomFormat::Spdx, SbomFormat::CycloneDx]),
        other => SbomFormat::from_str_loose(other)
            .map(|f| vec![f])
            .ok_or_else(|| {
                CliError::Command(format!(
                    "invalid SBOM format: {value} (expected: spdx, cyclonedx, both)"
                ))
            }),
    }
}

/// Derive the output file stem from the main module path.
fn document_stem(set: &ModuleSet) -> String {
    set.main()
        .and_then(|m| m.effective_path().rsplit('/').next().map(str::to_owned))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "sbom".to_owned())
}

/// Summary of one written SBOM document.
#[derive(Serialize)]
struct DocumentSummary {
    format: String,
    components: usize,
    path: String,
}

/// Report rendered after writing SBOM files.
#[derive(Serialize)]
struct GenerateReport {
    modules: usize,
    documents: Vec<DocumentSummary>,
}

impl Render for GenerateReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Resolved {} modules", self.modules)?;
        for document in &self.documents {
            writeln!(
                w,
                "  {} ({} components) -> {}",
                document.format, document.components, document.path,
            )?;
        }
        Ok(())
    }
}
