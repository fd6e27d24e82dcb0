//! `gobom config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use gobom_core::config::GobomConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
pub fn execute(
    args: ConfigArgs,
    config: &GobomConfig,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => {
            // Revalidate strictly against the file, independent of the
            // lenient load in main.
            GobomConfig::load(config_path).map_err(|e| CliError::Config(e.to_string()))?;
            writer.render(&ValidateReport {
                path: config_path.display().to_string(),
                status: "ok".to_owned(),
            })?;
        }
        ConfigAction::Show => {
            let rendered =
                toml::to_string(config).map_err(|e| CliError::Config(e.to_string()))?;
            writer.render(&ShowReport {
                config: config.clone(),
                rendered,
            })?;
        }
    }
    Ok(())
}

/// Validation result report.
#[derive(Serialize)]
struct ValidateReport {
    path: String,
    status: String,
}

impl Render for ValidateReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}: {}", self.path, self.status)
    }
}

/// Effective configuration report.
#[derive(Serialize)]
struct ShowReport {
    #[serde(flatten)]
    config: GobomConfig,
    #[serde(skip)]
    rendered: String,
}

impl Render for ShowReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        write!(w, "{}", self.rendered)
    }
}
