//! `tagkit check` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use tagkit_markup::{MarkupError, line_at};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Template files to check.
    #[arg(required = true)]
    templates: Vec<PathBuf>,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if any template cannot be read or parsed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let mut failed = 0;

        for path in &self.templates {
            match check_template(path) {
                Ok(()) => output.success(&format!("ok      {}", path.display())),
                Err(message) => {
                    failed += 1;
                    output.error(&format!("failed  {}: {message}", path.display()));
                }
            }
        }

        if failed > 0 {
            return Err(CliError::Validation(format!(
                "{failed} of {} template(s) failed to parse",
                self.templates.len()
            )));
        }
        output.info(&format!("{} template(s) checked", self.templates.len()));
        Ok(())
    }
}

/// Parse one template, returning a printable error message on failure.
fn check_template(path: &Path) -> Result<(), String> {
    let source = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    tagkit_markup::parse(&source)
        .map(drop)
        .map_err(|err| describe(&source, &err))
}

fn describe(source: &str, err: &MarkupError) -> String {
    match err {
        MarkupError::Xml { offset, source: cause } => {
            let offset = usize::try_from(*offset).unwrap_or(source.len());
            format!("line {}: {cause}", line_at(source, offset))
        }
        MarkupError::TooDeep { offset, .. } => {
            format!("line {}: {err}", line_at(source, *offset))
        }
        other => other.to_string(),
    }
}
