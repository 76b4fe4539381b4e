//! Conversion of a saved model directory into a deployable format.
//!
//! The conversion itself is delegated to an external tool; training only
//! depends on the [`ModelConverter`] trait so tests can substitute a stub.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::info;

use crate::config::ExportSettings;

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create export directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to launch converter {program}: {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },
    #[error("Converter {program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Turns the model in `model_dir` into files under `output_dir`.
pub trait ModelConverter {
    fn convert(&self, model_dir: &Path, output_dir: &Path) -> Result<(), ExportError>;

    /// Short label used in logs and reports.
    fn describe(&self) -> String;
}

/// Runs an external program, substituting the model and export directories into its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Arguments with `{input}` and `{output}` replaced.
    pub fn resolved_args(&self, model_dir: &Path, output_dir: &Path) -> Vec<String> {
        let input = model_dir.display().to_string();
        let output = output_dir.display().to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }
}

impl ModelConverter for CommandConverter {
    fn convert(&self, model_dir: &Path, output_dir: &Path) -> Result<(), ExportError> {
        fs::create_dir_all(output_dir).map_err(|source| ExportError::CreateDir {
            path: output_dir.to_path_buf(),
            source,
        })?;
        let args = self.resolved_args(model_dir, output_dir);
        info!("Running converter: {} {}", self.program, args.join(" "));
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| ExportError::Launch {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(ExportError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        info!("Export written to {}", output_dir.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.program.clone()
    }
}

/// Converter that does nothing; used when no export tool is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopConverter;

impl ModelConverter for NoopConverter {
    fn convert(&self, model_dir: &Path, _output_dir: &Path) -> Result<(), ExportError> {
        info!(
            "No export converter configured; leaving {} as the only artifact",
            model_dir.display()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        "none".to_string()
    }
}

/// Pick the converter described by `settings`.
pub fn converter_from_settings(settings: &ExportSettings) -> Box<dyn ModelConverter> {
    match settings.program.as_deref().map(str::trim) {
        Some(program) if settings.enabled && !program.is_empty() => {
            Box::new(CommandConverter::new(program, settings.args.clone()))
        }
        _ => Box::new(NoopConverter),
    }
}
