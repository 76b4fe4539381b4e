use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::analysis::mel::MelConfig;
use crate::dataset::ClassSizing;
use crate::ml::cnn::TrainingBackend;

/// Everything a training run needs, grouped the way the TOML file is laid out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default)]
    pub dataset: DatasetSettings,
    #[serde(default)]
    pub features: MelConfig,
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Where the tracks live and which files count as tracks.
///
/// Config keys: `audio_dir`, `extensions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSettings {
    /// Folder scanned (non-recursively) for tracks.
    #[serde(default)]
    pub audio_dir: PathBuf,
    /// Accepted file extensions, compared case-insensitively.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            audio_dir: PathBuf::new(),
            extensions: default_extensions(),
        }
    }
}

/// Optimizer, schedule, and split settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSettings {
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Adam step size.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Share of samples held out for per-epoch validation.
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Seed for the split, shuffling, weight init, and dropout.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// How the classifier width is chosen when some tracks fail to decode.
    #[serde(default)]
    pub class_sizing: ClassSizing,
    /// Tensor backend used for training.
    #[serde(default)]
    pub backend: TrainingBackend,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            learning_rate: default_learning_rate(),
            test_fraction: default_test_fraction(),
            seed: default_seed(),
            class_sizing: ClassSizing::default(),
            backend: TrainingBackend::default(),
        }
    }
}

/// Where artifacts are written and how the web export is produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Directory receiving the model weights, model info, and track catalog.
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    #[serde(default)]
    pub export: ExportSettings,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            export: ExportSettings::default(),
        }
    }
}

/// External converter invoked after the model is saved.
///
/// `{input}` and `{output}` in `args` are replaced by the model and export directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Converter executable; no command means the export step is skipped.
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default = "default_export_args")]
    pub args: Vec<String>,
    #[serde(default = "default_export_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            program: None,
            args: default_export_args(),
            output_dir: default_export_dir(),
        }
    }
}

impl TrainingConfig {
    /// Clamp numeric settings into workable ranges and tidy extension spellings.
    pub fn normalized(mut self) -> Self {
        self.training.epochs = self.training.epochs.max(1);
        self.training.batch_size = self.training.batch_size.max(1);
        if !self.training.test_fraction.is_finite() {
            self.training.test_fraction = default_test_fraction();
        }
        self.training.test_fraction = self.training.test_fraction.clamp(0.01, 0.99);
        let mut extensions: Vec<String> = self
            .dataset
            .extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        extensions.sort();
        extensions.dedup();
        self.dataset.extensions = extensions;
        self
    }

    /// Reject configurations that cannot start a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dataset.audio_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "dataset.audio_dir",
                reason: "no audio folder configured".to_string(),
            });
        }
        if self.dataset.extensions.is_empty() {
            return Err(ConfigError::Invalid {
                field: "dataset.extensions",
                reason: "at least one extension is required".to_string(),
            });
        }
        self.features
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                field: "features",
                reason,
            })?;
        if !(self.training.learning_rate.is_finite() && self.training.learning_rate > 0.0) {
            return Err(ConfigError::Invalid {
                field: "training.learning_rate",
                reason: format!("must be positive, got {}", self.training.learning_rate),
            });
        }
        if self.output.model_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "output.model_dir",
                reason: "no model directory configured".to_string(),
            });
        }
        Ok(())
    }
}

fn default_extensions() -> Vec<String> {
    vec!["mp3".to_string()]
}

fn default_epochs() -> usize {
    50
}

fn default_batch_size() -> usize {
    8
}

fn default_learning_rate() -> f64 {
    1e-3
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("model")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("model_js")
}

fn default_export_args() -> Vec<String> {
    vec!["{input}".to_string(), "{output}".to_string()]
}

fn default_true() -> bool {
    true
}
