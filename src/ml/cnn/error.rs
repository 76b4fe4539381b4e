use std::path::PathBuf;

use thiserror::Error;

use crate::analysis::PreprocessError;

/// Model construction and persistence failures.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Classifier needs at least one class")]
    InvalidClassCount,
    #[error("Input {height}x{width} is smaller than the minimum {min}x{min}")]
    InputTooSmall {
        height: usize,
        width: usize,
        min: usize,
    },
    #[error("Failed to create model directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Burnpack error for {path}: {reason}")]
    Burnpack { path: PathBuf, reason: String },
    #[error("Model artifact missing: {0}")]
    MissingArtifact(PathBuf),
    #[error("Catalog lists {catalog} tracks but the model has {model} classes")]
    CatalogMismatch { catalog: usize, model: usize },
}

/// Training loop failures.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Invalid training options: {0}")]
    InvalidOptions(String),
    #[error("Training split is empty")]
    EmptyTrainSplit,
    #[error("Label {label} is outside the {num_classes} classifier outputs")]
    LabelOutOfRange { label: usize, num_classes: usize },
    #[error("Failed to read tensor output: {0}")]
    Tensor(String),
}

/// Failures while identifying a clip against a trained model.
#[derive(Debug, Error)]
pub enum IdentifyError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
    #[error("Failed to read model output: {0}")]
    Output(String),
}
