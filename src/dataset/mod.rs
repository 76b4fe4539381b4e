//! Dataset assembly: one labeled spectrogram per track in a folder.
//!
//! Labels are positions in the sorted file listing, so the same folder always
//! produces the same label assignment. Tracks that fail to preprocess keep
//! their slot in the listing; their label is simply absent from the dataset.

mod builder;
mod catalog;
mod scan;
mod split;

use std::path::PathBuf;

use ndarray::{Array4, Axis};
use thiserror::Error;

use crate::analysis::mel::MelSpectrogram;

pub use builder::{build_dataset, build_dataset_with, process_track};
pub use catalog::{ClassSizing, LabelPlan, TrackCatalog, TrackEntry, plan_labels};
pub use scan::{has_audio_extension, list_audio_files};
pub use split::{SplitIndices, train_test_split};

/// Errors that abort dataset construction.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Audio folder {0} does not exist or is not a directory")]
    NotADirectory(PathBuf),
    #[error("Failed to read audio folder {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No tracks with extensions [{extensions}] in {dir}")]
    NoTracks { dir: PathBuf, extensions: String },
    #[error("None of the {skipped} tracks in {dir} could be preprocessed")]
    NoUsableTracks { dir: PathBuf, skipped: usize },
    #[error("Spectrogram of {file_name} is {found:?}, expected {expected:?}")]
    ShapeMismatch {
        file_name: String,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("Failed to stack spectrograms: {0}")]
    Stack(#[from] ndarray::ShapeError),
    #[error("Need at least 2 samples to split into train and test sets, got {0}")]
    TooFewSamples(usize),
}

/// Outcome of preprocessing one track.
#[derive(Debug)]
pub enum TrackOutcome {
    Processed {
        label: usize,
        file_name: String,
        spectrogram: MelSpectrogram,
    },
    Skipped(SkippedTrack),
}

/// A track left out of the dataset and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTrack {
    pub label: usize,
    pub file_name: String,
    pub reason: String,
}

/// Stacked features with aligned labels and the full sorted listing.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Shape `(samples, n_mels, frames, 1)`.
    pub features: Array4<f32>,
    /// Label of each feature row; the index of its file in `file_names`.
    pub labels: Vec<usize>,
    /// Every candidate file name in ascending order, processed or not.
    pub file_names: Vec<String>,
    pub skipped: Vec<SkippedTrack>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_mels(&self) -> usize {
        self.features.len_of(Axis(1))
    }

    pub fn frames(&self) -> usize {
        self.features.len_of(Axis(2))
    }

    /// Copy out the rows at `indices` together with their labels.
    pub fn select(&self, indices: &[usize]) -> (Array4<f32>, Vec<usize>) {
        let features = self.features.select(Axis(0), indices);
        let labels = indices.iter().map(|&idx| self.labels[idx]).collect();
        (features, labels)
    }
}
