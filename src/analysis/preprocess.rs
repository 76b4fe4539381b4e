use std::path::Path;

use thiserror::Error;

use super::audio::{fix_length, load_mono};
use super::mel::{MelConfig, MelExtractor, MelSpectrogram};

/// Reasons a single file could not be turned into a spectrogram.
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// Extraction parameters are unusable.
    #[error("Invalid feature settings: {0}")]
    InvalidConfig(String),
    /// The file could not be opened or decoded.
    #[error("{0}")]
    Decode(String),
    /// Spectrogram computation failed.
    #[error("Spectrogram failed: {0}")]
    Spectrogram(String),
}

/// Turns audio files into fixed-size normalized mel spectrograms.
pub struct Preprocessor {
    config: MelConfig,
    extractor: MelExtractor,
}

impl Preprocessor {
    pub fn new(config: &MelConfig) -> Result<Self, PreprocessError> {
        let extractor = MelExtractor::new(config).map_err(PreprocessError::InvalidConfig)?;
        Ok(Self {
            config: config.clone(),
            extractor,
        })
    }

    pub fn config(&self) -> &MelConfig {
        &self.config
    }

    /// Decode `path` at the configured rate and extract its spectrogram.
    pub fn spectrogram_from_file(&mut self, path: &Path) -> Result<MelSpectrogram, PreprocessError> {
        let samples = load_mono(
            path,
            self.config.sample_rate,
            Some(self.config.duration_seconds),
        )
        .map_err(PreprocessError::Decode)?;
        self.spectrogram_from_samples(samples)
    }

    /// Fix `samples` (already at the configured rate) to the clip length and extract.
    pub fn spectrogram_from_samples(
        &mut self,
        mut samples: Vec<f32>,
    ) -> Result<MelSpectrogram, PreprocessError> {
        fix_length(&mut samples, self.config.target_samples());
        self.extractor
            .compute(&samples)
            .map_err(PreprocessError::Spectrogram)
    }
}
