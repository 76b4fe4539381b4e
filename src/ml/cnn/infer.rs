use std::path::Path;

use burn::prelude::*;
use serde::Serialize;

use super::model::check_input_size;
use super::{IdentifyError, ModelInfo, TrackNet, load_model};
use crate::analysis::Preprocessor;
use crate::analysis::mel::MelSpectrogram;
use crate::dataset::TrackCatalog;

/// One candidate track for a clip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackMatch {
    pub label: usize,
    pub file_name: String,
    pub confidence: f32,
}

/// A trained model loaded for identifying clips.
pub struct TrackIdentifier<B: Backend> {
    model: TrackNet<B>,
    device: B::Device,
    info: ModelInfo,
    catalog: TrackCatalog,
    preprocessor: Preprocessor,
}

impl<B: Backend> TrackIdentifier<B> {
    /// Load the model in `model_dir` and prepare matching feature extraction.
    pub fn load(model_dir: &Path, device: &B::Device) -> Result<Self, IdentifyError> {
        let (model, info, catalog) = load_model::<B>(model_dir, device)?;
        let preprocessor = Preprocessor::new(&info.features)?;
        Ok(Self {
            model,
            device: device.clone(),
            info,
            catalog,
            preprocessor,
        })
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    pub fn catalog(&self) -> &TrackCatalog {
        &self.catalog
    }

    /// Best `top_k` matches for the audio file at `path`.
    pub fn identify_file(
        &mut self,
        path: &Path,
        top_k: usize,
    ) -> Result<Vec<TrackMatch>, IdentifyError> {
        let spectrogram = self.preprocessor.spectrogram_from_file(path)?;
        self.identify_spectrogram(&spectrogram, top_k)
    }

    /// Best `top_k` matches for mono samples already at the model's sample rate.
    pub fn identify_samples(
        &mut self,
        samples: Vec<f32>,
        top_k: usize,
    ) -> Result<Vec<TrackMatch>, IdentifyError> {
        let spectrogram = self.preprocessor.spectrogram_from_samples(samples)?;
        self.identify_spectrogram(&spectrogram, top_k)
    }

    pub fn identify_spectrogram(
        &self,
        spectrogram: &MelSpectrogram,
        top_k: usize,
    ) -> Result<Vec<TrackMatch>, IdentifyError> {
        let probs = self.probabilities(spectrogram)?;
        Ok(top_matches(&probs, &self.catalog, top_k))
    }

    /// Class probabilities for one spectrogram, indexed by label.
    pub fn probabilities(&self, spectrogram: &MelSpectrogram) -> Result<Vec<f32>, IdentifyError> {
        let (n_mels, frames) = (spectrogram.n_mels(), spectrogram.frames());
        check_input_size(n_mels, frames)?;
        let flat: Vec<f32> = spectrogram.values().iter().copied().collect();
        let input = Tensor::<B, 4>::from_data(
            TensorData::new(flat, [1, 1, n_mels, frames]),
            &self.device,
        );
        let probs: Vec<f32> = self
            .model
            .forward_probs(input)
            .into_data()
            .iter::<f32>()
            .collect();
        if probs.len() != self.info.num_classes {
            return Err(IdentifyError::Output(format!(
                "expected {} probabilities, got {}",
                self.info.num_classes,
                probs.len()
            )));
        }
        Ok(probs)
    }
}

/// Rank labels by probability and attach track names, highest first.
pub fn top_matches(probs: &[f32], catalog: &TrackCatalog, top_k: usize) -> Vec<TrackMatch> {
    let mut ranked: Vec<(usize, f32)> = probs.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(top_k)
        .map(|(label, confidence)| TrackMatch {
            label,
            file_name: catalog
                .file_name(label)
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{label}")),
            confidence,
        })
        .collect()
}
