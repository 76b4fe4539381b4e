//! Normalized log-mel spectrograms.
//!
//! The pipeline mirrors the usual librosa defaults: centered Hann-windowed STFT,
//! power spectrum, Slaney mel filterbank, decibels relative to the loudest cell,
//! then a per-spectrogram min-max scale into `[0, 1]`.

mod db;
mod extractor;
mod filterbank;
mod stft;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use extractor::MelExtractor;

/// Default analysis sample rate in Hz.
pub const SAMPLE_RATE: u32 = 22_050;
/// Default clip duration in seconds.
pub const DURATION_SECONDS: f32 = 5.0;
/// Default number of mel bands.
pub const N_MELS: usize = 128;
/// Default FFT window length.
pub const N_FFT: usize = 2048;
/// Default hop between frames.
pub const HOP_LENGTH: usize = 512;

/// Parameters that fully determine spectrogram extraction.
///
/// Persisted with every trained model so inference reproduces training features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MelConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: f32,
    #[serde(default = "default_n_mels")]
    pub n_mels: usize,
    #[serde(default = "default_n_fft")]
    pub n_fft: usize,
    #[serde(default = "default_hop_length")]
    pub hop_length: usize,
}

impl Default for MelConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            duration_seconds: DURATION_SECONDS,
            n_mels: N_MELS,
            n_fft: N_FFT,
            hop_length: HOP_LENGTH,
        }
    }
}

impl MelConfig {
    /// Exact sample count every clip is truncated or padded to.
    pub fn target_samples(&self) -> usize {
        crate::analysis::audio::target_sample_count(self.sample_rate, self.duration_seconds)
    }

    /// Column count of every spectrogram produced with this config.
    pub fn frames(&self) -> usize {
        stft::frame_count(self.target_samples(), self.hop_length)
    }

    /// Check that the parameters describe a computable spectrogram.
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample_rate must be positive".to_string());
        }
        if !self.duration_seconds.is_finite() || self.duration_seconds <= 0.0 {
            return Err(format!(
                "duration_seconds must be positive, got {}",
                self.duration_seconds
            ));
        }
        if self.n_mels == 0 {
            return Err("n_mels must be positive".to_string());
        }
        if self.n_fft < 2 || !self.n_fft.is_power_of_two() {
            return Err(format!("n_fft must be a power of two, got {}", self.n_fft));
        }
        if self.hop_length == 0 {
            return Err("hop_length must be positive".to_string());
        }
        Ok(())
    }
}

fn default_sample_rate() -> u32 {
    SAMPLE_RATE
}

fn default_duration_seconds() -> f32 {
    DURATION_SECONDS
}

fn default_n_mels() -> usize {
    N_MELS
}

fn default_n_fft() -> usize {
    N_FFT
}

fn default_hop_length() -> usize {
    HOP_LENGTH
}

/// Mel bands by time frames, every value in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MelSpectrogram {
    values: Array2<f32>,
}

impl MelSpectrogram {
    pub fn from_values(values: Array2<f32>) -> Self {
        Self { values }
    }

    pub fn n_mels(&self) -> usize {
        self.values.nrows()
    }

    pub fn frames(&self) -> usize {
        self.values.ncols()
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    pub fn into_values(self) -> Array2<f32> {
        self.values
    }
}
