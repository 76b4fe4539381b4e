use ndarray::Array2;

use super::db::{normalize_min_max_in_place, power_to_db_in_place};
use super::filterbank::MelFilterbank;
use super::stft::{PowerStft, frame_count};
use super::{MelConfig, MelSpectrogram};

/// Reusable spectrogram extractor holding the FFT plan, window, and filterbank.
pub struct MelExtractor {
    stft: PowerStft,
    filterbank: MelFilterbank,
    hop_length: usize,
    mel_buf: Vec<f32>,
}

impl MelExtractor {
    pub fn new(config: &MelConfig) -> Result<Self, String> {
        config.validate()?;
        let stft = PowerStft::new(config.n_fft, config.hop_length)?;
        let filterbank = MelFilterbank::new(config.sample_rate, config.n_fft, config.n_mels);
        debug_assert_eq!(filterbank.n_bins(), stft.n_bins());
        Ok(Self {
            stft,
            mel_buf: vec![0.0; filterbank.n_mels()],
            filterbank,
            hop_length: config.hop_length,
        })
    }

    /// Compute the normalized spectrogram of `samples` as given (no length fixing).
    pub fn compute(&mut self, samples: &[f32]) -> Result<MelSpectrogram, String> {
        let frames = frame_count(samples.len(), self.hop_length);
        let mut values = Array2::<f32>::zeros((self.filterbank.n_mels(), frames));
        let filterbank = &self.filterbank;
        let mel_buf = &mut self.mel_buf;
        self.stft.for_each_frame(samples, |frame_idx, power| {
            filterbank.apply_into(power, mel_buf);
            for (band, &energy) in mel_buf.iter().enumerate() {
                values[[band, frame_idx]] = energy;
            }
        })?;
        power_to_db_in_place(&mut values);
        normalize_min_max_in_place(&mut values);
        Ok(MelSpectrogram::from_values(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chirp(len: usize, sample_rate: f32) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate;
                (2.0 * std::f32::consts::PI * (220.0 + 400.0 * t) * t).sin() * 0.5
            })
            .collect()
    }

    #[test]
    fn output_is_bounded_and_shaped() {
        let config = MelConfig::default();
        let mut extractor = MelExtractor::new(&config).unwrap();
        let samples = chirp(config.target_samples(), config.sample_rate as f32);
        let spec = extractor.compute(&samples).unwrap();
        assert_eq!(spec.n_mels(), 128);
        assert_eq!(spec.frames(), 216);
        assert!(spec.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
        let max = spec.values().iter().copied().fold(0.0_f32, f32::max);
        assert!((max - 1.0).abs() < 1e-6);
    }

    #[test]
    fn per_sample_scaling_discards_absolute_loudness() {
        let config = MelConfig {
            duration_seconds: 0.5,
            ..MelConfig::default()
        };
        let mut extractor = MelExtractor::new(&config).unwrap();
        let loud = chirp(config.target_samples(), config.sample_rate as f32);
        let quiet: Vec<f32> = loud.iter().map(|v| v * 0.1).collect();
        let a = extractor.compute(&loud).unwrap();
        let b = extractor.compute(&quiet).unwrap();
        let max_diff = a
            .values()
            .iter()
            .zip(b.values().iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0_f32, f32::max);
        assert!(max_diff < 1e-3, "max diff {max_diff}");
    }
}
