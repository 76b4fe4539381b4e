//! Slaney-style mel filterbank, area-normalized per band.

/// Sparse triangular filters over the `0..=n_fft/2` power bins.
pub(crate) struct MelFilterbank {
    filters: Vec<Vec<(usize, f32)>>,
    n_bins: usize,
}

impl MelFilterbank {
    pub(crate) fn new(sample_rate: u32, n_fft: usize, n_mels: usize) -> Self {
        let sr = sample_rate.max(1) as f64;
        let n_bins = n_fft / 2 + 1;
        let fft_freqs: Vec<f64> = (0..n_bins)
            .map(|bin| bin as f64 * sr / n_fft.max(1) as f64)
            .collect();
        let mel_max = hz_to_mel(sr / 2.0);
        let mel_points: Vec<f64> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_max * i as f64 / (n_mels + 1) as f64))
            .collect();

        let filters = (0..n_mels)
            .map(|m| {
                let (left, center, right) = (mel_points[m], mel_points[m + 1], mel_points[m + 2]);
                let enorm = 2.0 / (right - left);
                fft_freqs
                    .iter()
                    .enumerate()
                    .filter_map(|(bin, &freq)| {
                        let lower = (freq - left) / (center - left);
                        let upper = (right - freq) / (right - center);
                        let weight = lower.min(upper).max(0.0) * enorm;
                        (weight > 0.0).then_some((bin, weight as f32))
                    })
                    .collect()
            })
            .collect();
        Self { filters, n_bins }
    }

    pub(crate) fn n_mels(&self) -> usize {
        self.filters.len()
    }

    pub(crate) fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Project one power spectrum onto the mel bands, writing `n_mels` values.
    pub(crate) fn apply_into(&self, power: &[f32], out: &mut [f32]) {
        for (slot, filter) in out.iter_mut().zip(self.filters.iter()) {
            let mut sum = 0.0_f64;
            for &(bin, weight) in filter {
                let p = power.get(bin).copied().unwrap_or(0.0).max(0.0) as f64;
                sum += p * weight as f64;
            }
            *slot = sum as f32;
        }
    }
}

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1_000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4_f64.ln() / 27.0
}

pub(crate) fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

pub(crate) fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        mel * F_SP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mel_scale_is_linear_below_1khz_and_invertible() {
        assert!((hz_to_mel(600.0) - 9.0).abs() < 1e-9);
        assert!((hz_to_mel(1_000.0) - 15.0).abs() < 1e-9);
        for hz in [0.0, 440.0, 1_000.0, 4_000.0, 11_025.0] {
            assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 1e-6);
        }
    }

    #[test]
    fn every_band_has_weights_for_default_layout() {
        let bank = MelFilterbank::new(22_050, 2048, 128);
        assert_eq!(bank.n_mels(), 128);
        assert_eq!(bank.n_bins(), 1025);
        assert!(bank.filters.iter().all(|filter| !filter.is_empty()));
        assert!(
            bank.filters
                .iter()
                .flatten()
                .all(|&(bin, weight)| bin < 1025 && weight.is_finite() && weight > 0.0)
        );
    }

    #[test]
    fn band_energy_follows_tone_frequency() {
        let bank = MelFilterbank::new(22_050, 2048, 128);
        let mut low = vec![0.0_f32; 1025];
        let mut high = vec![0.0_f32; 1025];
        low[20] = 1.0;
        high[600] = 1.0;
        let mut low_out = vec![0.0_f32; 128];
        let mut high_out = vec![0.0_f32; 128];
        bank.apply_into(&low, &mut low_out);
        bank.apply_into(&high, &mut high_out);
        let argmax = |values: &[f32]| {
            values
                .iter()
                .enumerate()
                .fold((0, f32::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
                .0
        };
        assert!(argmax(&low_out) < argmax(&high_out));
    }
}
