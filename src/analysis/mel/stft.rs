use crate::analysis::fft::{Complex32, FftPlan, hann_window_periodic};

/// Number of centered STFT frames for a signal of `num_samples`.
pub(crate) fn frame_count(num_samples: usize, hop: usize) -> usize {
    1 + num_samples / hop.max(1)
}

/// Short-time power spectra with centered, zero-padded frames.
pub(crate) struct PowerStft {
    n_fft: usize,
    hop: usize,
    window: Vec<f32>,
    plan: FftPlan,
    padded: Vec<f32>,
    fft_buf: Vec<Complex32>,
}

impl PowerStft {
    pub(crate) fn new(n_fft: usize, hop: usize) -> Result<Self, String> {
        if hop == 0 {
            return Err("STFT hop length must be positive".to_string());
        }
        let plan = FftPlan::new(n_fft)?;
        Ok(Self {
            n_fft,
            hop,
            window: hann_window_periodic(n_fft),
            fft_buf: vec![Complex32::default(); plan.len()],
            plan,
            padded: Vec::new(),
        })
    }

    pub(crate) fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Run the STFT over `samples`, calling `sink(frame_idx, power)` once per frame.
    pub(crate) fn for_each_frame(
        &mut self,
        samples: &[f32],
        mut sink: impl FnMut(usize, &[f32]),
    ) -> Result<usize, String> {
        let pad = self.n_fft / 2;
        self.padded.clear();
        self.padded.resize(samples.len() + 2 * pad, 0.0);
        self.padded[pad..pad + samples.len()].copy_from_slice(samples);

        let frames = frame_count(samples.len(), self.hop);
        let mut power = vec![0.0_f32; self.n_bins()];
        for frame_idx in 0..frames {
            let start = frame_idx * self.hop;
            fill_windowed(&mut self.fft_buf, &self.padded, start, &self.window);
            self.plan.process(&mut self.fft_buf)?;
            power_spectrum_into(&self.fft_buf, &mut power);
            sink(frame_idx, &power);
        }
        Ok(frames)
    }
}

fn fill_windowed(target: &mut [Complex32], samples: &[f32], start: usize, window: &[f32]) {
    for (i, cell) in target.iter_mut().enumerate() {
        let src = samples.get(start + i).copied().unwrap_or(0.0);
        *cell = Complex32::new(src * window[i], 0.0);
    }
}

fn power_spectrum_into(fft: &[Complex32], out: &mut [f32]) {
    for (slot, bin) in out.iter_mut().zip(fft.iter()) {
        *slot = bin.norm_sqr().max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_matches_centered_layout() {
        assert_eq!(frame_count(110_250, 512), 216);
        assert_eq!(frame_count(0, 512), 1);
        assert_eq!(frame_count(511, 512), 1);
        assert_eq!(frame_count(512, 512), 2);
    }

    #[test]
    fn emits_expected_frames_and_bins() {
        let mut stft = PowerStft::new(64, 16).unwrap();
        let samples = vec![0.1_f32; 100];
        let mut seen = Vec::new();
        let frames = stft
            .for_each_frame(&samples, |idx, power| {
                assert_eq!(power.len(), 33);
                seen.push(idx);
            })
            .unwrap();
        assert_eq!(frames, 7);
        assert_eq!(seen, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn sine_peaks_in_its_bin() {
        let n_fft = 256;
        let sample_rate = 8_000.0_f32;
        let bin = 16usize;
        let freq = bin as f32 * sample_rate / n_fft as f32;
        let samples: Vec<f32> = (0..2_048)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin())
            .collect();
        let mut stft = PowerStft::new(n_fft, 64).unwrap();
        let mut peak_bins = Vec::new();
        stft.for_each_frame(&samples, |idx, power| {
            if idx == 8 {
                let peak = power
                    .iter()
                    .enumerate()
                    .fold((0, 0.0_f32), |best, (i, &v)| if v > best.1 { (i, v) } else { best });
                peak_bins.push(peak.0);
            }
        })
        .unwrap();
        assert_eq!(peak_bins, vec![bin]);
    }

    #[test]
    fn rejects_zero_hop_and_odd_fft() {
        assert!(PowerStft::new(64, 0).is_err());
        assert!(PowerStft::new(100, 10).is_err());
    }
}
