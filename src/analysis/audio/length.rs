/// Number of samples in a clip of `duration_seconds` at `sample_rate`.
pub fn target_sample_count(sample_rate: u32, duration_seconds: f32) -> usize {
    if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
        return 0;
    }
    (sample_rate as f64 * duration_seconds as f64).round() as usize
}

/// Truncate `samples` to `target_len`, or zero-pad on the right up to it.
pub fn fix_length(samples: &mut Vec<f32>, target_len: usize) {
    samples.resize(target_len, 0.0);
}
