use std::path::Path;

use super::{downmix_to_mono_into, resample_linear_into};
use crate::analysis::audio_decode::decode_audio;

/// Decode `path` to mono at `sample_rate`, reading at most `max_seconds` of source audio.
///
/// No gain normalization is applied; the returned buffer keeps the source loudness.
pub fn load_mono(path: &Path, sample_rate: u32, max_seconds: Option<f32>) -> Result<Vec<f32>, String> {
    let decoded = decode_audio(path, max_seconds)?;
    let mut mono = Vec::new();
    downmix_to_mono_into(&mut mono, &decoded.samples, decoded.channels);
    let mut resampled = Vec::new();
    resample_linear_into(&mut resampled, &mono, decoded.sample_rate, sample_rate);
    Ok(resampled)
}
