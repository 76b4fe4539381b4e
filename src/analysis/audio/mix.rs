/// Average interleaved channels into a mono buffer, replacing non-finite samples with silence.
pub(crate) fn downmix_to_mono_into(out: &mut Vec<f32>, samples: &[f32], channels: u16) {
    let channels = channels.max(1) as usize;
    out.clear();
    if channels == 1 {
        out.extend(samples.iter().copied().map(sanitize_sample));
        return;
    }
    out.reserve(samples.len() / channels);
    for frame in samples.chunks_exact(channels) {
        let sum: f32 = frame.iter().copied().map(sanitize_sample).sum();
        out.push(sum / channels as f32);
    }
}

fn sanitize_sample(sample: f32) -> f32 {
    if !sample.is_finite() {
        return 0.0;
    }
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped != 0.0 && clamped.abs() < f32::MIN_POSITIVE {
        0.0
    } else {
        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_frames_are_averaged() {
        let mut out = Vec::new();
        downmix_to_mono_into(&mut out, &[1.0, 0.0, 0.5, -0.5, 0.25, 0.75], 2);
        assert_eq!(out, vec![0.5, 0.0, 0.5]);
    }

    #[test]
    fn trailing_partial_frame_is_dropped() {
        let mut out = Vec::new();
        downmix_to_mono_into(&mut out, &[0.2, 0.4, 0.6], 2);
        assert_eq!(out.len(), 1);
        assert!((out[0] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn mono_passthrough_sanitizes_non_finite() {
        let mut out = vec![9.0];
        downmix_to_mono_into(&mut out, &[f32::NAN, 0.5, f32::INFINITY], 1);
        assert_eq!(out, vec![0.0, 0.5, 0.0]);
    }
}
