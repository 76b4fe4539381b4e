use std::f32::consts::PI;
use std::path::Path;

pub const SAMPLE_RATE: u32 = 22_050;

/// Write mono float samples at [`SAMPLE_RATE`].
pub fn write_wav(path: &Path, samples: &[f32]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create wav parent dirs");
    }
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav writer");
    for &sample in samples {
        writer.write_sample(sample).expect("write wav sample");
    }
    writer.finalize().expect("finalize wav");
}

/// A sine at `freq_hz` with a slow amplitude wobble so frames differ.
pub fn tone(freq_hz: f32, seconds: f32) -> Vec<f32> {
    let len = (seconds * SAMPLE_RATE as f32) as usize;
    (0..len)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let envelope = 0.6 + 0.3 * (2.0 * PI * 1.5 * t).sin();
            envelope * (2.0 * PI * freq_hz * t).sin()
        })
        .collect()
}

pub fn write_tone(path: &Path, freq_hz: f32, seconds: f32) {
    write_wav(path, &tone(freq_hz, seconds));
}

/// A file with an audio extension that no decoder accepts.
pub fn write_garbage(path: &Path) {
    std::fs::write(path, b"this is not an audio file").expect("write garbage file");
}
