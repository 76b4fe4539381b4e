use std::path::Path;

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, mono, no CRC, no padding.
const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0xC0];
/// `144 * 128_000 / 44_100`, rounded down.
const FRAME_BYTES: usize = 417;
const SAMPLES_PER_FRAME: f32 = 1152.0;
pub const MP3_SAMPLE_RATE: u32 = 44_100;

/// Write a silent mp3 of at least `seconds`. Zeroed side info decodes to all-zero samples.
pub fn write_silent_mp3(path: &Path, seconds: f32) {
    let frames = (seconds * MP3_SAMPLE_RATE as f32 / SAMPLES_PER_FRAME).ceil() as usize + 1;
    let mut frame = vec![0_u8; FRAME_BYTES];
    frame[..FRAME_HEADER.len()].copy_from_slice(&FRAME_HEADER);
    let mut bytes = Vec::with_capacity(frames * FRAME_BYTES);
    for _ in 0..frames {
        bytes.extend_from_slice(&frame);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create mp3 parent dirs");
    }
    std::fs::write(path, bytes).expect("write mp3 file");
}
