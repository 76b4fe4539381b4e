use std::fs::File;
use std::path::Path;

use symphonia::core::{
    audio::SampleBuffer, codecs::DecoderOptions, errors::Error, formats::FormatOptions,
    io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
};

/// Raw decoded audio in interleaved `f32` samples.
pub(crate) struct DecodedAudio {
    pub(crate) samples: Vec<f32>,
    pub(crate) sample_rate: u32,
    pub(crate) channels: u16,
}

/// Decode the default track of `path`, stopping once `max_seconds` of audio is buffered.
pub(crate) fn decode_audio(path: &Path, max_seconds: Option<f32>) -> Result<DecodedAudio, String> {
    let file = File::open(path).map_err(|err| format!("Open {}: {err}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| format!("Unsupported or corrupt audio in {}: {err}", path.display()))?;
    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| format!("No default track in {}", path.display()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| format!("Missing sample rate in {}", path.display()))?;
    let mut channels = codec_params.channels.map(|c| c.count() as u16).unwrap_or(0);
    let max_frames = max_seconds
        .filter(|limit| limit.is_finite() && *limit > 0.0)
        .map(|limit| (limit * sample_rate as f32).ceil().max(1.0) as usize);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|err| format!("No decoder for {}: {err}", path.display()))?;

    let mut samples = Vec::new();
    loop {
        if let Some(limit) = max_frames {
            if channels > 0 && samples.len() >= limit.saturating_mul(channels as usize) {
                break;
            }
        }
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(Error::IoError(_)) => break,
            Err(err) => {
                return Err(format!("Packet read failed for {}: {err}", path.display()));
            }
        };
        if packet.track_id() != track_id {
            continue;
        }
        let audio_buf = match decoder.decode(&packet) {
            Ok(audio_buf) => audio_buf,
            Err(Error::DecodeError(_)) => continue,
            Err(err) => {
                return Err(format!("Decode failed for {}: {err}", path.display()));
            }
        };
        let spec = *audio_buf.spec();
        channels = spec.channels.count() as u16;
        let mut sample_buf = SampleBuffer::<f32>::new(audio_buf.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(audio_buf);
        samples.extend_from_slice(sample_buf.samples());
    }

    let channels = channels.max(1);
    if let Some(limit) = max_frames {
        samples.truncate(limit.saturating_mul(channels as usize));
    }
    if samples.is_empty() {
        return Err(format!("Decoded 0 samples from {}", path.display()));
    }

    Ok(DecodedAudio {
        samples,
        sample_rate: sample_rate.max(1),
        channels,
    })
}
