//! Waveform loading: decode, downmix, resample, and length fixing.

mod decode;
mod length;
mod mix;
mod resample;

pub use decode::load_mono;
pub use length::{fix_length, target_sample_count};
pub(crate) use mix::downmix_to_mono_into;
pub(crate) use resample::resample_linear_into;
