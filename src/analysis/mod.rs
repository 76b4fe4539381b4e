//! Audio decoding and spectrogram feature extraction.

pub mod audio;
pub(crate) mod audio_decode;
pub(crate) mod fft;
pub mod mel;
mod preprocess;

pub use preprocess::{PreprocessError, Preprocessor};
