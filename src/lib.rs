//! Library exports for the training and identification binaries, tests, and benchmarks.
/// Application directory resolution.
pub mod app_dirs;
/// Audio decoding and mel-spectrogram extraction.
pub mod analysis;
/// Training configuration loading and defaults.
pub mod config;
/// Dataset assembly from a folder of tracks.
pub mod dataset;
/// External model conversion step.
pub mod export;
/// Tracing subscriber setup.
pub mod logging;
/// Model topology, training loop, persistence and inference.
pub mod ml;
/// End-to-end training driver.
pub mod pipeline;
