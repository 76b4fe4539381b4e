//! Machine learning pieces: the track classifier and its evaluation metrics.

pub mod cnn;
pub mod metrics;
