//! Convolutional track classifier over mel spectrograms.
//!
//! The model sees one normalized spectrogram as a single-channel image
//! `[batch, 1, n_mels, frames]` and predicts which catalog track it came from.

mod backend;
mod batch;
mod error;
mod infer;
mod model;
mod store;
mod train;

pub use backend::{BACKEND_ENV, TrainingBackend, backend_from_env, init_cubecl_config, init_wgpu};
pub use backend::{CpuBackend, WgpuBackend};
#[cfg(feature = "tracknet-cuda")]
pub use backend::CudaBackend;
pub use batch::{features_to_tensor, labels_to_tensor};
pub use error::{IdentifyError, ModelError, TrainError};
pub use infer::{TrackIdentifier, TrackMatch, top_matches};
pub use model::{MIN_INPUT_SIZE, TrackNet, TrackNetConfig};
pub use store::{
    CATALOG_FILE, MODEL_FILE, MODEL_INFO_FILE, ModelArtifacts, ModelInfo, load_model,
    read_catalog, read_model_info, save_model,
};
pub use train::{EpochMetrics, Evaluation, TrainOptions, TrainedModel, evaluate, train};
