//! Training configuration: TOML-backed settings with per-field defaults.

mod errors;
mod io;
mod types;

pub use errors::ConfigError;
pub use io::{config_path, load_from_path, load_or_default, save_to_path};
pub use types::{DatasetSettings, ExportSettings, OutputSettings, TrainingConfig, TrainingSettings};

/// Default filename of the training configuration inside the app directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
