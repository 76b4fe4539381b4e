//! On-disk layout of a trained model directory.
//!
//! ```text
//! <model_dir>/model.bpk        weights (burnpack)
//! <model_dir>/model_info.json  architecture and feature parameters
//! <model_dir>/tracks.json      class index -> track file name
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use burn::prelude::*;
use burn_store::{BurnpackStore, ModuleSnapshot};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use super::{ModelError, TrackNet, TrackNetConfig};
use crate::analysis::mel::MelConfig;
use crate::dataset::{ClassSizing, TrackCatalog};

pub const MODEL_FILE: &str = "model.bpk";
pub const MODEL_INFO_FILE: &str = "model_info.json";
pub const CATALOG_FILE: &str = "tracks.json";

const FORMAT_VERSION: u32 = 1;

/// Everything needed to rebuild the model and preprocess clips for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub format_version: u32,
    pub num_classes: usize,
    pub n_mels: usize,
    /// Frame count of the training spectrograms.
    pub frames: usize,
    pub dropout: f64,
    pub class_sizing: ClassSizing,
    pub features: MelConfig,
    /// RFC 3339 timestamp, empty when the clock could not be formatted.
    #[serde(default)]
    pub created_at: String,
}

impl ModelInfo {
    pub fn new(
        config: &TrackNetConfig,
        features: &MelConfig,
        frames: usize,
        class_sizing: ClassSizing,
    ) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            num_classes: config.num_classes,
            n_mels: config.n_mels,
            frames,
            dropout: config.dropout,
            class_sizing,
            features: features.clone(),
            created_at: OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
        }
    }

    pub fn model_config(&self) -> TrackNetConfig {
        TrackNetConfig::new(self.num_classes)
            .with_n_mels(self.n_mels)
            .with_dropout(self.dropout)
    }
}

/// Paths of the files written by [`save_model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifacts {
    pub dir: PathBuf,
    pub weights: PathBuf,
    pub info: PathBuf,
    pub catalog: PathBuf,
}

impl ModelArtifacts {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            weights: dir.join(MODEL_FILE),
            info: dir.join(MODEL_INFO_FILE),
            catalog: dir.join(CATALOG_FILE),
        }
    }
}

/// Write weights, model info, and catalog into `dir`, replacing earlier files.
pub fn save_model<B: Backend>(
    model: &TrackNet<B>,
    info: &ModelInfo,
    catalog: &TrackCatalog,
    dir: &Path,
) -> Result<ModelArtifacts, ModelError> {
    if catalog.len() != info.num_classes {
        return Err(ModelError::CatalogMismatch {
            catalog: catalog.len(),
            model: info.num_classes,
        });
    }
    fs::create_dir_all(dir).map_err(|source| ModelError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let artifacts = ModelArtifacts::in_dir(dir);

    if artifacts.weights.exists() {
        fs::remove_file(&artifacts.weights).map_err(|source| ModelError::Write {
            path: artifacts.weights.clone(),
            source,
        })?;
    }
    let mut store = BurnpackStore::from_file(&artifacts.weights);
    model
        .save_into(&mut store)
        .map_err(|err| ModelError::Burnpack {
            path: artifacts.weights.clone(),
            reason: format!("{err:?}"),
        })?;
    write_json(&artifacts.info, info)?;
    write_json(&artifacts.catalog, catalog)?;
    info!("Saved model with {} classes to {}", info.num_classes, dir.display());
    Ok(artifacts)
}

/// Rebuild a model from `dir` on `device`.
pub fn load_model<B: Backend>(
    dir: &Path,
    device: &B::Device,
) -> Result<(TrackNet<B>, ModelInfo, TrackCatalog), ModelError> {
    let artifacts = ModelArtifacts::in_dir(dir);
    let info = read_model_info(dir)?;
    let catalog = read_catalog(dir)?;
    if catalog.len() != info.num_classes {
        return Err(ModelError::CatalogMismatch {
            catalog: catalog.len(),
            model: info.num_classes,
        });
    }
    if !artifacts.weights.is_file() {
        return Err(ModelError::MissingArtifact(artifacts.weights));
    }
    let mut model: TrackNet<B> = info.model_config().init(device)?;
    let mut store = BurnpackStore::from_file(&artifacts.weights);
    model
        .load_from(&mut store)
        .map_err(|err| ModelError::Burnpack {
            path: artifacts.weights.clone(),
            reason: format!("{err:?}"),
        })?;
    Ok((model, info, catalog))
}

pub fn read_model_info(dir: &Path) -> Result<ModelInfo, ModelError> {
    read_json(&dir.join(MODEL_INFO_FILE))
}

pub fn read_catalog(dir: &Path) -> Result<TrackCatalog, ModelError> {
    read_json(&dir.join(CATALOG_FILE))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ModelError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| ModelError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| ModelError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    if !path.is_file() {
        return Err(ModelError::MissingArtifact(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| ModelError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ModelError::Json {
        path: path.to_path_buf(),
        source,
    })
}
