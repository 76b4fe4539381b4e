//! End-to-end training run: folder of tracks in, saved model directory out.

use std::path::PathBuf;

use burn::backend::Autodiff;
use burn::backend::wgpu::WgpuDevice;
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use thiserror::Error;
use tracing::{debug, info};

use crate::analysis::{PreprocessError, Preprocessor};
use crate::config::{ConfigError, TrainingConfig};
use crate::dataset::{
    DatasetError, SkippedTrack, build_dataset, plan_labels, train_test_split,
};
use crate::export::{ExportError, ModelConverter};
#[cfg(feature = "tracknet-cuda")]
use crate::ml::cnn::CudaBackend;
use crate::ml::cnn::{
    CpuBackend, EpochMetrics, ModelArtifacts, ModelError, ModelInfo, TrackNetConfig,
    TrainError, TrainOptions, TrainingBackend, WgpuBackend, backend_from_env,
    init_cubecl_config, init_wgpu, save_model, train,
};
use crate::ml::metrics::precision_recall_by_class;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Train(#[from] TrainError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub backend: TrainingBackend,
    /// Candidate files found in the audio folder.
    pub track_count: usize,
    pub num_classes: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    pub skipped: Vec<SkippedTrack>,
    pub history: Vec<EpochMetrics>,
    /// Accuracy of the final model on the held-out split.
    pub test_accuracy: Option<f32>,
    pub artifacts: ModelArtifacts,
    pub export_dir: PathBuf,
    /// Converter used for the export step.
    pub converter: String,
}

/// Train on the backend chosen by the config (or `TRACKNET_BACKEND`).
pub fn run_training(
    config: &TrainingConfig,
    converter: &dyn ModelConverter,
) -> Result<TrainingReport, PipelineError> {
    let backend = backend_from_env(config.training.backend);
    info!("Using {backend} backend");
    match backend {
        TrainingBackend::Cpu => {
            let device = <CpuBackend as Backend>::Device::default();
            run_training_on::<Autodiff<CpuBackend>>(config, converter, &device, backend)
        }
        TrainingBackend::Wgpu => {
            init_cubecl_config();
            let device = WgpuDevice::default();
            init_wgpu(&device);
            run_training_on::<Autodiff<WgpuBackend>>(config, converter, &device, backend)
        }
        #[cfg(feature = "tracknet-cuda")]
        TrainingBackend::Cuda => {
            init_cubecl_config();
            let device = <CudaBackend as Backend>::Device::default();
            run_training_on::<Autodiff<CudaBackend>>(config, converter, &device, backend)
        }
    }
}

/// Full run on a specific autodiff backend.
pub fn run_training_on<B: AutodiffBackend>(
    config: &TrainingConfig,
    converter: &dyn ModelConverter,
    device: &B::Device,
    backend: TrainingBackend,
) -> Result<TrainingReport, PipelineError> {
    config.validate()?;
    let settings = &config.training;

    let mut preprocessor = Preprocessor::new(&config.features)?;
    let dataset = build_dataset(
        &config.dataset.audio_dir,
        &config.dataset.extensions,
        &mut preprocessor,
    )?;
    let plan = plan_labels(&dataset, settings.class_sizing);
    if plan.num_classes != dataset.file_names.len() {
        info!(
            "Sizing classifier to {} processed tracks instead of {} files",
            plan.num_classes,
            dataset.file_names.len()
        );
    }
    let split = train_test_split(dataset.len(), settings.test_fraction, settings.seed)?;
    let model_config = TrackNetConfig::new(plan.num_classes).with_n_mels(dataset.n_mels());
    let options = TrainOptions {
        epochs: settings.epochs,
        batch_size: settings.batch_size,
        learning_rate: settings.learning_rate,
        seed: settings.seed,
    };

    let trained = train::<B>(
        device,
        &model_config,
        &dataset.features,
        &plan.labels,
        &split.train,
        &split.test,
        &options,
    )?;
    let test_accuracy = trained.evaluation.as_ref().map(|eval| eval.accuracy);
    if let Some(evaluation) = &trained.evaluation {
        info!("Held-out accuracy {:.4}", evaluation.accuracy);
        for stats in precision_recall_by_class(&evaluation.confusion) {
            debug!(
                "Class {}: precision {:.3} recall {:.3} support {}",
                stats.class, stats.precision, stats.recall, stats.support
            );
        }
    }

    let info = ModelInfo::new(
        &model_config,
        &config.features,
        dataset.frames(),
        settings.class_sizing,
    );
    let artifacts = save_model(&trained.model, &info, &plan.catalog, &config.output.model_dir)?;

    let export_dir = config.output.export.output_dir.clone();
    converter.convert(&artifacts.dir, &export_dir)?;

    Ok(TrainingReport {
        backend,
        track_count: dataset.file_names.len(),
        num_classes: plan.num_classes,
        train_samples: split.train.len(),
        test_samples: split.test.len(),
        skipped: dataset.skipped,
        history: trained.history,
        test_accuracy,
        artifacts,
        export_dir,
        converter: converter.describe(),
    })
}
