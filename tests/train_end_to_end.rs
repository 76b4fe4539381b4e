mod support;

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use burn::backend::ndarray::NdArrayDevice;
use burn::backend::{Autodiff, NdArray};
use tempfile::{TempDir, tempdir};
use tracknet::config::TrainingConfig;
use tracknet::dataset::ClassSizing;
use tracknet::export::{ExportError, ModelConverter, NoopConverter};
use tracknet::ml::cnn::{TrackIdentifier, TrainingBackend, read_catalog, read_model_info};
use tracknet::pipeline::{PipelineError, run_training_on};

use support::wav::{write_garbage, write_tone};

type TrainBackend = Autodiff<NdArray>;

#[derive(Default)]
struct RecordingConverter {
    calls: RefCell<Vec<(PathBuf, PathBuf)>>,
}

impl ModelConverter for RecordingConverter {
    fn convert(&self, model_dir: &Path, output_dir: &Path) -> Result<(), ExportError> {
        assert!(model_dir.join("model.bpk").is_file());
        self.calls
            .borrow_mut()
            .push((model_dir.to_path_buf(), output_dir.to_path_buf()));
        Ok(())
    }

    fn describe(&self) -> String {
        "recording".to_string()
    }
}

struct FailingConverter;

impl ModelConverter for FailingConverter {
    fn convert(&self, _model_dir: &Path, output_dir: &Path) -> Result<(), ExportError> {
        Err(ExportError::CreateDir {
            path: output_dir.to_path_buf(),
            source: std::io::Error::other("read-only"),
        })
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

fn three_track_folder() -> TempDir {
    let dir = tempdir().unwrap();
    write_tone(&dir.path().join("a.wav"), 220.0, 1.0);
    write_tone(&dir.path().join("b.wav"), 1_760.0, 1.0);
    write_tone(&dir.path().join("c.wav"), 5_000.0, 1.0);
    dir
}

fn quick_config(audio_dir: &Path, out: &Path) -> TrainingConfig {
    let mut config = TrainingConfig::default();
    config.dataset.audio_dir = audio_dir.to_path_buf();
    config.dataset.extensions = vec!["wav".to_string()];
    config.features.duration_seconds = 1.0;
    config.training.epochs = 2;
    config.output.model_dir = out.join("model");
    config.output.export.output_dir = out.join("model_js");
    config.normalized()
}

#[test]
fn three_tracks_train_save_and_identify() {
    let audio = three_track_folder();
    let out = tempdir().unwrap();
    let config = quick_config(audio.path(), out.path());
    let converter = RecordingConverter::default();
    let device = NdArrayDevice::default();

    let report =
        run_training_on::<TrainBackend>(&config, &converter, &device, TrainingBackend::Cpu)
            .unwrap();

    assert_eq!(report.num_classes, 3);
    assert_eq!(report.track_count, 3);
    assert_eq!(report.train_samples, 2);
    assert_eq!(report.test_samples, 1);
    assert_eq!(report.history.len(), 2);
    assert!(report.skipped.is_empty());
    assert_eq!(report.converter, "recording");
    assert_eq!(
        converter.calls.borrow().as_slice(),
        &[(out.path().join("model"), out.path().join("model_js"))]
    );

    let model_dir = out.path().join("model");
    let info = read_model_info(&model_dir).unwrap();
    assert_eq!(info.num_classes, 3);
    assert_eq!(info.n_mels, 128);
    assert_eq!(info.frames, 44);
    let catalog = read_catalog(&model_dir).unwrap();
    let names: Vec<&str> = catalog.tracks.iter().map(|t| t.file_name.as_str()).collect();
    assert_eq!(names, vec!["a.wav", "b.wav", "c.wav"]);

    let mut identifier = TrackIdentifier::<NdArray>::load(&model_dir, &device).unwrap();
    let matches = identifier
        .identify_file(&audio.path().join("b.wav"), 5)
        .unwrap();
    assert_eq!(matches.len(), 3);
    let total: f32 = matches.iter().map(|m| m.confidence).sum();
    assert!((total - 1.0).abs() < 1e-4);
    assert!(matches.windows(2).all(|w| w[0].confidence >= w[1].confidence));
}

#[test]
fn processed_sizing_drops_the_failed_track() {
    let audio = three_track_folder();
    write_garbage(&audio.path().join("bb.wav"));
    let out = tempdir().unwrap();
    let mut config = quick_config(audio.path(), out.path());
    config.training.class_sizing = ClassSizing::Processed;
    let device = NdArrayDevice::default();

    let report =
        run_training_on::<TrainBackend>(&config, &NoopConverter, &device, TrainingBackend::Cpu)
            .unwrap();

    assert_eq!(report.track_count, 4);
    assert_eq!(report.num_classes, 3);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].file_name, "bb.wav");
    let catalog = read_catalog(&out.path().join("model")).unwrap();
    assert_eq!(catalog.file_name(2), Some("c.wav"));
}

#[test]
fn file_count_sizing_keeps_an_untrained_class() {
    let audio = three_track_folder();
    write_garbage(&audio.path().join("bb.wav"));
    let out = tempdir().unwrap();
    let config = quick_config(audio.path(), out.path());
    let device = NdArrayDevice::default();

    let report =
        run_training_on::<TrainBackend>(&config, &NoopConverter, &device, TrainingBackend::Cpu)
            .unwrap();

    assert_eq!(report.num_classes, 4);
    let catalog = read_catalog(&out.path().join("model")).unwrap();
    let untrained = catalog.entry(2).unwrap();
    assert_eq!(untrained.file_name, "bb.wav");
    assert!(!untrained.trained);
}

#[test]
fn export_failure_aborts_the_run() {
    let audio = three_track_folder();
    let out = tempdir().unwrap();
    let mut config = quick_config(audio.path(), out.path());
    config.training.epochs = 1;
    let device = NdArrayDevice::default();

    let err =
        run_training_on::<TrainBackend>(&config, &FailingConverter, &device, TrainingBackend::Cpu)
            .unwrap_err();
    assert!(matches!(err, PipelineError::Export(_)));
}

#[test]
fn single_track_cannot_be_split() {
    let audio = tempdir().unwrap();
    write_tone(&audio.path().join("only.wav"), 440.0, 1.0);
    let out = tempdir().unwrap();
    let config = quick_config(audio.path(), out.path());
    let device = NdArrayDevice::default();

    let err =
        run_training_on::<TrainBackend>(&config, &NoopConverter, &device, TrainingBackend::Cpu)
            .unwrap_err();
    assert!(matches!(err, PipelineError::Dataset(_)));
}
