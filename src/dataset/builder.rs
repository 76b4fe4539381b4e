use std::path::Path;

use ndarray::Array4;
use tracing::{info, warn};

use super::{Dataset, DatasetError, SkippedTrack, TrackOutcome, list_audio_files};
use crate::analysis::mel::MelSpectrogram;
use crate::analysis::{PreprocessError, Preprocessor};

/// Build a dataset from every track in `dir` using `preprocessor`.
pub fn build_dataset(
    dir: &Path,
    extensions: &[String],
    preprocessor: &mut Preprocessor,
) -> Result<Dataset, DatasetError> {
    build_dataset_with(dir, extensions, |path| {
        preprocessor.spectrogram_from_file(path)
    })
}

/// Build a dataset, turning each track into a spectrogram with `extract`.
pub fn build_dataset_with<F>(
    dir: &Path,
    extensions: &[String],
    mut extract: F,
) -> Result<Dataset, DatasetError>
where
    F: FnMut(&Path) -> Result<MelSpectrogram, PreprocessError>,
{
    let file_names = list_audio_files(dir, extensions)?;
    if file_names.is_empty() {
        return Err(DatasetError::NoTracks {
            dir: dir.to_path_buf(),
            extensions: extensions.join(", "),
        });
    }
    info!("Found {} tracks in {}", file_names.len(), dir.display());

    let outcomes = file_names
        .iter()
        .enumerate()
        .map(|(label, file_name)| process_track(dir, label, file_name, &mut extract))
        .collect::<Vec<_>>();
    let dataset = assemble(dir, file_names, outcomes)?;
    info!(
        "Dataset ready: {} samples, {} skipped, spectrogram {}x{}",
        dataset.len(),
        dataset.skipped.len(),
        dataset.n_mels(),
        dataset.frames()
    );
    Ok(dataset)
}

/// Preprocess one track, logging and recording a skip on failure.
pub fn process_track<F>(dir: &Path, label: usize, file_name: &str, extract: &mut F) -> TrackOutcome
where
    F: FnMut(&Path) -> Result<MelSpectrogram, PreprocessError>,
{
    match extract(&dir.join(file_name)) {
        Ok(spectrogram) => TrackOutcome::Processed {
            label,
            file_name: file_name.to_string(),
            spectrogram,
        },
        Err(err) => {
            warn!("Skipping {file_name} (label {label}): {err}");
            TrackOutcome::Skipped(SkippedTrack {
                label,
                file_name: file_name.to_string(),
                reason: err.to_string(),
            })
        }
    }
}

fn assemble(
    dir: &Path,
    file_names: Vec<String>,
    outcomes: Vec<TrackOutcome>,
) -> Result<Dataset, DatasetError> {
    let mut shape: Option<(usize, usize)> = None;
    let mut flat = Vec::new();
    let mut labels = Vec::new();
    let mut skipped = Vec::new();

    for outcome in outcomes {
        match outcome {
            TrackOutcome::Processed {
                label,
                file_name,
                spectrogram,
            } => {
                let found = (spectrogram.n_mels(), spectrogram.frames());
                let expected = *shape.get_or_insert(found);
                if found != expected {
                    return Err(DatasetError::ShapeMismatch {
                        file_name,
                        expected,
                        found,
                    });
                }
                flat.extend(spectrogram.values().iter().copied());
                labels.push(label);
            }
            TrackOutcome::Skipped(track) => skipped.push(track),
        }
    }

    let Some((n_mels, frames)) = shape else {
        return Err(DatasetError::NoUsableTracks {
            dir: dir.to_path_buf(),
            skipped: skipped.len(),
        });
    };
    let features = Array4::from_shape_vec((labels.len(), n_mels, frames, 1), flat)?;
    Ok(Dataset {
        features,
        labels,
        file_names,
        skipped,
    })
}
