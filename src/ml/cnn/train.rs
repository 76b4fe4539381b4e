use burn::module::AutodiffModule;
use burn::nn::loss::CrossEntropyLossConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use ndarray::Array4;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::model::check_input_size;
use super::{TrackNet, TrackNetConfig, TrainError, features_to_tensor, labels_to_tensor};
use crate::ml::metrics::{ConfusionMatrix, accuracy};

/// Adam epsilon matching the usual Keras default.
const ADAM_EPSILON: f32 = 1e-7;

/// Optimizer schedule for one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub seed: u64,
}

impl TrainOptions {
    fn validate(&self) -> Result<(), TrainError> {
        if self.epochs == 0 {
            return Err(TrainError::InvalidOptions("epochs must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(TrainError::InvalidOptions("batch size must be at least 1".into()));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(TrainError::InvalidOptions(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// Loss and accuracy recorded after one epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub train_loss: f32,
    pub train_accuracy: f32,
    /// Absent when no samples were held out.
    pub val_loss: Option<f32>,
    pub val_accuracy: Option<f32>,
}

/// Loss, accuracy, and confusion counts over a set of rows.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub loss: f32,
    pub accuracy: f32,
    pub confusion: ConfusionMatrix,
}

/// Result of [`train`]: the inference-mode model plus its history.
#[derive(Debug)]
pub struct TrainedModel<B: Backend> {
    pub model: TrackNet<B>,
    pub history: Vec<EpochMetrics>,
    /// Evaluation of the final model on the held-out rows.
    pub evaluation: Option<Evaluation>,
}

/// Fit a fresh classifier on `train_idx` rows, validating on `test_idx` after each epoch.
///
/// `features` is `(samples, n_mels, frames, 1)` and `labels[i]` is the class of row `i`.
pub fn train<B: AutodiffBackend>(
    device: &B::Device,
    config: &TrackNetConfig,
    features: &Array4<f32>,
    labels: &[usize],
    train_idx: &[usize],
    test_idx: &[usize],
    options: &TrainOptions,
) -> Result<TrainedModel<B::InnerBackend>, TrainError> {
    options.validate()?;
    if train_idx.is_empty() {
        return Err(TrainError::EmptyTrainSplit);
    }
    let (_, n_mels, frames, _) = features.dim();
    check_input_size(n_mels, frames)?;
    if let Some(&label) = labels.iter().find(|&&label| label >= config.num_classes) {
        return Err(TrainError::LabelOutOfRange {
            label,
            num_classes: config.num_classes,
        });
    }

    B::seed(device, options.seed);
    let mut model: TrackNet<B> = config.init(device)?;
    let mut optim = AdamConfig::new()
        .with_epsilon(ADAM_EPSILON)
        .init::<B, TrackNet<B>>();
    let loss_fn = CrossEntropyLossConfig::new().init(device);
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut order = train_idx.to_vec();
    let mut history = Vec::with_capacity(options.epochs);

    info!(
        "Training {} classes on {} samples ({} held out) for {} epochs",
        config.num_classes,
        train_idx.len(),
        test_idx.len(),
        options.epochs
    );
    for epoch in 1..=options.epochs {
        order.shuffle(&mut rng);
        let mut loss_sum = 0.0_f32;
        let mut correct = 0usize;
        for chunk in order.chunks(options.batch_size) {
            let input = features_to_tensor::<B>(features, chunk, device);
            let targets = labels_to_tensor::<B>(labels, chunk, device);
            let logits = model.forward(input);
            let loss = loss_fn.forward(logits.clone(), targets);
            loss_sum += scalar(loss.clone().into_data())? * chunk.len() as f32;
            correct += count_correct(logits.into_data(), labels, chunk)?;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(options.learning_rate, model, grads);
        }

        let train_loss = loss_sum / train_idx.len() as f32;
        let train_accuracy = correct as f32 / train_idx.len() as f32;
        let validation = if test_idx.is_empty() {
            None
        } else {
            Some(evaluate(
                &model.valid(),
                device,
                features,
                labels,
                test_idx,
                options.batch_size,
            )?)
        };
        let metrics = EpochMetrics {
            epoch,
            train_loss,
            train_accuracy,
            val_loss: validation.as_ref().map(|eval| eval.loss),
            val_accuracy: validation.as_ref().map(|eval| eval.accuracy),
        };
        match (metrics.val_loss, metrics.val_accuracy) {
            (Some(val_loss), Some(val_accuracy)) => info!(
                "Epoch {epoch}/{}: loss {train_loss:.4} accuracy {train_accuracy:.4} val_loss {val_loss:.4} val_accuracy {val_accuracy:.4}",
                options.epochs
            ),
            _ => info!(
                "Epoch {epoch}/{}: loss {train_loss:.4} accuracy {train_accuracy:.4}",
                options.epochs
            ),
        }
        history.push(metrics);
    }

    let model = model.valid();
    let evaluation = if test_idx.is_empty() {
        None
    } else {
        Some(evaluate(
            &model,
            device,
            features,
            labels,
            test_idx,
            options.batch_size,
        )?)
    };
    Ok(TrainedModel {
        model,
        history,
        evaluation,
    })
}

/// Mean loss, accuracy, and confusion counts of `model` over `indices`.
pub fn evaluate<B: Backend>(
    model: &TrackNet<B>,
    device: &B::Device,
    features: &Array4<f32>,
    labels: &[usize],
    indices: &[usize],
    batch_size: usize,
) -> Result<Evaluation, TrainError> {
    let num_classes = model.num_classes();
    let loss_fn = CrossEntropyLossConfig::new().init(device);
    let mut confusion = ConfusionMatrix::new(num_classes);
    let mut loss_sum = 0.0_f32;
    for chunk in indices.chunks(batch_size.max(1)) {
        let input = features_to_tensor::<B>(features, chunk, device);
        let targets = labels_to_tensor::<B>(labels, chunk, device);
        let logits = model.forward(input);
        let loss = loss_fn.forward(logits.clone(), targets);
        loss_sum += scalar(loss.into_data())? * chunk.len() as f32;
        for (row, predicted) in predictions(logits.into_data(), chunk.len())?
            .into_iter()
            .enumerate()
        {
            confusion.add(labels[chunk[row]], predicted);
        }
    }
    let count = indices.len().max(1) as f32;
    let evaluation = Evaluation {
        loss: loss_sum / count,
        accuracy: accuracy(&confusion),
        confusion,
    };
    debug!(
        "Evaluated {} samples: loss {:.4} accuracy {:.4}",
        indices.len(),
        evaluation.loss,
        evaluation.accuracy
    );
    Ok(evaluation)
}

fn scalar(data: TensorData) -> Result<f32, TrainError> {
    data.iter::<f32>()
        .next()
        .ok_or_else(|| TrainError::Tensor("empty loss tensor".into()))
}

/// Argmax class of each row of a `[rows, classes]` logits tensor.
fn predictions(logits: TensorData, rows: usize) -> Result<Vec<usize>, TrainError> {
    let values: Vec<f32> = logits.iter::<f32>().collect();
    if rows == 0 || values.len() % rows != 0 {
        return Err(TrainError::Tensor(format!(
            "expected {rows} rows of logits, got {} values",
            values.len()
        )));
    }
    let width = values.len() / rows;
    Ok(values
        .chunks(width)
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |best, (idx, &value)| {
                    if value > best.1 { (idx, value) } else { best }
                })
                .0
        })
        .collect())
}

fn count_correct(logits: TensorData, labels: &[usize], chunk: &[usize]) -> Result<usize, TrainError> {
    Ok(predictions(logits, chunk.len())?
        .into_iter()
        .zip(chunk)
        .filter(|(predicted, idx)| *predicted == labels[**idx])
        .count())
}
