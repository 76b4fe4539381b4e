use burn::prelude::*;
use ndarray::{Array4, Axis};

/// Gather rows of a `(samples, n_mels, frames, 1)` array into an NCHW tensor.
///
/// With a single channel the channel-last rows already have NCHW element order,
/// so each row is copied as-is.
pub fn features_to_tensor<B: Backend>(
    features: &Array4<f32>,
    indices: &[usize],
    device: &B::Device,
) -> Tensor<B, 4> {
    let (_, n_mels, frames, _) = features.dim();
    let mut flat = Vec::with_capacity(indices.len() * n_mels * frames);
    for &idx in indices {
        flat.extend(features.index_axis(Axis(0), idx).iter().copied());
    }
    let data = TensorData::new(flat, [indices.len(), 1, n_mels, frames]);
    Tensor::from_data(data, device)
}

/// Integer class targets for `indices`.
pub fn labels_to_tensor<B: Backend>(
    labels: &[usize],
    indices: &[usize],
    device: &B::Device,
) -> Tensor<B, 1, Int> {
    let targets: Vec<i64> = indices.iter().map(|&idx| labels[idx] as i64).collect();
    let data = TensorData::new(targets, [indices.len()]);
    Tensor::from_data(data, device)
}
