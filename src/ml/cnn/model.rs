use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig};
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig, Relu};
use burn::prelude::*;
use burn::tensor::activation::softmax;

use super::ModelError;

/// Smallest spatial extent that survives three valid 3x3 convolutions and two 2x2 pools.
pub const MIN_INPUT_SIZE: usize = 18;

const CONV1_FILTERS: usize = 32;
const CONV2_FILTERS: usize = 64;
const CONV3_FILTERS: usize = 64;
const HIDDEN_UNITS: usize = 64;

#[derive(Config, Debug)]
pub struct TrackNetConfig {
    /// Output width of the final dense layer.
    pub num_classes: usize,
    /// Frequency bands of the input spectrogram.
    #[config(default = 128)]
    pub n_mels: usize,
    #[config(default = 0.5)]
    pub dropout: f64,
}

impl TrackNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<TrackNet<B>, ModelError> {
        if self.num_classes == 0 {
            return Err(ModelError::InvalidClassCount);
        }
        check_input_size(self.n_mels, MIN_INPUT_SIZE)?;
        Ok(TrackNet {
            conv1: Conv2dConfig::new([1, CONV1_FILTERS], [3, 3]).init(device),
            conv2: Conv2dConfig::new([CONV1_FILTERS, CONV2_FILTERS], [3, 3]).init(device),
            conv3: Conv2dConfig::new([CONV2_FILTERS, CONV3_FILTERS], [3, 3]).init(device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            gap: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            hidden: LinearConfig::new(CONV3_FILTERS, HIDDEN_UNITS).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            output: LinearConfig::new(HIDDEN_UNITS, self.num_classes).init(device),
            activation: Relu::new(),
        })
    }
}

/// Reject spectrograms too small for the convolution stack.
pub(crate) fn check_input_size(height: usize, width: usize) -> Result<(), ModelError> {
    if height < MIN_INPUT_SIZE || width < MIN_INPUT_SIZE {
        return Err(ModelError::InputTooSmall {
            height,
            width,
            min: MIN_INPUT_SIZE,
        });
    }
    Ok(())
}

#[derive(Module, Debug)]
pub struct TrackNet<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    conv3: Conv2d<B>,
    pool: MaxPool2d,
    gap: AdaptiveAvgPool2d,
    hidden: Linear<B>,
    dropout: Dropout,
    output: Linear<B>,
    activation: Relu,
}

impl<B: Backend> TrackNet<B> {
    /// Class logits for `input` shaped `[batch, 1, n_mels, frames]`.
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.activation.forward(self.conv1.forward(input));
        let x = self.pool.forward(x);
        let x = self.activation.forward(self.conv2.forward(x));
        let x = self.pool.forward(x);
        let x = self.activation.forward(self.conv3.forward(x));
        let x = self.gap.forward(x);
        let [batch, channels, _, _] = x.dims();
        let x = x.reshape([batch, channels]);
        let x = self.activation.forward(self.hidden.forward(x));
        let x = self.dropout.forward(x);
        self.output.forward(x)
    }

    /// Per-class probabilities; each row sums to one.
    pub fn forward_probs(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        softmax(self.forward(input), 1)
    }

    pub fn num_classes(&self) -> usize {
        self.output.weight.val().dims()[1]
    }
}
