use std::fmt;
use std::str::FromStr;

use candle_core::{Result as CandleResult, Tensor, D};
use candle_nn::{batch_norm, linear, ops, BatchNorm, Dropout, Linear, Module, ModuleT, VarBuilder};

use crate::activation::{ActivationKind, WeightedTanh};
use crate::errors::ConfigError;

/// Hidden layer widths shared by both initialization modes.
const HIDDEN_DIMS: [usize; 3] = [256, 128, 64];

/// Configuration for the fully-connected classifier.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Flattened input size (28x28 grayscale images)
    pub input_dim: usize,
    /// Number of target classes
    pub num_classes: usize,
    /// Activation mode applied after the first affine transform
    pub activation: ActivationKind,
    /// Fixed scaling weight for the weighted-tanh activation
    pub tanh_weight: f64,
    /// Dropout probability used by the sequential-mode stack
    pub dropout_rate: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            input_dim: 784,
            num_classes: 10,
            activation: ActivationKind::WeightedTanh,
            tanh_weight: 1.0,
            dropout_rate: 0.3,
        }
    }
}

/// How the classifier stack is assembled.
///
/// Both modes describe the same kind of computation, a linear pipeline of
/// named stages; `Sequential` builds the richer stack with batch
/// normalization and dropout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelInit {
    Class,
    Sequential,
}

impl ModelInit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelInit::Class => "class",
            ModelInit::Sequential => "sequential",
        }
    }
}

impl Default for ModelInit {
    fn default() -> Self {
        ModelInit::Class
    }
}

impl FromStr for ModelInit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "class" => Ok(ModelInit::Class),
            "sequential" => Ok(ModelInit::Sequential),
            other => Err(ConfigError::UnsupportedInitialization(other.to_string())),
        }
    }
}

impl fmt::Display for ModelInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stage of the classifier pipeline.
#[derive(Debug)]
enum Stage {
    Linear(Linear),
    WeightedTanh(WeightedTanh),
    Relu,
    BatchNorm(BatchNorm),
    Dropout(Dropout),
    LogSoftmax,
}

impl Stage {
    fn forward_t(&self, xs: &Tensor, train: bool) -> CandleResult<Tensor> {
        match self {
            Stage::Linear(inner) => inner.forward(xs),
            Stage::WeightedTanh(inner) => inner.forward(xs),
            Stage::Relu => xs.relu(),
            Stage::BatchNorm(inner) => inner.forward_t(xs, train),
            Stage::Dropout(inner) => inner.forward(xs, train),
            Stage::LogSoftmax => ops::log_softmax(xs, D::Minus1),
        }
    }
}

/// Fully-connected classifier producing per-class log-probabilities.
///
/// The model is an ordered list of named stages evaluated in sequence; the
/// two initialization modes only differ in which stage list they build.
#[derive(Debug)]
pub struct Classifier {
    config: ClassifierConfig,
    stages: Vec<(&'static str, Stage)>,
}

impl Classifier {
    /// Build the classifier, resolving the initialization mode once.
    pub fn new(config: ClassifierConfig, init: ModelInit, vb: VarBuilder) -> CandleResult<Self> {
        let stages = match init {
            ModelInit::Class => Self::class_stages(&config, vb)?,
            ModelInit::Sequential => Self::sequential_stages(&config, vb)?,
        };
        Ok(Classifier { config, stages })
    }

    /// Stack used by the `class` initialization mode:
    /// four affine transforms with the selected activation after the first
    /// and relu after the middle two.
    fn class_stages(
        config: &ClassifierConfig,
        vb: VarBuilder,
    ) -> CandleResult<Vec<(&'static str, Stage)>> {
        let [h1, h2, h3] = HIDDEN_DIMS;
        let activation = match config.activation {
            ActivationKind::WeightedTanh => {
                Stage::WeightedTanh(WeightedTanh::new(config.tanh_weight))
            }
        };
        Ok(vec![
            ("fc1", Stage::Linear(linear(config.input_dim, h1, vb.pp("fc1"))?)),
            ("wtanh1", activation),
            ("fc2", Stage::Linear(linear(h1, h2, vb.pp("fc2"))?)),
            ("relu2", Stage::Relu),
            ("fc3", Stage::Linear(linear(h2, h3, vb.pp("fc3"))?)),
            ("relu3", Stage::Relu),
            ("fc4", Stage::Linear(linear(h3, config.num_classes, vb.pp("fc4"))?)),
            ("logsoftmax", Stage::LogSoftmax),
        ])
    }

    /// Stack used by the `sequential` initialization mode, with batch
    /// normalization and dropout between the hidden layers.
    fn sequential_stages(
        config: &ClassifierConfig,
        vb: VarBuilder,
    ) -> CandleResult<Vec<(&'static str, Stage)>> {
        let [h1, h2, h3] = HIDDEN_DIMS;
        Ok(vec![
            ("fc1", Stage::Linear(linear(config.input_dim, h1, vb.pp("fc1"))?)),
            ("wtanh1", Stage::WeightedTanh(WeightedTanh::new(config.tanh_weight))),
            ("fc2", Stage::Linear(linear(h1, h2, vb.pp("fc2"))?)),
            ("bn2", Stage::BatchNorm(batch_norm(h2, 1e-5, vb.pp("bn2"))?)),
            ("relu2", Stage::Relu),
            ("dropout", Stage::Dropout(Dropout::new(config.dropout_rate))),
            ("fc3", Stage::Linear(linear(h2, h3, vb.pp("fc3"))?)),
            ("bn3", Stage::BatchNorm(batch_norm(h3, 1e-5, vb.pp("bn3"))?)),
            ("relu3", Stage::Relu),
            ("logits", Stage::Linear(linear(h3, config.num_classes, vb.pp("logits"))?)),
            ("logsoftmax", Stage::LogSoftmax),
        ])
    }

    /// Forward pass over a batch of images.
    ///
    /// Higher-rank inputs such as `(batch, 1, 28, 28)` are flattened to
    /// `(batch, input_dim)` once before the stages run. Returns
    /// `(batch, num_classes)` log-probabilities.
    pub fn forward(&self, xs: &Tensor, train: bool) -> CandleResult<Tensor> {
        let mut x = xs.flatten_from(1)?;

        let width = x.dim(1)?;
        if width != self.config.input_dim {
            return Err(candle_core::Error::Msg(format!(
                "Input width {} does not match expected input size {}",
                width, self.config.input_dim
            )));
        }

        for (_, stage) in &self.stages {
            x = stage.forward_t(&x, train)?;
        }
        Ok(x)
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Names of the stages, in evaluation order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|(name, _)| *name).collect()
    }
}
