//! Weighted-tanh activation.
//!
//! The non-linearity is `f(x) = tanh(weight * x)` applied elementwise, with
//! the scaling weight fixed at construction time rather than learned. It is
//! available both as a plain function and as a [`Module`] so it can be used
//! inline in a custom forward pass or inserted into a layer stack.

use std::fmt;
use std::str::FromStr;

use candle_core::{Result as CandleResult, Tensor};
use candle_nn::Module;

use crate::errors::ConfigError;

/// Applies `tanh(weight * x)` elementwise.
///
/// The output has the same shape as the input and lies in (-1, 1) for finite
/// inputs. NaN and infinite inputs follow the IEEE semantics of the
/// underlying tanh kernel.
pub fn weighted_tanh(xs: &Tensor, weight: f64) -> CandleResult<Tensor> {
    xs.affine(weight, 0.0)?.tanh()
}

/// Module form of [`weighted_tanh`] with the weight fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct WeightedTanh {
    weight: f64,
}

impl WeightedTanh {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl Default for WeightedTanh {
    fn default() -> Self {
        Self { weight: 1.0 }
    }
}

impl Module for WeightedTanh {
    fn forward(&self, xs: &Tensor) -> CandleResult<Tensor> {
        weighted_tanh(xs, self.weight)
    }
}

/// Closed set of activation modes selectable on the command line.
///
/// Only one mode exists today; the enum is the extension point for further
/// modes. The mode is resolved once from its string name, so the forward
/// pass never re-checks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKind {
    WeightedTanh,
}

impl ActivationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationKind::WeightedTanh => "weighted_tanh",
        }
    }
}

impl Default for ActivationKind {
    fn default() -> Self {
        ActivationKind::WeightedTanh
    }
}

impl FromStr for ActivationKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "weighted_tanh" => Ok(ActivationKind::WeightedTanh),
            other => Err(ConfigError::UnsupportedActivation(other.to_string())),
        }
    }
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
