use candle_core::{Device, Result as CandleResult};
use candle_nn::loss;
use candle_nn::optim::{AdamW, Optimizer, ParamsAdamW};
use candle_nn::VarMap;
use std::time::Instant;

use crate::dataset::{DataSplit, FashionMnist};
use crate::model::Classifier;

/// Hyperparameters for the training run
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Learning rate for the optimizer
    pub learning_rate: f64,
    /// Batch size for training and evaluation
    pub batch_size: usize,
    /// Number of full passes over the training split
    pub epochs: usize,
    /// Weight decay; zero makes AdamW behave as plain Adam
    pub weight_decay: f64,
    /// Beta1 parameter for the optimizer
    pub beta1: f64,
    /// Beta2 parameter for the optimizer
    pub beta2: f64,
    /// Epsilon for numerical stability
    pub eps: f64,
    /// Device to run training on
    pub device: Device,
    /// Optional seed for the per-epoch batch shuffle
    pub shuffle_seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            learning_rate: 3e-3,
            batch_size: 64,
            epochs: 5,
            weight_decay: 0.0,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            device: Device::Cpu,
            shuffle_seed: None,
        }
    }
}

/// Per-epoch training statistics
#[derive(Debug, Clone)]
pub struct EpochStats {
    pub epoch: usize,
    /// Sum of per-batch mean losses over the epoch
    pub running_loss: f32,
    pub batches: usize,
    pub images_per_sec: f32,
    pub elapsed_time: f32,
}

/// Estimates the mean loss on a split without updating any parameters
pub fn estimate_loss(
    model: &Classifier,
    data: &FashionMnist,
    split: DataSplit,
    config: &TrainingConfig,
) -> CandleResult<f32> {
    let mut total_loss = 0.0f32;
    let mut num_batches = 0;

    for batch in data.batches(split, config.batch_size, false) {
        let (images, labels) = batch?;
        let log_probs = model.forward(&images, false)?;
        let batch_loss = loss::nll(&log_probs, &labels)?;
        total_loss += batch_loss.to_scalar::<f32>()?;
        num_batches += 1;
    }

    if num_batches > 0 {
        Ok(total_loss / num_batches as f32)
    } else {
        Err(candle_core::Error::Msg(
            "No batches available for loss estimation".to_string(),
        ))
    }
}

/// Runs the training loop and reports per-epoch statistics.
///
/// Each epoch iterates the shuffled training split once, computing the
/// negative-log-likelihood loss against the integer labels and taking one
/// optimizer step per batch. The reported loss is the sum of per-batch mean
/// losses, i.e. the running loss of one epoch.
pub fn train_model(
    model: &Classifier,
    data: &FashionMnist,
    varmap: &VarMap,
    config: &TrainingConfig,
) -> CandleResult<Vec<EpochStats>> {
    if let Some(seed) = config.shuffle_seed {
        fastrand::seed(seed);
    }

    let mut optimizer = AdamW::new(
        varmap.all_vars(),
        ParamsAdamW {
            lr: config.learning_rate,
            beta1: config.beta1,
            beta2: config.beta2,
            weight_decay: config.weight_decay,
            eps: config.eps,
        },
    )?;

    println!("Training configuration:");
    println!("  Learning rate: {}", config.learning_rate);
    println!("  Batch size: {}", config.batch_size);
    println!("  Epochs: {}", config.epochs);
    println!("  Device: {:?}", config.device);
    println!();
    println!(
        "{:>6} | {:>12} | {:>10} | {:>8}",
        "Epoch", "Running Loss", "Img/sec", "Time"
    );
    println!("{}", "-".repeat(46));

    let training_start = Instant::now();
    let mut stats = Vec::with_capacity(config.epochs);

    for epoch in 0..config.epochs {
        let epoch_start = Instant::now();
        let mut running_loss = 0.0f32;
        let mut batches = 0;

        for batch in data.batches(DataSplit::Train, config.batch_size, true) {
            let (images, labels) = batch?;
            let log_probs = model.forward(&images, true)?;
            let batch_loss = loss::nll(&log_probs, &labels)?;
            optimizer.backward_step(&batch_loss)?;

            running_loss += batch_loss.to_scalar::<f32>()?;
            batches += 1;
        }

        let elapsed = epoch_start.elapsed().as_secs_f32();
        let images_per_sec = if elapsed > 0.0 {
            data.train_size() as f32 / elapsed
        } else {
            0.0
        };

        let epoch_stats = EpochStats {
            epoch,
            running_loss,
            batches,
            images_per_sec,
            elapsed_time: elapsed,
        };
        println!(
            "{:6} | {:12.4} | {:10.0} | {:7.1}s",
            epoch_stats.epoch,
            epoch_stats.running_loss,
            epoch_stats.images_per_sec,
            epoch_stats.elapsed_time
        );
        stats.push(epoch_stats);
    }

    println!();
    println!(
        "Training completed in {:.1}s",
        training_start.elapsed().as_secs_f32()
    );
    if let Some(last) = stats.last() {
        println!("Final training loss: {:.4}", last.running_loss);
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.learning_rate, 3e-3);
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.epochs, 5);
        assert_eq!(config.weight_decay, 0.0);
        assert_eq!(config.beta1, 0.9);
        assert_eq!(config.beta2, 0.999);
        assert!(matches!(config.device, Device::Cpu));
        assert!(config.shuffle_seed.is_none());
    }

    #[test]
    fn epoch_stats_creation() {
        let stats = EpochStats {
            epoch: 2,
            running_loss: 431.5,
            batches: 938,
            images_per_sec: 1500.0,
            elapsed_time: 40.0,
        };

        assert_eq!(stats.epoch, 2);
        assert_eq!(stats.running_loss, 431.5);
        assert_eq!(stats.batches, 938);
        assert_eq!(stats.images_per_sec, 1500.0);
        assert_eq!(stats.elapsed_time, 40.0);
    }
}
