pub mod activation;
pub mod dataset;
pub mod errors;
pub mod model;
pub mod training;

pub use activation::{weighted_tanh, ActivationKind, WeightedTanh};
pub use dataset::{DataSplit, FashionMnist};
pub use errors::ConfigError;
pub use model::{Classifier, ClassifierConfig, ModelInit};
pub use training::{estimate_loss, train_model, EpochStats, TrainingConfig};

use anyhow::Result;
use candle_core::Device;

/// Selects the device to run on.
///
/// `CANDLE_FORCE_CPU` pins the CPU backend; otherwise CUDA is used when
/// available, falling back to the CPU.
pub fn setup_device() -> Result<Device> {
    if std::env::var("CANDLE_FORCE_CPU").is_ok() {
        println!("CANDLE_FORCE_CPU set, using CPU backend");
        return Ok(Device::Cpu);
    }

    match Device::cuda_if_available(0) {
        Ok(device) if device.is_cuda() => {
            println!("CUDA device selected: {:?}", device);
            Ok(device)
        }
        Ok(_) | Err(_) => {
            println!("Using CPU backend");
            Ok(Device::Cpu)
        }
    }
}
