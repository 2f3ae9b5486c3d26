use std::path::PathBuf;

use anyhow::Context;
use candle_core::DType;
use candle_nn::{VarBuilder, VarMap};
use clap::Parser;

use fashion_classifier::{
    estimate_loss, setup_device, train_model, ActivationKind, Classifier, ClassifierConfig,
    DataSplit, FashionMnist, ModelInit, TrainingConfig,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("training failed: {:#}", err);
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Weighted-tanh Fashion-MNIST classifier", long_about = None)]
struct Args {
    #[arg(
        long,
        default_value = "weighted_tanh",
        help = "Activation function for demonstration"
    )]
    activation: ActivationKind,

    #[arg(
        long = "model_initialization",
        default_value = "class",
        help = "Model initialization mode: assemble with the classifier stack or the sequential stack"
    )]
    model_initialization: ModelInit,

    #[arg(
        long,
        value_name = "PATH",
        default_value = "data/fashion-mnist",
        help = "Directory holding the four Fashion-MNIST IDX files"
    )]
    data_dir: PathBuf,

    #[arg(long, default_value_t = 5, help = "Number of training epochs")]
    epochs: usize,

    #[arg(long, help = "Seed for the per-epoch batch shuffle")]
    seed: Option<u64>,
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let device = setup_device()?;

    println!("Loading Fashion-MNIST from {}", args.data_dir.display());
    let data = FashionMnist::from_dir(&args.data_dir, device.clone())
        .context("Failed to load the Fashion-MNIST dataset")?;
    data.print_stats();

    println!();
    println!("Create model with {} activation.", args.activation);
    println!("Model initialization: {}", args.model_initialization);

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let config = ClassifierConfig {
        activation: args.activation,
        ..ClassifierConfig::default()
    };
    let model = Classifier::new(config, args.model_initialization, vb)?;

    println!();
    println!("Training the model on the Fashion-MNIST dataset.");
    let training_config = TrainingConfig {
        epochs: args.epochs,
        device,
        shuffle_seed: args.seed,
        ..TrainingConfig::default()
    };
    train_model(&model, &data, &varmap, &training_config)?;

    let test_loss = estimate_loss(&model, &data, DataSplit::Test, &training_config)?;
    println!("Test loss: {:.4}", test_loss);

    Ok(())
}
