use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use fashion_classifier::dataset::IMAGE_DIM;
use fashion_classifier::{
    estimate_loss, train_model, Classifier, ClassifierConfig, DataSplit, FashionMnist, ModelInit,
    TrainingConfig,
};

#[test]
fn default_hyperparameters() {
    let config = TrainingConfig::default();
    assert_eq!(config.learning_rate, 3e-3);
    assert_eq!(config.batch_size, 64);
    assert_eq!(config.epochs, 5);
    assert_eq!(config.weight_decay, 0.0);
    assert!(matches!(config.device, Device::Cpu));
}

/// Two deterministic, linearly separable examples with fixed labels.
fn synthetic_dataset(device: Device) -> FashionMnist {
    let mut top_half = vec![0.0f32; IMAGE_DIM];
    for pixel in top_half.iter_mut().take(IMAGE_DIM / 2) {
        *pixel = 1.0;
    }
    let mut bottom_half = vec![0.0f32; IMAGE_DIM];
    for pixel in bottom_half.iter_mut().skip(IMAGE_DIM / 2) {
        *pixel = 1.0;
    }

    let images = [top_half, bottom_half].concat();
    let labels = vec![0u32, 1];
    FashionMnist::from_vecs(images.clone(), labels.clone(), images, labels, device).unwrap()
}

#[test]
fn one_epoch_reduces_loss_on_synthetic_data() {
    let device = Device::Cpu;
    let data = synthetic_dataset(device.clone());

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let model = Classifier::new(ClassifierConfig::default(), ModelInit::Class, vb).unwrap();

    let config = TrainingConfig {
        epochs: 1,
        shuffle_seed: Some(7),
        ..TrainingConfig::default()
    };

    let initial = estimate_loss(&model, &data, DataSplit::Train, &config).unwrap();
    let stats = train_model(&model, &data, &varmap, &config).unwrap();
    let trained = estimate_loss(&model, &data, DataSplit::Train, &config).unwrap();

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].batches, 1);
    assert!(
        trained < initial,
        "loss did not decrease: {initial} -> {trained}"
    );
}

#[test]
fn estimate_loss_fails_on_an_empty_split() {
    let device = Device::Cpu;
    let data = FashionMnist::from_vecs(
        vec![0.0f32; IMAGE_DIM],
        vec![0],
        vec![],
        vec![],
        device.clone(),
    )
    .unwrap();

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let model = Classifier::new(ClassifierConfig::default(), ModelInit::Class, vb).unwrap();

    let config = TrainingConfig::default();
    assert!(estimate_loss(&model, &data, DataSplit::Test, &config).is_err());
}
