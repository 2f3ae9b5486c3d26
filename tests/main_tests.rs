use fashion_classifier::{setup_device, ActivationKind, ModelInit, TrainingConfig};

#[test]
fn device_setup_succeeds() {
    let device = setup_device();
    assert!(device.is_ok());
}

#[test]
fn cli_defaults() {
    assert_eq!(ActivationKind::default().as_str(), "weighted_tanh");
    assert_eq!(ModelInit::default().as_str(), "class");

    let config = TrainingConfig::default();
    assert_eq!(config.epochs, 5);
    assert_eq!(config.batch_size, 64);
}

#[test]
fn mode_names_round_trip() {
    for name in ["weighted_tanh"] {
        let kind: ActivationKind = name.parse().unwrap();
        assert_eq!(kind.to_string(), name);
    }
    for name in ["class", "sequential"] {
        let init: ModelInit = name.parse().unwrap();
        assert_eq!(init.to_string(), name);
    }
}
