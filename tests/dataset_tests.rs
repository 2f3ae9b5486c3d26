use candle_core::Device;
use fashion_classifier::dataset::IMAGE_DIM;
use fashion_classifier::{DataSplit, FashionMnist};

fn synthetic(train: usize, test: usize) -> FashionMnist {
    let train_images = vec![0.5f32; train * IMAGE_DIM];
    let train_labels = (0..train as u32).map(|i| i % 10).collect();
    let test_images = vec![0.25f32; test * IMAGE_DIM];
    let test_labels = (0..test as u32).map(|i| i % 10).collect();
    FashionMnist::from_vecs(train_images, train_labels, test_images, test_labels, Device::Cpu)
        .unwrap()
}

#[test]
fn epoch_covers_every_example_with_partial_tail() {
    let data = synthetic(7, 0);

    let sizes: Vec<usize> = data
        .batches(DataSplit::Train, 3, false)
        .map(|b| b.unwrap().1.dims1().unwrap())
        .collect();
    assert_eq!(sizes, vec![3, 3, 1]);
}

#[test]
fn shuffling_permutes_without_dropping_examples() {
    let data = synthetic(10, 0);

    let mut seen: Vec<u32> = data
        .batches(DataSplit::Train, 4, true)
        .flat_map(|b| b.unwrap().1.to_vec1::<u32>().unwrap())
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..10).collect::<Vec<u32>>());
}

#[test]
fn batch_tensors_match_split_and_shape() {
    let data = synthetic(3, 5);
    assert_eq!(data.train_size(), 3);
    assert_eq!(data.test_size(), 5);

    let (images, labels) = data
        .batches(DataSplit::Test, 2, false)
        .next()
        .unwrap()
        .unwrap();
    assert_eq!(images.dims2().unwrap(), (2, IMAGE_DIM));
    assert_eq!(labels.dims1().unwrap(), 2);
}

#[test]
fn inconsistent_buffers_are_rejected() {
    let images = vec![0.0f32; IMAGE_DIM];
    let err = FashionMnist::from_vecs(images, vec![0, 1], vec![], vec![], Device::Cpu);
    assert!(err.is_err());
}
