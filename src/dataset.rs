use anyhow::{bail, Context, Result};
use candle_core::{Device, Result as CandleResult, Tensor};
use std::fs;
use std::path::Path;

/// Flattened size of one 28x28 grayscale image
pub const IMAGE_DIM: usize = 784;
/// Image height and width in pixels
pub const IMAGE_SIDE: usize = 28;
/// Number of target classes
pub const NUM_CLASSES: usize = 10;

/// Human-readable Fashion-MNIST class names, indexed by label
pub const CLASS_NAMES: [&str; NUM_CLASSES] = [
    "T-shirt/top",
    "Trouser",
    "Pullover",
    "Dress",
    "Coat",
    "Sandal",
    "Shirt",
    "Sneaker",
    "Bag",
    "Ankle boot",
];

const IMAGE_MAGIC: u32 = 2051;
const LABEL_MAGIC: u32 = 2049;

/// Enum for specifying which data split to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSplit {
    Train,
    Test,
}

/// Fashion-MNIST dataset held host-side, batched into tensors on demand
#[derive(Debug, Clone)]
pub struct FashionMnist {
    /// Training images, flattened and scaled to [0, 1]
    train_images: Vec<f32>,
    /// Training labels in 0..10
    train_labels: Vec<u32>,
    /// Test images, flattened and scaled to [0, 1]
    test_images: Vec<f32>,
    /// Test labels in 0..10
    test_labels: Vec<u32>,
    /// Device batches are placed on
    device: Device,
}

impl FashionMnist {
    /// Load the four IDX files from a data directory.
    ///
    /// Expects the standard uncompressed file names
    /// (`train-images-idx3-ubyte`, `train-labels-idx1-ubyte`,
    /// `t10k-images-idx3-ubyte`, `t10k-labels-idx1-ubyte`). Downloading the
    /// files is up to the caller; the directory is explicit configuration.
    pub fn from_dir<P: AsRef<Path>>(dir: P, device: Device) -> Result<Self> {
        let dir = dir.as_ref();
        let train_images = read_images(&dir.join("train-images-idx3-ubyte"))?;
        let train_labels = read_labels(&dir.join("train-labels-idx1-ubyte"))?;
        let test_images = read_images(&dir.join("t10k-images-idx3-ubyte"))?;
        let test_labels = read_labels(&dir.join("t10k-labels-idx1-ubyte"))?;

        Self::from_vecs(train_images, train_labels, test_images, test_labels, device)
    }

    /// Build a dataset from in-memory buffers.
    ///
    /// Images are flat `IMAGE_DIM`-sized rows; labels must stay below
    /// `NUM_CLASSES`.
    pub fn from_vecs(
        train_images: Vec<f32>,
        train_labels: Vec<u32>,
        test_images: Vec<f32>,
        test_labels: Vec<u32>,
        device: Device,
    ) -> Result<Self> {
        validate_split("train", &train_images, &train_labels)?;
        validate_split("test", &test_images, &test_labels)?;

        Ok(FashionMnist {
            train_images,
            train_labels,
            test_images,
            test_labels,
            device,
        })
    }

    fn split(&self, split: DataSplit) -> (&[f32], &[u32]) {
        match split {
            DataSplit::Train => (&self.train_images, &self.train_labels),
            DataSplit::Test => (&self.test_images, &self.test_labels),
        }
    }

    /// Number of training examples
    pub fn train_size(&self) -> usize {
        self.train_labels.len()
    }

    /// Number of test examples
    pub fn test_size(&self) -> usize {
        self.test_labels.len()
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Iterate one epoch of `(images, labels)` batches over a split.
    ///
    /// Batches are `(n, IMAGE_DIM)` f32 and `(n,)` u32 tensors; the final
    /// batch may be smaller than `batch_size`. With `shuffle` set the visit
    /// order is re-drawn for this epoch.
    pub fn batches(&self, split: DataSplit, batch_size: usize, shuffle: bool) -> Batches<'_> {
        assert!(batch_size > 0, "batch_size must be greater than 0");

        let (images, labels) = self.split(split);
        let mut order: Vec<usize> = (0..labels.len()).collect();
        if shuffle {
            fastrand::shuffle(&mut order);
        }

        Batches {
            images,
            labels,
            device: &self.device,
            order,
            cursor: 0,
            batch_size,
        }
    }

    /// Print dataset statistics
    pub fn print_stats(&self) {
        println!("Dataset statistics:");
        println!("  Training examples: {}", self.train_size());
        println!("  Test examples: {}", self.test_size());
        println!(
            "  Image size: {}x{} ({} pixels)",
            IMAGE_SIDE, IMAGE_SIDE, IMAGE_DIM
        );
        println!("  Classes: {}", CLASS_NAMES.join(", "));
    }
}

/// Epoch iterator over tensor batches of one split
pub struct Batches<'a> {
    images: &'a [f32],
    labels: &'a [u32],
    device: &'a Device,
    order: Vec<usize>,
    cursor: usize,
    batch_size: usize,
}

impl Batches<'_> {
    fn build_batch(&self, indices: &[usize]) -> CandleResult<(Tensor, Tensor)> {
        let mut images = Vec::with_capacity(indices.len() * IMAGE_DIM);
        let mut labels = Vec::with_capacity(indices.len());
        for &idx in indices {
            images.extend_from_slice(&self.images[idx * IMAGE_DIM..(idx + 1) * IMAGE_DIM]);
            labels.push(self.labels[idx]);
        }

        let images = Tensor::from_vec(images, (indices.len(), IMAGE_DIM), self.device)?;
        let labels = Tensor::from_vec(labels, indices.len(), self.device)?;
        Ok((images, labels))
    }
}

impl Iterator for Batches<'_> {
    type Item = CandleResult<(Tensor, Tensor)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let end = usize::min(self.cursor + self.batch_size, self.order.len());
        let indices = self.order[self.cursor..end].to_vec();
        self.cursor = end;

        Some(self.build_batch(&indices))
    }
}

fn validate_split(name: &str, images: &[f32], labels: &[u32]) -> Result<()> {
    if images.len() % IMAGE_DIM != 0 {
        bail!(
            "{} image buffer length {} is not a multiple of {}",
            name,
            images.len(),
            IMAGE_DIM
        );
    }
    if images.len() / IMAGE_DIM != labels.len() {
        bail!(
            "{} split has {} images but {} labels",
            name,
            images.len() / IMAGE_DIM,
            labels.len()
        );
    }
    if let Some(label) = labels.iter().find(|&&l| l >= NUM_CLASSES as u32) {
        bail!("{} split contains out-of-range label {}", name, label);
    }
    Ok(())
}

fn be_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn read_images(path: &Path) -> Result<Vec<f32>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read image file {}", path.display()))?;
    if bytes.len() < 16 {
        bail!("Image file {} is truncated", path.display());
    }

    let magic = be_u32(&bytes, 0);
    if magic != IMAGE_MAGIC {
        bail!(
            "Image file {} has magic {}, expected {}",
            path.display(),
            magic,
            IMAGE_MAGIC
        );
    }

    let count = be_u32(&bytes, 4) as usize;
    let rows = be_u32(&bytes, 8) as usize;
    let cols = be_u32(&bytes, 12) as usize;
    if rows != IMAGE_SIDE || cols != IMAGE_SIDE {
        bail!(
            "Image file {} has geometry {}x{}, expected {}x{}",
            path.display(),
            rows,
            cols,
            IMAGE_SIDE,
            IMAGE_SIDE
        );
    }
    if bytes.len() != 16 + count * rows * cols {
        bail!(
            "Image file {} declares {} images but holds {} payload bytes",
            path.display(),
            count,
            bytes.len() - 16
        );
    }

    Ok(bytes[16..].iter().map(|&b| b as f32 / 255.0).collect())
}

fn read_labels(path: &Path) -> Result<Vec<u32>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read label file {}", path.display()))?;
    if bytes.len() < 8 {
        bail!("Label file {} is truncated", path.display());
    }

    let magic = be_u32(&bytes, 0);
    if magic != LABEL_MAGIC {
        bail!(
            "Label file {} has magic {}, expected {}",
            path.display(),
            magic,
            LABEL_MAGIC
        );
    }

    let count = be_u32(&bytes, 4) as usize;
    if bytes.len() != 8 + count {
        bail!(
            "Label file {} declares {} labels but holds {} payload bytes",
            path.display(),
            count,
            bytes.len() - 8
        );
    }

    Ok(bytes[8..].iter().map(|&b| b as u32).collect())
}
