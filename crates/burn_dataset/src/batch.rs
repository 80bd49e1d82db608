//! Batch iteration and collation into Burn tensors.

use crate::types::{CaptionSample, Dataset, DatasetError, DatasetResult, DetectionSample, ImageChw};
use burn::tensor::{backend::Backend, Int, Tensor, TensorData};
use rand::{seq::SliceRandom, SeedableRng};
use text_vocab::PAD_INDEX;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub batch_size: usize,
    pub shuffle: bool,
    pub drop_last: bool,
    pub seed: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 8,
            shuffle: false,
            drop_last: false,
            seed: None,
        }
    }
}

/// Yields batches of dataset items. Item loading errors end the current batch
/// with that error; later batches continue from the next index.
pub struct BatchIter<'a, D: Dataset> {
    dataset: &'a D,
    order: Vec<usize>,
    cursor: usize,
    cfg: BatchConfig,
}

impl<'a, D: Dataset> BatchIter<'a, D> {
    pub fn new(dataset: &'a D, cfg: BatchConfig) -> Self {
        let mut order: Vec<usize> = (0..dataset.len()).collect();
        if cfg.shuffle {
            let mut rng = match cfg.seed {
                Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
                None => rand::rngs::StdRng::from_rng(&mut rand::rng()),
            };
            order.shuffle(&mut rng);
        }
        Self {
            dataset,
            order,
            cursor: 0,
            cfg,
        }
    }

    pub fn num_batches(&self) -> usize {
        let size = self.cfg.batch_size.max(1);
        if self.cfg.drop_last {
            self.order.len() / size
        } else {
            self.order.len().div_ceil(size)
        }
    }
}

impl<D: Dataset> Iterator for BatchIter<'_, D> {
    type Item = DatasetResult<Vec<D::Item>>;

    fn next(&mut self) -> Option<Self::Item> {
        let size = self.cfg.batch_size.max(1);
        let remaining = self.order.len().saturating_sub(self.cursor);
        if remaining == 0 || (self.cfg.drop_last && remaining < size) {
            return None;
        }
        let end = (self.cursor + size).min(self.order.len());
        let indices = &self.order[self.cursor..end];
        self.cursor = end;
        let batch = indices
            .iter()
            .map(|&i| self.dataset.get(i))
            .collect::<DatasetResult<Vec<_>>>();
        Some(batch)
    }
}

#[derive(Debug, Clone)]
pub struct DetectionTargetTensors<B: Backend> {
    /// Absolute-pixel boxes, shape `[N, 4]`.
    pub boxes: Tensor<B, 2>,
    /// Class indices, shape `[N]`.
    pub labels: Tensor<B, 1, Int>,
}

#[derive(Debug, Clone)]
pub struct DetectionBatch<B: Backend> {
    /// Shape `[batch, 3, H, W]`.
    pub images: Tensor<B, 4>,
    pub targets: Vec<DetectionTargetTensors<B>>,
    pub image_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CaptionBatch<B: Backend> {
    /// Shape `[batch, 3, H, W]`.
    pub images: Tensor<B, 4>,
    /// Shape `[batch, max_len]`, padded with `<pad>`.
    pub captions: Tensor<B, 2, Int>,
    /// Unpadded caption lengths, non-increasing.
    pub lengths: Vec<usize>,
    pub annotation_ids: Vec<u64>,
}

fn stack_images<'a, B: Backend>(
    images: impl ExactSizeIterator<Item = &'a ImageChw>,
    device: &B::Device,
) -> DatasetResult<Tensor<B, 4>> {
    let batch = images.len();
    let mut buf: Vec<f32> = Vec::new();
    let mut dims: Option<(u32, u32)> = None;
    for img in images {
        match dims {
            None => {
                dims = Some((img.width, img.height));
                buf.reserve(batch * img.data.len());
            }
            Some((w, h)) if w != img.width || h != img.height => {
                return Err(DatasetError::Other(format!(
                    "image dimensions differ within batch: {}x{}, expected {w}x{h}",
                    img.width, img.height
                )));
            }
            Some(_) => {}
        }
        buf.extend_from_slice(&img.data);
    }
    let (width, height) =
        dims.ok_or_else(|| DatasetError::Other("cannot collate empty batch".into()))?;
    Ok(Tensor::<B, 4>::from_data(
        TensorData::new(buf, [batch, 3, height as usize, width as usize]),
        device,
    ))
}

pub fn collate_detection<B: Backend>(
    samples: &[DetectionSample],
    device: &B::Device,
) -> DatasetResult<DetectionBatch<B>> {
    let images = stack_images::<B>(samples.iter().map(|s| &s.image), device)?;
    let targets = samples
        .iter()
        .map(|s| {
            let n = s.target.boxes.len();
            let flat: Vec<f32> = s.target.boxes.iter().flatten().copied().collect();
            DetectionTargetTensors {
                boxes: Tensor::<B, 2>::from_data(TensorData::new(flat, [n, 4]), device),
                labels: Tensor::<B, 1, Int>::from_data(
                    TensorData::new(s.target.labels.clone(), [n]),
                    device,
                ),
            }
        })
        .collect();
    Ok(DetectionBatch {
        images,
        targets,
        image_ids: samples.iter().map(|s| s.image_id.clone()).collect(),
    })
}

/// Sort by caption length (longest first), stack images and pad captions with
/// `<pad>` to the longest caption.
pub fn collate_captions<B: Backend>(
    mut samples: Vec<CaptionSample>,
    device: &B::Device,
) -> DatasetResult<CaptionBatch<B>> {
    samples.sort_by(|a, b| b.caption.len().cmp(&a.caption.len()));
    let images = stack_images::<B>(samples.iter().map(|s| &s.image), device)?;
    let lengths: Vec<usize> = samples.iter().map(|s| s.caption.len()).collect();
    let max_len = lengths.first().copied().unwrap_or(0);
    let mut padded = vec![PAD_INDEX as i64; samples.len() * max_len];
    for (row, sample) in samples.iter().enumerate() {
        for (col, &token) in sample.caption.iter().enumerate() {
            padded[row * max_len + col] = token as i64;
        }
    }
    debug!(batch = samples.len(), max_len, "collated caption batch");
    let captions =
        Tensor::<B, 2, Int>::from_data(TensorData::new(padded, [samples.len(), max_len]), device);
    Ok(CaptionBatch {
        images,
        captions,
        lengths,
        annotation_ids: samples.iter().map(|s| s.annotation_id).collect(),
    })
}
