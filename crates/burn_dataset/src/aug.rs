//! Image resize, crop, flip and normalization pipeline.

use crate::types::{DatasetResult, ImageChw, ResizeMode};
use image::imageops::FilterType;
use image::RgbImage;
use rand::{Rng, SeedableRng};

/// Per-channel RGB mean of the ImageNet training set.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// Per-channel RGB standard deviation of the ImageNet training set.
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

#[derive(Debug, Clone, PartialEq)]
pub struct TransformPipeline {
    /// Resize to this (width, height) first. If None, the source size is kept.
    pub target_size: Option<(u32, u32)>,
    /// How to resize when target_size is set.
    pub resize_mode: ResizeMode,
    /// Random crop of this (width, height) after resizing; clamped to the image size.
    pub crop_size: Option<(u32, u32)>,
    /// Probability of a horizontal flip.
    pub flip_horizontal_prob: f32,
    /// Subtracted per channel after scaling to [0, 1].
    pub mean: [f32; 3],
    /// Divides per channel after mean subtraction.
    pub std: [f32; 3],
    /// Seed for reproducible crops/flips; mixed with the sample key.
    pub seed: Option<u64>,
}

impl Default for TransformPipeline {
    fn default() -> Self {
        Self::identity()
    }
}

impl TransformPipeline {
    /// Scale to [0, 1] only.
    pub fn identity() -> Self {
        Self {
            target_size: None,
            resize_mode: ResizeMode::Force,
            crop_size: None,
            flip_horizontal_prob: 0.0,
            mean: [0.0; 3],
            std: [1.0; 3],
            seed: None,
        }
    }

    /// Training transform for caption images: 256x256 resize, random 224 crop,
    /// horizontal flip, ImageNet normalization.
    pub fn caption_train() -> Self {
        Self {
            target_size: Some((256, 256)),
            resize_mode: ResizeMode::Force,
            crop_size: Some((224, 224)),
            flip_horizontal_prob: 0.5,
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
            seed: None,
        }
    }

    /// Deterministic caption transform: 224x224 resize, ImageNet normalization.
    pub fn caption_eval() -> Self {
        Self {
            target_size: Some((224, 224)),
            resize_mode: ResizeMode::Force,
            crop_size: None,
            flip_horizontal_prob: 0.0,
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
            seed: None,
        }
    }

    pub fn describe(&self) -> String {
        let dims = |d: Option<(u32, u32)>| {
            d.map(|(w, h)| format!("{w}x{h}"))
                .unwrap_or_else(|| "none".to_string())
        };
        format!(
            "target_size={} resize={:?} crop={} flip_p={:.2} mean={:?} std={:?} seed={}",
            dims(self.target_size),
            self.resize_mode,
            dims(self.crop_size),
            self.flip_horizontal_prob,
            self.mean,
            self.std,
            self.seed
                .map(|s| s.to_string())
                .unwrap_or_else(|| "none".to_string())
        )
    }

    /// Apply the pipeline. `sample_key` makes seeded randomness differ per sample.
    pub fn apply(&self, img: RgbImage, sample_key: u64) -> DatasetResult<ImageChw> {
        let mut rng_local;
        let mut seeded_rng;
        let rng: &mut dyn rand::RngCore = if let Some(seed) = self.seed {
            seeded_rng = rand::rngs::StdRng::seed_from_u64(seed ^ sample_key);
            &mut seeded_rng
        } else {
            rng_local = rand::rng();
            &mut rng_local
        };

        let mut img = match self.target_size {
            Some((w, h)) => match self.resize_mode {
                ResizeMode::Force => image::imageops::resize(&img, w, h, FilterType::Triangle),
                ResizeMode::Letterbox => letterbox_resize(&img, w, h),
            },
            None => img,
        };
        if let Some((cw, ch)) = self.crop_size {
            img = random_crop(&img, cw, ch, rng);
        }
        maybe_hflip(&mut img, self.flip_horizontal_prob, rng);
        Ok(to_chw(&img, self.mean, self.std))
    }
}

#[derive(Debug, Clone)]
pub struct TransformPipelineBuilder {
    inner: TransformPipeline,
}

impl Default for TransformPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformPipelineBuilder {
    pub fn new() -> Self {
        Self {
            inner: TransformPipeline::identity(),
        }
    }
    pub fn target_size(mut self, size: Option<(u32, u32)>) -> Self {
        self.inner.target_size = size;
        self
    }
    pub fn resize_mode(mut self, mode: ResizeMode) -> Self {
        self.inner.resize_mode = mode;
        self
    }
    pub fn crop_size(mut self, size: Option<(u32, u32)>) -> Self {
        self.inner.crop_size = size;
        self
    }
    pub fn flip_horizontal_prob(mut self, p: f32) -> Self {
        self.inner.flip_horizontal_prob = p;
        self
    }
    pub fn normalize(mut self, mean: [f32; 3], std: [f32; 3]) -> Self {
        self.inner.mean = mean;
        self.inner.std = std;
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.inner.seed = seed;
        self
    }
    pub fn build(self) -> TransformPipeline {
        self.inner
    }
}

/// Pixels scaled to [0, 1], then `(v - mean) / std`, laid out channel-major.
pub(crate) fn to_chw(img: &RgbImage, mean: [f32; 3], std: [f32; 3]) -> ImageChw {
    let (width, height) = img.dimensions();
    let plane = (width * height) as usize;
    let mut data = vec![0.0f32; plane * 3];
    for (x, y, pixel) in img.enumerate_pixels() {
        let base = (y * width + x) as usize;
        for c in 0..3 {
            let v = pixel[c] as f32 / 255.0;
            data[c * plane + base] = (v - mean[c]) / std[c];
        }
    }
    ImageChw {
        data,
        width,
        height,
    }
}

fn letterbox_resize(img: &RgbImage, target_w: u32, target_h: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    let scale = f32::min(target_w as f32 / w as f32, target_h as f32 / h as f32);
    let new_w = ((w as f32 * scale).round() as u32).clamp(1, target_w);
    let new_h = ((h as f32 * scale).round() as u32).clamp(1, target_h);
    let resized = image::imageops::resize(img, new_w, new_h, FilterType::Triangle);

    let pad_w = (target_w - new_w) / 2;
    let pad_h = (target_h - new_h) / 2;

    let mut canvas = RgbImage::new(target_w, target_h);
    image::imageops::replace(&mut canvas, &resized, pad_w.into(), pad_h.into());
    canvas
}

fn random_crop(img: &RgbImage, crop_w: u32, crop_h: u32, rng: &mut dyn rand::RngCore) -> RgbImage {
    let (w, h) = img.dimensions();
    let cw = crop_w.min(w);
    let ch = crop_h.min(h);
    let x0 = if w > cw { rng.random_range(0..=w - cw) } else { 0 };
    let y0 = if h > ch { rng.random_range(0..=h - ch) } else { 0 };
    image::imageops::crop_imm(img, x0, y0, cw, ch).to_image()
}

pub(crate) fn maybe_hflip(img: &mut RgbImage, prob: f32, rng: &mut dyn rand::RngCore) {
    if prob <= 0.0 {
        return;
    }
    if rng.random_range(0.0..1.0) < prob {
        image::imageops::flip_horizontal_in_place(img);
    }
}
