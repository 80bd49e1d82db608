//! Core types, error definitions, and data structures for burn_dataset.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Contract(#[from] data_contracts::ContractError),
    #[error("no image file matching id {image_id} under {dir}")]
    ImageNotFound { image_id: String, dir: PathBuf },
    #[error("image decode error at {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("label {label:?} for image {image_id} is not in the class map")]
    UnknownLabel { image_id: String, label: String },
    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("{0}")]
    Other(String),
}

/// Dataset item lookup by position, one file read per call.
pub trait Dataset {
    type Item;

    fn len(&self) -> usize;

    fn get(&self, index: usize) -> DatasetResult<Self::Item>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeMode {
    /// Stretch to fill the target dimensions (may distort boxes).
    Force,
    /// Preserve aspect ratio; pad to target with zeros.
    Letterbox,
}

/// Image tensor data in CHW order.
#[derive(Debug, Clone)]
pub struct ImageChw {
    pub data: Vec<f32>,
    pub width: u32,
    pub height: u32,
}

impl ImageChw {
    pub fn shape(&self) -> [usize; 3] {
        [3, self.height as usize, self.width as usize]
    }
}

/// Absolute-pixel boxes and class indices for one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionTarget {
    pub boxes: Vec<[f32; 4]>,
    pub labels: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct DetectionSample {
    pub image_id: String,
    /// Image scaled to [0, 1].
    pub image: ImageChw,
    pub target: DetectionTarget,
}

#[derive(Debug, Clone)]
pub struct CaptionSample {
    pub annotation_id: u64,
    pub image: ImageChw,
    /// `<start>`, caption tokens, `<end>` as vocabulary indices.
    pub caption: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    Pass,
    Warn,
    Fail,
}

impl ValidationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationOutcome::Pass => "pass",
            ValidationOutcome::Warn => "warn",
            ValidationOutcome::Fail => "fail",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub images: usize,
    pub rows: usize,
    pub invalid_rows: usize,
    pub missing_images: usize,
    pub unknown_labels: usize,
    pub classes: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationThresholds {
    pub max_invalid: Option<usize>,
    pub max_missing: Option<usize>,
    pub max_invalid_ratio: Option<f32>,
    pub max_missing_ratio: Option<f32>,
}

impl ValidationThresholds {
    pub fn from_env() -> Self {
        fn parse<T: std::str::FromStr>(key: &str) -> Option<T> {
            std::env::var(key).ok()?.trim().parse().ok()
        }
        ValidationThresholds {
            max_invalid: parse("VISIONLAB_MAX_INVALID"),
            max_missing: parse("VISIONLAB_MAX_MISSING"),
            max_invalid_ratio: parse("VISIONLAB_MAX_INVALID_RATIO"),
            max_missing_ratio: parse("VISIONLAB_MAX_MISSING_RATIO"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub outcome: ValidationOutcome,
    pub reasons: Vec<String>,
    pub summary: DatasetSummary,
}
