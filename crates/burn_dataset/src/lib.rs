//! Dataset adapters for detection and captioning, plus Burn-compatible batching.
//!
//! This crate provides utilities for:
//! - Loading detection samples from an annotation table and an image folder
//! - Loading caption samples from a COCO-style corpus
//! - Image resize/crop/flip/normalize pipelines
//! - Offline folder resizing
//! - Annotation quality checks
//! - Batch iteration and collation into Burn tensors

pub mod aug;
pub mod captioning;
pub mod detection;
pub mod resize;
pub mod types;
pub mod validation;

#[cfg(feature = "burn-runtime")]
pub mod batch;

pub use aug::{TransformPipeline, TransformPipelineBuilder, IMAGENET_MEAN, IMAGENET_STD};
pub use captioning::{build_token_counter, CaptionDataset};
pub use detection::{ClassMap, DetectionDataset, BACKGROUND_LABEL, DETECTION_IMAGE_SIZE};
pub use resize::resize_images_in_folder;
pub use types::*;
pub use validation::{summarize_detection_table, summarize_with_thresholds, validate_summary};

#[cfg(feature = "burn-runtime")]
pub use batch::{
    collate_captions, collate_detection, BatchConfig, BatchIter, CaptionBatch, DetectionBatch,
    DetectionTargetTensors,
};
