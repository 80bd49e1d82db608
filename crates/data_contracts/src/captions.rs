//! COCO-style caption corpus: `images` give file names, `annotations` give captions.

use crate::error::{ContractError, ContractResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionImage {
    pub id: u64,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionAnnotation {
    pub id: u64,
    pub image_id: u64,
    pub caption: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptionCorpus {
    #[serde(default)]
    pub images: Vec<CaptionImage>,
    #[serde(default)]
    pub annotations: Vec<CaptionAnnotation>,
    #[serde(skip)]
    image_index: HashMap<u64, usize>,
}

impl CaptionCorpus {
    pub fn new(images: Vec<CaptionImage>, annotations: Vec<CaptionAnnotation>) -> ContractResult<Self> {
        let mut corpus = Self {
            images,
            annotations,
            image_index: HashMap::new(),
        };
        corpus.reindex()?;
        Ok(corpus)
    }

    pub fn from_path(path: &Path) -> ContractResult<Self> {
        let raw = std::fs::read(path).map_err(|e| ContractError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_slice(&raw)
    }

    pub fn from_slice(raw: &[u8]) -> ContractResult<Self> {
        let mut corpus: CaptionCorpus = serde_json::from_slice(raw)?;
        corpus.reindex()?;
        Ok(corpus)
    }

    fn reindex(&mut self) -> ContractResult<()> {
        self.image_index.clear();
        for (pos, image) in self.images.iter().enumerate() {
            if self.image_index.insert(image.id, pos).is_some() {
                return Err(ContractError::DuplicateImage(image.id));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn image(&self, image_id: u64) -> Option<&CaptionImage> {
        self.image_index.get(&image_id).map(|&pos| &self.images[pos])
    }

    /// Resolve the image file name for an annotation.
    pub fn file_name_for(&self, annotation: &CaptionAnnotation) -> ContractResult<&str> {
        self.image(annotation.image_id)
            .map(|img| img.file_name.as_str())
            .ok_or(ContractError::UnknownImage {
                annotation_id: annotation.id,
                image_id: annotation.image_id,
            })
    }

    pub fn captions(&self) -> impl Iterator<Item = &str> {
        self.annotations.iter().map(|a| a.caption.as_str())
    }
}
