//! Detection annotation table: one row per labelled box, coordinates normalized to 0..1.

use crate::error::{ContractError, ContractResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionAnnotation {
    #[serde(rename = "ImageID")]
    pub image_id: String,
    #[serde(rename = "LabelName")]
    pub label_name: String,
    #[serde(rename = "XMin")]
    pub x_min: f32,
    #[serde(rename = "YMin")]
    pub y_min: f32,
    #[serde(rename = "XMax")]
    pub x_max: f32,
    #[serde(rename = "YMax")]
    pub y_max: f32,
}

impl DetectionAnnotation {
    /// Normalized box `[x_min, y_min, x_max, y_max]`.
    pub fn bbox_norm(&self) -> [f32; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }

    /// Box scaled to a `width` x `height` image, truncated to whole pixels.
    pub fn bbox_px(&self, width: u32, height: u32) -> [u32; 4] {
        let (w, h) = (width as f32, height as f32);
        [
            (self.x_min * w) as u32,
            (self.y_min * h) as u32,
            (self.x_max * w) as u32,
            (self.y_max * h) as u32,
        ]
    }

    pub fn validate(&self) -> ContractResult<()> {
        if self.image_id.trim().is_empty() {
            return Err(ContractError::EmptyImageId);
        }
        if self.label_name.trim().is_empty() {
            return Err(ContractError::EmptyLabel {
                image_id: self.image_id.clone(),
            });
        }
        let bbox = self.bbox_norm();
        let in_range = bbox.iter().all(|v| !v.is_nan() && *v >= 0.0 && *v <= 1.0);
        if !in_range || bbox[0] > bbox[2] || bbox[1] > bbox[3] {
            return Err(ContractError::InvalidBbox {
                image_id: self.image_id.clone(),
                bbox,
            });
        }
        Ok(())
    }
}

/// Parsed annotation table. Row order is file order; extra CSV columns are ignored.
#[derive(Debug, Clone, Default)]
pub struct AnnotationTable {
    rows: Vec<DetectionAnnotation>,
}

impl AnnotationTable {
    pub fn from_rows(rows: Vec<DetectionAnnotation>) -> Self {
        Self { rows }
    }

    pub fn from_csv_path(path: &Path) -> ContractResult<Self> {
        let file = File::open(path).map_err(|e| ContractError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> ContractResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let rows = csv_reader
            .deserialize::<DetectionAnnotation>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[DetectionAnnotation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct image ids in order of first appearance.
    pub fn image_ids(&self) -> Vec<&str> {
        unique_in_order(self.rows.iter().map(|r| r.image_id.as_str()))
    }

    /// Distinct label names in order of first appearance.
    pub fn label_names(&self) -> Vec<&str> {
        unique_in_order(self.rows.iter().map(|r| r.label_name.as_str()))
    }

    pub fn rows_for<'a>(
        &'a self,
        image_id: &'a str,
    ) -> impl Iterator<Item = &'a DetectionAnnotation> + 'a {
        self.rows.iter().filter(move |r| r.image_id == image_id)
    }
}

fn unique_in_order<'a>(items: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(*item)).collect()
}
