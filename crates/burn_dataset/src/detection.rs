//! Object-detection dataset over an annotation table and an image directory.

use crate::aug::to_chw;
use crate::types::{Dataset, DatasetError, DatasetResult, DetectionSample, DetectionTarget};
use data_contracts::AnnotationTable;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use vision_core::BACKGROUND_CLASS;

/// Output side length for detection images.
pub const DETECTION_IMAGE_SIZE: u32 = 224;

pub const BACKGROUND_LABEL: &str = "background";

/// Label name <-> class index. `background` always holds index 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ClassMap {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Default for ClassMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassMap {
    pub fn new() -> Self {
        let mut map = Self {
            names: Vec::new(),
            index: HashMap::new(),
        };
        map.insert(BACKGROUND_LABEL);
        map
    }

    /// Background first, then every label of the table in first-seen order.
    pub fn from_table(table: &AnnotationTable) -> Self {
        Self::from_labels(table.label_names())
    }

    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::new();
        for label in labels {
            map.insert(label.as_ref());
        }
        map
    }

    pub fn insert(&mut self, label: &str) -> usize {
        if let Some(&idx) = self.index.get(label) {
            return idx;
        }
        let idx = self.names.len();
        self.index.insert(label.to_string(), idx);
        self.names.push(label.to_string());
        idx
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl TryFrom<Vec<String>> for ClassMap {
    type Error = String;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        if names.first().map(String::as_str) != Some(BACKGROUND_LABEL) {
            return Err(format!("class {BACKGROUND_CLASS} must be {BACKGROUND_LABEL:?}"));
        }
        let mut map = Self::new();
        for name in names.iter().skip(1) {
            if map.index_of(name).is_some() {
                return Err(format!("duplicate class {name:?}"));
            }
            map.insert(name);
        }
        Ok(map)
    }
}

impl From<ClassMap> for Vec<String> {
    fn from(map: ClassMap) -> Self {
        map.names
    }
}

/// One item per distinct image id, in first-seen table order.
#[derive(Debug, Clone)]
pub struct DetectionDataset {
    table: AnnotationTable,
    image_dir: PathBuf,
    files: Vec<PathBuf>,
    image_ids: Vec<String>,
    classes: ClassMap,
    width: u32,
    height: u32,
}

impl DetectionDataset {
    pub fn new(table: AnnotationTable, image_dir: &Path, classes: ClassMap) -> DatasetResult<Self> {
        let files = list_files(image_dir)?;
        let image_ids = table.image_ids().into_iter().map(str::to_string).collect();
        Ok(Self {
            table,
            image_dir: image_dir.to_path_buf(),
            files,
            image_ids,
            classes,
            width: DETECTION_IMAGE_SIZE,
            height: DETECTION_IMAGE_SIZE,
        })
    }

    /// Override the output image size (default 224x224).
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn classes(&self) -> &ClassMap {
        &self.classes
    }

    pub fn image_ids(&self) -> &[String] {
        &self.image_ids
    }

    /// Image file for `image_id`: exact file-stem match, else the first file whose
    /// name contains the id.
    pub fn find_image(&self, image_id: &str) -> DatasetResult<&Path> {
        find_image_in(&self.files, image_id)
            .map(PathBuf::as_path)
            .ok_or_else(|| DatasetError::ImageNotFound {
                image_id: image_id.to_string(),
                dir: self.image_dir.clone(),
            })
    }

    fn target_for(&self, image_id: &str) -> DatasetResult<DetectionTarget> {
        let mut target = DetectionTarget::default();
        for row in self.table.rows_for(image_id) {
            let label = self
                .classes
                .index_of(&row.label_name)
                .ok_or_else(|| DatasetError::UnknownLabel {
                    image_id: image_id.to_string(),
                    label: row.label_name.clone(),
                })?;
            target
                .boxes
                .push(row.bbox_px(self.width, self.height).map(|v| v as f32));
            target.labels.push(label as i64);
        }
        Ok(target)
    }
}

impl Dataset for DetectionDataset {
    type Item = DetectionSample;

    fn len(&self) -> usize {
        self.image_ids.len()
    }

    fn get(&self, index: usize) -> DatasetResult<DetectionSample> {
        let image_id = self
            .image_ids
            .get(index)
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.image_ids.len(),
            })?;
        let path = self.find_image(image_id)?;
        let rgb = load_rgb(path)?;
        let resized = image::imageops::resize(&rgb, self.width, self.height, FilterType::Triangle);
        let target = self.target_for(image_id)?;
        debug!(
            image_id = image_id.as_str(),
            boxes = target.boxes.len(),
            path = %path.display(),
            "loaded detection sample"
        );
        Ok(DetectionSample {
            image_id: image_id.clone(),
            image: to_chw(&resized, [0.0; 3], [1.0; 3]),
            target,
        })
    }
}

pub(crate) fn load_rgb(path: &Path) -> DatasetResult<image::RgbImage> {
    Ok(image::open(path)
        .map_err(|e| DatasetError::Image {
            path: path.to_path_buf(),
            source: e,
        })?
        .to_rgb8())
}

/// Regular files directly under `dir`, sorted by path.
pub(crate) fn list_files(dir: &Path) -> DatasetResult<Vec<PathBuf>> {
    let io_err = |e| DatasetError::Io {
        path: dir.to_path_buf(),
        source: e,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn find_image_in<'a>(files: &'a [PathBuf], image_id: &str) -> Option<&'a PathBuf> {
    let stem_match = files
        .iter()
        .find(|p| p.file_stem().and_then(|s| s.to_str()) == Some(image_id));
    stem_match.or_else(|| {
        files.iter().find(|p| {
            p.file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|name| name.contains(image_id))
        })
    })
}
