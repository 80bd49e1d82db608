//! Region candidates from an external segmentation routine and the area filter applied to them.

use crate::geometry::BoundingBox;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A proposed rectangle plus the pixel area of the segment that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawRegion {
    pub rect: BoundingBox,
    pub size: u64,
}

impl RawRegion {
    pub fn new(rect: BoundingBox, size: u64) -> Self {
        Self { rect, size }
    }
}

/// Area bounds, as fractions of the image area, that a candidate must fall within.
/// Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateFilter {
    pub min_area_fraction: f64,
    pub max_area_fraction: f64,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self {
            min_area_fraction: 0.05,
            max_area_fraction: 1.0,
        }
    }
}

impl CandidateFilter {
    pub fn new(min_area_fraction: f64, max_area_fraction: f64) -> Self {
        Self {
            min_area_fraction,
            max_area_fraction,
        }
    }

    /// Keep regions whose size lies in the configured bounds, skipping rectangles
    /// already accepted. Output order is order of first acceptance.
    pub fn apply(&self, regions: &[RawRegion], image_area: u64) -> Vec<BoundingBox> {
        let min_size = self.min_area_fraction * image_area as f64;
        let max_size = self.max_area_fraction * image_area as f64;
        let mut candidates: Vec<BoundingBox> = Vec::new();
        for region in regions {
            if candidates.contains(&region.rect) {
                continue;
            }
            let size = region.size as f64;
            if size < min_size || size > max_size {
                continue;
            }
            candidates.push(region.rect);
        }
        debug!(
            raw = regions.len(),
            kept = candidates.len(),
            image_area,
            "filtered region candidates"
        );
        candidates
    }
}

/// Filter with the default bounds (5%..=100% of the image area).
pub fn filter_candidates(regions: &[RawRegion], image_area: u64) -> Vec<BoundingBox> {
    CandidateFilter::default().apply(regions, image_area)
}

/// Segmentation routine producing raw regions for an image (e.g. selective search).
pub trait RegionProposer {
    fn propose(&self, image: &RgbImage) -> Vec<RawRegion>;
}

impl<F> RegionProposer for F
where
    F: Fn(&RgbImage) -> Vec<RawRegion>,
{
    fn propose(&self, image: &RgbImage) -> Vec<RawRegion> {
        self(image)
    }
}

/// Run a proposer on `image` and filter its output against the image's pixel area.
pub fn extract_candidate_boxes<P: RegionProposer + ?Sized>(
    proposer: &P,
    image: &RgbImage,
) -> Vec<BoundingBox> {
    let (w, h) = image.dimensions();
    let regions = proposer.propose(image);
    filter_candidates(&regions, u64::from(w) * u64::from(h))
}
