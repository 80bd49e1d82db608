//! vision_core: box geometry, region-candidate filtering and proposal labelling.

pub mod geometry;
pub mod overlay;
pub mod proposals;
pub mod regions;

pub use geometry::{iou, iou_with_epsilon, nms, BoundingBox, IOU_EPSILON};
pub use proposals::{label_candidates, CandidateLabel, BACKGROUND_CLASS};
pub use regions::{
    extract_candidate_boxes, filter_candidates, CandidateFilter, RawRegion, RegionProposer,
};

pub mod prelude {
    pub use crate::geometry::*;
    pub use crate::overlay::*;
    pub use crate::proposals::*;
    pub use crate::regions::*;
}
