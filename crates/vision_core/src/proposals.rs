//! Assign ground-truth classes and regression offsets to region candidates.

use crate::geometry::{iou, BoundingBox};
use serde::{Deserialize, Serialize};

/// Class index reserved for candidates that match no ground-truth box.
pub const BACKGROUND_CLASS: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateLabel {
    pub candidate: BoundingBox,
    /// Best IoU against any ground-truth box (0 when there is none).
    pub best_iou: f32,
    /// Index into the ground-truth list of the best match, if any.
    pub matched: Option<usize>,
    pub class: usize,
    /// `(gt - candidate) / [w, h, w, h]` in image-normalized units.
    pub deltas: [f32; 4],
}

/// Label each candidate with the class of its best-overlapping ground-truth box when
/// that overlap exceeds `iou_threshold`, otherwise [`BACKGROUND_CLASS`].
pub fn label_candidates(
    candidates: &[BoundingBox],
    ground_truth: &[(BoundingBox, usize)],
    image_size: (u32, u32),
    iou_threshold: f32,
) -> Vec<CandidateLabel> {
    let (w, h) = (image_size.0.max(1) as f32, image_size.1.max(1) as f32);
    candidates
        .iter()
        .map(|cand| {
            let best = ground_truth
                .iter()
                .enumerate()
                .map(|(i, (gt, _))| (i, iou(cand, gt)))
                .fold(None::<(usize, f32)>, |acc, (i, score)| match acc {
                    Some((_, best)) if best >= score => acc,
                    _ => Some((i, score)),
                });
            match best {
                Some((idx, best_iou)) => {
                    let (gt, label) = ground_truth[idx];
                    let class = if best_iou > iou_threshold {
                        label
                    } else {
                        BACKGROUND_CLASS
                    };
                    CandidateLabel {
                        candidate: *cand,
                        best_iou,
                        matched: Some(idx),
                        class,
                        deltas: [
                            (gt.x1 - cand.x1) / w,
                            (gt.y1 - cand.y1) / h,
                            (gt.x2 - cand.x2) / w,
                            (gt.y2 - cand.y2) / h,
                        ],
                    }
                }
                None => CandidateLabel {
                    candidate: *cand,
                    best_iou: 0.0,
                    matched: None,
                    class: BACKGROUND_CLASS,
                    deltas: [0.0; 4],
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_candidate_takes_gt_class() {
        let gt = [
            (BoundingBox::new(0.0, 0.0, 50.0, 50.0), 3),
            (BoundingBox::new(60.0, 60.0, 100.0, 100.0), 5),
        ];
        let cands = [
            BoundingBox::new(5.0, 5.0, 50.0, 50.0),
            BoundingBox::new(0.0, 60.0, 20.0, 100.0),
        ];
        let labels = label_candidates(&cands, &gt, (100, 100), 0.3);
        assert_eq!(labels[0].class, 3);
        assert_eq!(labels[0].matched, Some(0));
        assert!((labels[0].deltas[0] + 0.05).abs() < 1e-6);
        assert_eq!(labels[0].deltas[2], 0.0);
        assert_eq!(labels[1].class, BACKGROUND_CLASS);
        assert_eq!(labels[1].best_iou, 0.0);
    }

    #[test]
    fn no_ground_truth_means_background() {
        let cands = [BoundingBox::new(0.0, 0.0, 10.0, 10.0)];
        let labels = label_candidates(&cands, &[], (10, 10), 0.3);
        assert_eq!(labels[0].class, BACKGROUND_CLASS);
        assert_eq!(labels[0].matched, None);
    }
}
