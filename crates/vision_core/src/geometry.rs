//! Axis-aligned boxes in absolute pixel coordinates and overlap scoring.

use serde::{Deserialize, Serialize};

/// Added to the IoU denominator so zero-area unions do not divide by zero.
pub const IOU_EPSILON: f32 = 1e-5;

/// Box `[x1, y1, x2, y2]` in pixels. Boxes with `x2 < x1` or `y2 < y1` are degenerate
/// and never overlap anything.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build from a segmentation-style `(x, y, width, height)` rectangle.
    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    pub fn from_array(b: [f32; 4]) -> Self {
        Self::new(b[0], b[1], b[2], b[3])
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn is_degenerate(&self) -> bool {
        self.x2 < self.x1 || self.y2 < self.y1
    }

    /// Signed area; negative for degenerate boxes.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(b: [f32; 4]) -> Self {
        Self::from_array(b)
    }
}

/// Intersection-over-union with the default epsilon.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    iou_with_epsilon(a, b, IOU_EPSILON)
}

/// Overlap divided by `area_a + area_b - overlap + epsilon`.
///
/// Returns exactly `0.0` whenever the intersection has negative width or height.
/// `epsilon` only enters the denominator.
pub fn iou_with_epsilon(a: &BoundingBox, b: &BoundingBox, epsilon: f32) -> f32 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);
    let width = x2 - x1;
    let height = y2 - y1;
    if width < 0.0 || height < 0.0 {
        return 0.0;
    }
    let overlap = width * height;
    let combined = a.area() + b.area() - overlap;
    overlap / (combined + epsilon)
}

/// Greedy non-max suppression. Returns indices of kept boxes, highest score first.
pub fn nms(boxes: &[BoundingBox], scores: &[f32], iou_thresh: f32) -> Vec<usize> {
    let n = boxes.len().min(scores.len());
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    while !order.is_empty() {
        let i = order.remove(0);
        keep.push(i);
        order.retain(|&j| iou(&boxes[i], &boxes[j]) <= iou_thresh);
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_boxes_score_one() {
        let b = BoundingBox::new(10.0, 10.0, 50.0, 40.0);
        assert!((iou(&b, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_is_symmetric() {
        let pairs = [
            (
                BoundingBox::new(0.0, 0.0, 10.0, 10.0),
                BoundingBox::new(5.0, 5.0, 15.0, 15.0),
            ),
            (
                BoundingBox::new(0.0, 0.0, 100.0, 20.0),
                BoundingBox::new(30.0, -5.0, 40.0, 60.0),
            ),
            (
                BoundingBox::new(0.0, 0.0, 1.0, 1.0),
                BoundingBox::new(3.0, 3.0, 4.0, 4.0),
            ),
        ];
        for (a, b) in pairs {
            assert_eq!(iou(&a, &b), iou(&b, &a));
        }
    }

    #[test]
    fn half_overlap_matches_hand_computation() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 0.0, 15.0, 10.0);
        // overlap 50, union 150
        let expected = 50.0 / (150.0 + IOU_EPSILON);
        assert!((iou(&a, &b) - expected).abs() < 1e-7);
    }

    #[test]
    fn disjoint_boxes_score_zero() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, 0.0, 30.0, 10.0);
        assert_eq!(iou(&a, &b), 0.0);
        let c = BoundingBox::new(0.0, 11.0, 10.0, 20.0);
        assert_eq!(iou(&a, &c), 0.0);
    }

    #[test]
    fn touching_boxes_score_zero() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
        assert_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn degenerate_box_never_overlaps() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let flipped = BoundingBox::new(8.0, 2.0, 4.0, 6.0);
        assert!(flipped.is_degenerate());
        assert_eq!(iou(&a, &flipped), 0.0);
        assert_eq!(iou(&flipped, &a), 0.0);
    }

    #[test]
    fn zero_area_boxes_do_not_divide_by_zero() {
        let p = BoundingBox::new(3.0, 3.0, 3.0, 3.0);
        let v = iou(&p, &p);
        assert!(v.is_finite());
        assert_eq!(v, 0.0);
    }

    #[test]
    fn nms_keeps_best_of_overlapping_pair() {
        let boxes = vec![
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            BoundingBox::new(1.0, 1.0, 11.0, 11.0),
            BoundingBox::new(50.0, 50.0, 60.0, 60.0),
        ];
        let scores = vec![0.6, 0.9, 0.3];
        assert_eq!(nms(&boxes, &scores, 0.5), vec![1, 2]);
    }
}
