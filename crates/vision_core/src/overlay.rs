use crate::geometry::BoundingBox;
use image::{Rgb, RgbImage};

/// Clamp a pixel box to image bounds. Returns `None` for degenerate or fully outside boxes.
pub fn clamp_to_image(bbox: &BoundingBox, dims: (u32, u32)) -> Option<[u32; 4]> {
    let (w, h) = dims;
    if w == 0 || h == 0 || bbox.is_degenerate() {
        return None;
    }
    if bbox.x1 >= w as f32 || bbox.y1 >= h as f32 || bbox.x2 < 0.0 || bbox.y2 < 0.0 {
        return None;
    }
    let clamp = |v: f32, max: u32| -> u32 { v.max(0.0).min((max - 1) as f32) as u32 };
    Some([
        clamp(bbox.x1, w),
        clamp(bbox.y1, h),
        clamp(bbox.x2, w),
        clamp(bbox.y2, h),
    ])
}

/// Draw a rectangle border with given thickness.
pub fn draw_box(img: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    let (w, h) = img.dimensions();
    let Some([x0, y0, x1, y1]) = clamp_to_image(bbox, (w, h)) else {
        return;
    };
    for t in 0..thickness {
        let xx0 = x0.saturating_add(t);
        let yy0 = y0.saturating_add(t);
        let xx1 = x1.saturating_sub(t);
        let yy1 = y1.saturating_sub(t);
        if xx0 > xx1 || yy0 > yy1 {
            break;
        }
        for x in xx0..=xx1 {
            img.put_pixel(x, yy0, color);
            img.put_pixel(x, yy1, color);
        }
        for y in yy0..=yy1 {
            img.put_pixel(xx0, y, color);
            img.put_pixel(xx1, y, color);
        }
    }
}
