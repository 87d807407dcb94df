// ============================================================================
// CANVAS OPERATIONS - crop and freehand brush painting
// ============================================================================

use image::{Rgba, RgbaImage, imageops};

use crate::error::{EditorError, Result};

// ---------------------------------------------------------------------------
//  Crop
// ---------------------------------------------------------------------------

/// A requested crop rectangle in image pixel coordinates. May extend past
/// the image; `resolve` clips it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRegion {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl CropRegion {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self { x, y, width, height }
    }

    /// Region spanned by two drag corners, in either order. Negative
    /// coordinates are pulled in to the image edge first.
    pub fn from_corners(a: (i64, i64), b: (i64, i64)) -> Self {
        let (x1, x2) = sorted(a.0.max(0), b.0.max(0));
        let (y1, y2) = sorted(a.1.max(0), b.1.max(0));
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Clip against a `img_w`×`img_h` image and return `(x, y, w, h)`.
    ///
    /// Fails with `InvalidCropRegion` when the requested extent is zero or
    /// negative, or when nothing of it lies inside the image.
    pub fn resolve(&self, img_w: u32, img_h: u32) -> Result<(u32, u32, u32, u32)> {
        if self.width <= 0 || self.height <= 0 {
            return Err(EditorError::InvalidCropRegion { width: self.width, height: self.height });
        }
        let x1 = self.x.clamp(0, img_w as i64);
        let y1 = self.y.clamp(0, img_h as i64);
        let x2 = self.x.saturating_add(self.width).clamp(0, img_w as i64);
        let y2 = self.y.saturating_add(self.height).clamp(0, img_h as i64);
        let (w, h) = (x2 - x1, y2 - y1);
        if w <= 0 || h <= 0 {
            return Err(EditorError::InvalidCropRegion { width: w, height: h });
        }
        Ok((x1 as u32, y1 as u32, w as u32, h as u32))
    }
}

fn sorted(a: i64, b: i64) -> (i64, i64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Cut `region` out of `src`.
pub fn crop(src: &RgbaImage, region: CropRegion) -> Result<RgbaImage> {
    let (x, y, w, h) = region.resolve(src.width(), src.height())?;
    Ok(imageops::crop_imm(src, x, y, w, h).to_image())
}

// ---------------------------------------------------------------------------
//  Brush
// ---------------------------------------------------------------------------

/// Paint a filled round dab of diameter `size` centred on `center`.
pub fn stamp_dot(img: &mut RgbaImage, center: (i64, i64), size: u32, color: Rgba<u8>) {
    draw_segment(img, center, center, size, color);
}

/// Paint a straight stroke of width `size` with round caps from `from` to
/// `to`. Pixels are overwritten, not blended.
pub fn draw_segment(
    img: &mut RgbaImage,
    from: (i64, i64),
    to: (i64, i64),
    size: u32,
    color: Rgba<u8>,
) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    if w == 0 || h == 0 {
        return;
    }
    let radius = size.max(1) as f32 * 0.5;
    let reach = radius.ceil() as i64;

    let min_x = (from.0.min(to.0) - reach).max(0);
    let max_x = (from.0.max(to.0) + reach).min(w - 1);
    let min_y = (from.1.min(to.1) - reach).max(0);
    let max_y = (from.1.max(to.1) + reach).min(h - 1);
    if min_x > max_x || min_y > max_y {
        return;
    }

    let r2 = radius * radius;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if dist2_to_segment((x, y), from, to) <= r2 {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// Squared distance from `p` to the segment `a`–`b`.
fn dist2_to_segment(p: (i64, i64), a: (i64, i64), b: (i64, i64)) -> f32 {
    let (px, py) = (p.0 as f32, p.1 as f32);
    let (ax, ay) = (a.0 as f32, a.1 as f32);
    let (bx, by) = (b.0 as f32, b.1 as f32);
    let (dx, dy) = (bx - ax, by - ay);
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 {
        (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    (px - cx) * (px - cx) + (py - cy) * (py - cy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn test_crop_from_corners_any_order() {
        let img = RgbaImage::from_fn(10, 10, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let out = crop(&img, CropRegion::from_corners((7, 8), (2, 3))).unwrap();
        assert_eq!(out.dimensions(), (5, 5));
        assert_eq!(out.get_pixel(0, 0), &Rgba([2, 3, 0, 255]));
    }

    #[test]
    fn test_crop_zero_extent_is_invalid() {
        let img = RgbaImage::new(10, 10);
        let region = CropRegion::from_corners((4, 1), (4, 9));
        assert!(matches!(crop(&img, region), Err(EditorError::InvalidCropRegion { width: 0, .. })));
    }

    #[test]
    fn test_crop_negative_extent_is_invalid() {
        let img = RgbaImage::new(10, 10);
        assert!(crop(&img, CropRegion::new(5, 5, -3, 2)).is_err());
        assert!(crop(&img, CropRegion::new(5, 5, 3, -2)).is_err());
    }

    #[test]
    fn test_crop_clips_to_image() {
        let region = CropRegion::from_corners((-5, -5), (50, 3));
        assert_eq!(region.resolve(10, 6).unwrap(), (0, 0, 10, 3));
    }

    #[test]
    fn test_extreme_region_does_not_overflow() {
        let region = CropRegion::new(i64::MAX - 1, 2, i64::MAX, 3);
        assert!(region.resolve(10, 10).is_err());
        let huge = CropRegion::new(2, 1, i64::MAX, i64::MAX);
        assert_eq!(huge.resolve(10, 6).unwrap(), (2, 1, 8, 5));
    }

    #[test]
    fn test_crop_entirely_outside_is_invalid() {
        assert!(CropRegion::new(20, 20, 5, 5).resolve(10, 10).is_err());
    }

    #[test]
    fn test_stamp_dot_covers_center_only_within_radius() {
        let mut img = RgbaImage::from_pixel(11, 11, WHITE);
        stamp_dot(&mut img, (5, 5), 5, RED);
        assert_eq!(img.get_pixel(5, 5), &RED);
        assert_eq!(img.get_pixel(7, 5), &RED);
        assert_eq!(img.get_pixel(8, 5), &WHITE);
        assert_eq!(img.get_pixel(7, 7), &WHITE);
    }

    #[test]
    fn test_segment_connects_endpoints() {
        let mut img = RgbaImage::from_pixel(20, 5, WHITE);
        draw_segment(&mut img, (1, 2), (18, 2), 1, RED);
        for x in 1..=18 {
            assert_eq!(img.get_pixel(x, 2), &RED);
        }
        assert_eq!(img.get_pixel(0, 2), &WHITE);
        assert_eq!(img.get_pixel(5, 1), &WHITE);
    }

    #[test]
    fn test_segment_off_canvas_is_clipped() {
        let mut img = RgbaImage::from_pixel(4, 4, WHITE);
        draw_segment(&mut img, (-10, -10), (-5, -5), 3, RED);
        assert!(img.pixels().all(|p| *p == WHITE));
        stamp_dot(&mut img, (0, 0), 3, RED);
        assert_eq!(img.get_pixel(0, 0), &RED);
    }
}
