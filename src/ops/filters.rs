// ============================================================================
// FILTER OPERATIONS - Gaussian blur and unsharp-mask sharpening
// ============================================================================

use image::{RgbaImage, imageops};
use rayon::prelude::*;

/// Gaussian blur of the whole image (all four channels).
/// A non-positive sigma returns an unchanged copy.
pub fn gaussian_blur(src: &RgbaImage, sigma: f32) -> RgbaImage {
    if sigma <= 0.0 || src.width() == 0 || src.height() == 0 {
        return src.clone();
    }
    imageops::blur(src, sigma)
}

/// Unsharp mask: push each RGB channel away from its blurred value.
///
/// * `radius` - sigma of the blurred reference copy
/// * `percent` - strength; 100 adds the full difference back
/// * `threshold` - differences smaller than this are left alone
///
/// Alpha is preserved.
pub fn unsharp_mask(src: &RgbaImage, radius: f32, percent: f32, threshold: i32) -> RgbaImage {
    let blurred = gaussian_blur(src, radius);
    let (w, h) = src.dimensions();
    let mut out = src.clone();
    if w == 0 || h == 0 {
        return out;
    }

    let amount = percent / 100.0;
    let stride = w as usize * 4;
    let orig_raw = src.as_raw();
    let blur_raw = blurred.as_raw();
    let dst_raw: &mut [u8] = &mut out;

    dst_raw.par_chunks_mut(stride).enumerate().for_each(|(y, row_out)| {
        let row = y * stride..(y + 1) * stride;
        let row_orig = &orig_raw[row.clone()];
        let row_blur = &blur_raw[row];
        for i in 0..stride {
            if i % 4 == 3 {
                continue;
            }
            let orig = row_orig[i] as i32;
            let diff = orig - row_blur[i] as i32;
            if diff.abs() >= threshold {
                let v = orig as f32 + diff as f32 * amount;
                row_out[i] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker(size: u32) -> RgbaImage {
        RgbaImage::from_fn(size, size, |x, y| {
            if (x / 2 + y / 2) % 2 == 0 {
                Rgba([220, 220, 220, 255])
            } else {
                Rgba([30, 30, 30, 255])
            }
        })
    }

    #[test]
    fn test_blur_flat_image_unchanged() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([90, 120, 30, 255]));
        let out = gaussian_blur(&img, 2.0);
        for p in out.pixels() {
            for c in 0..4 {
                assert!((p[c] as i32 - img.get_pixel(0, 0)[c] as i32).abs() <= 1);
            }
        }
    }

    #[test]
    fn test_blur_reduces_contrast() {
        let img = checker(16);
        let out = gaussian_blur(&img, 2.0);
        let spread = |im: &RgbaImage| {
            let (mut lo, mut hi) = (255u8, 0u8);
            for p in im.pixels() {
                lo = lo.min(p[0]);
                hi = hi.max(p[0]);
            }
            hi - lo
        };
        assert!(spread(&out) < spread(&img));
        assert_eq!(out.dimensions(), img.dimensions());
    }

    #[test]
    fn test_blur_zero_sigma_is_copy() {
        let img = checker(6);
        assert_eq!(gaussian_blur(&img, 0.0), img);
    }

    #[test]
    fn test_sharpen_flat_image_unchanged() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([128, 64, 200, 255]));
        assert_eq!(unsharp_mask(&img, 2.0, 150.0, 3), img);
    }

    #[test]
    fn test_sharpen_increases_edge_contrast() {
        let img = checker(16);
        let out = unsharp_mask(&img, 2.0, 150.0, 3);
        // A bright pixel next to a dark block gets brighter, a dark one darker.
        assert!(out.get_pixel(1, 1)[0] >= img.get_pixel(1, 1)[0]);
        assert!(out.get_pixel(2, 1)[0] <= img.get_pixel(2, 1)[0]);
        assert!(out.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_sharpen_threshold_suppresses_small_differences() {
        let mut img = RgbaImage::from_pixel(9, 9, Rgba([100, 100, 100, 255]));
        img.put_pixel(4, 4, Rgba([101, 101, 101, 255]));
        assert_eq!(unsharp_mask(&img, 2.0, 150.0, 3), img);
    }
}
