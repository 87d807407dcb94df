// ============================================================================
// TRANSFORM OPERATIONS - rotation with expand-to-fit
// ============================================================================

use image::{Rgba, RgbaImage, imageops};
use rayon::prelude::*;

/// Angles closer than this to a quarter turn use the exact pixel-shuffling path.
const ANGLE_EPSILON: f64 = 1e-3;

/// Normalize an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees % 360.0;
    if d < 0.0 { d + 360.0 } else { d }
}

/// Size of the bounding box that holds a `width`×`height` image rotated by
/// `degrees`. Quarter turns are exact; other angles round to the nearest
/// pixel and never go below 1×1.
pub fn rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    match quarter_turns(degrees) {
        Some(0) | Some(2) => return (width, height),
        Some(_) => return (height, width),
        None => {}
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let (w, h) = (width as f64, height as f64);
    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;
    (new_w.max(1), new_h.max(1))
}

/// Number of counter-clockwise quarter turns if `degrees` is (nearly) a
/// multiple of 90.
fn quarter_turns(degrees: f64) -> Option<u8> {
    let d = normalize_degrees(degrees);
    let turns = (d / 90.0).round();
    if (d - turns * 90.0).abs() < ANGLE_EPSILON {
        Some((turns as u8) % 4)
    } else {
        None
    }
}

/// Rotate the image counter-clockwise by `degrees` around its center.
///
/// The canvas is expanded to fit the whole rotated image; uncovered corners
/// are transparent. Multiples of 90° are lossless.
pub fn rotate(src: &RgbaImage, degrees: f64) -> RgbaImage {
    match quarter_turns(degrees) {
        Some(0) => src.clone(),
        Some(1) => imageops::rotate270(src),
        Some(2) => imageops::rotate180(src),
        Some(3) => imageops::rotate90(src),
        _ => rotate_bilinear(src, degrees),
    }
}

/// Arbitrary-angle rotation by inverse mapping with bilinear sampling.
fn rotate_bilinear(src: &RgbaImage, degrees: f64) -> RgbaImage {
    let (src_w, src_h) = src.dimensions();
    let (dst_w, dst_h) = rotated_bounds(src_w, src_h, degrees);
    let mut dst = RgbaImage::new(dst_w, dst_h);
    if src_w == 0 || src_h == 0 {
        return dst;
    }

    // Screen y grows downward, so a visual counter-clockwise turn of the
    // image maps each destination pixel back through a clockwise turn.
    let (sin, cos) = (degrees.to_radians() as f32).sin_cos();
    let src_cx = src_w as f32 * 0.5;
    let src_cy = src_h as f32 * 0.5;
    let dst_cx = dst_w as f32 * 0.5;
    let dst_cy = dst_h as f32 * 0.5;

    let row_bytes = dst_w as usize * 4;
    let dst_raw: &mut [u8] = &mut dst;
    dst_raw.par_chunks_mut(row_bytes).enumerate().for_each(|(dy, row)| {
        let v = dy as f32 + 0.5 - dst_cy;
        for dx in 0..dst_w as usize {
            let u = dx as f32 + 0.5 - dst_cx;
            let sx = u * cos - v * sin + src_cx - 0.5;
            let sy = u * sin + v * cos + src_cy - 0.5;
            let px = bilinear_sample(src, sx, sy);
            row[dx * 4..dx * 4 + 4].copy_from_slice(&px.0);
        }
    });
    dst
}

/// Bilinear interpolation sampling from an RgbaImage. Out-of-bounds
/// neighbours count as transparent black.
fn bilinear_sample(img: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let sample = |sx: i32, sy: i32| -> [f32; 4] {
        if sx < 0 || sy < 0 || sx >= img.width() as i32 || sy >= img.height() as i32 {
            [0.0; 4]
        } else {
            let p = img.get_pixel(sx as u32, sy as u32);
            [p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32]
        }
    };

    let tl = sample(x0, y0);
    let tr = sample(x0 + 1, y0);
    let bl = sample(x0, y0 + 1);
    let br = sample(x0 + 1, y0 + 1);

    let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;
    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = lerp(tl[c], tr[c], fx);
        let bot = lerp(bl[c], br[c], fx);
        out[c] = lerp(top, bot, fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, (x * 7 + y) as u8, 255]))
    }

    #[test]
    fn test_four_quarter_turns_round_trip() {
        let img = numbered(5, 3);
        let mut out = img.clone();
        for _ in 0..4 {
            out = rotate(&out, 90.0);
        }
        assert_eq!(out, img);
    }

    #[test]
    fn test_quarter_turn_swaps_dimensions() {
        let img = numbered(5, 3);
        assert_eq!(rotate(&img, 90.0).dimensions(), (3, 5));
        assert_eq!(rotate(&img, -90.0).dimensions(), (3, 5));
        assert_eq!(rotate(&img, 180.0).dimensions(), (5, 3));
    }

    #[test]
    fn test_positive_angle_is_counter_clockwise() {
        let img = numbered(4, 2);
        let out = rotate(&img, 90.0);
        // The top-right corner ends up top-left.
        assert_eq!(out.get_pixel(0, 0), img.get_pixel(3, 0));
        let back = rotate(&out, -90.0);
        assert_eq!(back, img);
    }

    #[test]
    fn test_rotated_bounds() {
        assert_eq!(rotated_bounds(100, 50, 0.0), (100, 50));
        assert_eq!(rotated_bounds(100, 50, 270.0), (50, 100));
        assert_eq!(rotated_bounds(100, 50, -450.0), (50, 100));
        assert_eq!(rotated_bounds(100, 100, 45.0), (141, 141));
    }

    #[test]
    fn test_arbitrary_angle_expands_canvas() {
        let img = RgbaImage::from_pixel(20, 10, Rgba([255, 0, 0, 255]));
        let out = rotate(&img, 30.0);
        assert_eq!(out.dimensions(), rotated_bounds(20, 10, 30.0));
        // The center stays covered, the corners are left transparent.
        let (w, h) = out.dimensions();
        assert_eq!(out.get_pixel(w / 2, h / 2), &Rgba([255, 0, 0, 255]));
        assert_eq!(out.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
    }
}
