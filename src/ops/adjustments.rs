// ============================================================================
// ADJUSTMENT OPERATIONS - whole-image color adjustments
// ============================================================================
//
// Every operation takes the current image and returns a new one; the caller
// swaps it in and records history.  Results are fully opaque: alpha is
// reset to 255.  Rows are processed in parallel via rayon.
// ============================================================================

use image::RgbaImage;
use rayon::prelude::*;

/// ITU-R 601-2 luma weights.
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

const OPAQUE: f32 = 255.0;

// ============================================================================
// HELPER: per-pixel transform
// ============================================================================

/// Apply a per-pixel transform to every pixel of `src`.
/// `transform` receives (r, g, b, a) as f32 and returns (r, g, b, a) as f32;
/// results are rounded and clamped to 0..=255 on both ends.
pub fn apply_pixel_transform<F>(src: &RgbaImage, transform: F) -> RgbaImage
where
    F: Fn(f32, f32, f32, f32) -> (f32, f32, f32, f32) + Sync,
{
    let (w, h) = src.dimensions();
    let mut out = RgbaImage::new(w, h);
    if w == 0 || h == 0 {
        return out;
    }

    let stride = w as usize * 4;
    let src_raw = src.as_raw();
    let dst_raw: &mut [u8] = &mut out;

    dst_raw.par_chunks_mut(stride).enumerate().for_each(|(y, row_out)| {
        let row_in = &src_raw[y * stride..(y + 1) * stride];
        for (px_in, px_out) in row_in.chunks_exact(4).zip(row_out.chunks_exact_mut(4)) {
            let (nr, ng, nb, na) = transform(
                px_in[0] as f32,
                px_in[1] as f32,
                px_in[2] as f32,
                px_in[3] as f32,
            );
            px_out[0] = to_channel(nr);
            px_out[1] = to_channel(ng);
            px_out[2] = to_channel(nb);
            px_out[3] = to_channel(na);
        }
    });
    out
}

#[inline]
fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[inline]
fn luma(r: f32, g: f32, b: f32) -> f32 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

/// Mean 8-bit luma of the image, rounded to the nearest integer level.
pub fn mean_luma(src: &RgbaImage) -> f32 {
    let pixels = src.width() as u64 * src.height() as u64;
    if pixels == 0 {
        return 0.0;
    }
    let total: f64 = src
        .as_raw()
        .par_chunks(4)
        .map(|p| luma(p[0] as f32, p[1] as f32, p[2] as f32).round() as f64)
        .sum();
    (total / pixels as f64).round() as f32
}

// ============================================================================
// INSTANT OPERATIONS (no prompt needed)
// ============================================================================

/// Convert to grayscale using luma weights. The result is opaque.
///
/// A gray pixel maps to itself, so applying this twice changes nothing.
pub fn grayscale(src: &RgbaImage) -> RgbaImage {
    apply_pixel_transform(src, |r, g, b, _| {
        let l = luma(r, g, b).round();
        (l, l, l, OPAQUE)
    })
}

/// Classic sepia tone matrix.
pub const SEPIA_MATRIX: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Apply a sepia tone. Each output channel is clamped to 0..=255.
pub fn sepia(src: &RgbaImage) -> RgbaImage {
    color_matrix(src, &SEPIA_MATRIX)
}

/// Multiply every RGB triple by a 3x3 matrix. The result is opaque.
/// Results are truncated toward zero (as an integer cast would) after clamping.
pub fn color_matrix(src: &RgbaImage, m: &[[f32; 3]; 3]) -> RgbaImage {
    apply_pixel_transform(src, |r, g, b, _| {
        let row = |k: usize| (m[k][0] * r + m[k][1] * g + m[k][2] * b).clamp(0.0, 255.0).trunc();
        (row(0), row(1), row(2), OPAQUE)
    })
}

// ============================================================================
// PROMPTED OPERATIONS
// ============================================================================

/// Brightness/Contrast adjustment.
/// `brightness`: -100..100, scales RGB by `1 + brightness / 100`.
/// `contrast`: -100..100, scales RGB away from the mean luma by
/// `1 + contrast / 100` (evaluated after the brightness step).
/// The result is opaque.
pub fn brightness_contrast(src: &RgbaImage, brightness: i32, contrast: i32) -> RgbaImage {
    let b_factor = 1.0 + brightness as f32 / 100.0;
    let brightened = apply_pixel_transform(src, move |r, g, b, _| {
        (r * b_factor, g * b_factor, b * b_factor, OPAQUE)
    });

    let c_factor = 1.0 + contrast as f32 / 100.0;
    if contrast == 0 {
        return brightened;
    }
    let mean = mean_luma(&brightened);
    apply_pixel_transform(&brightened, move |r, g, b, a| {
        (
            mean + (r - mean) * c_factor,
            mean + (g - mean) * c_factor,
            mean + (b - mean) * c_factor,
            a,
        )
    })
}
