// ============================================================================
// EDITOR SETTINGS - tunables owned by the session (never persisted)
// ============================================================================

use image::Rgba;

/// Smallest allowed view scale.
pub const MIN_SCALE: f32 = 0.1;
/// Largest allowed view scale.
pub const MAX_SCALE: f32 = 10.0;

/// Brush size bounds accepted by the size prompt.
pub const BRUSH_SIZE_RANGE: std::ops::RangeInclusive<u32> = 1..=50;
/// Brightness / contrast prompt bounds.
pub const ADJUST_RANGE: std::ops::RangeInclusive<i32> = -100..=100;

#[derive(Clone, Debug, PartialEq)]
pub struct EditorSettings {
    /// Maximum number of snapshots kept in the undo history.
    pub history_capacity: usize,
    /// Multiplicative zoom factor applied per wheel notch / shortcut.
    pub zoom_step: f32,
    /// Gaussian blur sigma.
    pub blur_sigma: f32,
    /// Unsharp mask radius (sigma of the blurred copy).
    pub sharpen_radius: f32,
    /// Unsharp mask strength in percent.
    pub sharpen_percent: f32,
    /// Per-channel difference below which sharpening is skipped.
    pub sharpen_threshold: i32,
    pub brush_color: Rgba<u8>,
    pub brush_size: u32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            history_capacity: 20,
            zoom_step: 1.1,
            blur_sigma: 2.0,
            sharpen_radius: 2.0,
            sharpen_percent: 150.0,
            sharpen_threshold: 3,
            brush_color: Rgba([0, 0, 0, 255]),
            brush_size: 5,
        }
    }
}
