// ============================================================================
// EDITOR SESSION - the one owner of image, history, view and interaction
// ============================================================================
//
// Every command either changes nothing and returns an error, or replaces the
// image and records exactly one history snapshot.  Zoom, mode toggles and
// brush settings never touch history.  A freehand stroke is painted in
// place while the pointer moves and recorded once on release.
// ============================================================================

use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

use crate::canvas::{CanvasIntent, EditMode, ImagePoint, Interaction, ViewState};
use crate::components::history::EditHistory;
use crate::error::{EditorError, NoticeLevel, Result};
use crate::ops::canvas_ops::{self, CropRegion};
use crate::ops::{adjustments, filters, transform};
use crate::settings::{ADJUST_RANGE, BRUSH_SIZE_RANGE, EditorSettings};
use crate::{io, log_info, log_warn};

// ============================================================================
// NOTICES
// ============================================================================

/// A user-visible message (the UI shows it as a small modal).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub text: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, title: title.into(), text: text.into() }
    }

    pub fn warning(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, title: title.into(), text: text.into() }
    }

    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, title: title.into(), text: text.into() }
    }
}

impl From<&EditorError> for Notice {
    fn from(err: &EditorError) -> Self {
        let title = match err {
            EditorError::NothingToUndo => "Undo",
            EditorError::InvalidCropRegion { .. } => "Crop",
            EditorError::NoImage | EditorError::InvalidInput { .. } => "Warning",
            _ => "Error",
        };
        Notice { level: err.level(), title: title.to_string(), text: err.to_string() }
    }
}

// ============================================================================
// BRUSH
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Brush {
    pub color: Rgba<u8>,
    pub size: u32,
}

// ============================================================================
// SESSION
// ============================================================================

pub struct EditorSession {
    image: Option<RgbaImage>,
    history: EditHistory,
    view: ViewState,
    interaction: Interaction,
    brush: Brush,
    settings: EditorSettings,
    /// Bumped on every pixel change so renderers can cache.
    revision: u64,
    /// True once the current stroke has painted something.
    stroke_dirty: bool,
    source_path: Option<PathBuf>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl EditorSession {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            image: None,
            history: EditHistory::with_capacity(settings.history_capacity),
            view: ViewState::new(settings.zoom_step),
            interaction: Interaction::default(),
            brush: Brush { color: settings.brush_color, size: settings.brush_size },
            settings,
            revision: 0,
            stroke_dirty: false,
            source_path: None,
        }
    }

    // --- Accessors ---

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn scale(&self) -> f32 {
        self.view.scale()
    }

    pub fn mode(&self) -> EditMode {
        self.interaction.mode()
    }

    pub fn rubber_band(&self) -> Option<CropRegion> {
        self.interaction.rubber_band()
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    // --- Internal helpers ---

    fn current(&self) -> Result<&RgbaImage> {
        self.image.as_ref().ok_or(EditorError::NoImage)
    }

    /// Swap in `next` and record it.
    fn commit(&mut self, next: RgbaImage, label: &str) {
        log_info!("{}: {}x{}", label, next.width(), next.height());
        self.history.record(&next);
        self.image = Some(next);
        self.revision += 1;
    }

    /// Run a whole-image operation and commit its result.
    fn apply<F>(&mut self, label: &str, op: F) -> Result<()>
    where
        F: FnOnce(&RgbaImage) -> Result<RgbaImage>,
    {
        self.current()?;
        // An open stroke becomes its own undo step before the image changes.
        self.finish_stroke();
        self.interaction.cancel_drag();
        let next = op(self.current()?).inspect_err(|e| log_warn!("{} declined: {}", label, e))?;
        self.commit(next, label);
        Ok(())
    }

    // ========================================================================
    // FILE
    // ========================================================================

    /// Replace the session's image. History restarts with `image` as its
    /// only entry; the view returns to 100% and no mode is active.
    pub fn load(&mut self, image: RgbaImage) {
        log_info!("Session: loaded {}x{} image", image.width(), image.height());
        self.history.reset(&image);
        self.image = Some(image);
        self.view.reset();
        self.interaction = Interaction::default();
        self.stroke_dirty = false;
        self.revision += 1;
    }

    /// Decode `path` and load it. On failure the current image is kept.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let image = io::load_image_sync(path)?;
        self.load_from(image, path.to_path_buf());
        Ok(())
    }

    /// `load` for an image that was decoded from `path` elsewhere (the UI
    /// decodes on a worker thread).
    pub fn load_from(&mut self, image: RgbaImage, path: PathBuf) {
        self.load(image);
        self.source_path = Some(path);
    }

    /// Write the current image. Returns the path actually written (a
    /// missing extension becomes `.png`).
    pub fn save(&mut self, path: &Path) -> Result<PathBuf> {
        let written = io::save_image(self.current()?, path)?;
        self.source_path = Some(written.clone());
        Ok(written)
    }

    // ========================================================================
    // HISTORY
    // ========================================================================

    /// Roll back the last mutating operation.
    ///
    /// A stroke still being drawn has not been recorded yet, so undoing
    /// mid-stroke only discards that stroke.
    pub fn undo(&mut self) -> Result<()> {
        self.current()?;
        self.interaction.cancel_drag();
        let restored = if std::mem::take(&mut self.stroke_dirty) {
            self.history.current().cloned().ok_or(EditorError::NothingToUndo)?
        } else {
            self.history.undo()?.clone()
        };
        log_info!("Undo: {} step(s) left", self.history.undo_depth());
        self.image = Some(restored);
        self.revision += 1;
        Ok(())
    }

    // ========================================================================
    // ADJUSTMENTS & FILTERS
    // ========================================================================

    pub fn adjust_brightness_contrast(&mut self, brightness: i32, contrast: i32) -> Result<()> {
        check_range("Brightness", brightness, &ADJUST_RANGE)?;
        check_range("Contrast", contrast, &ADJUST_RANGE)?;
        self.apply("Brightness/Contrast", |img| {
            Ok(adjustments::brightness_contrast(img, brightness, contrast))
        })
    }

    pub fn grayscale(&mut self) -> Result<()> {
        self.apply("Grayscale", |img| Ok(adjustments::grayscale(img)))
    }

    pub fn sepia(&mut self) -> Result<()> {
        self.apply("Sepia", |img| Ok(adjustments::sepia(img)))
    }

    pub fn blur(&mut self) -> Result<()> {
        let sigma = self.settings.blur_sigma;
        self.apply("Blur", |img| Ok(filters::gaussian_blur(img, sigma)))
    }

    pub fn sharpen(&mut self) -> Result<()> {
        let (radius, percent, threshold) = (
            self.settings.sharpen_radius,
            self.settings.sharpen_percent,
            self.settings.sharpen_threshold,
        );
        self.apply("Sharpen", |img| Ok(filters::unsharp_mask(img, radius, percent, threshold)))
    }

    /// Rotate counter-clockwise by `degrees`, expanding the canvas to fit.
    pub fn rotate(&mut self, degrees: f64) -> Result<()> {
        self.apply("Rotate", |img| Ok(transform::rotate(img, degrees)))
    }

    /// Crop to `region`. A region with no area inside the image is refused
    /// and the image is left alone.
    pub fn crop(&mut self, region: CropRegion) -> Result<()> {
        self.apply("Crop", |img| canvas_ops::crop(img, region))
    }

    // ========================================================================
    // MODES & BRUSH (never recorded)
    // ========================================================================

    pub fn toggle_draw(&mut self) -> Result<Notice> {
        self.current()?;
        self.finish_stroke();
        let notice = match self.interaction.toggle_draw() {
            EditMode::Draw => Notice::info("Draw", "Draw mode on"),
            _ => Notice::info("Draw", "Draw mode off"),
        };
        Ok(notice)
    }

    pub fn toggle_crop(&mut self) -> Result<Notice> {
        self.current()?;
        self.finish_stroke();
        let notice = match self.interaction.toggle_crop() {
            EditMode::Crop => Notice::info("Crop", "Crop mode on"),
            _ => Notice::info("Crop", "Crop mode off"),
        };
        Ok(notice)
    }

    pub fn set_brush_color(&mut self, color: Rgba<u8>) {
        self.brush.color = color;
    }

    pub fn set_brush_size(&mut self, size: u32) -> Result<()> {
        if !BRUSH_SIZE_RANGE.contains(&size) {
            return Err(EditorError::InvalidInput {
                name: "Brush size",
                value: i32::try_from(size).unwrap_or(i32::MAX),
                min: *BRUSH_SIZE_RANGE.start() as i32,
                max: *BRUSH_SIZE_RANGE.end() as i32,
            });
        }
        self.brush.size = size;
        Ok(())
    }

    // ========================================================================
    // VIEW (never recorded)
    // ========================================================================

    /// Zoom by wheel notches; ignored while no image is loaded.
    pub fn zoom(&mut self, steps: i32) {
        if self.image.is_some() && steps != 0 {
            self.view.zoom_by(steps);
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom(1);
    }

    pub fn zoom_out(&mut self) {
        self.zoom(-1);
    }

    pub fn reset_zoom(&mut self) {
        self.view.reset();
    }

    // ========================================================================
    // POINTER
    // ========================================================================

    pub fn pointer_pressed(&mut self, at: ImagePoint) -> Result<Option<Notice>> {
        if self.image.is_none() {
            return Ok(None);
        }
        let intent = self.interaction.press(at);
        self.handle_intent(intent)
    }

    pub fn pointer_dragged(&mut self, at: ImagePoint) -> Result<Option<Notice>> {
        if self.image.is_none() {
            return Ok(None);
        }
        let intent = self.interaction.drag_to(at);
        self.handle_intent(intent)
    }

    pub fn pointer_released(&mut self, at: ImagePoint) -> Result<Option<Notice>> {
        if self.image.is_none() {
            return Ok(None);
        }
        let intent = self.interaction.release(at);
        self.handle_intent(intent)
    }

    fn handle_intent(&mut self, intent: CanvasIntent) -> Result<Option<Notice>> {
        match intent {
            CanvasIntent::Nothing => Ok(None),
            CanvasIntent::Dot(at) => {
                self.paint(|img, brush| canvas_ops::stamp_dot(img, at, brush.size, brush.color));
                Ok(None)
            }
            CanvasIntent::Segment { from, to } => {
                self.paint(|img, brush| canvas_ops::draw_segment(img, from, to, brush.size, brush.color));
                Ok(None)
            }
            CanvasIntent::StrokeEnd => {
                self.finish_stroke();
                Ok(None)
            }
            CanvasIntent::Crop(region) => {
                self.crop(region)?;
                Ok(Some(Notice::info("Crop", "Crop applied")))
            }
        }
    }

    fn paint<F: FnOnce(&mut RgbaImage, Brush)>(&mut self, stroke: F) {
        let brush = self.brush;
        if let Some(img) = self.image.as_mut() {
            stroke(img, brush);
            self.stroke_dirty = true;
            self.revision += 1;
        }
    }

    /// Record the stroke painted since the last press, if any.
    fn finish_stroke(&mut self) {
        if !std::mem::take(&mut self.stroke_dirty) {
            return;
        }
        if let Some(img) = self.image.as_ref() {
            log_info!("Stroke finished (brush {} px)", self.brush.size);
            self.history.record(img);
        }
    }
}

fn check_range(name: &'static str, value: i32, range: &std::ops::RangeInclusive<i32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(EditorError::InvalidInput { name, value, min: *range.start(), max: *range.end() })
    }
}
