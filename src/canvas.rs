// ============================================================================
// CANVAS - view scale, pointer state machine, rendering and the egui widget
// ============================================================================
//
// The state machine turns pointer events (already mapped to image pixels)
// into editing intents and never touches pixels itself.  `render` is a pure
// function of (image, scale).  `Canvas` is the only part that knows about
// egui: it uploads the rendered buffer and reports pointer activity.
// ============================================================================

use eframe::egui;
use egui::{Color32, ColorImage, Pos2, Rect, Sense, Stroke, TextureHandle, TextureOptions, Vec2};
use image::{RgbaImage, imageops};

use crate::ops::canvas_ops::CropRegion;
use crate::settings::{MAX_SCALE, MIN_SCALE};

/// Pixel position in image space. May lie outside the image while dragging.
pub type ImagePoint = (i64, i64);

// ============================================================================
// VIEW STATE
// ============================================================================

/// Display scale. Always within `[MIN_SCALE, MAX_SCALE]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    scale: f32,
    step: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(1.1)
    }
}

impl ViewState {
    pub fn new(step: f32) -> Self {
        Self { scale: 1.0, step: step.max(1.0 + f32::EPSILON) }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = if scale.is_nan() { 1.0 } else { scale.clamp(MIN_SCALE, MAX_SCALE) };
    }

    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale * self.step);
    }

    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale / self.step);
    }

    /// Positive steps zoom in, negative zoom out.
    pub fn zoom_by(&mut self, steps: i32) {
        self.set_scale(self.scale * self.step.powi(steps));
    }

    pub fn reset(&mut self) {
        self.scale = 1.0;
    }
}

/// Map a position relative to the image's top-left corner on screen to
/// image pixel coordinates.
pub fn screen_to_image(pos: (f32, f32), scale: f32) -> ImagePoint {
    ((pos.0 / scale).floor() as i64, (pos.1 / scale).floor() as i64)
}

// ============================================================================
// INTERACTION STATE MACHINE
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    None,
    Draw,
    Crop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragKind {
    Crop,
    Draw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        kind: DragKind,
        origin: ImagePoint,
        last: ImagePoint,
    },
}

/// What the session should do in response to a pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanvasIntent {
    Nothing,
    /// Start of a stroke: a single round dab.
    Dot(ImagePoint),
    /// Stroke continued from `from` to `to`.
    Segment { from: ImagePoint, to: ImagePoint },
    /// Stroke finished; the painted result should be recorded.
    StrokeEnd,
    /// Crop rubber band released over `region`.
    Crop(CropRegion),
}

/// Edit mode plus the drag in progress (`Idle → Dragging → Idle`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Interaction {
    mode: EditMode,
    drag: DragState,
}

impl Interaction {
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    /// Switch mode. Any drag in progress is abandoned.
    pub fn set_mode(&mut self, mode: EditMode) {
        self.mode = mode;
        self.drag = DragState::Idle;
    }

    /// Flip draw mode on/off (turning crop off). Returns the new mode.
    pub fn toggle_draw(&mut self) -> EditMode {
        let next = if self.mode == EditMode::Draw { EditMode::None } else { EditMode::Draw };
        self.set_mode(next);
        next
    }

    /// Flip crop mode on/off (turning draw off). Returns the new mode.
    pub fn toggle_crop(&mut self) -> EditMode {
        let next = if self.mode == EditMode::Crop { EditMode::None } else { EditMode::Crop };
        self.set_mode(next);
        next
    }

    pub fn cancel_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    pub fn press(&mut self, at: ImagePoint) -> CanvasIntent {
        let kind = match self.mode {
            EditMode::None => return CanvasIntent::Nothing,
            EditMode::Crop => DragKind::Crop,
            EditMode::Draw => DragKind::Draw,
        };
        self.drag = DragState::Dragging { kind, origin: at, last: at };
        match kind {
            DragKind::Crop => CanvasIntent::Nothing,
            DragKind::Draw => CanvasIntent::Dot(at),
        }
    }

    pub fn drag_to(&mut self, at: ImagePoint) -> CanvasIntent {
        let DragState::Dragging { kind, origin, last } = self.drag else {
            return CanvasIntent::Nothing;
        };
        self.drag = DragState::Dragging { kind, origin, last: at };
        match kind {
            DragKind::Crop => CanvasIntent::Nothing,
            DragKind::Draw if last == at => CanvasIntent::Nothing,
            DragKind::Draw => CanvasIntent::Segment { from: last, to: at },
        }
    }

    pub fn release(&mut self, at: ImagePoint) -> CanvasIntent {
        let DragState::Dragging { kind, origin, .. } = self.drag else {
            return CanvasIntent::Nothing;
        };
        self.drag = DragState::Idle;
        match kind {
            DragKind::Draw => CanvasIntent::StrokeEnd,
            DragKind::Crop => {
                self.mode = EditMode::None;
                CanvasIntent::Crop(CropRegion::from_corners(origin, at))
            }
        }
    }

    /// Current crop rubber band, for the overlay.
    pub fn rubber_band(&self) -> Option<CropRegion> {
        match self.drag {
            DragState::Dragging { kind: DragKind::Crop, origin, last } => {
                Some(CropRegion::from_corners(origin, last))
            }
            _ => None,
        }
    }
}

// ============================================================================
// RENDER
// ============================================================================

/// Size of `image` shown at `scale`, at least 1×1.
pub fn scaled_size(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let w = ((width as f32 * scale).floor() as u32).max(1);
    let h = ((height as f32 * scale).floor() as u32).max(1);
    (w, h)
}

/// Resample `image` for display at `scale` (Lanczos3).
pub fn render(image: &RgbaImage, scale: f32) -> RgbaImage {
    let (w, h) = scaled_size(image.width(), image.height(), scale);
    if (w, h) == image.dimensions() {
        return image.clone();
    }
    imageops::resize(image, w, h, imageops::FilterType::Lanczos3)
}

// ============================================================================
// EGUI WIDGET
// ============================================================================

/// Largest side uploaded as a pre-rendered texture; beyond it the original
/// is uploaded and scaled by the GPU.
const MAX_RENDERED_SIDE: u32 = 8192;

/// Pointer activity over the canvas during one frame, in image pixels.
#[derive(Clone, Copy, Debug, Default)]
pub struct CanvasResponse {
    pub pressed: Option<ImagePoint>,
    pub dragged: Option<ImagePoint>,
    pub released: Option<ImagePoint>,
}

pub struct Canvas {
    texture: Option<TextureHandle>,
    /// (image revision, scale bits) the texture was built from.
    texture_key: Option<(u64, u32)>,
    pointer_down: bool,
    last_pointer: Option<ImagePoint>,
    pub last_canvas_rect: Option<Rect>,
    pub crop_stroke: Color32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            texture: None,
            texture_key: None,
            pointer_down: false,
            last_pointer: None,
            last_canvas_rect: None,
            crop_stroke: Color32::RED,
        }
    }
}

impl Canvas {
    fn ensure_texture(&mut self, ctx: &egui::Context, image: &RgbaImage, revision: u64, scale: f32) {
        let key = (revision, scale.to_bits());
        if self.texture_key == Some(key) && self.texture.is_some() {
            return;
        }
        let (w, h) = scaled_size(image.width(), image.height(), scale);
        let prescale = w.max(h) <= MAX_RENDERED_SIDE;
        let color_image = if prescale {
            to_color_image(&render(image, scale))
        } else {
            to_color_image(image)
        };
        match self.texture.as_mut() {
            Some(tex) => tex.set(color_image, TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture("canvas_image", color_image, TextureOptions::LINEAR));
            }
        }
        self.texture_key = Some(key);
    }

    /// Draw the image at `scale` inside a scroll area, plus the crop rubber
    /// band, and report pointer activity mapped to image pixels.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        image: Option<&RgbaImage>,
        revision: u64,
        scale: f32,
        rubber_band: Option<CropRegion>,
    ) -> CanvasResponse {
        let mut out = CanvasResponse::default();
        let Some(image) = image else {
            self.last_canvas_rect = None;
            ui.centered_and_justified(|ui| {
                ui.label("Open an image to start editing (Ctrl+O)");
            });
            return out;
        };

        self.ensure_texture(ui.ctx(), image, revision, scale);
        let (w, h) = scaled_size(image.width(), image.height(), scale);
        let size = Vec2::new(w as f32, h as f32);

        egui::ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
            let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
            self.last_canvas_rect = Some(ui.clip_rect().intersect(rect));

            if let Some(tex) = &self.texture {
                let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                ui.painter().image(tex.id(), rect, uv, Color32::WHITE);
            }

            if let Some(region) = rubber_band {
                let min = rect.min + Vec2::new(region.x as f32, region.y as f32) * scale;
                let band = Rect::from_min_size(
                    min,
                    Vec2::new(region.width as f32, region.height as f32) * scale,
                );
                ui.painter().rect_stroke(band, 0.0, Stroke::new(2.0, self.crop_stroke));
            }

            let (pressed, down, released, pos) = ui.input(|i| {
                (
                    i.pointer.primary_pressed(),
                    i.pointer.primary_down(),
                    i.pointer.primary_released(),
                    i.pointer.interact_pos(),
                )
            });
            let to_image = |p: Pos2| screen_to_image((p.x - rect.min.x, p.y - rect.min.y), scale);

            if pressed && response.hovered() {
                if let Some(p) = pos {
                    let at = to_image(p);
                    self.pointer_down = true;
                    self.last_pointer = Some(at);
                    out.pressed = Some(at);
                }
            } else if self.pointer_down && down {
                if let Some(p) = pos {
                    let at = to_image(p);
                    if self.last_pointer != Some(at) {
                        self.last_pointer = Some(at);
                        out.dragged = Some(at);
                    }
                }
            }
            if self.pointer_down && (released || !down) {
                self.pointer_down = false;
                out.released = pos.map(to_image).or(self.last_pointer);
                self.last_pointer = None;
            }
        });
        out
    }
}

fn to_color_image(image: &RgbaImage) -> ColorImage {
    ColorImage::from_rgba_unmultiplied(
        [image.width() as usize, image.height() as usize],
        image.as_raw(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_clamps_to_bounds() {
        let mut view = ViewState::default();
        for _ in 0..100 {
            view.zoom_in();
        }
        assert_eq!(view.scale(), MAX_SCALE);
        for _ in 0..200 {
            view.zoom_out();
        }
        assert_eq!(view.scale(), MIN_SCALE);
        view.zoom_by(1000);
        assert_eq!(view.scale(), MAX_SCALE);
        view.zoom_by(-1000);
        assert_eq!(view.scale(), MIN_SCALE);
        view.set_scale(f32::INFINITY);
        assert_eq!(view.scale(), MAX_SCALE);
        view.set_scale(f32::NAN);
        assert_eq!(view.scale(), 1.0);
    }

    #[test]
    fn test_zoom_step() {
        let mut view = ViewState::default();
        view.zoom_in();
        assert!((view.scale() - 1.1).abs() < 1e-6);
        view.zoom_out();
        assert!((view.scale() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_screen_to_image() {
        assert_eq!(screen_to_image((25.0, 9.9), 2.0), (12, 4));
        assert_eq!(screen_to_image((-1.0, 0.0), 2.0), (-1, 0));
        assert_eq!(screen_to_image((5.0, 5.0), 0.5), (10, 10));
    }

    #[test]
    fn test_toggles_are_exclusive() {
        let mut ix = Interaction::default();
        assert_eq!(ix.toggle_draw(), EditMode::Draw);
        assert_eq!(ix.toggle_crop(), EditMode::Crop);
        assert_eq!(ix.toggle_crop(), EditMode::None);
        assert_eq!(ix.toggle_draw(), EditMode::Draw);
        assert_eq!(ix.toggle_draw(), EditMode::None);
    }

    #[test]
    fn test_no_mode_ignores_pointer() {
        let mut ix = Interaction::default();
        assert_eq!(ix.press((1, 1)), CanvasIntent::Nothing);
        assert_eq!(ix.drag_to((2, 2)), CanvasIntent::Nothing);
        assert_eq!(ix.release((3, 3)), CanvasIntent::Nothing);
        assert_eq!(ix.drag(), DragState::Idle);
    }

    #[test]
    fn test_draw_stroke_sequence() {
        let mut ix = Interaction::default();
        ix.set_mode(EditMode::Draw);
        assert_eq!(ix.press((1, 1)), CanvasIntent::Dot((1, 1)));
        assert_eq!(ix.drag_to((4, 1)), CanvasIntent::Segment { from: (1, 1), to: (4, 1) });
        assert_eq!(ix.drag_to((4, 1)), CanvasIntent::Nothing);
        assert_eq!(ix.drag_to((4, 6)), CanvasIntent::Segment { from: (4, 1), to: (4, 6) });
        assert_eq!(ix.release((4, 6)), CanvasIntent::StrokeEnd);
        assert_eq!(ix.drag(), DragState::Idle);
        assert_eq!(ix.mode(), EditMode::Draw);
    }

    #[test]
    fn test_crop_drag_yields_region_and_leaves_crop_mode() {
        let mut ix = Interaction::default();
        ix.set_mode(EditMode::Crop);
        assert_eq!(ix.press((8, 9)), CanvasIntent::Nothing);
        assert_eq!(ix.drag_to((3, 2)), CanvasIntent::Nothing);
        assert_eq!(ix.rubber_band(), Some(CropRegion::new(3, 2, 5, 7)));
        assert_eq!(ix.release((2, 2)), CanvasIntent::Crop(CropRegion::new(2, 2, 6, 7)));
        assert_eq!(ix.mode(), EditMode::None);
        assert_eq!(ix.rubber_band(), None);
    }

    #[test]
    fn test_mode_switch_abandons_drag() {
        let mut ix = Interaction::default();
        ix.set_mode(EditMode::Crop);
        ix.press((0, 0));
        ix.toggle_draw();
        assert_eq!(ix.drag(), DragState::Idle);
        assert_eq!(ix.release((5, 5)), CanvasIntent::Nothing);
    }

    #[test]
    fn test_render_scales_dimensions() {
        let img = RgbaImage::new(10, 4);
        assert_eq!(render(&img, 2.0).dimensions(), (20, 8));
        assert_eq!(render(&img, 0.1).dimensions(), (1, 1));
        assert_eq!(render(&img, 1.0), img);
    }
}
