// ============================================================================
// DIALOGS - modal prompts for brightness/contrast, brush size and colour,
// plus the notice box every command reports through
// ============================================================================
//
// Each dialog is a small struct holding its own field values.  The app calls
// `show()` once per frame and acts on the returned `DialogResult`.
// ============================================================================

use eframe::egui;
use egui::{Color32, Pos2, Rect, Rounding, Sense, Stroke, Vec2};
use egui::color_picker::{Alpha, color_picker_color32};
use image::Rgba;

use crate::error::NoticeLevel;
use crate::session::Notice;
use crate::settings::{ADJUST_RANGE, BRUSH_SIZE_RANGE};

// ============================================================================
// ACTIVE-DIALOG ENUM - at most one modal dialog is open at a time
// ============================================================================

#[derive(Default)]
pub enum ActiveDialog {
    #[default]
    None,
    BrightnessContrast(BrightnessContrastDialog),
    BrushSize(BrushSizeDialog),
    BrushColor(BrushColorDialog),
}

impl ActiveDialog {
    /// Returns true if no dialog is currently open.
    pub fn is_none(&self) -> bool {
        matches!(self, ActiveDialog::None)
    }
}

/// Result returned by each dialog's `show()` method every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DialogResult<T> {
    /// Dialog is still open, no action needed this frame.
    Open,
    /// A field changed; the dialog's own preview has been refreshed.
    Changed,
    /// User clicked OK - contains the final values.
    Ok(T),
    /// User clicked Cancel.
    Cancel,
}

// ============================================================================
// SHARED DIALOG STYLING HELPERS
// ============================================================================

/// Colors extracted from the current egui visuals for dialog rendering.
pub(crate) struct DialogColors {
    pub accent: Color32,
    pub accent_faint: Color32,
    pub text_muted: Color32,
    pub separator: Color32,
}

impl DialogColors {
    pub(crate) fn from_ctx(ctx: &egui::Context) -> Self {
        let v = ctx.style().visuals.clone();
        let accent = v.selection.stroke.color;
        let alpha = if v.dark_mode { 35 } else { 25 };
        // In dark mode, boost muted text so labels stay readable
        let text_muted = if v.dark_mode { Color32::from_gray(160) } else { v.weak_text_color() };
        Self {
            accent,
            accent_faint: Color32::from_rgba_unmultiplied(accent.r(), accent.g(), accent.b(), alpha),
            text_muted,
            separator: v.widgets.noninteractive.bg_stroke.color,
        }
    }
}

/// Paint the accent header bar with icon + title.
pub(crate) fn paint_dialog_header(ui: &mut egui::Ui, colors: &DialogColors, icon: &str, title: &str) {
    let header_height = 32.0;
    let (rect, _) = ui.allocate_exact_size(Vec2::new(ui.available_width(), header_height), Sense::hover());

    let painter = ui.painter();
    painter.rect_filled(rect, Rounding::ZERO, colors.accent_faint);
    painter.rect_filled(
        Rect::from_min_size(rect.min, Vec2::new(3.0, header_height)),
        Rounding::ZERO,
        colors.accent,
    );
    painter.text(
        Pos2::new(rect.min.x + 12.0, rect.center().y),
        egui::Align2::LEFT_CENTER,
        format!("{} {}", icon, title),
        egui::FontId::proportional(14.0),
        colors.accent,
    );
}

/// Styled section label.
pub(crate) fn section_label(ui: &mut egui::Ui, colors: &DialogColors, text: &str) {
    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.add_space(2.0);
        ui.label(egui::RichText::new(text).size(11.0).color(colors.text_muted).strong());
    });
    ui.add_space(2.0);
}

/// Thin separator line using accent color (very faint).
pub(crate) fn accent_separator(ui: &mut egui::Ui, colors: &DialogColors) {
    let (rect, _) = ui.allocate_exact_size(Vec2::new(ui.available_width(), 1.0), Sense::hover());
    ui.painter().rect_filled(rect, 0.0, colors.accent_faint);
}

/// Styled OK / Cancel footer with an optional Reset on the left.
/// Returns (ok, cancel, reset).
pub(crate) fn dialog_footer(ui: &mut egui::Ui, colors: &DialogColors, with_reset: bool) -> (bool, bool, bool) {
    let (mut ok, mut cancel, mut reset) = (false, false, false);
    ui.add_space(4.0);
    accent_separator(ui, colors);
    ui.add_space(6.0);
    ui.horizontal(|ui| {
        if with_reset && ui.button("Reset").clicked() {
            reset = true;
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Cancel").clicked() {
                cancel = true;
            }
            let ok_btn = egui::Button::new(egui::RichText::new("  OK  ").color(Color32::WHITE).strong())
                .fill(colors.accent);
            if ui.add(ok_btn).clicked() {
                ok = true;
            }
        });
    });
    // Keyboard: Enter confirms, Escape cancels.
    ui.input(|i| {
        ok |= i.key_pressed(egui::Key::Enter);
        cancel |= i.key_pressed(egui::Key::Escape);
    });
    (ok, cancel, reset)
}

fn dialog_window(id: &str, ctx: &egui::Context, width: f32) -> egui::Window<'static> {
    egui::Window::new(id.to_owned())
        .title_bar(false)
        .collapsible(false)
        .resizable(false)
        .default_pos(egui::pos2(ctx.screen_rect().center().x - width * 0.5, 60.0))
}

// ============================================================================
// BRIGHTNESS / CONTRAST DIALOG
// ============================================================================

pub struct BrightnessContrastDialog {
    pub brightness: i32,
    pub contrast: i32,
}

impl Default for BrightnessContrastDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl BrightnessContrastDialog {
    pub fn new() -> Self {
        Self { brightness: 0, contrast: 0 }
    }

    /// Where a gray `level` lands after the adjustment, assuming a mid-gray
    /// image mean.  Drives the preview strip.
    pub fn preview_level(&self, level: f32) -> u8 {
        let b = level * (1.0 + self.brightness as f32 / 100.0);
        let mid = 128.0 * (1.0 + self.brightness as f32 / 100.0);
        let c = mid + (b - mid) * (1.0 + self.contrast as f32 / 100.0);
        c.round().clamp(0.0, 255.0) as u8
    }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogResult<(i32, i32)> {
        let mut result = DialogResult::Open;
        let colors = DialogColors::from_ctx(ctx);

        dialog_window("dialog_brightness_contrast", ctx, 350.0).show(ctx, |ui| {
            ui.set_min_width(350.0);
            paint_dialog_header(ui, &colors, "☀", "Brightness / Contrast");
            ui.add_space(4.0);

            section_label(ui, &colors, "ADJUSTMENTS");
            let mut changed = false;
            egui::Grid::new("bc_params").num_columns(2).spacing([8.0, 6.0]).show(ui, |ui| {
                ui.label("Brightness");
                changed |= ui.add(egui::Slider::new(&mut self.brightness, ADJUST_RANGE)).changed();
                ui.end_row();

                ui.label("Contrast");
                changed |= ui.add(egui::Slider::new(&mut self.contrast, ADJUST_RANGE)).changed();
                ui.end_row();
            });

            // Gray ramp as it will look after the adjustment
            ui.add_space(4.0);
            let bar_rect = ui.allocate_space(Vec2::new(ui.available_width(), 8.0)).1;
            let painter = ui.painter();
            let steps = 32;
            let bar_w = bar_rect.width() / steps as f32;
            for i in 0..steps {
                let level = i as f32 / (steps - 1) as f32 * 255.0;
                let r = Rect::from_min_size(
                    Pos2::new(bar_rect.min.x + i as f32 * bar_w, bar_rect.min.y),
                    Vec2::new(bar_w + 0.5, 8.0),
                );
                painter.rect_filled(r, 0.0, Color32::from_gray(self.preview_level(level)));
            }
            painter.rect_stroke(bar_rect, Rounding::same(2.0), Stroke::new(1.0, colors.separator));

            if changed {
                result = DialogResult::Changed;
            }
            let (ok, cancel, reset) = dialog_footer(ui, &colors, true);
            if reset {
                *self = Self::new();
                result = DialogResult::Changed;
            }
            if ok {
                result = DialogResult::Ok((self.brightness, self.contrast));
            }
            if cancel {
                result = DialogResult::Cancel;
            }
        });
        result
    }
}

// ============================================================================
// BRUSH SIZE DIALOG
// ============================================================================

pub struct BrushSizeDialog {
    pub size: u32,
}

impl BrushSizeDialog {
    pub fn new(current: u32) -> Self {
        Self { size: current.clamp(*BRUSH_SIZE_RANGE.start(), *BRUSH_SIZE_RANGE.end()) }
    }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogResult<u32> {
        let mut result = DialogResult::Open;
        let colors = DialogColors::from_ctx(ctx);

        dialog_window("dialog_brush_size", ctx, 300.0).show(ctx, |ui| {
            ui.set_min_width(300.0);
            paint_dialog_header(ui, &colors, "✏", "Brush Size");
            ui.add_space(4.0);

            section_label(ui, &colors, "DIAMETER");
            let changed = ui
                .add(egui::Slider::new(&mut self.size, BRUSH_SIZE_RANGE).suffix(" px"))
                .changed();

            // Dab preview
            let max_side = *BRUSH_SIZE_RANGE.end() as f32;
            let (rect, _) = ui.allocate_exact_size(Vec2::new(ui.available_width(), max_side + 8.0), Sense::hover());
            ui.painter().circle_filled(rect.center(), self.size as f32 * 0.5, ui.visuals().text_color());

            if changed {
                result = DialogResult::Changed;
            }
            let (ok, cancel, _) = dialog_footer(ui, &colors, false);
            if ok {
                result = DialogResult::Ok(self.size);
            }
            if cancel {
                result = DialogResult::Cancel;
            }
        });
        result
    }
}

// ============================================================================
// BRUSH COLOR DIALOG
// ============================================================================

pub struct BrushColorDialog {
    pub color: Color32,
}

impl BrushColorDialog {
    pub fn new(current: Rgba<u8>) -> Self {
        let [r, g, b, _] = current.0;
        Self { color: Color32::from_rgb(r, g, b) }
    }

    /// Picked colour as an opaque image pixel.
    pub fn rgba(&self) -> Rgba<u8> {
        Rgba([self.color.r(), self.color.g(), self.color.b(), 255])
    }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogResult<Rgba<u8>> {
        let mut result = DialogResult::Open;
        let colors = DialogColors::from_ctx(ctx);

        dialog_window("dialog_brush_color", ctx, 300.0).show(ctx, |ui| {
            ui.set_min_width(300.0);
            paint_dialog_header(ui, &colors, "🎨", "Brush Color");
            ui.add_space(4.0);

            if color_picker_color32(ui, &mut self.color, Alpha::Opaque) {
                result = DialogResult::Changed;
            }
            let (ok, cancel, _) = dialog_footer(ui, &colors, false);
            if ok {
                result = DialogResult::Ok(self.rgba());
            }
            if cancel {
                result = DialogResult::Cancel;
            }
        });
        result
    }
}

// ============================================================================
// NOTICE BOX
// ============================================================================

fn notice_icon(level: NoticeLevel) -> (&'static str, Color32) {
    match level {
        NoticeLevel::Info => ("ℹ", Color32::from_rgb(90, 160, 230)),
        NoticeLevel::Warning => ("⚠", Color32::from_rgb(230, 170, 40)),
        NoticeLevel::Error => ("✖", Color32::from_rgb(220, 70, 60)),
    }
}

/// Show `notice` as a small modal. Returns true once the user dismissed it.
pub fn show_notice(ctx: &egui::Context, notice: &Notice) -> bool {
    let mut dismissed = false;
    let colors = DialogColors::from_ctx(ctx);
    let (icon, tint) = notice_icon(notice.level);

    egui::Window::new("dialog_notice")
        .title_bar(false)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
        .show(ctx, |ui| {
            ui.set_min_width(280.0);
            paint_dialog_header(ui, &colors, icon, &notice.title);
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.add_space(6.0);
                ui.label(egui::RichText::new(&notice.text).color(tint));
            });
            ui.add_space(6.0);
            accent_separator(ui, &colors);
            ui.add_space(6.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("  OK  ").clicked() {
                    dismissed = true;
                }
            });
            ui.input(|i| {
                dismissed |= i.key_pressed(egui::Key::Enter) || i.key_pressed(egui::Key::Escape);
            });
        });
    dismissed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_adjustment_preview_is_identity() {
        let dialog = BrightnessContrastDialog::new();
        for level in [0.0, 64.0, 128.0, 255.0] {
            assert_eq!(dialog.preview_level(level), level as u8);
        }
    }

    #[test]
    fn test_brightness_preview_is_monotonic() {
        let dialog = BrightnessContrastDialog { brightness: 40, contrast: 0 };
        assert!(dialog.preview_level(100.0) > 100);
        let dark = BrightnessContrastDialog { brightness: -100, contrast: 0 };
        assert_eq!(dark.preview_level(200.0), 0);
    }

    #[test]
    fn test_brush_size_dialog_clamps_initial_value() {
        assert_eq!(BrushSizeDialog::new(0).size, 1);
        assert_eq!(BrushSizeDialog::new(80).size, 50);
        assert_eq!(BrushSizeDialog::new(7).size, 7);
    }

    #[test]
    fn test_brush_color_is_opaque() {
        let dialog = BrushColorDialog::new(Rgba([10, 20, 30, 40]));
        assert_eq!(dialog.rgba(), Rgba([10, 20, 30, 255]));
    }
}
