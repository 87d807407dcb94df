// ============================================================================
// PHOTO_REDACT APP - eframe front end driving one EditorSession
// ============================================================================

use eframe::egui;
use image::RgbaImage;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc;

use crate::canvas::{Canvas, CanvasResponse, EditMode};
use crate::components::dialogs::{
    ActiveDialog, BrightnessContrastDialog, BrushColorDialog, BrushSizeDialog, DialogResult, show_notice,
};
use crate::error::{EditorError, Result};
use crate::io::FileHandler;
use crate::session::{EditorSession, Notice};
use crate::settings::EditorSettings;
use crate::{log_err, log_info};

/// Messages sent from background I/O threads back to the UI thread.
pub enum IoResult {
    /// An image file was decoded, ready to replace the session's image.
    ImageLoaded { image: RgbaImage, path: PathBuf },
    /// Image decoding failed.
    LoadFailed { path: PathBuf, error: String },
}

/// Toolbar / shortcut commands. Everything the user can trigger funnels
/// through `run_command` so buttons and keys behave identically.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Open,
    Save,
    Undo,
    ToggleDraw,
    ToggleCrop,
    BrightnessContrast,
    Grayscale,
    Sepia,
    Blur,
    Sharpen,
    Rotate(f64),
    BrushColor,
    BrushSize,
    ZoomIn,
    ZoomOut,
}

pub struct PhotoRedactApp {
    session: EditorSession,
    canvas: Canvas,
    file_handler: FileHandler,
    active_dialog: ActiveDialog,
    /// Messages waiting to be shown, oldest first. Only the front one is
    /// on screen.
    notices: VecDeque<Notice>,
    io_sender: mpsc::Sender<IoResult>,
    io_receiver: mpsc::Receiver<IoResult>,
    pending_io_ops: usize,
    /// Set by the launch arguments, consumed on the first frame.
    startup_file: Option<PathBuf>,
    status: String,
}

impl PhotoRedactApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, startup_file: Option<PathBuf>) -> Self {
        Self::with_settings(EditorSettings::default(), startup_file)
    }

    pub fn with_settings(settings: EditorSettings, startup_file: Option<PathBuf>) -> Self {
        let (io_sender, io_receiver) = mpsc::channel();
        Self {
            session: EditorSession::new(settings),
            canvas: Canvas::default(),
            file_handler: FileHandler::new(),
            active_dialog: ActiveDialog::None,
            notices: VecDeque::new(),
            io_sender,
            io_receiver,
            pending_io_ops: 0,
            startup_file,
            status: String::new(),
        }
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    /// Turn a declined command into a notice.
    fn report(&mut self, result: Result<()>) {
        if let Err(e) = result {
            self.notify(Notice::from(&e));
        }
    }

    fn modal_open(&self) -> bool {
        !self.active_dialog.is_none() || !self.notices.is_empty()
    }

    // ========================================================================
    // COMMANDS
    // ========================================================================

    pub fn run_command(&mut self, command: Command) {
        match command {
            Command::Open => self.handle_open_file(),
            Command::Save => self.handle_save(),
            Command::Undo => {
                let r = self.session.undo();
                self.report(r);
            }
            Command::ToggleDraw => match self.session.toggle_draw() {
                Ok(n) => self.notify(n),
                Err(e) => self.notify(Notice::from(&e)),
            },
            Command::ToggleCrop => match self.session.toggle_crop() {
                Ok(n) => self.notify(n),
                Err(e) => self.notify(Notice::from(&e)),
            },
            Command::BrightnessContrast => {
                if self.session.has_image() {
                    self.active_dialog = ActiveDialog::BrightnessContrast(BrightnessContrastDialog::new());
                } else {
                    self.notify(Notice::from(&EditorError::NoImage));
                }
            }
            Command::Grayscale => {
                let r = self.session.grayscale();
                self.report(r);
            }
            Command::Sepia => {
                let r = self.session.sepia();
                self.report(r);
            }
            Command::Blur => {
                let r = self.session.blur();
                self.report(r);
            }
            Command::Sharpen => {
                let r = self.session.sharpen();
                self.report(r);
            }
            Command::Rotate(degrees) => {
                let r = self.session.rotate(degrees);
                self.report(r);
            }
            Command::BrushColor => {
                self.active_dialog = ActiveDialog::BrushColor(BrushColorDialog::new(self.session.brush().color));
            }
            Command::BrushSize => {
                self.active_dialog = ActiveDialog::BrushSize(BrushSizeDialog::new(self.session.brush().size));
            }
            Command::ZoomIn => self.session.zoom_in(),
            Command::ZoomOut => self.session.zoom_out(),
        }
    }

    fn handle_open_file(&mut self) {
        if let Some(path) = self.file_handler.pick_open_path() {
            self.open_file_by_path(path);
        }
    }

    /// Decode `path` on a background thread; the result arrives through
    /// `io_receiver`.
    fn open_file_by_path(&mut self, path: PathBuf) {
        let sender = self.io_sender.clone();
        self.pending_io_ops += 1;
        self.status = format!("Loading {}…", path.display());
        rayon::spawn(move || {
            let msg = match crate::io::load_image_sync(&path) {
                Ok(image) => IoResult::ImageLoaded { image, path },
                Err(e) => IoResult::LoadFailed { path, error: e.to_string() },
            };
            let _ = sender.send(msg);
        });
    }

    fn handle_save(&mut self) {
        if !self.session.has_image() {
            self.notify(Notice::warning("Warning", "No image to save"));
            return;
        }
        let Some(path) = self.file_handler.pick_save_path() else {
            return;
        };
        match self.session.save(&path) {
            Ok(written) => {
                self.status = format!("Saved {}", written.display());
                self.file_handler.current_path = Some(written);
            }
            Err(e) => self.notify(Notice::from(&e)),
        }
    }

    fn poll_io(&mut self) {
        while let Ok(result) = self.io_receiver.try_recv() {
            self.pending_io_ops = self.pending_io_ops.saturating_sub(1);
            match result {
                IoResult::ImageLoaded { image, path } => {
                    self.status = format!("{} ({}×{})", path.display(), image.width(), image.height());
                    self.file_handler.current_path = Some(path.clone());
                    self.session.load_from(image, path);
                    self.active_dialog = ActiveDialog::None;
                }
                IoResult::LoadFailed { path, error } => {
                    log_err!("Open {} failed: {}", path.display(), error);
                    self.status.clear();
                    self.notify(Notice::error("Error", format!("Could not open {}: {}", path.display(), error)));
                }
            }
        }
    }

    // ========================================================================
    // INPUT
    // ========================================================================

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let bindings = [
            (egui::Key::O, Command::Open),
            (egui::Key::S, Command::Save),
            (egui::Key::Z, Command::Undo),
            (egui::Key::PlusEquals, Command::ZoomIn),
            (egui::Key::Minus, Command::ZoomOut),
        ];
        for (key, command) in bindings {
            if ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, key)) {
                self.run_command(command);
            }
        }
    }

    /// Wheel over the canvas zooms by one step per notch; the delta is
    /// consumed so the scroll area does not also scroll.
    fn handle_wheel_zoom(&mut self, ctx: &egui::Context) {
        let pointer_over_widget = ctx.is_pointer_over_area();
        let mut steps = 0;
        ctx.input_mut(|i| {
            if i.scroll_delta.y.abs() > 0.1 {
                let over_canvas = i
                    .pointer
                    .hover_pos()
                    .is_some_and(|pos| self.canvas.last_canvas_rect.is_some_and(|rect| rect.contains(pos)));
                if over_canvas && !pointer_over_widget {
                    steps = if i.scroll_delta.y > 0.0 { 1 } else { -1 };
                    i.scroll_delta.y = 0.0;
                }
            }
        });
        self.session.zoom(steps);
    }

    fn handle_canvas_pointer(&mut self, response: CanvasResponse) {
        let events = [
            response.pressed.map(|p| self.session.pointer_pressed(p)),
            response.dragged.map(|p| self.session.pointer_dragged(p)),
            response.released.map(|p| self.session.pointer_released(p)),
        ];
        for event in events.into_iter().flatten() {
            match event {
                Ok(Some(notice)) => self.notify(notice),
                Ok(None) => {}
                Err(e) => self.notify(Notice::from(&e)),
            }
        }
    }

    // ========================================================================
    // PANELS
    // ========================================================================

    fn show_toolbar(&mut self, ctx: &egui::Context) {
        let mode = self.session.mode();
        let enabled = !self.modal_open();
        let mut clicked = None;
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(2.0);
            ui.set_enabled(enabled);
            ui.horizontal_wrapped(|ui| {
                let mut button = |ui: &mut egui::Ui, label: &str, hint: &str, command: Command| {
                    if ui.button(label).on_hover_text(hint).clicked() {
                        clicked = Some(command);
                    }
                };
                button(ui, "📂 Open", "Open an image (Ctrl+O)", Command::Open);
                button(ui, "💾 Save", "Save the image (Ctrl+S)", Command::Save);
                button(ui, "↶ Undo", "Undo the last edit (Ctrl+Z)", Command::Undo);
                ui.separator();

                if ui.selectable_label(mode == EditMode::Draw, "✏ Draw").clicked() {
                    clicked = Some(Command::ToggleDraw);
                }
                if ui.selectable_label(mode == EditMode::Crop, "✂ Crop").clicked() {
                    clicked = Some(Command::ToggleCrop);
                }
                ui.separator();

                let mut button = |ui: &mut egui::Ui, label: &str, hint: &str, command: Command| {
                    if ui.button(label).on_hover_text(hint).clicked() {
                        clicked = Some(command);
                    }
                };
                button(ui, "☀ Brightness/Contrast", "Adjust brightness and contrast", Command::BrightnessContrast);
                button(ui, "Grayscale", "Convert to grayscale", Command::Grayscale);
                button(ui, "Sepia", "Apply a sepia tone", Command::Sepia);
                button(ui, "Blur", "Gaussian blur", Command::Blur);
                button(ui, "Sharpen", "Unsharp mask", Command::Sharpen);
                ui.separator();
                button(ui, "⟲ Rotate left", "Rotate 90° counter-clockwise", Command::Rotate(90.0));
                button(ui, "⟳ Rotate right", "Rotate 90° clockwise", Command::Rotate(-90.0));
                ui.separator();
                button(ui, "🎨 Brush color", "Pick the brush color", Command::BrushColor);
                button(ui, "Brush size", "Set the brush diameter (1-50)", Command::BrushSize);
            });
            ui.add_space(2.0);
        });
        if let Some(command) = clicked {
            self.run_command(command);
        }
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.pending_io_ops > 0 {
                    ui.spinner();
                }
                if let Some(image) = self.session.image() {
                    ui.label(format!("{}×{}", image.width(), image.height()));
                    ui.separator();
                    ui.label(format!("{:.0}%", self.session.scale() * 100.0));
                    ui.separator();
                    ui.label(format!("Undo: {}", self.session.history().undo_depth()));
                    ui.separator();
                    let mode = match self.session.mode() {
                        EditMode::None => "View",
                        EditMode::Draw => "Draw",
                        EditMode::Crop => "Crop",
                    };
                    ui.label(mode);
                    ui.separator();
                    let brush = self.session.brush();
                    let [r, g, b, _] = brush.color.0;
                    let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                    ui.painter().rect_filled(rect, 2.0, egui::Color32::from_rgb(r, g, b));
                    ui.label(format!("{} px", brush.size));
                }
                if !self.status.is_empty() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(egui::RichText::new(&self.status).weak());
                    });
                }
            });
        });
    }

    // ========================================================================
    // DIALOGS
    // ========================================================================

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        match &mut self.active_dialog {
            ActiveDialog::None => {}
            ActiveDialog::BrightnessContrast(dialog) => match dialog.show(ctx) {
                DialogResult::Ok((brightness, contrast)) => {
                    self.active_dialog = ActiveDialog::None;
                    let r = self.session.adjust_brightness_contrast(brightness, contrast);
                    self.report(r);
                }
                DialogResult::Cancel => self.active_dialog = ActiveDialog::None,
                DialogResult::Open | DialogResult::Changed => {}
            },
            ActiveDialog::BrushSize(dialog) => match dialog.show(ctx) {
                DialogResult::Ok(size) => {
                    self.active_dialog = ActiveDialog::None;
                    let r = self.session.set_brush_size(size);
                    self.report(r);
                }
                DialogResult::Cancel => self.active_dialog = ActiveDialog::None,
                DialogResult::Open | DialogResult::Changed => {}
            },
            ActiveDialog::BrushColor(dialog) => match dialog.show(ctx) {
                DialogResult::Ok(color) => {
                    self.active_dialog = ActiveDialog::None;
                    self.session.set_brush_color(color);
                }
                DialogResult::Cancel => self.active_dialog = ActiveDialog::None,
                DialogResult::Open | DialogResult::Changed => {}
            },
        }
    }

    fn show_notices(&mut self, ctx: &egui::Context) {
        if let Some(notice) = self.notices.front()
            && show_notice(ctx, notice)
        {
            self.notices.pop_front();
        }
    }

    fn window_title(&self) -> String {
        match self.session.source_path().and_then(|p| p.file_name()) {
            Some(name) => format!("Photo_Redact - {}", name.to_string_lossy()),
            None => "Photo_Redact".to_string(),
        }
    }
}

impl eframe::App for PhotoRedactApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.window_title()));

        // Open the file passed on the command line
        if let Some(path) = self.startup_file.take() {
            log_info!("Opening startup file {}", path.display());
            self.open_file_by_path(path);
        }

        self.poll_io();
        if self.pending_io_ops > 0 {
            ctx.request_repaint();
        }

        // A dialog or notice blocks shortcuts and canvas interaction
        let modal_open = self.modal_open();
        if !modal_open {
            self.handle_shortcuts(ctx);
            self.handle_wheel_zoom(ctx);
        }

        self.show_toolbar(ctx);
        self.show_status_bar(ctx);

        let response = egui::CentralPanel::default()
            .show(ctx, |ui| {
                self.canvas.show(
                    ui,
                    self.session.image(),
                    self.session.revision(),
                    self.session.scale(),
                    self.session.rubber_band(),
                )
            })
            .inner;
        if !modal_open {
            self.handle_canvas_pointer(response);
        }

        // Notices first: one raised by a dialog this frame waits a frame, so
        // the key that closed the dialog does not also dismiss it.
        self.show_notices(ctx);
        self.show_dialogs(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn app_with_image() -> PhotoRedactApp {
        let mut app = PhotoRedactApp::with_settings(EditorSettings::default(), None);
        app.session.load(RgbaImage::from_pixel(8, 8, Rgba([200, 100, 50, 255])));
        app
    }

    #[test]
    fn test_commands_without_image_queue_warnings() {
        let mut app = PhotoRedactApp::with_settings(EditorSettings::default(), None);
        app.run_command(Command::Grayscale);
        app.run_command(Command::ToggleDraw);
        app.run_command(Command::BrightnessContrast);
        assert_eq!(app.notices.len(), 3);
        assert!(app.active_dialog.is_none());
        assert!(app.modal_open());
    }

    #[test]
    fn test_toggle_reports_mode_change() {
        let mut app = app_with_image();
        app.run_command(Command::ToggleCrop);
        assert_eq!(app.notices.pop_front(), Some(Notice::info("Crop", "Crop mode on")));
        assert_eq!(app.session.mode(), EditMode::Crop);
    }

    #[test]
    fn test_undo_with_nothing_to_undo_is_info() {
        let mut app = app_with_image();
        app.run_command(Command::Undo);
        let notice = app.notices.pop_front().unwrap();
        assert_eq!(notice.level, crate::error::NoticeLevel::Info);
    }

    #[test]
    fn test_canvas_drag_in_draw_mode_records_one_stroke() {
        let mut app = app_with_image();
        app.run_command(Command::ToggleDraw);
        app.notices.clear();
        app.handle_canvas_pointer(CanvasResponse { pressed: Some((1, 4)), dragged: Some((6, 4)), released: None });
        app.handle_canvas_pointer(CanvasResponse { released: Some((6, 4)), ..Default::default() });
        assert_eq!(app.session.history().len(), 2);
        assert_ne!(app.session.image().unwrap().get_pixel(3, 4), &Rgba([200, 100, 50, 255]));
        assert!(app.notices.is_empty());
    }

    #[test]
    fn test_rotate_buttons() {
        let mut app = PhotoRedactApp::with_settings(EditorSettings::default(), None);
        app.session.load(RgbaImage::new(6, 2));
        app.run_command(Command::Rotate(90.0));
        assert_eq!(app.session.image().unwrap().dimensions(), (2, 6));
        app.run_command(Command::Rotate(-90.0));
        assert_eq!(app.session.image().unwrap().dimensions(), (6, 2));
        assert!(app.notices.is_empty());
    }

    #[test]
    fn test_background_load_replaces_image() {
        let mut app = app_with_image();
        app.session.grayscale().unwrap();
        app.io_sender
            .send(IoResult::ImageLoaded { image: RgbaImage::new(3, 4), path: PathBuf::from("new.png") })
            .unwrap();
        app.pending_io_ops = 1;
        app.poll_io();
        assert_eq!(app.pending_io_ops, 0);
        assert_eq!(app.session.image().unwrap().dimensions(), (3, 4));
        assert_eq!(app.session.history().len(), 1);
        assert_eq!(app.window_title(), "Photo_Redact - new.png");
    }

    #[test]
    fn test_failed_load_keeps_image() {
        let mut app = app_with_image();
        app.io_sender
            .send(IoResult::LoadFailed { path: PathBuf::from("bad.png"), error: "corrupt".into() })
            .unwrap();
        app.poll_io();
        assert_eq!(app.session.image().unwrap().dimensions(), (8, 8));
        assert_eq!(app.notices.len(), 1);
    }
}
