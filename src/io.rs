// ============================================================================
// FILE I/O - decode to RGBA, encode PNG / JPEG / BMP, native file dialogs
// ============================================================================

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageEncoder, RgbaImage};
use rfd::FileDialog;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{EditorError, Result};
use crate::{log_err, log_info};

/// Extensions offered by the open dialog.
pub const OPEN_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// JPEG quality used when saving.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

// ============================================================================
// SAVE FORMAT
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SaveFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
}

impl SaveFormat {
    pub fn all() -> &'static [SaveFormat] {
        &[SaveFormat::Png, SaveFormat::Jpeg, SaveFormat::Bmp]
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
            SaveFormat::Bmp => "bmp",
        }
    }

    /// Every extension the save dialog accepts for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            SaveFormat::Png => &["png"],
            SaveFormat::Jpeg => &["jpg", "jpeg"],
            SaveFormat::Bmp => &["bmp"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SaveFormat::Png => "PNG",
            SaveFormat::Jpeg => "JPEG",
            SaveFormat::Bmp => "BMP",
        }
    }

    pub fn from_extension(ext: &str) -> Option<SaveFormat> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(SaveFormat::Png),
            "jpg" | "jpeg" => Some(SaveFormat::Jpeg),
            "bmp" => Some(SaveFormat::Bmp),
            _ => None,
        }
    }
}

/// Work out where and how to save `path`.
///
/// No extension: PNG, with `.png` appended. A known extension picks its
/// encoder. Anything else is `UnsupportedFormat`.
pub fn resolve_save_target(path: &Path) -> Result<(PathBuf, SaveFormat)> {
    match path.extension().and_then(|e| e.to_str()) {
        None => Ok((path.with_extension(SaveFormat::Png.extension()), SaveFormat::Png)),
        Some(ext) => SaveFormat::from_extension(ext)
            .map(|format| (path.to_path_buf(), format))
            .ok_or_else(|| EditorError::UnsupportedFormat(ext.to_string())),
    }
}

// ============================================================================
// DECODE / ENCODE
// ============================================================================

/// Decode any supported raster file into 8-bit RGBA.
pub fn load_image_sync(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)?.to_rgba8();
    log_info!("Loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img)
}

/// Encode and write an image to a file. JPEG has no alpha channel, so it is
/// dropped before encoding.
pub fn encode_and_write(image: &RgbaImage, path: &Path, format: SaveFormat, quality: u8) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let (w, h) = image.dimensions();

    match format {
        SaveFormat::Png => {
            PngEncoder::new(&mut writer).write_image(image.as_raw(), w, h, ColorType::Rgba8)?;
        }
        SaveFormat::Jpeg => {
            let rgb_image = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100)).write_image(
                rgb_image.as_raw(),
                w,
                h,
                ColorType::Rgb8,
            )?;
        }
        SaveFormat::Bmp => {
            BmpEncoder::new(&mut writer).write_image(image.as_raw(), w, h, ColorType::Rgba8)?;
        }
    }

    writer.flush()?;
    log_info!("Saved {} as {} ({}x{})", path.display(), format.label(), w, h);
    Ok(())
}

/// Resolve the target for `path` and write `image` there. Returns the path
/// actually written.
pub fn save_image(image: &RgbaImage, path: &Path) -> Result<PathBuf> {
    let (path, format) = resolve_save_target(path)?;
    encode_and_write(image, &path, format, DEFAULT_JPEG_QUALITY).inspect_err(|e| {
        log_err!("Save to {} failed: {}", path.display(), e);
    })?;
    Ok(path)
}

// ============================================================================
// FILE HANDLER
// ============================================================================

/// Native open/save dialogs plus the last path used, so the save dialog can
/// start next to the opened file.
#[derive(Default)]
pub struct FileHandler {
    /// Path the current image was opened from or last saved to.
    pub current_path: Option<PathBuf>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the native open dialog. `None` when the user cancels.
    pub fn pick_open_path(&self) -> Option<PathBuf> {
        let mut dialog = FileDialog::new()
            .add_filter("Image files", OPEN_EXTENSIONS)
            .add_filter("All Files", &["*"]);
        if let Some(dir) = self.current_dir() {
            dialog = dialog.set_directory(dir);
        }
        dialog.pick_file()
    }

    /// Show the native save dialog, PNG first. `None` when the user cancels.
    pub fn pick_save_path(&self) -> Option<PathBuf> {
        let mut dialog = FileDialog::new();
        for format in SaveFormat::all() {
            dialog = dialog.add_filter(format.label(), format.extensions());
        }
        if let Some(dir) = self.current_dir() {
            dialog = dialog.set_directory(dir);
        }
        let stem = self
            .current_path
            .as_ref()
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("untitled");
        dialog
            .set_file_name(format!("{}.{}", stem, SaveFormat::Png.extension()))
            .save_file()
    }

    fn current_dir(&self) -> Option<&Path> {
        self.current_path.as_deref().and_then(Path::parent)
    }
}
