//! End-to-end behaviour of `EditorSession`: history bounds, zoom bounds,
//! crop refusal and stroke recording.

use image::{Rgba, RgbaImage};
use photoredact::canvas::EditMode;
use photoredact::error::EditorError;
use photoredact::ops::canvas_ops::CropRegion;
use photoredact::settings::{MAX_SCALE, MIN_SCALE};
use photoredact::EditorSession;
use proptest::prelude::*;

fn photo() -> RgbaImage {
    RgbaImage::from_fn(16, 10, |x, y| Rgba([(x * 15) as u8, (y * 25) as u8, 90, 255]))
}

fn loaded() -> EditorSession {
    let mut session = EditorSession::default();
    session.load(photo());
    session
}

/// Apply mutation number `op` (mod 6). Every one of them records.
fn mutate(session: &mut EditorSession, op: u8) {
    let result = match op % 6 {
        0 => session.grayscale(),
        1 => session.sepia(),
        2 => session.blur(),
        3 => session.sharpen(),
        4 => session.rotate(90.0),
        _ => session.adjust_brightness_contrast(15, 10),
    };
    result.unwrap();
}

proptest! {
    #[test]
    fn prop_undo_all_returns_loaded_image(ops in proptest::collection::vec(0u8..6, 1..=19)) {
        let mut session = loaded();
        for &op in &ops {
            mutate(&mut session, op);
        }
        for _ in 0..ops.len() {
            session.undo().unwrap();
        }
        prop_assert_eq!(session.image(), Some(&photo()));
        prop_assert!(matches!(session.undo(), Err(EditorError::NothingToUndo)));
    }

    #[test]
    fn prop_scale_stays_in_bounds(steps in proptest::collection::vec(-40i32..40, 0..30)) {
        let mut session = loaded();
        for s in steps {
            session.zoom(s);
            prop_assert!(session.scale() >= MIN_SCALE && session.scale() <= MAX_SCALE);
        }
        prop_assert_eq!(session.history().len(), 1);
    }
}

#[test]
fn history_keeps_only_the_last_twenty_snapshots() {
    let mut session = loaded();
    for i in 0..25 {
        mutate(&mut session, i);
    }
    assert_eq!(session.history().len(), 20);

    let mut undone = 0;
    while session.undo().is_ok() {
        undone += 1;
    }
    assert_eq!(undone, 19);
    // The loaded image fell off the bottom of the history.
    assert_ne!(session.image(), Some(&photo()));
}

#[test]
fn degenerate_crop_changes_nothing() {
    let mut session = loaded();
    let before = session.revision();
    let err = session.crop(CropRegion::from_corners((5, 2), (5, 9))).unwrap_err();
    assert!(matches!(err, EditorError::InvalidCropRegion { .. }));
    assert_eq!(session.image(), Some(&photo()));
    assert_eq!(session.revision(), before);
    assert!(!session.history().can_undo());
}

#[test]
fn stroke_is_one_undo_step() {
    let mut session = loaded();
    session.set_brush_color(Rgba([0, 255, 0, 255]));
    session.set_brush_size(3).unwrap();
    session.toggle_draw().unwrap();

    session.pointer_pressed((1, 1)).unwrap();
    for x in 2..14 {
        session.pointer_dragged((x, 1 + x / 3)).unwrap();
    }
    session.pointer_released((13, 5)).unwrap();

    assert_eq!(session.history().len(), 2);
    assert_eq!(session.image().unwrap().get_pixel(1, 1), &Rgba([0, 255, 0, 255]));
    session.undo().unwrap();
    assert_eq!(session.image(), Some(&photo()));
}

#[test]
fn press_outside_any_mode_does_nothing() {
    let mut session = loaded();
    assert_eq!(session.mode(), EditMode::None);
    session.pointer_pressed((2, 2)).unwrap();
    session.pointer_dragged((8, 8)).unwrap();
    session.pointer_released((8, 8)).unwrap();
    assert_eq!(session.image(), Some(&photo()));
    assert_eq!(session.history().len(), 1);
}

#[test]
fn crop_by_drag_then_undo() {
    let mut session = loaded();
    session.toggle_crop().unwrap();
    session.pointer_pressed((12, 8)).unwrap();
    session.pointer_dragged((4, 3)).unwrap();
    session.pointer_released((4, 2)).unwrap();
    assert_eq!(session.image().unwrap().dimensions(), (8, 6));
    assert_eq!(session.mode(), EditMode::None);

    session.undo().unwrap();
    assert_eq!(session.image(), Some(&photo()));
}

#[test]
fn open_and_save_through_the_session() {
    let dir = std::env::temp_dir().join(format!("photoredact-session-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let mut session = loaded();
    session.grayscale().unwrap();
    let written = session.save(&dir.join("gray")).unwrap();
    assert_eq!(written, dir.join("gray.png"));

    let mut reopened = EditorSession::default();
    reopened.open(&written).unwrap();
    assert_eq!(reopened.image(), session.image());
    assert_eq!(reopened.history().len(), 1);
    assert_eq!(reopened.source_path(), Some(written.as_path()));

    assert!(matches!(
        session.save(&dir.join("gray.webp")),
        Err(EditorError::UnsupportedFormat(_))
    ));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn failed_open_keeps_current_image() {
    let mut session = loaded();
    assert!(session.open(std::path::Path::new("/no/such/photo.png")).is_err());
    assert_eq!(session.image(), Some(&photo()));
}
