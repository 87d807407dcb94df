//! Photo_Redact: a single-image desktop raster editor.
//!
//! `session::EditorSession` owns the image, its undo history and the view;
//! `app::PhotoRedactApp` is the eframe front end that drives it.

pub mod logger;

pub mod app;
pub mod canvas;
pub mod cli;
pub mod components;
pub mod error;
pub mod io;
pub mod ops;
pub mod session;
pub mod settings;

pub use error::{EditorError, Result};
pub use session::{EditorSession, Notice};
