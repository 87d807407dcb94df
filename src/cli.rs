// ============================================================================
// LAUNCH ARGUMENTS - optional image to open when the window appears
// ============================================================================
//
// Usage:
//   PhotoRedact                 (empty canvas)
//   PhotoRedact photo.jpg       (opens photo.jpg on startup)

use std::path::PathBuf;

use clap::Parser;

/// Photo_Redact desktop image editor.
#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(name = "PhotoRedact", version, about = "Desktop raster image editor")]
pub struct LaunchArgs {
    /// Image to open on startup (PNG, JPEG, BMP or GIF).
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl LaunchArgs {
    /// Parse from the process arguments. Malformed arguments are logged and
    /// ignored so the editor still opens.
    pub fn from_env() -> Self {
        match Self::try_parse() {
            Ok(args) => args,
            Err(e) => {
                crate::log_warn!("Ignoring launch arguments: {}", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_opens_nothing() {
        let args = LaunchArgs::try_parse_from(["PhotoRedact"]).unwrap();
        assert_eq!(args.file, None);
    }

    #[test]
    fn test_positional_file() {
        let args = LaunchArgs::try_parse_from(["PhotoRedact", "shots/cat.png"]).unwrap();
        assert_eq!(args.file, Some(PathBuf::from("shots/cat.png")));
    }

    #[test]
    fn test_extra_positional_is_rejected() {
        assert!(LaunchArgs::try_parse_from(["PhotoRedact", "a.png", "b.png"]).is_err());
    }
}
