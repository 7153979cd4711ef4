//! FFmpeg setup and console verbosity.
//!
//! Only the video sink touches FFmpeg. Encoders print their own diagnostics
//! to stderr, separately from this crate's `log` output; [`set_ffmpeg_log_level`]
//! tunes or silences them.
//!
//! # Example
//!
//! ```no_run
//! use camroll::FfmpegLogLevel;
//!
//! camroll::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! ```

use ffmpeg_next::util::log::Level;

use crate::error::CamrollError;

/// FFmpeg console verbosity, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print nothing.
    Quiet,
    /// Unrecoverable errors only.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Debugging output.
    Debug,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Debug => Level::Debug,
        }
    }

    /// Parse a level name; `warn` is accepted for `warning`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "quiet" => Some(FfmpegLogLevel::Quiet),
            "fatal" => Some(FfmpegLogLevel::Fatal),
            "error" => Some(FfmpegLogLevel::Error),
            "warning" | "warn" => Some(FfmpegLogLevel::Warning),
            "info" => Some(FfmpegLogLevel::Info),
            "debug" => Some(FfmpegLogLevel::Debug),
            _ => None,
        }
    }
}

/// Set FFmpeg's console verbosity. Does not affect `log` output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

/// Initialise FFmpeg. Safe to call repeatedly.
pub(crate) fn ensure_initialized() -> Result<(), CamrollError> {
    ffmpeg_next::init()
        .map_err(|error| CamrollError::FfmpegError(format!("initialisation failed: {error}")))
}

#[cfg(test)]
mod tests {
    use super::FfmpegLogLevel;

    #[test]
    fn level_names_parse() {
        assert_eq!(FfmpegLogLevel::from_name("WARN"), Some(FfmpegLogLevel::Warning));
        assert_eq!(FfmpegLogLevel::from_name("quiet"), Some(FfmpegLogLevel::Quiet));
        assert_eq!(FfmpegLogLevel::from_name("trace"), None);
    }
}
