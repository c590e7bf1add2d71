//! Command definitions for pskope

use std::path::PathBuf;

/// Seconds skipped by one seek key press
pub const SEEK_STEP_SECS: f64 = 5.0;

/// Commands produced by the input handler
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Playback
    TogglePlay,
    /// Pause and rewind to the start
    Stop,
    /// Relative seek in seconds
    Seek(f64),

    // Processing
    /// Upload the given file, or the current one
    Upload(Option<PathBuf>),
    /// Select a file without uploading it
    OpenFile(PathBuf),
    CycleBitDepth,
    CycleSampleRate,
    /// Requested bit depth, validated by the application
    SetBitDepth(u32),
    /// Requested sample rate in Hz, validated by the application
    SetSampleRate(u32),
    SetServer(String),
    /// Write the modulated signal of the last upload to a WAV file
    Save(Option<PathBuf>),

    // View
    ToggleDynamicMode,
    SetTheme(String),
    ToggleHelp,

    // Mode changes
    EnterCommandMode,
    EnterNormalMode,
    /// Unrecognized command line, echoed back to the user
    ExecuteCommand(String),
    Cancel,
    Quit,
}
