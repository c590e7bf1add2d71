//! Saving the modulated signal returned by the service

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name used when `:save` is given no path
pub const DEFAULT_EXPORT_NAME: &str = "psk_modulated.wav";

/// Write the downloaded WAV bytes to `path`
///
/// A path without an extension gets `.wav`; missing parent directories are
/// created. Returns the path actually written.
pub fn save_modulated(path: &Path, wav: &[u8]) -> io::Result<PathBuf> {
    let mut target = path.to_path_buf();
    if target.extension().is_none() {
        target.set_extension("wav");
    }
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&target, wav)?;
    tracing::info!(path = %target.display(), bytes = wav.len(), "modulated signal saved");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let written = save_modulated(&path, b"RIFF1234WAVE").unwrap();

        assert_eq!(written, path);
        assert_eq!(fs::read(&path).unwrap(), b"RIFF1234WAVE");
    }

    #[test]
    fn test_adds_extension_and_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs").join("tone_psk");
        let written = save_modulated(&path, b"RIFF").unwrap();

        assert_eq!(written, dir.path().join("runs").join("tone_psk.wav"));
        assert_eq!(fs::read(&written).unwrap(), b"RIFF");
    }

    #[test]
    fn test_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_NAME);
        fs::write(&path, b"old contents").unwrap();

        save_modulated(&path, b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }
}
