//! Upload settings and client-side file validation

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Extensions the processing service accepts
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["wav", "mp3", "flac", "ogg"];

/// Largest file accepted for upload (20 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a file: {0}")]
    NotAFile(String),
    #[error("unsupported format ({0}), use: .wav, .mp3, .flac, .ogg")]
    UnsupportedExtension(String),
    #[error("file too large ({size} bytes), maximum is 20 MB")]
    TooLarge { size: u64 },
    #[error("unsupported bit depth {0}, use 8 or 16")]
    InvalidBitDepth(u32),
    #[error("unsupported sample rate {0}, use 44100, 48000 or 96000")]
    InvalidSampleRate(u32),
}

/// PCM quantization depth requested from the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepth {
    #[default]
    Eight,
    Sixteen,
}

impl BitDepth {
    pub fn bits(self) -> u32 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            BitDepth::Eight => BitDepth::Sixteen,
            BitDepth::Sixteen => BitDepth::Eight,
        }
    }
}

impl TryFrom<u32> for BitDepth {
    type Error = UploadError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            other => Err(UploadError::InvalidBitDepth(other)),
        }
    }
}

impl FromStr for BitDepth {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s.trim().parse::<u32>().map_err(|_| UploadError::InvalidBitDepth(0))?;
        Self::try_from(bits)
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Rate the service resamples to before encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleRate {
    #[default]
    Hz44100,
    Hz48000,
    Hz96000,
}

impl SampleRate {
    pub fn hz(self) -> u32 {
        match self {
            SampleRate::Hz44100 => 44_100,
            SampleRate::Hz48000 => 48_000,
            SampleRate::Hz96000 => 96_000,
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            SampleRate::Hz44100 => SampleRate::Hz48000,
            SampleRate::Hz48000 => SampleRate::Hz96000,
            SampleRate::Hz96000 => SampleRate::Hz44100,
        }
    }
}

impl TryFrom<u32> for SampleRate {
    type Error = UploadError;

    fn try_from(hz: u32) -> Result<Self, Self::Error> {
        match hz {
            44_100 => Ok(SampleRate::Hz44100),
            48_000 => Ok(SampleRate::Hz48000),
            96_000 => Ok(SampleRate::Hz96000),
            other => Err(UploadError::InvalidSampleRate(other)),
        }
    }
}

impl FromStr for SampleRate {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hz = s
            .trim()
            .parse::<u32>()
            .map_err(|_| UploadError::InvalidSampleRate(0))?;
        Self::try_from(hz)
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.hz())
    }
}

/// Form fields sent with every upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessingSettings {
    pub bit_depth: BitDepth,
    pub sample_rate: SampleRate,
}

/// Check a file before uploading it; returns its size in bytes
pub fn validate_file(path: &Path) -> Result<u64, UploadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(UploadError::UnsupportedExtension(format!(".{extension}")));
    }

    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(UploadError::NotAFile(path.display().to_string()));
    }

    let size = metadata.len();
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size });
    }

    Ok(size)
}
