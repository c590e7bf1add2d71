//! Pipeline stages

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a stage name cannot be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown pipeline stage: {0}")]
pub struct StageParseError(pub String);

/// One stage of the PCM -> polar -> BPSK pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Source audio as uploaded
    Original,
    /// Quantized PCM samples
    Pcm,
    /// Bit stream fed into the line coder
    Binary,
    /// Polar NRZ line code
    Polar,
    /// Unmodulated carrier
    Carrier,
    /// BPSK modulated signal
    Psk,
}

impl Stage {
    /// Every stage in pipeline order
    pub const ALL: [Stage; 6] = [
        Stage::Original,
        Stage::Pcm,
        Stage::Binary,
        Stage::Polar,
        Stage::Carrier,
        Stage::Psk,
    ];

    /// Position of this stage in [`Stage::ALL`]
    pub fn index(self) -> usize {
        match self {
            Stage::Original => 0,
            Stage::Pcm => 1,
            Stage::Binary => 2,
            Stage::Polar => 3,
            Stage::Carrier => 4,
            Stage::Psk => 5,
        }
    }

    /// Panel title
    pub fn title(self) -> &'static str {
        match self {
            Stage::Original => "ORIGINAL SIGNAL",
            Stage::Pcm => "PCM ENCODING",
            Stage::Binary => "BINARY INTO POLAR",
            Stage::Polar => "POLAR NRZ",
            Stage::Carrier => "CARRIER",
            Stage::Psk => "PSK MODULATED",
        }
    }

    /// Field name of this stage's array in the processing service response
    pub fn field_name(self) -> &'static str {
        match self {
            Stage::Original => "audio_data",
            Stage::Pcm => "pcm_samples",
            Stage::Binary => "binary_data",
            Stage::Polar => "polar_data",
            Stage::Carrier => "carrier",
            Stage::Psk => "psk_waveform",
        }
    }

    /// Whether the stage carries near-binary levels (line code rather than audio)
    pub fn is_line_code(self) -> bool {
        matches!(self, Stage::Binary | Stage::Polar)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Stage {
    type Err = StageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" | "audio" | "audio_data" => Ok(Stage::Original),
            "pcm" | "pcm_samples" => Ok(Stage::Pcm),
            "binary" | "binary_data" => Ok(Stage::Binary),
            "polar" | "polar_data" => Ok(Stage::Polar),
            "carrier" => Ok(Stage::Carrier),
            "psk" | "psk_waveform" => Ok(Stage::Psk),
            _ => Err(StageParseError(s.to_string())),
        }
    }
}
