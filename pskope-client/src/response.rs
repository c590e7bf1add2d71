//! Processing service response

use pskope_signal::{SampleBuffer, Stage};
use serde::{Deserialize, Deserializer};

/// JSON body returned by `POST /api/process-audio`
///
/// Stage arrays the service leaves out, or sends as `null`, decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProcessingResponse {
    #[serde(deserialize_with = "null_as_empty")]
    pub audio_data: Vec<f32>,
    #[serde(deserialize_with = "null_as_empty")]
    pub pcm_samples: Vec<f32>,
    #[serde(deserialize_with = "null_as_empty")]
    pub binary_data: Vec<f32>,
    #[serde(deserialize_with = "null_as_empty")]
    pub polar_data: Vec<f32>,
    #[serde(deserialize_with = "null_as_empty")]
    pub carrier: Vec<f32>,
    #[serde(deserialize_with = "null_as_empty")]
    pub psk_waveform: Vec<f32>,
    pub audio_url: Option<String>,
    pub message: Option<String>,
    pub original_sample_rate: Option<u32>,
    pub processed_sample_rate: Option<u32>,
    pub bit_depth: Option<u32>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<f32>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ProcessingResponse {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Move the stage arrays into an immutable buffer
    pub fn into_sample_buffer(self, source: Option<&str>) -> SampleBuffer {
        let mut builder = SampleBuffer::builder()
            .stage(Stage::Original, self.audio_data)
            .stage(Stage::Pcm, self.pcm_samples)
            .stage(Stage::Binary, self.binary_data)
            .stage(Stage::Polar, self.polar_data)
            .stage(Stage::Carrier, self.carrier)
            .stage(Stage::Psk, self.psk_waveform);
        if let Some(source) = source {
            builder = builder.source(source);
        }
        builder.build()
    }
}
