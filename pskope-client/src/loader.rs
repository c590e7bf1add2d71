//! Media decoding for playback

use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

/// Errors that can occur while decoding a media resource
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No audio track found in media")]
    NoAudioTrack,
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Resample error: {0}")]
    Resample(String),
}

/// Mono PCM ready for the output device
#[derive(Debug, Clone, Default)]
pub struct DecodedMedia {
    /// Mono samples, nominally -1.0 to 1.0
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Sample rate of the resource before resampling
    pub source_rate: u32,
}

impl DecodedMedia {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Media decoder using Symphonia, resampling to the output rate with Rubato
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaLoader {
    target_sample_rate: Option<u32>,
}

impl MediaLoader {
    /// Decoder that keeps the resource's own rate
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that resamples to `rate`
    pub fn with_sample_rate(rate: u32) -> Self {
        Self {
            target_sample_rate: Some(rate),
        }
    }

    pub fn load(&self, path: &Path) -> Result<DecodedMedia, LoadError> {
        let bytes = std::fs::read(path)?;
        let extension = path.extension().and_then(|e| e.to_str());
        self.decode(bytes, extension)
    }

    /// Decode an in-memory resource; `extension` is a format hint
    pub fn decode(&self, bytes: Vec<u8>, extension: Option<&str>) -> Result<DecodedMedia, LoadError> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = extension {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(LoadError::NoAudioTrack)?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();
        let source_rate = codec_params.sample_rate.unwrap_or(44_100);

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        let mut samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(_) => break,
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(e) => {
                    tracing::trace!(error = %e, "skipping undecodable packet");
                    continue;
                }
            };

            let spec = *decoded.spec();
            let channels = spec.channels.count().max(1);
            let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);

            samples.extend(
                sample_buf
                    .samples()
                    .chunks(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        }

        let (samples, sample_rate) = match self.target_sample_rate {
            Some(target) if target != source_rate && !samples.is_empty() => {
                (resample(&samples, source_rate, target)?, target)
            }
            _ => (samples, source_rate),
        };

        tracing::debug!(source_rate, sample_rate, len = samples.len(), "media decoded");

        Ok(DecodedMedia {
            samples,
            sample_rate,
            source_rate,
        })
    }
}

/// Resample a mono signal
fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>, LoadError> {
    use rubato::{FftFixedInOut, Resampler};

    let mut resampler =
        FftFixedInOut::<f32>::new(source_rate as usize, target_rate as usize, 1024, 1)
            .map_err(|e| LoadError::Resample(e.to_string()))?;

    let chunk_size = resampler.input_frames_next();
    let mut output = Vec::with_capacity(
        (samples.len() as u64 * target_rate as u64 / source_rate as u64) as usize + chunk_size,
    );

    let mut chunks = samples.chunks_exact(chunk_size);
    for chunk in chunks.by_ref() {
        let resampled = resampler
            .process(&[chunk], None)
            .map_err(|e| LoadError::Resample(e.to_string()))?;
        output.extend_from_slice(&resampled[0]);
    }

    // Zero-pad the tail and keep only its share of the output
    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut padded = tail.to_vec();
        padded.resize(chunk_size, 0.0);
        let resampled = resampler
            .process(&[padded.as_slice()], None)
            .map_err(|e| LoadError::Resample(e.to_string()))?;
        let keep = tail.len() * target_rate as usize / source_rate as usize;
        output.extend_from_slice(&resampled[0][..keep.min(resampled[0].len())]);
    }

    Ok(output)
}
