//! Background upload worker

use crate::client::{ClientError, ProcessingClient};
use crate::loader::{DecodedMedia, LoadError, MediaLoader};
use crate::upload::ProcessingSettings;
use crossbeam_channel::{unbounded, Receiver, Sender};
use pskope_signal::SampleBuffer;
use std::path::{Path, PathBuf};
use std::thread;

/// Everything one successful upload produced
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub buffer: SampleBuffer,
    /// Decoded modulated signal; `None` when it could not be fetched or decoded
    pub media: Option<DecodedMedia>,
    /// Why `media` is missing
    pub media_error: Option<String>,
    /// Modulated signal as downloaded (WAV), kept for saving
    pub modulated_wav: Option<Vec<u8>>,
    /// Service status message
    pub message: Option<String>,
    pub original_sample_rate: Option<u32>,
    pub processed_sample_rate: Option<u32>,
}

/// Progress of a background upload
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// Request is being sent
    Started { file: String },
    /// Response received, fetching the media resource
    Downloading,
    Completed(Box<UploadOutcome>),
    /// Nothing from this upload may be shown
    Failed(String),
}

/// Upload `path` on a worker thread
///
/// The returned channel yields `Started`, then either `Completed` or `Failed`.
/// Stage data is only ever delivered whole, inside `Completed`.
pub fn spawn_upload(
    server_url: String,
    path: PathBuf,
    settings: ProcessingSettings,
    output_rate: Option<u32>,
) -> Receiver<UploadEvent> {
    let (tx, rx) = unbounded();
    let fail_tx = tx.clone();

    let spawned = thread::Builder::new()
        .name("pskope-upload".to_string())
        .spawn(move || {
            let result = ProcessingClient::new(&server_url)
                .and_then(|client| run_upload(&client, &path, settings, output_rate, &tx));
            let event = match result {
                Ok(outcome) => {
                    tracing::info!(file = %path.display(), "upload completed");
                    UploadEvent::Completed(Box::new(outcome))
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "upload failed");
                    UploadEvent::Failed(e.to_string())
                }
            };
            let _ = tx.send(event);
        });

    if let Err(e) = spawned {
        let _ = fail_tx.send(UploadEvent::Failed(format!("failed to start upload: {e}")));
    }

    rx
}

/// Ask the service at `server_url` whether it is up, on a worker thread
///
/// Yields exactly one result: `Ok(true)` when the service reports `ok`.
pub fn spawn_health_check(server_url: String) -> Receiver<Result<bool, String>> {
    let (tx, rx) = unbounded();
    let fail_tx = tx.clone();

    let spawned = thread::Builder::new()
        .name("pskope-health".to_string())
        .spawn(move || {
            let result = ProcessingClient::new(&server_url)
                .and_then(|client| client.health())
                .map_err(|e| e.to_string());
            tracing::debug!(server = %server_url, ?result, "health check");
            let _ = tx.send(result);
        });

    if let Err(e) = spawned {
        let _ = fail_tx.send(Err(format!("failed to start health check: {e}")));
    }

    rx
}

fn run_upload(
    client: &ProcessingClient,
    path: &Path,
    settings: ProcessingSettings,
    output_rate: Option<u32>,
    tx: &Sender<UploadEvent>,
) -> Result<UploadOutcome, ClientError> {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let _ = tx.send(UploadEvent::Started { file: file.clone() });

    let response = client.process(path, settings)?;

    let message = response.message.clone();
    let original_sample_rate = response.original_sample_rate;
    let processed_sample_rate = response.processed_sample_rate;
    let audio_url = response.audio_url.clone();
    let buffer = response.into_sample_buffer(Some(&file));

    let (media, modulated_wav, media_error) = match audio_url {
        Some(url) => {
            let _ = tx.send(UploadEvent::Downloading);
            match client.fetch_media(&url) {
                Ok(wav) => match decode_media(&wav, output_rate) {
                    Ok(media) => (Some(media), Some(wav), None),
                    Err(e) => {
                        tracing::warn!(%url, error = %e, "media undecodable");
                        (None, Some(wav), Some(e.to_string()))
                    }
                },
                Err(e) => {
                    tracing::warn!(%url, error = %e, "media unavailable");
                    (None, None, Some(e.to_string()))
                }
            }
        }
        None => (None, None, Some(ClientError::MissingMedia.to_string())),
    };

    Ok(UploadOutcome {
        buffer,
        media,
        media_error,
        modulated_wav,
        message,
        original_sample_rate,
        processed_sample_rate,
    })
}

fn decode_media(wav: &[u8], output_rate: Option<u32>) -> Result<DecodedMedia, LoadError> {
    let loader = match output_rate {
        Some(rate) => MediaLoader::with_sample_rate(rate),
        None => MediaLoader::new(),
    };
    loader.decode(wav.to_vec(), Some("wav"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_invalid_file_fails_without_results() {
        let rx = spawn_upload(
            "http://127.0.0.1:9".to_string(),
            PathBuf::from("/nonexistent/clip.txt"),
            ProcessingSettings::default(),
            None,
        );

        let mut events = Vec::new();
        while let Ok(event) = rx.recv_timeout(Duration::from_secs(5)) {
            events.push(event);
        }

        assert!(matches!(events.first(), Some(UploadEvent::Started { file }) if file == "clip.txt"));
        assert!(matches!(events.last(), Some(UploadEvent::Failed(msg)) if msg.contains(".txt")));
        assert!(!events.iter().any(|e| matches!(e, UploadEvent::Completed(_))));
    }

    #[test]
    fn test_bad_server_url_fails_before_sending() {
        let rx = spawn_upload(
            "not a url".to_string(),
            PathBuf::from("/nonexistent/clip.wav"),
            ProcessingSettings::default(),
            None,
        );

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], UploadEvent::Failed(msg) if msg.contains("invalid URL")));
    }

    #[test]
    fn test_health_check_unreachable() {
        let rx = spawn_health_check("http://127.0.0.1:9".to_string());
        let result = rx.recv_timeout(Duration::from_secs(30)).unwrap();
        assert!(result.is_err());
    }
}
