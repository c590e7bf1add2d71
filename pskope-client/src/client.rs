//! Blocking HTTP client for the processing service

use crate::response::ProcessingResponse;
use crate::upload::{validate_file, ProcessingSettings, UploadError};
use reqwest::blocking::{multipart, Client, Response};
use reqwest::Url;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Upload + processing can take a while for long files
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on response and media bodies
const MAX_BODY_BYTES: u64 = 512 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Invalid(#[from] UploadError),
    #[error("invalid URL {url}: {reason}")]
    Url { url: String, reason: String },
    #[error("server error {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("response did not include a playable media URL")]
    MissingMedia,
}

/// Resolve a possibly relative URL returned by the service against `base`
pub fn resolve_url(base: &Url, url: &str) -> Result<Url, ClientError> {
    base.join(url).map_err(|e| ClientError::Url {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Client for one processing service
pub struct ProcessingClient {
    base_url: Url,
    http: Client,
}

impl ProcessingClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(trimmed).map_err(|e| ClientError::Url {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Upload `path` and decode the per-stage result
    pub fn process(
        &self,
        path: &Path,
        settings: ProcessingSettings,
    ) -> Result<ProcessingResponse, ClientError> {
        let size = validate_file(path)?;

        let form = multipart::Form::new()
            .text("bit_depth", settings.bit_depth.bits().to_string())
            .text("sample_rate", settings.sample_rate.hz().to_string())
            .file("file", path)?;

        let url = resolve_url(&self.base_url, "/api/process-audio")?;
        tracing::info!(
            %url,
            file = %path.display(),
            size,
            bit_depth = settings.bit_depth.bits(),
            sample_rate = settings.sample_rate.hz(),
            "uploading"
        );

        let response = check_status(self.http.post(url).multipart(form).send()?)?;
        let bytes = read_body(response)?;
        let decoded = ProcessingResponse::from_slice(&bytes)?;
        if let Some(message) = &decoded.message {
            tracing::debug!(%message, "service message");
        }
        Ok(decoded)
    }

    /// Download the media resource behind `audio_url`
    pub fn fetch_media(&self, audio_url: &str) -> Result<Vec<u8>, ClientError> {
        let url = resolve_url(&self.base_url, audio_url)?;
        tracing::debug!(%url, "downloading media");

        let response = check_status(self.http.get(url).send()?)?;
        let bytes = read_body(response)?;
        if bytes.is_empty() {
            return Err(ClientError::MissingMedia);
        }
        Ok(bytes)
    }

    /// Whether `GET /api/health` reports the service as up
    pub fn health(&self) -> Result<bool, ClientError> {
        let url = resolve_url(&self.base_url, "/api/health")?;
        let response = check_status(self.http.get(url).send()?)?;
        let bytes = read_body(response)?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        Ok(value.get("status").and_then(|s| s.as_str()) == Some("ok"))
    }
}

fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        message: error_detail(&body),
    })
}

fn read_body(response: Response) -> Result<Vec<u8>, ClientError> {
    let mut bytes = Vec::new();
    response.take(MAX_BODY_BYTES).read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Human readable message from an error body (`{"detail": ...}` or plain text)
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
    }

    let body = body.trim();
    if body.is_empty() {
        return "no details".to_string();
    }
    body.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::BitDepth;

    fn base(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(
            resolve_url(&base("http://127.0.0.1:8000/"), "/api/download-result?path=/tmp/a.wav")
                .unwrap()
                .as_str(),
            "http://127.0.0.1:8000/api/download-result?path=/tmp/a.wav"
        );
        assert_eq!(
            resolve_url(&base("http://host:8000"), "media/a.wav")
                .unwrap()
                .as_str(),
            "http://host:8000/media/a.wav"
        );
    }

    #[test]
    fn test_resolve_absolute() {
        assert_eq!(
            resolve_url(&base("http://127.0.0.1:8000"), "https://cdn.example/a.wav")
                .unwrap()
                .as_str(),
            "https://cdn.example/a.wav"
        );
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(
            error_detail(r#"{"detail": "Error processing audio: bad header"}"#),
            "Error processing audio: bad header"
        );
        assert_eq!(error_detail("  Internal Server Error \n"), "Internal Server Error");
        assert_eq!(error_detail(""), "no details");
    }

    #[test]
    fn test_base_url_normalized() {
        let client = ProcessingClient::new("http://localhost:8000///").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ProcessingClient::new("not a url"),
            Err(ClientError::Url { .. })
        ));
    }

    #[test]
    fn test_invalid_file_never_sent() {
        let client = ProcessingClient::new("http://127.0.0.1:9").unwrap();
        let settings = ProcessingSettings {
            bit_depth: BitDepth::Sixteen,
            ..Default::default()
        };
        let result = client.process(Path::new("/nonexistent/readme.md"), settings);
        assert!(matches!(
            result,
            Err(ClientError::Invalid(UploadError::UnsupportedExtension(_)))
        ));
    }
}
