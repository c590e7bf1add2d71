//! Processing service client for pskope - upload, decoding, and configuration

mod client;
mod config;
mod export;
mod loader;
mod response;
mod upload;
mod worker;

pub use client::{resolve_url, ClientError, ProcessingClient};
pub use config::{Config, DEFAULT_SERVER_URL};
pub use export::{save_modulated, DEFAULT_EXPORT_NAME};
pub use loader::{DecodedMedia, LoadError, MediaLoader};
pub use response::ProcessingResponse;
pub use upload::{
    validate_file, BitDepth, ProcessingSettings, SampleRate, UploadError, ALLOWED_EXTENSIONS,
    MAX_UPLOAD_BYTES,
};
pub use worker::{spawn_health_check, spawn_upload, UploadEvent, UploadOutcome};
