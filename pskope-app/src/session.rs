//! Upload, playback and view wiring for one running pskope

use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::{Receiver, TryRecvError};
use pskope_client::{
    save_modulated, spawn_health_check, spawn_upload, validate_file, Config, UploadEvent,
    UploadOutcome, DEFAULT_EXPORT_NAME,
};
use pskope_playback::{MediaEventBus, MediaPlayer, PlayerSource};
use pskope_render::{DynamicMode, PipelineView};
use pskope_tui::{AppState, UploadStatus};

/// Owns the pipeline view, the current media player and background workers
pub struct Session {
    pub view: PipelineView,
    player: Option<MediaPlayer>,
    /// WAV bytes of the shown result, for `:save`
    modulated_wav: Option<Vec<u8>>,
    /// Followed by results that came without playable media
    idle_bus: MediaEventBus,
    upload_rx: Option<Receiver<UploadEvent>>,
    health_rx: Option<Receiver<Result<bool, String>>>,
    /// Device rate media is decoded to; `None` keeps the resource's rate
    output_rate: Option<u32>,
}

impl Session {
    pub fn new(mode: DynamicMode, output_rate: Option<u32>) -> Self {
        Self {
            view: PipelineView::new(mode),
            player: None,
            modulated_wav: None,
            idle_bus: MediaEventBus::new(),
            upload_rx: None,
            health_rx: None,
            output_rate,
        }
    }

    pub fn has_media(&self) -> bool {
        self.player.is_some()
    }

    /// Advance one UI frame: deliver media events, then redraw
    pub fn tick(&mut self) -> bool {
        let tap = match self.player.as_mut() {
            Some(player) => {
                player.pump_events();
                if self.view.dynamic_mode() == DynamicMode::LiveTap {
                    Some(player.analysis_tap())
                } else {
                    player.drain_tap();
                    None
                }
            }
            None => None,
        };
        self.view.frame(tap)
    }

    /// Upload `path` (or the current file) with the current settings
    pub fn start_upload(&mut self, state: &mut AppState, path: Option<PathBuf>) {
        if state.upload.is_busy() {
            state.set_warning("An upload is already running");
            return;
        }
        let Some(path) = path.or_else(|| state.current_file.clone()) else {
            state.set_warning("No file selected. Use :open <path>");
            return;
        };
        if let Err(e) = validate_file(&path) {
            state.set_error(e.to_string());
            return;
        }

        state.current_file = Some(path.clone());
        state.upload = UploadStatus::Uploading {
            file: state.current_file_name().unwrap_or_default(),
        };
        self.upload_rx = Some(spawn_upload(
            state.server_url.clone(),
            path,
            state.settings,
            self.output_rate,
        ));
    }

    /// Select a file for the next upload
    pub fn open_file(&mut self, state: &mut AppState, path: PathBuf) {
        match validate_file(&path) {
            Ok(_) => {
                state.current_file = Some(path);
                state.set_message(format!(
                    "Selected {}. Press u to upload",
                    state.current_file_name().unwrap_or_default()
                ));
            }
            Err(e) => state.set_error(e.to_string()),
        }
    }

    /// Drain upload progress; returns true when new results were applied
    pub fn poll_upload(&mut self, state: &mut AppState, config: &mut Config) -> bool {
        let Some(rx) = self.upload_rx.as_ref() else {
            return false;
        };

        let mut events = Vec::new();
        let mut finished = false;
        loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    finished = true;
                    break;
                }
            }
        }

        let mut applied = false;
        for event in events {
            match event {
                UploadEvent::Started { file } => {
                    state.upload = UploadStatus::Uploading { file: file.clone() };
                    state.set_message(format!("Uploading {file}..."));
                }
                UploadEvent::Downloading => {
                    state.upload = UploadStatus::Downloading;
                }
                UploadEvent::Completed(outcome) => {
                    self.apply_outcome(state, *outcome);
                    state.store(config);
                    if let Err(e) = config.save() {
                        tracing::warn!(error = %e, "failed to save config");
                    }
                    applied = true;
                    finished = true;
                }
                UploadEvent::Failed(message) => {
                    state.set_error(format!("Upload failed: {message}"));
                    finished = true;
                }
            }
        }

        if finished {
            state.upload = UploadStatus::Idle;
            self.upload_rx = None;
        }
        applied
    }

    /// Swap in a finished upload's results and media
    fn apply_outcome(&mut self, state: &mut AppState, outcome: UploadOutcome) {
        // The previous element and its tap go first
        self.player = None;

        let UploadOutcome {
            buffer,
            media,
            media_error,
            modulated_wav,
            message,
            original_sample_rate,
            processed_sample_rate,
        } = outcome;

        self.modulated_wav = modulated_wav;

        state.results_label = buffer.source().map(str::to_string);
        state.reported_rates = (original_sample_rate, processed_sample_rate);

        let player = media.and_then(|media| {
            let source = PlayerSource {
                samples: Arc::new(media.samples),
                sample_rate: media.sample_rate,
            };
            match MediaPlayer::spawn(source) {
                Ok(player) => Some(player),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to start media player");
                    state.set_warning(format!("Playback unavailable: {e}"));
                    None
                }
            }
        });

        match player {
            Some(player) => {
                self.view.set_results(buffer, player.bus());
                self.player = Some(player);
                state.set_success(
                    message.unwrap_or_else(|| "Processing complete. Space to play".to_string()),
                );
            }
            None => {
                self.view.set_results(buffer, &self.idle_bus);
                if let Some(error) = media_error {
                    state.set_warning(format!("Results shown, audio unavailable: {error}"));
                }
            }
        }
    }

    /// Write the last result's modulated signal to `path` (or the default name)
    pub fn save(&self, state: &mut AppState, path: Option<PathBuf>) {
        let Some(wav) = self.modulated_wav.as_deref() else {
            state.set_warning("No modulated signal to save. Upload a file first");
            return;
        };
        let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_NAME));
        match save_modulated(&path, wav) {
            Ok(written) => state.set_success(format!("Saved {}", written.display())),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "save failed");
                state.set_error(format!("Save failed: {e}"));
            }
        }
    }

    /// Check the configured service in the background
    pub fn check_health(&mut self, server_url: &str) {
        self.health_rx = Some(spawn_health_check(server_url.to_string()));
    }

    pub fn poll_health(&mut self, state: &mut AppState) {
        let Some(rx) = self.health_rx.as_ref() else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err("health check aborted".to_string()),
        };
        self.health_rx = None;

        // Upload progress takes the status line while it runs
        if state.upload.is_busy() {
            return;
        }
        match result {
            Ok(true) => state.set_success(format!("Connected to {}", state.server_url)),
            Ok(false) => state.set_warning(format!("{} is not healthy", state.server_url)),
            Err(e) => state.set_warning(format!("Service unreachable: {e}")),
        }
    }

    pub fn toggle_play(&self, state: &mut AppState) {
        match &self.player {
            Some(player) => player.toggle(),
            None => state.set_warning("Nothing to play"),
        }
    }

    /// Pause and rewind
    pub fn stop(&self, state: &mut AppState) {
        match &self.player {
            Some(player) => {
                player.pause();
                player.seek(0.0);
            }
            None => state.set_warning("Nothing to play"),
        }
    }

    /// Seek relative to the current position
    pub fn seek_by(&self, state: &mut AppState, delta: f64) {
        let Some(player) = &self.player else {
            state.set_warning("Nothing to play");
            return;
        };
        let playback = self.view.playback();
        let mut target = (playback.current_time + delta).max(0.0);
        if let Some(duration) = playback.duration {
            target = target.min(duration);
        }
        player.seek(target);
    }

    pub fn set_dynamic_mode(&mut self, state: &mut AppState, mode: DynamicMode) {
        state.dynamic_mode = mode;
        self.view.set_dynamic_mode(mode);
        let label = match mode {
            DynamicMode::FocusContext => "focus window",
            DynamicMode::LiveTap => "live tap",
        };
        state.set_message(format!("Dynamic view: {label}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use pskope_client::DecodedMedia;
    use pskope_signal::{SampleBuffer, Stage};
    use pskope_tui::MessageType;

    fn outcome(media: Option<DecodedMedia>) -> UploadOutcome {
        UploadOutcome {
            buffer: SampleBuffer::builder()
                .stage(Stage::Psk, vec![1.0, 1.0, -1.0, -1.0, 1.0])
                .source("tone.wav")
                .build(),
            media,
            media_error: Some("response did not include a playable media URL".to_string()),
            modulated_wav: None,
            message: None,
            original_sample_rate: Some(44_100),
            processed_sample_rate: Some(48_000),
        }
    }

    #[test]
    fn test_outcome_without_media_still_shows_results() {
        let mut session = Session::new(DynamicMode::FocusContext, None);
        let mut state = AppState::new();

        session.apply_outcome(&mut state, outcome(None));

        assert!(!session.has_media());
        assert!(session.view.results().is_some());
        assert!(!session.view.stage_surface(Stage::Psk).is_blank());
        assert_eq!(state.results_label.as_deref(), Some("tone.wav"));
        assert_eq!(state.reported_rates, (Some(44_100), Some(48_000)));
        assert_eq!(state.message_type, MessageType::Warning);
    }

    #[test]
    fn test_transport_without_media_warns() {
        let session = Session::new(DynamicMode::FocusContext, None);
        let mut state = AppState::new();
        session.toggle_play(&mut state);
        assert_eq!(state.message_type, MessageType::Warning);
    }

    #[test]
    fn test_upload_without_file_warns() {
        let mut session = Session::new(DynamicMode::FocusContext, None);
        let mut state = AppState::new();
        session.start_upload(&mut state, None);
        assert_eq!(state.upload, UploadStatus::Idle);
        assert_eq!(state.message_type, MessageType::Warning);
    }

    #[test]
    fn test_upload_rejects_invalid_file() {
        let mut session = Session::new(DynamicMode::FocusContext, None);
        let mut state = AppState::new();
        session.start_upload(&mut state, Some(PathBuf::from("/nonexistent/notes.txt")));
        assert_eq!(state.upload, UploadStatus::Idle);
        assert_eq!(state.message_type, MessageType::Error);
        assert!(state.current_file.is_none());
    }

    #[test]
    fn test_failed_upload_keeps_previous_results() {
        let mut session = Session::new(DynamicMode::FocusContext, None);
        let mut state = AppState::new();
        let mut config = Config::default();
        session.apply_outcome(&mut state, outcome(None));
        let generation = session.view.generation();

        let (tx, rx) = unbounded();
        session.upload_rx = Some(rx);
        state.upload = UploadStatus::Uploading {
            file: "b.wav".to_string(),
        };
        tx.send(UploadEvent::Started {
            file: "b.wav".to_string(),
        })
        .unwrap();
        tx.send(UploadEvent::Failed("server error 500: boom".to_string()))
            .unwrap();
        drop(tx);

        assert!(!session.poll_upload(&mut state, &mut config));
        assert_eq!(session.view.generation(), generation);
        assert_eq!(state.upload, UploadStatus::Idle);
        assert_eq!(state.message_type, MessageType::Error);
        assert!(state.message.as_deref().is_some_and(|m| m.contains("boom")));
    }

    #[test]
    fn test_progress_events_update_status() {
        let mut session = Session::new(DynamicMode::FocusContext, None);
        let mut state = AppState::new();
        let mut config = Config::default();

        let (tx, rx) = unbounded();
        session.upload_rx = Some(rx);
        tx.send(UploadEvent::Started {
            file: "c.wav".to_string(),
        })
        .unwrap();
        tx.send(UploadEvent::Downloading).unwrap();

        assert!(!session.poll_upload(&mut state, &mut config));
        assert_eq!(state.upload, UploadStatus::Downloading);
        assert!(session.upload_rx.is_some());
    }

    #[test]
    fn test_save_without_result_warns() {
        let session = Session::new(DynamicMode::FocusContext, None);
        let mut state = AppState::new();
        session.save(&mut state, None);
        assert_eq!(state.message_type, MessageType::Warning);
    }

    #[test]
    fn test_save_writes_downloaded_wav() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(DynamicMode::FocusContext, None);
        let mut state = AppState::new();
        let mut with_wav = outcome(None);
        with_wav.modulated_wav = Some(b"RIFF....WAVE".to_vec());
        session.apply_outcome(&mut state, with_wav);

        let path = dir.path().join("psk");
        session.save(&mut state, Some(path));
        assert_eq!(state.message_type, MessageType::Success);
        assert_eq!(
            std::fs::read(dir.path().join("psk.wav")).unwrap(),
            b"RIFF....WAVE"
        );

        // A later result without media forgets the old signal
        session.apply_outcome(&mut state, outcome(None));
        session.save(&mut state, Some(dir.path().join("again.wav")));
        assert_eq!(state.message_type, MessageType::Warning);
        assert!(!dir.path().join("again.wav").exists());
    }

    #[test]
    fn test_dynamic_mode_switch() {
        let mut session = Session::new(DynamicMode::FocusContext, None);
        let mut state = AppState::new();
        session.set_dynamic_mode(&mut state, DynamicMode::LiveTap);
        assert_eq!(state.dynamic_mode, DynamicMode::LiveTap);
        assert_eq!(session.view.dynamic_mode(), DynamicMode::LiveTap);
    }
}
