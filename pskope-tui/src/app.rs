//! Application state

use crate::theme::Theme;
use pskope_client::{BitDepth, Config, ProcessingSettings, SampleRate};
use pskope_input::Mode;
use pskope_render::DynamicMode;
use std::path::PathBuf;

/// Message type for colored status messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// Where the current upload stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading { file: String },
    Downloading,
}

impl UploadStatus {
    pub fn is_busy(&self) -> bool {
        !matches!(self, UploadStatus::Idle)
    }
}

/// Application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub mode: Mode,
    pub command_buffer: String,
    pub message: Option<String>,
    pub message_type: MessageType,
    pub show_help: bool,
    pub theme: Theme,
    pub frame_count: u64,

    /// File the next upload will send
    pub current_file: Option<PathBuf>,
    pub settings: ProcessingSettings,
    pub server_url: String,
    pub upload: UploadStatus,
    pub dynamic_mode: DynamicMode,

    /// Name of the file whose results are on screen
    pub results_label: Option<String>,
    /// (original, processed) rates reported by the service
    pub reported_rates: (Option<u32>, Option<u32>),
}

impl AppState {
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// State seeded from persisted configuration
    pub fn from_config(config: &Config) -> Self {
        let theme = config
            .theme
            .as_deref()
            .and_then(Theme::by_name)
            .unwrap_or_default();

        Self {
            mode: Mode::Normal,
            command_buffer: String::new(),
            message: None,
            message_type: MessageType::Info,
            show_help: false,
            theme,
            frame_count: 0,
            current_file: config.last_file.clone(),
            settings: ProcessingSettings {
                bit_depth: config.bit_depth,
                sample_rate: config.sample_rate,
            },
            server_url: config.server_url.clone(),
            upload: UploadStatus::Idle,
            dynamic_mode: config.dynamic_mode.parse().unwrap_or_default(),
            results_label: None,
            reported_rates: (None, None),
        }
    }

    /// Write the user-facing settings back into `config`
    pub fn store(&self, config: &mut Config) {
        config.server_url = self.server_url.clone();
        config.bit_depth = self.settings.bit_depth;
        config.sample_rate = self.settings.sample_rate;
        config.last_file = self.current_file.clone();
        config.dynamic_mode = self.dynamic_mode.as_str().to_string();
        config.theme = Some(self.theme.name.to_string());
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        if mode != Mode::Command {
            self.command_buffer.clear();
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Set theme by name
    pub fn set_theme(&mut self, name: &str) {
        match Theme::by_name(name) {
            Some(theme) => {
                self.theme = theme;
                self.set_success(format!("Theme set to: {}", self.theme.name));
            }
            None => {
                self.set_error(format!(
                    "Unknown theme: {name}. Use slate/green/amber/cyber"
                ));
            }
        }
    }

    pub fn cycle_bit_depth(&mut self) {
        self.settings.bit_depth = self.settings.bit_depth.cycle();
        self.set_message(format!("Bit depth: {}", self.settings.bit_depth));
    }

    pub fn cycle_sample_rate(&mut self) {
        self.settings.sample_rate = self.settings.sample_rate.cycle();
        self.set_message(format!("Sample rate: {}", self.settings.sample_rate));
    }

    pub fn set_bit_depth(&mut self, bits: u32) {
        match BitDepth::try_from(bits) {
            Ok(depth) => {
                self.settings.bit_depth = depth;
                self.set_message(format!("Bit depth: {depth}"));
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    pub fn set_sample_rate(&mut self, hz: u32) {
        match SampleRate::try_from(hz) {
            Ok(rate) => {
                self.settings.sample_rate = rate;
                self.set_message(format!("Sample rate: {rate}"));
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    pub fn set_server(&mut self, url: &str) {
        self.server_url = url.trim().trim_end_matches('/').to_string();
        self.set_message(format!("Server: {}", self.server_url));
    }

    /// File name of the current file, for display
    pub fn current_file_name(&self) -> Option<String> {
        self.current_file.as_ref().map(|path| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        })
    }

    /// Clear any displayed message
    pub fn clear_message(&mut self) {
        self.message = None;
        self.message_type = MessageType::Info;
    }

    /// Set a message to display (info level)
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Info;
    }

    pub fn set_success(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Success;
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Warning;
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Error;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Main application wrapper
pub struct App {
    pub state: AppState,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            state: AppState::from_config(config),
            should_quit: false,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = Config {
            bit_depth: BitDepth::Sixteen,
            sample_rate: SampleRate::Hz96000,
            last_file: Some(PathBuf::from("/audio/tone.wav")),
            dynamic_mode: "live".to_string(),
            theme: Some("amber".to_string()),
            ..Default::default()
        };
        let state = AppState::from_config(&config);

        assert_eq!(state.settings.bit_depth, BitDepth::Sixteen);
        assert_eq!(state.settings.sample_rate, SampleRate::Hz96000);
        assert_eq!(state.current_file_name().as_deref(), Some("tone.wav"));
        assert_eq!(state.dynamic_mode, DynamicMode::LiveTap);
        assert_eq!(state.theme.name, "amber");
    }

    #[test]
    fn test_bad_config_values_fall_back() {
        let config = Config {
            dynamic_mode: "spectrum".to_string(),
            theme: Some("nope".to_string()),
            ..Default::default()
        };
        let state = AppState::from_config(&config);
        assert_eq!(state.dynamic_mode, DynamicMode::FocusContext);
        assert_eq!(state.theme.name, "slate");
    }

    #[test]
    fn test_store_round_trips_settings() {
        let mut state = AppState::new();
        state.cycle_bit_depth();
        state.set_server("http://lab:9000/");
        state.dynamic_mode = DynamicMode::LiveTap;

        let mut config = Config::default();
        state.store(&mut config);
        assert_eq!(config.bit_depth, BitDepth::Sixteen);
        assert_eq!(config.server_url, "http://lab:9000");
        assert_eq!(config.dynamic_mode, "live");
        assert_eq!(config.theme.as_deref(), Some("slate"));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut state = AppState::new();
        state.set_bit_depth(24);
        assert_eq!(state.settings.bit_depth, BitDepth::Eight);
        assert_eq!(state.message_type, MessageType::Error);

        state.set_sample_rate(48_000);
        assert_eq!(state.settings.sample_rate, SampleRate::Hz48000);
        assert_eq!(state.message_type, MessageType::Info);
    }

    #[test]
    fn test_set_theme() {
        let mut state = AppState::new();
        state.set_theme("cyber");
        assert_eq!(state.theme.name, "cyberpunk");
        assert_eq!(state.message_type, MessageType::Success);

        state.set_theme("paper");
        assert_eq!(state.theme.name, "cyberpunk");
        assert_eq!(state.message_type, MessageType::Error);
    }

    #[test]
    fn test_set_mode_clears_buffer() {
        let mut state = AppState::new();
        state.set_mode(Mode::Command);
        state.command_buffer.push_str("bits");
        state.set_mode(Mode::Normal);
        assert!(state.command_buffer.is_empty());
    }
}
