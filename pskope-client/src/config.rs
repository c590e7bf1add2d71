//! Simple configuration persistence for pskope
//!
//! Stores the service address, processing settings and UI preferences.

use crate::upload::{BitDepth, SampleRate};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Service address used when none is configured
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the processing service
    pub server_url: String,
    pub bit_depth: BitDepth,
    pub sample_rate: SampleRate,
    /// Last file that was uploaded
    pub last_file: Option<PathBuf>,
    /// Dynamic surface mode name ("focus" or "live")
    pub dynamic_mode: String,
    /// Theme name
    pub theme: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            bit_depth: BitDepth::default(),
            sample_rate: SampleRate::default(),
            last_file: None,
            dynamic_mode: "focus".to_string(),
            theme: None,
        }
    }
}

impl Config {
    /// Load config from the default location
    ///
    /// Returns default config if file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path()).unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn save(&self) -> io::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.serialize())
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pskope")
            .join("config.txt")
    }

    /// Parse config from simple key=value format
    fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match key.trim() {
                "server_url" => config.server_url = value.to_string(),
                "bit_depth" => {
                    if let Ok(bits) = value.parse() {
                        config.bit_depth = bits;
                    }
                }
                "sample_rate" => {
                    if let Ok(rate) = value.parse() {
                        config.sample_rate = rate;
                    }
                }
                "last_file" => config.last_file = Some(PathBuf::from(value)),
                "dynamic_mode" => config.dynamic_mode = value.to_string(),
                "theme" => config.theme = Some(value.to_string()),
                _ => {} // Ignore unknown keys
            }
        }

        config
    }

    fn serialize(&self) -> String {
        let mut lines = vec![
            "# pskope configuration".to_string(),
            format!("server_url={}", self.server_url),
            format!("bit_depth={}", self.bit_depth.bits()),
            format!("sample_rate={}", self.sample_rate.hz()),
            format!("dynamic_mode={}", self.dynamic_mode),
        ];

        if let Some(ref file) = self.last_file {
            lines.push(format!("last_file={}", file.display()));
        }
        if let Some(ref theme) = self.theme {
            lines.push(format!("theme={theme}"));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert_eq!(Config::parse(""), Config::default());
    }

    #[test]
    fn test_parse_values() {
        let content = "# Comment\n\
            server_url=http://lab:9000\n\
            bit_depth=16\n\
            sample_rate=96000\n\
            last_file=/music/tone.wav\n\
            dynamic_mode=live\n\
            theme=amber\n\
            colour=blue";
        let config = Config::parse(content);
        assert_eq!(config.server_url, "http://lab:9000");
        assert_eq!(config.bit_depth, BitDepth::Sixteen);
        assert_eq!(config.sample_rate, SampleRate::Hz96000);
        assert_eq!(config.last_file, Some(PathBuf::from("/music/tone.wav")));
        assert_eq!(config.dynamic_mode, "live");
        assert_eq!(config.theme.as_deref(), Some("amber"));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = Config::parse("bit_depth=12\nsample_rate=fast\nserver_url=");
        assert_eq!(config.bit_depth, BitDepth::Eight);
        assert_eq!(config.sample_rate, SampleRate::Hz44100);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.txt");

        let config = Config {
            bit_depth: BitDepth::Sixteen,
            last_file: Some(PathBuf::from("/tmp/a.flac")),
            theme: Some("cyberpunk".to_string()),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from(&dir.path().join("none.txt")).is_err());
    }
}
