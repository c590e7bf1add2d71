//! Modal state machine for vim-style input handling

use crate::commands::{Command, SEEK_STEP_SECS};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;

/// Input modes (vim-style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Command,
    Help,
}

impl Mode {
    /// Get display name for the mode
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Command => "COMMAND",
            Mode::Help => "HELP",
        }
    }
}

/// Handles keyboard input and converts to commands
#[derive(Debug, Default)]
pub struct InputHandler {
    mode: Mode,
    command_buffer: String,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Get current command buffer (for display)
    pub fn command_buffer(&self) -> &str {
        &self.command_buffer
    }

    /// Handle a key event and return a command if applicable
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Command::Quit);
        }

        match self.mode {
            Mode::Normal => self.handle_normal_mode(key),
            Mode::Command => self.handle_command_mode(key),
            Mode::Help => self.handle_help_mode(key),
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Char(':') => {
                self.mode = Mode::Command;
                self.command_buffer.clear();
                Some(Command::EnterCommandMode)
            }
            KeyCode::Char('?') => {
                self.mode = Mode::Help;
                Some(Command::ToggleHelp)
            }

            KeyCode::Char(' ') => Some(Command::TogglePlay),
            KeyCode::Char('s') => Some(Command::Stop),
            KeyCode::Left | KeyCode::Char('h') => Some(Command::Seek(-SEEK_STEP_SECS)),
            KeyCode::Right | KeyCode::Char('l') => Some(Command::Seek(SEEK_STEP_SECS)),

            KeyCode::Char('u') => Some(Command::Upload(None)),
            KeyCode::Char('b') => Some(Command::CycleBitDepth),
            KeyCode::Char('r') => Some(Command::CycleSampleRate),
            KeyCode::Char('v') => Some(Command::ToggleDynamicMode),

            KeyCode::Esc => Some(Command::Cancel),

            _ => None,
        }
    }

    fn handle_command_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Enter => {
                let cmd = parse_command(&self.command_buffer);
                self.mode = Mode::Normal;
                let buffer = std::mem::take(&mut self.command_buffer);
                cmd.or(Some(Command::ExecuteCommand(buffer)))
            }
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.command_buffer.clear();
                Some(Command::EnterNormalMode)
            }
            KeyCode::Backspace => {
                if self.command_buffer.pop().is_none() {
                    self.mode = Mode::Normal;
                    return Some(Command::EnterNormalMode);
                }
                None
            }
            KeyCode::Char(c) => {
                self.command_buffer.push(c);
                None
            }
            _ => None,
        }
    }

    fn handle_help_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                self.mode = Mode::Normal;
                Some(Command::ToggleHelp)
            }
            _ => None,
        }
    }
}

/// Parse a `:` command line (without the colon)
fn parse_command(line: &str) -> Option<Command> {
    let input = line.trim();
    let (name, arg) = match input.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (input, ""),
    };

    match (name, arg) {
        ("q" | "quit", "") => Some(Command::Quit),
        ("help", "") => Some(Command::ToggleHelp),
        ("upload" | "up", "") => Some(Command::Upload(None)),
        ("upload" | "up", path) => unquote(path).map(|p| Command::Upload(Some(p))),
        ("open" | "o" | "e", path) => unquote(path).map(Command::OpenFile),
        ("save" | "w", "") => Some(Command::Save(None)),
        ("save" | "w", path) => unquote(path).map(|p| Command::Save(Some(p))),
        ("bits", value) => value.parse().ok().map(Command::SetBitDepth),
        ("rate", value) => value.parse().ok().map(Command::SetSampleRate),
        ("server", url) if !url.is_empty() => Some(Command::SetServer(url.to_string())),
        ("theme", theme) if !theme.is_empty() => Some(Command::SetTheme(theme.to_string())),
        ("mode", "") => Some(Command::ToggleDynamicMode),
        _ => None,
    }
}

/// Path argument with optional surrounding quotes
fn unquote(path: &str) -> Option<PathBuf> {
    let path = path.trim();
    let path = if path.len() >= 2
        && ((path.starts_with('\'') && path.ends_with('\''))
            || (path.starts_with('"') && path.ends_with('"')))
    {
        &path[1..path.len() - 1]
    } else {
        path
    };

    (!path.is_empty()).then(|| PathBuf::from(path))
}
