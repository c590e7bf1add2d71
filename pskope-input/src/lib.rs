//! Vim-style modal keyboard input handling for pskope

mod commands;
mod modal;

pub use commands::{Command, SEEK_STEP_SECS};
pub use modal::{InputHandler, Mode};
