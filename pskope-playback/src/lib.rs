//! Media playback for pskope
//!
//! This crate provides the playback side of the visualizer:
//! - MediaPlayer: native audio output thread for the modulated signal
//! - MediaEventBus: browser-style media event stream with scoped listeners
//! - PlaybackSync: phase/time projection of that event stream
//! - AnalysisTap: live time-domain snapshot of what is being played

mod bus;
mod event;
mod player;
mod sync;
mod tap;

pub use bus::{MediaEventBus, Subscription};
pub use event::MediaEvent;
pub use player::{default_output_rate, MediaId, MediaPlayer, PlayerCommand, PlayerError, PlayerSource};
pub use sync::{Phase, PlaybackState, PlaybackSync};
pub use tap::{analysis_tap, AnalysisTap, TapSlot, TapWriter, TAP_SIZE};
