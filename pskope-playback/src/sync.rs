//! Playback state projected from the media event stream

use crate::bus::{MediaEventBus, Subscription};
use crate::event::MediaEvent;
use parking_lot::RwLock;
use std::sync::Arc;

/// Playback phase of the active media resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No media loaded (or results were just replaced)
    #[default]
    Idle,
    /// Metadata known, not started yet
    Loaded,
    Playing,
    Paused,
    /// Reached the end; position was rewound to 0
    Ended,
}

impl Phase {
    pub fn display_name(self) -> &'static str {
        match self {
            Phase::Idle => "IDLE",
            Phase::Loaded => "READY",
            Phase::Playing => "PLAYING",
            Phase::Paused => "PAUSED",
            Phase::Ended => "ENDED",
        }
    }
}

/// Snapshot of the playback position and phase
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackState {
    /// Seconds, never negative
    pub current_time: f64,
    /// Seconds; `None` while unknown, zero or non-finite
    pub duration: Option<f64>,
    pub phase: Phase,
}

impl PlaybackState {
    /// Fold one media event into the state
    pub fn apply(&mut self, event: &MediaEvent) {
        match event {
            MediaEvent::MetadataReady { duration } => {
                self.duration = valid_duration(*duration);
                self.current_time = 0.0;
                self.phase = Phase::Loaded;
            }
            MediaEvent::DurationChange(duration) => {
                self.duration = valid_duration(*duration);
            }
            MediaEvent::Play | MediaEvent::Playing => {
                self.phase = Phase::Playing;
            }
            MediaEvent::Pause => {
                if self.phase == Phase::Playing {
                    self.phase = Phase::Paused;
                }
            }
            MediaEvent::TimeUpdate(time) | MediaEvent::Seeked(time) => {
                if time.is_finite() {
                    self.current_time = time.max(0.0);
                }
            }
            MediaEvent::Ended => {
                self.current_time = 0.0;
                self.phase = Phase::Ended;
            }
            MediaEvent::Error(_) => {}
        }
    }

    /// Position as a fraction of the duration, `None` when the duration is unusable
    pub fn progress(&self) -> Option<f64> {
        self.duration
            .map(|duration| (self.current_time / duration).clamp(0.0, 1.0))
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// "12.3s / 48.0s"
    pub fn readout(&self) -> String {
        match self.duration {
            Some(duration) => format!("{:.1}s / {:.1}s", self.current_time, duration),
            None => format!("{:.1}s / --", self.current_time),
        }
    }
}

fn valid_duration(duration: f64) -> Option<f64> {
    (duration.is_finite() && duration > 0.0).then_some(duration)
}

/// Keeps a [`PlaybackState`] in step with one media element's events
///
/// At most one listener is registered at a time: attaching to a new bus
/// releases the previous subscription first, and dropping the sync releases
/// it as well.
#[derive(Debug, Default)]
pub struct PlaybackSync {
    state: Arc<RwLock<PlaybackState>>,
    subscription: Option<Subscription>,
}

impl PlaybackSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow a (new) media element, starting again from `Idle`
    pub fn attach(&mut self, bus: &MediaEventBus) {
        self.detach();

        let state = Arc::clone(&self.state);
        self.subscription = Some(bus.subscribe(move |event| {
            state.write().apply(event);
        }));
        tracing::debug!(listeners = bus.listener_count(), "playback sync attached");
    }

    /// Release the listener and reset to `Idle`
    pub fn detach(&mut self) {
        if self.subscription.take().is_some() {
            tracing::debug!("playback sync detached");
        }
        *self.state.write() = PlaybackState::default();
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Consistent copy of the current state
    pub fn snapshot(&self) -> PlaybackState {
        *self.state.read()
    }
}
