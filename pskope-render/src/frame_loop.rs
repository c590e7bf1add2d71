//! Per-frame redraw scheduling

use pskope_playback::Phase;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Run flag of the playback animation loop
///
/// Clones share the flag, so a media event listener can start the loop that
/// the view ticks. There is only ever one loop: starting a running loop does
/// nothing, and a tick outside `Playing` stops it.
#[derive(Debug, Clone, Default)]
pub struct FrameLoop {
    active: Arc<AtomicBool>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule frames; returns false if the loop was already running
    pub fn start(&self) -> bool {
        let started = !self.active.swap(true, Ordering::AcqRel);
        if started {
            tracing::trace!("frame loop started");
        }
        started
    }

    pub fn stop(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Whether this frame should draw; stops the loop unless `phase` is Playing
    pub fn tick(&self, phase: Phase) -> bool {
        if !self.is_running() {
            return false;
        }
        if phase != Phase::Playing {
            self.stop();
            tracing::trace!(?phase, "frame loop stopped");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_is_idempotent() {
        let frames = FrameLoop::new();
        assert!(frames.start());
        assert!(!frames.start());
        assert!(frames.clone().is_running());
    }

    #[test]
    fn test_tick_stops_outside_playing() {
        let frames = FrameLoop::new();
        assert!(!frames.tick(Phase::Playing));

        frames.start();
        assert!(frames.tick(Phase::Playing));
        assert!(frames.tick(Phase::Playing));
        assert!(!frames.tick(Phase::Paused));
        assert!(!frames.is_running());
        assert!(!frames.tick(Phase::Playing));
    }

    #[test]
    fn test_shared_between_clones() {
        let frames = FrameLoop::new();
        let listener_side = frames.clone();
        listener_side.start();
        assert!(frames.tick(Phase::Playing));
        frames.tick(Phase::Ended);
        assert!(!listener_side.is_running());
    }
}
