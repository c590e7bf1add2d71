//! Media element events

/// Events emitted by a playing media resource
///
/// Mirrors the HTML media element events the visualizer reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Metadata (duration) is known; the resource is ready to play
    MetadataReady { duration: f64 },
    /// Duration changed after metadata
    DurationChange(f64),
    /// Playback was requested
    Play,
    /// Playback actually started
    Playing,
    /// Playback paused (also sent just before `Ended`)
    Pause,
    /// Periodic playback position report, in seconds
    TimeUpdate(f64),
    /// Seek completed at the given position, in seconds
    Seeked(f64),
    /// End of media reached
    Ended,
    /// Playback failed
    Error(String),
}

impl MediaEvent {
    /// Short event name for logging
    pub fn name(&self) -> &'static str {
        match self {
            MediaEvent::MetadataReady { .. } => "loadedmetadata",
            MediaEvent::DurationChange(_) => "durationchange",
            MediaEvent::Play => "play",
            MediaEvent::Playing => "playing",
            MediaEvent::Pause => "pause",
            MediaEvent::TimeUpdate(_) => "timeupdate",
            MediaEvent::Seeked(_) => "seeked",
            MediaEvent::Ended => "ended",
            MediaEvent::Error(_) => "error",
        }
    }

    /// Whether the event starts playback
    pub fn starts_playback(&self) -> bool {
        matches!(self, MediaEvent::Play | MediaEvent::Playing)
    }
}
