//! Native media player - plays the modulated signal and reports media events
//!
//! The audio device lives on its own thread. Commands go in over a channel,
//! media events come back over another and are dispatched into the player's
//! [`MediaEventBus`] by whoever calls [`MediaPlayer::pump_events`] (the UI
//! thread), so listeners never run concurrently with drawing.

use crate::bus::MediaEventBus;
use crate::event::MediaEvent;
use crate::tap::{AnalysisTap, TapSlot, TapWriter};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Interval between time-update events while playing
const TIME_UPDATE_INTERVAL: Duration = Duration::from_millis(50);

/// Command poll timeout on the audio thread
const COMMAND_POLL: Duration = Duration::from_millis(10);

static NEXT_MEDIA_ID: AtomicU64 = AtomicU64::new(1);

/// Errors raised while bringing up audio output
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("No audio output device found")]
    NoDevice,
    #[error("Failed to get audio config: {0}")]
    Config(String),
    #[error("Failed to create audio stream: {0}")]
    Stream(String),
    #[error("Failed to start audio: {0}")]
    Start(String),
    #[error("Failed to spawn audio thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Identity of one media element instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaId(u64);

impl MediaId {
    fn next() -> Self {
        Self(NEXT_MEDIA_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Decoded mono samples ready for the output device
#[derive(Debug, Clone)]
pub struct PlayerSource {
    pub samples: Arc<Vec<f32>>,
    pub sample_rate: u32,
}

/// Commands sent to the audio thread
#[derive(Debug)]
pub enum PlayerCommand {
    Play,
    Pause,
    Toggle,
    /// Seek to an absolute position in seconds
    Seek(f64),
    /// Connect an analysis tap to the output
    AttachTap(TapWriter),
    Shutdown,
}

/// Output device sample rate, used to decode media at the rate it will play
pub fn default_output_rate() -> Option<u32> {
    let device = cpal::default_host().default_output_device()?;
    device
        .default_output_config()
        .ok()
        .map(|config| config.sample_rate().0)
}

/// One playable media element
///
/// Dropping the player stops the audio thread and tears down everything
/// attached to its output, including the analysis tap.
pub struct MediaPlayer {
    id: MediaId,
    cmd_tx: Sender<PlayerCommand>,
    evt_rx: Receiver<MediaEvent>,
    bus: MediaEventBus,
    tap: TapSlot,
    handle: Option<JoinHandle<()>>,
}

impl MediaPlayer {
    /// Start an audio thread for `source`
    ///
    /// Device problems are reported as a [`MediaEvent::Error`] on the bus
    /// rather than failing here.
    pub fn spawn(source: PlayerSource) -> Result<Self, PlayerError> {
        let (cmd_tx, cmd_rx) = bounded(64);
        let (evt_tx, evt_rx) = bounded(256);
        let id = MediaId::next();

        let handle = thread::Builder::new()
            .name(format!("pskope-audio-{}", id.0))
            .spawn(move || run_audio_thread(source, cmd_rx, evt_tx))?;

        tracing::info!(media = id.0, "media player started");

        Ok(Self {
            id,
            cmd_tx,
            evt_rx,
            bus: MediaEventBus::new(),
            tap: TapSlot::new(),
            handle: Some(handle),
        })
    }

    pub fn id(&self) -> MediaId {
        self.id
    }

    /// Event stream of this element
    pub fn bus(&self) -> &MediaEventBus {
        &self.bus
    }

    pub fn send(&self, cmd: PlayerCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    pub fn play(&self) {
        self.send(PlayerCommand::Play);
    }

    pub fn pause(&self) {
        self.send(PlayerCommand::Pause);
    }

    pub fn toggle(&self) {
        self.send(PlayerCommand::Toggle);
    }

    pub fn seek(&self, seconds: f64) {
        self.send(PlayerCommand::Seek(seconds));
    }

    /// Dispatch queued events into the bus; returns how many were delivered
    pub fn pump_events(&self) -> usize {
        let mut delivered = 0;
        while let Ok(event) = self.evt_rx.try_recv() {
            if let MediaEvent::Error(ref message) = event {
                tracing::warn!(media = self.id.0, %message, "media error");
            }
            self.bus.dispatch(&event);
            delivered += 1;
        }
        delivered
    }

    /// Keep an attached tap current while nothing reads it
    pub fn drain_tap(&mut self) {
        self.tap.drain();
    }

    /// The element's analysis tap, attached to the output on first use only
    pub fn analysis_tap(&mut self) -> &mut AnalysisTap {
        let cmd_tx = &self.cmd_tx;
        self.tap.get_or_attach(|writer| {
            let _ = cmd_tx.send(PlayerCommand::AttachTap(writer));
        })
    }
}

impl Drop for MediaPlayer {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(PlayerCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        tracing::info!(media = self.id.0, "media player stopped");
    }
}

/// Playback position and output routing shared with the device callback
struct Transport {
    samples: Arc<Vec<f32>>,
    sample_rate: u32,
    position: usize,
    playing: bool,
    finished: bool,
    tap: Option<TapWriter>,
    last_time_update: Instant,
}

impl Transport {
    fn new(source: PlayerSource, output_rate: u32) -> Self {
        Self {
            samples: source.samples,
            sample_rate: output_rate.max(1),
            position: 0,
            playing: false,
            finished: false,
            tap: None,
            last_time_update: Instant::now(),
        }
    }

    fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    fn current_time(&self) -> f64 {
        self.position as f64 / self.sample_rate as f64
    }

    /// Fill an interleaved output buffer, duplicating the mono signal
    fn render(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let frames = out.len() / channels;
        let start = self.position;
        let mut end = start;

        if self.playing {
            end = (start + frames).min(self.samples.len());
        }

        for (i, frame) in out.chunks_mut(channels).enumerate() {
            let sample = if start + i < end { self.samples[start + i] } else { 0.0 };
            frame.fill(sample);
        }

        if end > start {
            if let Some(tap) = self.tap.as_mut() {
                tap.push(&self.samples[start..end]);
            }
        }

        self.position = end;
        if self.playing && self.position >= self.samples.len() {
            self.playing = false;
            self.finished = true;
        }
    }

    /// Apply a command, collecting the events it produces
    fn command(&mut self, cmd: PlayerCommand, events: &mut Vec<MediaEvent>) {
        match cmd {
            PlayerCommand::Play => self.play(events),
            PlayerCommand::Pause => self.pause(events),
            PlayerCommand::Toggle => {
                if self.playing {
                    self.pause(events);
                } else {
                    self.play(events);
                }
            }
            PlayerCommand::Seek(seconds) => {
                let seconds = if seconds.is_finite() { seconds } else { 0.0 };
                let target = (seconds.max(0.0) * self.sample_rate as f64) as usize;
                self.position = target.min(self.samples.len());
                let time = self.current_time();
                events.push(MediaEvent::Seeked(time));
                events.push(MediaEvent::TimeUpdate(time));
            }
            PlayerCommand::AttachTap(writer) => {
                if self.tap.replace(writer).is_some() {
                    tracing::warn!("analysis tap replaced on a running output");
                }
            }
            PlayerCommand::Shutdown => {}
        }
    }

    fn play(&mut self, events: &mut Vec<MediaEvent>) {
        if self.playing {
            return;
        }
        if self.position >= self.samples.len() {
            self.position = 0;
        }
        self.playing = true;
        self.last_time_update = Instant::now();
        events.push(MediaEvent::Play);
        events.push(MediaEvent::Playing);
    }

    fn pause(&mut self, events: &mut Vec<MediaEvent>) {
        if !self.playing {
            return;
        }
        self.playing = false;
        events.push(MediaEvent::TimeUpdate(self.current_time()));
        events.push(MediaEvent::Pause);
    }

    /// End-of-media detection and periodic time updates
    fn poll(&mut self, events: &mut Vec<MediaEvent>) {
        if self.finished {
            self.finished = false;
            events.push(MediaEvent::TimeUpdate(self.duration()));
            events.push(MediaEvent::Pause);
            events.push(MediaEvent::Ended);
            self.position = 0;
            return;
        }

        if self.playing && self.last_time_update.elapsed() >= TIME_UPDATE_INTERVAL {
            self.last_time_update = Instant::now();
            events.push(MediaEvent::TimeUpdate(self.current_time()));
        }
    }
}

fn open_output(transport: Arc<Mutex<Transport>>) -> Result<(cpal::Stream, u32), PlayerError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(PlayerError::NoDevice)?;
    let config = device
        .default_output_config()
        .map_err(|e| PlayerError::Config(e.to_string()))?;

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                // Never block the device callback; output silence on contention
                if let Some(mut transport) = transport.try_lock() {
                    transport.render(data, channels);
                } else {
                    data.fill(0.0);
                }
            },
            |err| {
                tracing::error!(%err, "audio stream error");
            },
            None,
        )
        .map_err(|e| PlayerError::Stream(e.to_string()))?;

    stream.play().map_err(|e| PlayerError::Start(e.to_string()))?;

    Ok((stream, sample_rate))
}

fn run_audio_thread(
    source: PlayerSource,
    cmd_rx: Receiver<PlayerCommand>,
    evt_tx: Sender<MediaEvent>,
) {
    let source_rate = source.sample_rate;
    let transport = Arc::new(Mutex::new(Transport::new(source, source_rate)));

    let (_stream, output_rate) = match open_output(Arc::clone(&transport)) {
        Ok(opened) => opened,
        Err(e) => {
            tracing::warn!(error = %e, "audio output unavailable");
            let _ = evt_tx.send(MediaEvent::Error(e.to_string()));
            return;
        }
    };

    if output_rate != source_rate {
        tracing::warn!(source_rate, output_rate, "media rate differs from output rate");
    }

    let duration = {
        let mut transport = transport.lock();
        transport.sample_rate = output_rate.max(1);
        transport.duration()
    };
    let _ = evt_tx.send(MediaEvent::MetadataReady { duration });

    let mut events = Vec::with_capacity(8);

    loop {
        match cmd_rx.recv_timeout(COMMAND_POLL) {
            Ok(PlayerCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(cmd) => transport.lock().command(cmd, &mut events),
            Err(RecvTimeoutError::Timeout) => {}
        }

        transport.lock().poll(&mut events);

        for event in events.drain(..) {
            let sent = match event {
                MediaEvent::TimeUpdate(_) => evt_tx.try_send(event).is_ok(),
                _ => evt_tx.send(event).is_ok(),
            };
            if !sent {
                tracing::trace!("media event dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tap::analysis_tap;

    fn transport(samples: Vec<f32>, rate: u32) -> Transport {
        Transport::new(
            PlayerSource {
                samples: Arc::new(samples),
                sample_rate: rate,
            },
            rate,
        )
    }

    #[test]
    fn test_silent_until_played() {
        let mut t = transport(vec![0.5; 8], 8);
        let mut out = [1.0f32; 4];
        t.render(&mut out, 2);
        assert_eq!(out, [0.0; 4]);
        assert_eq!(t.position, 0);
    }

    #[test]
    fn test_play_emits_events_and_advances() {
        let mut t = transport(vec![0.1, 0.2, 0.3, 0.4], 4);
        let mut events = Vec::new();
        t.command(PlayerCommand::Play, &mut events);
        assert_eq!(events, vec![MediaEvent::Play, MediaEvent::Playing]);

        let mut out = [0.0f32; 4];
        t.render(&mut out, 2);
        assert_eq!(out, [0.1, 0.1, 0.2, 0.2]);
        assert_eq!(t.current_time(), 0.5);
    }

    #[test]
    fn test_end_of_media_sequence() {
        let mut t = transport(vec![0.25; 4], 4);
        let mut events = Vec::new();
        t.command(PlayerCommand::Play, &mut events);
        events.clear();

        let mut out = [0.0f32; 6];
        t.render(&mut out, 1);
        assert_eq!(out, [0.25, 0.25, 0.25, 0.25, 0.0, 0.0]);

        t.poll(&mut events);
        assert_eq!(
            events,
            vec![MediaEvent::TimeUpdate(1.0), MediaEvent::Pause, MediaEvent::Ended]
        );
        assert_eq!(t.position, 0);

        // Replay starts from the beginning
        events.clear();
        t.command(PlayerCommand::Play, &mut events);
        assert_eq!(events, vec![MediaEvent::Play, MediaEvent::Playing]);
    }

    #[test]
    fn test_pause_and_toggle() {
        let mut t = transport(vec![0.0; 100], 10);
        let mut events = Vec::new();
        t.command(PlayerCommand::Pause, &mut events);
        assert!(events.is_empty());

        t.command(PlayerCommand::Toggle, &mut events);
        assert!(t.playing);
        events.clear();
        t.command(PlayerCommand::Toggle, &mut events);
        assert!(!t.playing);
        assert_eq!(events.last(), Some(&MediaEvent::Pause));
    }

    #[test]
    fn test_seek_clamps() {
        let mut t = transport(vec![0.0; 100], 10);
        let mut events = Vec::new();
        t.command(PlayerCommand::Seek(4.0), &mut events);
        assert_eq!(t.position, 40);
        assert_eq!(events, vec![MediaEvent::Seeked(4.0), MediaEvent::TimeUpdate(4.0)]);

        events.clear();
        t.command(PlayerCommand::Seek(99.0), &mut events);
        assert_eq!(t.position, 100);
        t.command(PlayerCommand::Seek(-1.0), &mut events);
        assert_eq!(t.position, 0);
    }

    #[test]
    fn test_tap_receives_played_samples() {
        let mut t = transport(vec![0.1, 0.2, 0.3], 3);
        let (writer, mut tap) = analysis_tap(3);
        let mut events = Vec::new();
        t.command(PlayerCommand::AttachTap(writer), &mut events);
        t.command(PlayerCommand::Play, &mut events);

        let mut out = [0.0f32; 2];
        t.render(&mut out, 1);
        assert_eq!(tap.snapshot(), &[0.0, 0.1, 0.2]);
    }
}
