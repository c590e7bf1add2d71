//! Live time-domain analysis tap on the audio output

use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::collections::VecDeque;
use std::fmt;

/// Samples in one tap snapshot
pub const TAP_SIZE: usize = 1024;

/// Ring capacity in snapshots; bounds how stale an undrained tap can get
const RING_SNAPSHOTS: usize = 4;

/// Audio-thread side of a tap
pub struct TapWriter {
    producer: HeapProd<f32>,
}

impl TapWriter {
    /// Push played samples; excess is dropped when the reader falls behind
    pub fn push(&mut self, samples: &[f32]) -> usize {
        self.producer.push_slice(samples)
    }
}

impl fmt::Debug for TapWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TapWriter")
    }
}

/// UI side of a tap: the most recent `window` played samples
pub struct AnalysisTap {
    consumer: HeapCons<f32>,
    window: VecDeque<f32>,
    capacity: usize,
    scratch: Vec<f32>,
}

/// Create a connected writer/tap pair holding `window` samples per snapshot
pub fn analysis_tap(window: usize) -> (TapWriter, AnalysisTap) {
    let window = window.max(1);
    let ring = HeapRb::<f32>::new(window * RING_SNAPSHOTS);
    let (producer, consumer) = ring.split();

    let mut initial = VecDeque::with_capacity(window + 1);
    initial.resize(window, 0.0);

    (
        TapWriter { producer },
        AnalysisTap {
            consumer,
            window: initial,
            capacity: window,
            scratch: vec![0.0; window],
        },
    )
}

impl AnalysisTap {
    /// Drain pending samples and return the latest window, oldest first
    ///
    /// Values are whatever was played, nominally in [-1, 1]. Before any audio
    /// arrives the window is silence.
    pub fn snapshot(&mut self) -> &[f32] {
        loop {
            let read = self.consumer.pop_slice(&mut self.scratch);
            if read == 0 {
                break;
            }
            self.window.extend(&self.scratch[..read]);
            let excess = self.window.len().saturating_sub(self.capacity);
            self.window.drain(..excess);
        }
        self.window.make_contiguous()
    }

    pub fn window_len(&self) -> usize {
        self.capacity
    }
}

impl fmt::Debug for AnalysisTap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisTap")
            .field("window", &self.capacity)
            .finish()
    }
}

/// Construct-once holder for the tap of one media element
///
/// The first request builds the tap and hands its writer to `attach`; later
/// requests return the same tap without calling `attach` again.
#[derive(Debug, Default)]
pub struct TapSlot {
    tap: Option<AnalysisTap>,
}

impl TapSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_attach<F>(&mut self, attach: F) -> &mut AnalysisTap
    where
        F: FnOnce(TapWriter),
    {
        self.tap.get_or_insert_with(|| {
            let (writer, tap) = analysis_tap(TAP_SIZE);
            attach(writer);
            tracing::debug!(window = TAP_SIZE, "analysis tap attached");
            tap
        })
    }

    pub fn is_attached(&self) -> bool {
        self.tap.is_some()
    }

    /// Pull pending samples into an attached tap without using them
    ///
    /// The writer drops new samples while the ring is full, so a tap nobody
    /// reads has to be drained every frame to stay current.
    pub fn drain(&mut self) {
        if let Some(tap) = self.tap.as_mut() {
            tap.snapshot();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_starts_silent() {
        let (_writer, mut tap) = analysis_tap(8);
        assert_eq!(tap.snapshot(), &[0.0; 8]);
    }

    #[test]
    fn test_snapshot_keeps_latest_window() {
        let (mut writer, mut tap) = analysis_tap(4);
        writer.push(&[0.1, 0.2, 0.3]);
        assert_eq!(tap.snapshot(), &[0.0, 0.1, 0.2, 0.3]);

        writer.push(&[0.4, 0.5, 0.6, 0.7, 0.8, 0.9]);
        assert_eq!(tap.snapshot(), &[0.6, 0.7, 0.8, 0.9]);

        // Nothing new: the window is frozen
        assert_eq!(tap.snapshot(), &[0.6, 0.7, 0.8, 0.9]);
    }

    #[test]
    fn test_writer_drops_when_full() {
        let (mut writer, mut tap) = analysis_tap(2);
        let pushed = writer.push(&[1.0; 32]);
        assert_eq!(pushed, 2 * RING_SNAPSHOTS);
        assert_eq!(tap.snapshot(), &[1.0, 1.0]);
    }

    #[test]
    fn test_drained_slot_stays_current() {
        let mut slot = TapSlot::new();
        let mut writer = None;
        slot.get_or_attach(|w| writer = Some(w));
        let mut writer = writer.unwrap();

        // Far more than the ring holds, spread over frames that only drain
        for frame in 0..(RING_SNAPSHOTS * 4) {
            writer.push(&vec![frame as f32; TAP_SIZE]);
            slot.drain();
        }
        writer.push(&[-1.0; TAP_SIZE]);

        let tap = slot.get_or_attach(|_| {});
        assert!(tap.snapshot().iter().all(|&s| s == -1.0));
    }

    #[test]
    fn test_undrained_slot_drops_newest() {
        let (mut writer, mut tap) = analysis_tap(4);
        for _ in 0..RING_SNAPSHOTS {
            writer.push(&[0.5; 4]);
        }
        assert_eq!(writer.push(&[-1.0; 4]), 0);
        assert_eq!(tap.snapshot(), &[0.5; 4]);
    }

    #[test]
    fn test_drain_without_tap_is_noop() {
        let mut slot = TapSlot::new();
        slot.drain();
        assert!(!slot.is_attached());
    }

    #[test]
    fn test_slot_constructs_once() {
        let mut slot = TapSlot::new();
        let mut attached = 0;

        slot.get_or_attach(|_| attached += 1);
        slot.get_or_attach(|_| attached += 1);
        slot.get_or_attach(|_| attached += 1);

        assert_eq!(attached, 1);
        assert!(slot.is_attached());
        assert_eq!(slot.get_or_attach(|_| {}).window_len(), TAP_SIZE);
    }
}
