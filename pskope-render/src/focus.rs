//! Focus + context playback renderer

use crate::color::{Rgba, ACCENT, READOUT};
use crate::rasterizer::{draw, Trace, TraceStyle};
use crate::surface::{DrawSurface, Point, Stroke};
use pskope_playback::PlaybackState;
use pskope_signal::{decimation_stride, focus_stride, focus_window, FocusWindow, SampleSequence};

/// Opacity of the full-length context layer
pub const CONTEXT_ALPHA: f32 = 0.3;

/// Line width of the focus layer
const FOCUS_LINE_WIDTH: f32 = 2.0;

/// Geometry of one windowed frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusFrame {
    pub progress: f64,
    pub window: FocusWindow,
    pub context_stride: usize,
    pub focus_stride: usize,
    /// X coordinate of the playhead marker
    pub marker_x: f32,
}

/// Result of one [`FocusContextRenderer::render`] call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusOutcome {
    /// Context, focus window, marker and readout were drawn
    Windowed(FocusFrame),
    /// Duration unusable; the full sequence was drawn as a static trace
    StaticFallback,
    /// Nothing to do this frame
    Skipped,
}

/// Draws a dim full-length trace, a bright window around the playhead, a
/// marker and a time readout
///
/// When the duration is unknown, zero or non-finite the renderer draws the
/// whole sequence once as a plain trace instead, and leaves it alone until
/// the results generation changes.
#[derive(Debug, Default)]
pub struct FocusContextRenderer {
    fallback_generation: Option<u64>,
}

impl FocusContextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the drawn fallback so the next call draws again
    pub fn reset(&mut self) {
        self.fallback_generation = None;
    }

    pub fn render<S: DrawSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        samples: &SampleSequence,
        state: &PlaybackState,
        generation: u64,
        color: Rgba,
    ) -> FocusOutcome {
        if samples.is_empty() {
            return FocusOutcome::Skipped;
        }

        let Some(progress) = state.progress() else {
            if self.fallback_generation == Some(generation) {
                return FocusOutcome::Skipped;
            }
            draw(surface, samples, color, TraceStyle::Continuous);
            self.fallback_generation = Some(generation);
            tracing::debug!(generation, "duration unknown, static trace drawn");
            return FocusOutcome::StaticFallback;
        };

        let width = surface.width();
        let height = surface.height() as f32;
        let len = samples.len();
        let peak = samples.peak();

        surface.clear();

        let context_stride = decimation_stride(len, width);
        Trace::new(samples)
            .color(color)
            .stride(context_stride)
            .peak(peak)
            .alpha(CONTEXT_ALPHA)
            .paint(surface);

        let window = focus_window(len, progress);
        let fine = focus_stride(context_stride);
        Trace::new(samples)
            .color(color)
            .range(window.range())
            .stride(fine)
            .peak(peak)
            .line_width(FOCUS_LINE_WIDTH)
            .paint(surface);

        let marker_x = (progress * width as f64) as f32;
        surface.stroke_path(
            &[Point::new(marker_x, 0.0), Point::new(marker_x, height)],
            Stroke {
                color: ACCENT,
                width: 1.0,
            },
        );
        surface.fill_text(6.0, 4.0, &state.readout(), READOUT);

        FocusOutcome::Windowed(FocusFrame {
            progress,
            window,
            context_stride,
            focus_stride: fine,
            marker_x,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelSurface;
    use pskope_playback::Phase;

    const RED: Rgba = Rgba::rgb(0xe7, 0x4c, 0x3c);

    fn playing(current_time: f64, duration: Option<f64>) -> PlaybackState {
        PlaybackState {
            current_time,
            duration,
            phase: Phase::Playing,
        }
    }

    #[test]
    fn test_midpoint_frame() {
        let samples = SampleSequence::from(vec![1.0, 1.0, -1.0, -1.0, 1.0]);
        let mut surface = PixelSurface::dynamic();
        let mut renderer = FocusContextRenderer::new();

        let outcome = renderer.render(&mut surface, &samples, &playing(2.5, Some(5.0)), 1, RED);
        let FocusOutcome::Windowed(frame) = outcome else {
            panic!("expected a windowed frame, got {outcome:?}");
        };

        assert_eq!(frame.progress, 0.5);
        assert_eq!(frame.window.center, 2);
        assert_eq!(samples[frame.window.center], -1.0);
        assert_eq!(frame.marker_x, surface.width() as f32 / 2.0);
        assert_eq!(surface.clear_count(), 1);
        assert_eq!(surface.text_runs()[0].text, "2.5s / 5.0s");
        assert_eq!(surface.pixel(250, 0), Some(ACCENT));
    }

    #[test]
    fn test_focus_stride_finer() {
        let samples = SampleSequence::from(vec![0.5; 48_000]);
        let mut surface = PixelSurface::dynamic();
        let mut renderer = FocusContextRenderer::new();

        let outcome = renderer.render(&mut surface, &samples, &playing(1.0, Some(4.0)), 1, RED);
        let FocusOutcome::Windowed(frame) = outcome else {
            panic!("expected a windowed frame");
        };
        assert_eq!(frame.context_stride, 96);
        assert!(frame.focus_stride < frame.context_stride);
        assert!(frame.window.start <= frame.window.center);
        assert!(frame.window.center <= frame.window.end);
        assert!(frame.window.end <= samples.len());
    }

    #[test]
    fn test_window_at_extremes() {
        let samples = SampleSequence::from(vec![0.1; 1_000]);
        let mut surface = PixelSurface::dynamic();
        let mut renderer = FocusContextRenderer::new();

        let start = renderer.render(&mut surface, &samples, &playing(0.0, Some(10.0)), 1, RED);
        let end = renderer.render(&mut surface, &samples, &playing(10.0, Some(10.0)), 1, RED);
        match (start, end) {
            (FocusOutcome::Windowed(a), FocusOutcome::Windowed(b)) => {
                assert_eq!(a.window.start, 0);
                assert_eq!(b.window.end, 1_000);
            }
            other => panic!("unexpected outcomes {other:?}"),
        }
    }

    #[test]
    fn test_zero_duration_falls_back_once() {
        let samples = SampleSequence::from(vec![0.2, -0.4, 0.6]);
        let mut surface = PixelSurface::dynamic();
        let mut renderer = FocusContextRenderer::new();
        let state = PlaybackState {
            current_time: 1.0,
            ..playing(0.0, None)
        };

        assert_eq!(
            renderer.render(&mut surface, &samples, &state, 7, RED),
            FocusOutcome::StaticFallback
        );
        for _ in 0..5 {
            assert_eq!(
                renderer.render(&mut surface, &samples, &state, 7, RED),
                FocusOutcome::Skipped
            );
        }
        assert_eq!(surface.clear_count(), 1);
        assert!(surface.text_runs().is_empty());

        // New results draw the fallback again
        assert_eq!(
            renderer.render(&mut surface, &samples, &state, 8, RED),
            FocusOutcome::StaticFallback
        );
    }

    #[test]
    fn test_empty_sequence_skipped() {
        let mut surface = PixelSurface::dynamic();
        let mut renderer = FocusContextRenderer::new();
        let outcome = renderer.render(
            &mut surface,
            &SampleSequence::empty(),
            &playing(1.0, Some(2.0)),
            1,
            RED,
        );
        assert_eq!(outcome, FocusOutcome::Skipped);
        assert_eq!(surface.clear_count(), 0);
    }
}
