//! Sample sequence rasterizer
//!
//! [`draw`] renders one whole trace onto a cleared surface. [`Trace`] is the
//! layering primitive underneath it: it paints any index range of a sequence
//! with its own stride, peak and opacity without touching what is already on
//! the surface, so several layers of the same sequence line up exactly.

use crate::color::Rgba;
use crate::surface::{DrawSurface, Point, Stroke};
use pskope_signal::{decimation_stride, Stage};
use std::ops::Range;

/// Vertical padding of a continuous trace, in pixels
const CONTINUOUS_PADDING: f32 = 10.0;

/// Vertical padding of a stepped trace, in pixels
const STEPPED_PADDING: f32 = 20.0;

/// How consecutive samples are joined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceStyle {
    /// Straight segments between sample points
    #[default]
    Continuous,
    /// Horizontal run per sample, vertical transitions at sample boundaries
    Stepped,
}

impl TraceStyle {
    fn padding(self, height: u32) -> f32 {
        let padding = match self {
            TraceStyle::Continuous => CONTINUOUS_PADDING,
            TraceStyle::Stepped => STEPPED_PADDING,
        };
        padding.min(height as f32 / 4.0)
    }
}

/// Style a stage is drawn with
pub fn style_for(stage: Stage) -> TraceStyle {
    if stage.is_line_code() {
        TraceStyle::Stepped
    } else {
        TraceStyle::Continuous
    }
}

/// What a paint call put on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceStats {
    /// Samples drawn
    pub points: usize,
    /// Decimation stride used
    pub stride: usize,
}

/// One layer of a waveform, configured builder-style
#[derive(Debug, Clone)]
pub struct Trace<'a> {
    samples: &'a [f32],
    color: Rgba,
    style: TraceStyle,
    range: Option<Range<usize>>,
    stride: Option<usize>,
    peak: Option<f32>,
    alpha: f32,
    line_width: f32,
}

impl<'a> Trace<'a> {
    pub fn new(samples: &'a [f32]) -> Self {
        Self {
            samples,
            color: Rgba::rgb(255, 255, 255),
            style: TraceStyle::Continuous,
            range: None,
            stride: None,
            peak: None,
            alpha: 1.0,
            line_width: 1.0,
        }
    }

    pub fn color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn style(mut self, style: TraceStyle) -> Self {
        self.style = style;
        self
    }

    /// Restrict painting to an index range (clamped to the sequence)
    pub fn range(mut self, range: Range<usize>) -> Self {
        self.range = Some(range);
        self
    }

    /// Fixed stride instead of `ceil(len / width)`
    pub fn stride(mut self, stride: usize) -> Self {
        self.stride = Some(stride.max(1));
        self
    }

    /// Normalization peak instead of the sequence's own maximum
    pub fn peak(mut self, peak: f32) -> Self {
        self.peak = Some(peak);
        self
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    fn effective_stride(&self, width: u32) -> usize {
        self.stride
            .unwrap_or_else(|| decimation_stride(self.samples.len(), width))
    }

    fn clamped_range(&self) -> Range<usize> {
        let len = self.samples.len();
        match &self.range {
            Some(range) => {
                let end = range.end.min(len);
                range.start.min(end)..end
            }
            None => 0..len,
        }
    }

    /// Polyline of this layer on a `width` x `height` surface
    pub fn path(&self, width: u32, height: u32) -> Vec<Point> {
        let len = self.samples.len();
        let range = self.clamped_range();
        if range.is_empty() {
            return Vec::new();
        }

        let stride = self.effective_stride(width);
        let peak = match self.peak {
            Some(peak) => peak.abs(),
            None => sequence_peak(self.samples),
        };

        let mid = height as f32 / 2.0;
        let amplitude = mid - self.style.padding(height);
        let scale = width as f32 / len as f32;

        let level = |value: f32| -> f32 {
            if !value.is_finite() || peak <= 0.0 || !peak.is_finite() {
                return mid;
            }
            mid - (value / peak).clamp(-1.0, 1.0) * amplitude
        };

        let mut points = Vec::with_capacity(range.len().div_ceil(stride) * 2);
        for i in range.step_by(stride) {
            let x = i as f32 * scale;
            let y = level(self.samples[i]);
            points.push(Point::new(x, y));
            if self.style == TraceStyle::Stepped {
                // Run ends exactly where the next drawn sample starts
                let end = (i + stride).min(len);
                points.push(Point::new(end as f32 * scale, y));
            }
        }
        points
    }

    /// Paint onto `surface` without clearing it
    pub fn paint<S: DrawSurface + ?Sized>(&self, surface: &mut S) -> TraceStats {
        let path = self.path(surface.width(), surface.height());
        let points = match self.style {
            TraceStyle::Continuous => path.len(),
            TraceStyle::Stepped => path.len() / 2,
        };

        surface.stroke_path(
            &path,
            Stroke {
                color: self.color.with_alpha(self.alpha),
                width: self.line_width,
            },
        );

        TraceStats {
            points,
            stride: self.effective_stride(surface.width()),
        }
    }
}

fn sequence_peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .filter(|v| v.is_finite())
        .fold(0.0f32, |acc, v| acc.max(v.abs()))
}

/// Clear `surface` and draw the whole of `samples` on it
///
/// Values are normalized by the largest absolute sample. An empty sequence
/// leaves the surface untouched.
pub fn draw<S: DrawSurface + ?Sized>(
    surface: &mut S,
    samples: &[f32],
    color: Rgba,
    style: TraceStyle,
) -> TraceStats {
    if samples.is_empty() {
        return TraceStats::default();
    }

    surface.clear();
    Trace::new(samples).color(color).style(style).paint(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelSurface;

    const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    fn vertical_transitions(path: &[Point]) -> usize {
        path.windows(2)
            .filter(|w| w[0].x == w[1].x && w[0].y != w[1].y)
            .count()
    }

    #[test]
    fn test_points_bounded_by_stride() {
        for len in [1usize, 7, 499, 500, 501, 1_000, 44_100] {
            let samples: Vec<f32> = (0..len).map(|i| (i as f32 * 0.1).sin()).collect();
            let mut surface = PixelSurface::stage();
            let stats = draw(&mut surface, &samples, WHITE, TraceStyle::Continuous);

            let stride = decimation_stride(len, 500);
            assert_eq!(stats.stride, stride);
            assert!(stats.points <= len.div_ceil(stride));
            assert!(stats.points <= 500);
        }
    }

    #[test]
    fn test_empty_draw_is_noop() {
        let mut surface = PixelSurface::stage();
        draw(&mut surface, &[0.5, -0.5, 0.25], WHITE, TraceStyle::Continuous);
        let before = surface.clone();

        let stats = draw(&mut surface, &[], WHITE, TraceStyle::Stepped);
        assert_eq!(stats, TraceStats::default());
        assert_eq!(surface, before);
    }

    #[test]
    fn test_stepped_transitions() {
        let samples = [1.0, -1.0, 1.0];
        let path = Trace::new(&samples)
            .style(TraceStyle::Stepped)
            .path(3, 250);

        assert_eq!(path.len(), 6);
        assert_eq!(vertical_transitions(&path), 2);

        // Runs are horizontal and cover the full width
        assert_eq!(path[0].y, path[1].y);
        assert_eq!(path[5].x, 3.0);
    }

    #[test]
    fn test_stepped_decimated() {
        let samples: Vec<f32> = (0..1001)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        let mut surface = PixelSurface::stage();
        let stats = draw(&mut surface, &samples, WHITE, TraceStyle::Stepped);
        assert_eq!(stats.stride, 3);
        assert_eq!(stats.points, 334);

        let path = Trace::new(&samples).style(TraceStyle::Stepped).path(500, 250);
        assert_eq!(path.len(), stats.points * 2);

        for run in path.chunks(2) {
            assert_eq!(run[0].y, run[1].y);
            assert!(run[1].x > run[0].x);
        }
        for pair in path.chunks(2).collect::<Vec<_>>().windows(2) {
            assert_eq!(pair[1][0].x, pair[0][1].x);
        }

        // Every third sample of an alternating signal flips sign
        assert_eq!(vertical_transitions(&path), stats.points - 1);
        assert!((path[path.len() - 1].x - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_continuous_normalization() {
        let samples = [0.0, 2.0, -2.0];
        let path = Trace::new(&samples).path(300, 100);
        assert_eq!(path[0].y, 50.0);
        assert_eq!(path[1].y, 10.0);
        assert_eq!(path[2].y, 90.0);
        assert_eq!(path[1].x, 100.0);
    }

    #[test]
    fn test_zero_peak_draws_flat_line() {
        let samples = [0.0; 8];
        let path = Trace::new(&samples).path(8, 100);
        assert!(path.iter().all(|p| p.y == 50.0));
    }

    #[test]
    fn test_range_lines_up_with_full_trace() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let full = Trace::new(&samples).stride(1).path(500, 100);
        let window = Trace::new(&samples).range(40..60).stride(1).path(500, 100);

        assert_eq!(window.len(), 20);
        assert_eq!(window[0], full[40]);
        assert_eq!(window[19], full[59]);
    }

    #[test]
    fn test_out_of_range_clamped() {
        let samples = [1.0, 2.0];
        assert!(Trace::new(&samples).range(5..9).path(10, 10).is_empty());
        assert_eq!(Trace::new(&samples).range(1..9).path(10, 10).len(), 1);
    }

    #[test]
    fn test_stage_styles() {
        assert_eq!(style_for(Stage::Binary), TraceStyle::Stepped);
        assert_eq!(style_for(Stage::Polar), TraceStyle::Stepped);
        assert_eq!(style_for(Stage::Psk), TraceStyle::Continuous);
        assert_eq!(style_for(Stage::Original), TraceStyle::Continuous);
    }

    #[test]
    fn test_draw_clears_first() {
        let mut surface = PixelSurface::new(10, 10).unwrap();
        draw(&mut surface, &[1.0; 10], WHITE, TraceStyle::Continuous);
        draw(&mut surface, &[-1.0; 10], WHITE, TraceStyle::Continuous);
        assert_eq!(surface.clear_count(), 2);
        // Row 2 held the first trace
        assert!(surface.pixel(5, 2) == Some(Rgba::TRANSPARENT));
    }
}
