//! Decimation and focus-window index math
//!
//! Traces are reduced by plain fixed-stride selection. Peaks that fall
//! between selected indices are not preserved.

/// Focus window half-width as a fraction of the sequence length
pub const FOCUS_HALF_WIDTH: f64 = 0.05;

/// Divisor applied to the context stride to get the focus stride
const FOCUS_DETAIL: usize = 4;

/// Stride selecting at most `width` samples out of `len`
///
/// `ceil(len / width)`, never less than 1.
pub fn decimation_stride(len: usize, width: u32) -> usize {
    let width = width.max(1) as usize;
    len.div_ceil(width).max(1)
}

/// Stride for the focus layer, strictly finer than `context_stride`
/// whenever the context stride is above 1
pub fn focus_stride(context_stride: usize) -> usize {
    context_stride.div_ceil(FOCUS_DETAIL).max(1)
}

/// Index range highlighted around the playback position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusWindow {
    /// First index (inclusive)
    pub start: usize,
    /// Index under the playhead
    pub center: usize,
    /// Last index (exclusive)
    pub end: usize,
}

impl FocusWindow {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Window of half-width `FOCUS_HALF_WIDTH * len` centered at `progress * len`
///
/// `progress` is clamped to [0, 1]. The result always satisfies
/// `0 <= start <= center <= end <= len`.
pub fn focus_window(len: usize, progress: f64) -> FocusWindow {
    if len == 0 {
        return FocusWindow::default();
    }

    let progress = if progress.is_finite() { progress.clamp(0.0, 1.0) } else { 0.0 };
    let len_f = len as f64;
    let half = len_f * FOCUS_HALF_WIDTH;
    let center_f = progress * len_f;

    let start = (center_f - half).max(0.0).floor() as usize;
    let end = ((center_f + half).min(len_f).ceil() as usize).min(len);
    let start = start.min(end);
    let center = (center_f.floor() as usize).min(len - 1).clamp(start, end);

    FocusWindow { start, center, end }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride() {
        assert_eq!(decimation_stride(0, 500), 1);
        assert_eq!(decimation_stride(100, 500), 1);
        assert_eq!(decimation_stride(500, 500), 1);
        assert_eq!(decimation_stride(501, 500), 2);
        assert_eq!(decimation_stride(44_100, 500), 89);
        assert_eq!(decimation_stride(10, 0), 10);
    }

    #[test]
    fn test_focus_stride_is_finer() {
        assert_eq!(focus_stride(1), 1);
        for context in 2..200 {
            let focus = focus_stride(context);
            assert!(focus >= 1);
            assert!(focus < context, "context {context} focus {focus}");
        }
    }

    #[test]
    fn test_window_bounds_hold() {
        for len in [1usize, 2, 5, 17, 100, 44_100] {
            for step in 0..=40 {
                let progress = step as f64 / 40.0;
                let w = focus_window(len, progress);
                assert!(w.start <= w.center, "{len} {progress} {w:?}");
                assert!(w.center <= w.end, "{len} {progress} {w:?}");
                assert!(w.end <= len, "{len} {progress} {w:?}");
            }
        }
    }

    #[test]
    fn test_window_edges() {
        let w = focus_window(1000, 0.0);
        assert_eq!(w.start, 0);
        assert_eq!(w.end, 50);

        let w = focus_window(1000, 1.0);
        assert_eq!(w.end, 1000);
        assert_eq!(w.start, 950);

        let w = focus_window(1000, 0.5);
        assert_eq!((w.start, w.center, w.end), (450, 500, 550));
    }

    #[test]
    fn test_window_out_of_range_progress() {
        assert_eq!(focus_window(100, -3.0), focus_window(100, 0.0));
        assert_eq!(focus_window(100, 7.0), focus_window(100, 1.0));
        assert_eq!(focus_window(100, f64::NAN), focus_window(100, 0.0));
        assert!(focus_window(0, 0.5).is_empty());
    }

    #[test]
    fn test_window_short_sequence() {
        let w = focus_window(5, 0.5);
        assert_eq!(w.center, 2);
        assert_eq!((w.start, w.end), (2, 3));
    }
}
