//! Live analysis tap renderer

use crate::color::Rgba;
use crate::rasterizer::{Trace, TraceStats, TraceStyle};
use crate::surface::DrawSurface;

/// Rasterizes the tap's instantaneous time-domain window
///
/// Snapshot values are already in [-1, 1], so the trace uses a fixed unit
/// peak instead of normalizing per frame. Quiet passages therefore look
/// quiet.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveTapRenderer;

impl LiveTapRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Clear `surface` and draw `snapshot`; an empty snapshot changes nothing
    pub fn render<S: DrawSurface + ?Sized>(
        &self,
        surface: &mut S,
        snapshot: &[f32],
        color: Rgba,
    ) -> TraceStats {
        if snapshot.is_empty() {
            return TraceStats::default();
        }

        surface.clear();
        Trace::new(snapshot)
            .color(color)
            .style(TraceStyle::Continuous)
            .peak(1.0)
            .paint(surface)
    }
}
