//! Waveform rendering for pskope
//!
//! This crate turns sample sequences into pixels:
//! - Rasterizer: one trace per surface, continuous or stepped
//! - FocusContextRenderer: full-length context, windowed detail and playhead
//! - LiveTapRenderer: instantaneous analysis tap snapshot
//! - PipelineView: owns the surfaces and drives the renderers per frame

mod color;
mod focus;
mod frame_loop;
mod live_tap;
mod pipeline;
mod rasterizer;
mod surface;

pub use color::{stage_color, Rgba, ACCENT, READOUT};
pub use focus::{FocusContextRenderer, FocusFrame, FocusOutcome, CONTEXT_ALPHA};
pub use frame_loop::FrameLoop;
pub use live_tap::LiveTapRenderer;
pub use pipeline::{DynamicMode, PipelineView, DYNAMIC_STAGE};
pub use rasterizer::{draw, style_for, Trace, TraceStats, TraceStyle};
pub use surface::{
    DrawSurface, PixelSurface, Point, Stroke, SurfaceError, TextRun, DYNAMIC_SURFACE,
    STAGE_SURFACE,
};
