//! Sample data model for pskope
//!
//! Holds the per-stage sample sequences returned by the processing service
//! and the index math (decimation stride, focus window) shared by every
//! renderer.

mod buffer;
mod decimate;
mod stage;

pub use buffer::{SampleBuffer, SampleBufferBuilder, SampleSequence};
pub use decimate::{decimation_stride, focus_stride, focus_window, FocusWindow, FOCUS_HALF_WIDTH};
pub use stage::{Stage, StageParseError};
