//! Terminal UI for pskope - widgets, themes, and application state
//!
//! Stage surfaces are rasterized off-screen by `pskope-render` and blitted
//! into braille cells here.

mod app;
mod theme;
pub mod widgets;

pub use app::{App, AppState, MessageType, UploadStatus};
pub use theme::{Theme, AMBER, CYBERPUNK, PHOSPHOR, SLATE};
pub use widgets::help::HelpWidget;
pub use widgets::{HeaderWidget, StatusBarWidget, SurfaceWidget, TransportWidget};
