//! UI Widgets for pskope

mod header;
pub mod help;
mod status_bar;
mod surface;
mod transport;

pub use header::HeaderWidget;
pub use status_bar::StatusBarWidget;
pub use surface::SurfaceWidget;
pub use transport::TransportWidget;
