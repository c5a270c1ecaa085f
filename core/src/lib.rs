//! Bar lifecycle management for external bar renderers.
//!
//! One renderer process is kept per (monitor, side) pair. The manager
//! computes geometry, formats collected metrics into renderer markup, and
//! replaces processes without leaving a monitor barless.

pub mod bars;
pub mod error;
pub mod format;
pub mod geometry;
pub mod layout;
pub mod metrics;

pub use bars::{BarManager, BarProcess, BarSide, BarSlots, RedrawMode, Reaper};
pub use error::BarError;
pub use format::{EntryFormats, Formatter, status_line_length};
pub use geometry::{Geometry, Monitor, bar_width_from_key, left_bar_geometry, main_bar_geometry};
pub use layout::LayoutConfig;
pub use metrics::{Collector, MetricEntry, MetricSnapshot};
