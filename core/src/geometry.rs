//! Bar geometry
//!
//! Positions are in pixels relative to the monitor's top-left corner; the
//! renderer is told which screen to use separately.

use barkeep_types::MonitorConfig;

use crate::error::BarError;
use crate::layout::LayoutConfig;
use crate::metrics::MetricSnapshot;

/// Extra characters reserved after the username segment.
pub const USERNAME_PADDING: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monitor {
    pub index: usize,
    pub width: i32,
    pub height: i32,
}

impl Monitor {
    pub fn new(index: usize, width: i32, height: i32) -> Self {
        Self {
            index,
            width,
            height,
        }
    }

    /// Number monitors in configuration order.
    pub fn from_configs(configs: &[MonitorConfig]) -> Vec<Monitor> {
        configs
            .iter()
            .enumerate()
            .map(|(i, m)| Monitor::new(i, m.width, m.height))
            .collect()
    }

    /// 1-based screen number used in renderer arguments and popup commands.
    pub fn screen(&self) -> usize {
        self.index + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

fn monitor_at(monitors: &[Monitor], index: usize) -> Result<&Monitor, BarError> {
    monitors.get(index).ok_or(BarError::MonitorIndex {
        index,
        count: monitors.len(),
    })
}

/// Geometry of the main (status) bar on `monitors[index]`.
pub fn main_bar_geometry(
    monitors: &[Monitor],
    index: usize,
    layout: &LayoutConfig,
) -> Result<Geometry, BarError> {
    let monitor = monitor_at(monitors, index)?;

    let (x, width) = if layout.contiguous {
        (layout.left_bar_width, monitor.width - layout.left_bar_width)
    } else {
        (
            monitor.width - layout.main_bar_width - 1,
            layout.main_bar_width,
        )
    };

    Ok(Geometry {
        x,
        y: layout.y_for(monitor.height),
        width,
        height: layout.bar_height,
    })
}

/// Geometry of the left (info) bar on `monitors[index]`.
pub fn left_bar_geometry(
    monitors: &[Monitor],
    index: usize,
    layout: &LayoutConfig,
) -> Result<Geometry, BarError> {
    let monitor = monitor_at(monitors, index)?;
    Ok(Geometry {
        x: 0,
        y: layout.y_for(monitor.height),
        width: layout.left_bar_width,
        height: layout.bar_height,
    })
}

/// Characters reserved for the trailing username segment.
pub fn reserved_width(username: &str) -> usize {
    username.chars().count() + USERNAME_PADDING
}

/// Pixel width from the metric `key` to the end of the bar.
///
/// Sizes clickable regions so that a popup trigger spans from its metric to
/// the bar's right edge.
pub fn bar_width_from_key(
    key: &str,
    snapshot: &MetricSnapshot,
    reserved: usize,
    char_width: f32,
) -> i32 {
    let chars: usize = snapshot.from_key(key).map(|e| e.length).sum::<usize>() + reserved;
    (chars as f32 * char_width) as i32
}
