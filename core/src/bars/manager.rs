//! Bar lifecycle manager
//!
//! Owns the left and main bar of every monitor and decides when renderers
//! are spawned, fed, resized, hidden or torn down. All methods run on the
//! caller's control path; only teardown of superseded handles is handed off
//! to the [`Reaper`].

use std::time::Duration;

use barkeep_types::{AppConfig, BarConfig, RendererConfig};
use tokio::time::sleep;

use super::process::BarProcess;
use super::reaper::Reaper;
use crate::error::BarError;
use crate::format::{Formatter, status_line_length};
use crate::geometry::{self, Geometry, Monitor};
use crate::layout::LayoutConfig;
use crate::metrics::{Collector, MetricSnapshot};

/// Delay before closing replaced bars after a bulk reconfiguration, so the
/// old and new renderer do not fight over the same region while the window
/// manager settles.
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarSide {
    Left,
    Main,
}

impl BarSide {
    pub fn label(self) -> &'static str {
        match self {
            BarSide::Left => "left bar",
            BarSide::Main => "main bar",
        }
    }

    fn bar_name(self, monitor: usize) -> String {
        format!("{}, monitor {}", self.label(), monitor)
    }
}

/// How superseded handles are torn down after a full redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedrawMode {
    /// Close right away
    #[default]
    Immediate,
    /// Wait [`SETTLE_DELAY`] first (bulk reconfiguration)
    Settle,
}

/// The two bars of one monitor.
#[derive(Debug)]
pub struct BarSlots {
    left: BarProcess,
    main: BarProcess,
}

impl BarSlots {
    fn empty(monitor: usize) -> Self {
        Self {
            left: BarProcess::empty(BarSide::Left.bar_name(monitor)),
            main: BarProcess::empty(BarSide::Main.bar_name(monitor)),
        }
    }

    pub fn left(&self) -> &BarProcess {
        &self.left
    }

    pub fn main(&self) -> &BarProcess {
        &self.main
    }

    pub fn get(&self, side: BarSide) -> &BarProcess {
        match side {
            BarSide::Left => &self.left,
            BarSide::Main => &self.main,
        }
    }

    fn get_mut(&mut self, side: BarSide) -> &mut BarProcess {
        match side {
            BarSide::Left => &mut self.left,
            BarSide::Main => &mut self.main,
        }
    }
}

pub struct BarManager {
    layout: LayoutConfig,
    formatter: Formatter,
    renderer: RendererConfig,
    font: String,
    monitors: Vec<Monitor>,
    slots: Vec<BarSlots>,
    collector: Box<dyn Collector>,
    snapshot: MetricSnapshot,
    reaper: Reaper,
    settle_delay: Duration,
}

impl std::fmt::Debug for BarManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarManager")
            .field("layout", &self.layout)
            .field("monitors", &self.monitors)
            .field("slots", &self.slots)
            .finish()
    }
}

impl BarManager {
    /// Build a manager from a config snapshot. Must be called inside a tokio
    /// runtime; [`initialize`](Self::initialize) must run before drawing.
    pub fn new(config: &AppConfig, username: String, collector: Box<dyn Collector>) -> Self {
        let mut layout = LayoutConfig::from_bar_config(&config.bar);
        layout.char_width = config.char_width;

        Self {
            layout,
            formatter: Formatter::new(
                config.colors.clone(),
                config.popups.clone(),
                username,
                config.char_width,
            ),
            renderer: config.renderer.clone(),
            font: config.font.clone(),
            monitors: Monitor::from_configs(&config.monitors),
            slots: Vec::new(),
            collector,
            snapshot: MetricSnapshot::new(config.keys.clone()),
            reaper: Reaper::new(),
            settle_delay: SETTLE_DELAY,
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State
    // ─────────────────────────────────────────────────────────────────────────

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    pub fn snapshot(&self) -> &MetricSnapshot {
        &self.snapshot
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self, monitor: usize) -> Option<&BarSlots> {
        self.slots.get(monitor)
    }

    /// Visibility of a monitor's bar pair, as seen by its left bar.
    pub fn is_visible(&self, monitor: usize) -> bool {
        self.slots
            .get(monitor)
            .is_some_and(|slots| !slots.left.is_hidden())
    }

    /// Allocate `monitor_count` empty slot pairs.
    ///
    /// Existing handles are dropped without the close protocol; callers that
    /// care should `close_all` first.
    pub fn initialize(&mut self, monitor_count: usize) {
        let live = self
            .slots
            .iter()
            .filter(|s| s.left.is_running() || s.main.is_running())
            .count();
        if live > 0 {
            tracing::warn!(live, "Discarding running bars without closing them");
        }

        self.slots = (0..monitor_count).map(BarSlots::empty).collect();
        tracing::debug!(monitor_count, "Bar slots initialized");
    }

    /// Replace the monitor topology snapshot.
    pub fn set_monitors(&mut self, monitors: Vec<Monitor>) {
        self.monitors = monitors;
    }

    fn check_index(&self, monitor: usize) -> Result<(), BarError> {
        let count = self.monitors.len().min(self.slots.len());
        if monitor < count {
            Ok(())
        } else {
            Err(BarError::MonitorIndex {
                index: monitor,
                count,
            })
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────

    /// Recompute the cached layout. Takes effect on the next redraw.
    pub fn apply_bar_config(&mut self, config: &BarConfig) {
        self.layout.apply(config);
        tracing::debug!(layout = ?self.layout, "Bar layout updated");
    }

    /// Take palette, popups, font, renderer, layout and collector settings
    /// from a reloaded config. Takes effect on the next redraw.
    pub fn apply_config(&mut self, config: &AppConfig) {
        self.apply_bar_config(&config.bar);
        self.layout.char_width = config.char_width;
        self.formatter
            .set_palette(config.colors.clone(), config.popups.clone());
        self.formatter.set_char_width(config.char_width);
        self.renderer = config.renderer.clone();
        self.font = config.font.clone();
        self.snapshot.set_keys(config.keys.clone());
        self.collector.configure(config);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Drawing
    // ─────────────────────────────────────────────────────────────────────────

    fn main_bar_args(&self, monitor: usize, g: &Geometry) -> Vec<String> {
        let colors = self.formatter.colors();
        vec![
            "-xs".to_string(),
            (monitor + 1).to_string(),
            "-ta".to_string(),
            "r".to_string(),
            "-fn".to_string(),
            self.font.clone(),
            "-x".to_string(),
            g.x.to_string(),
            "-y".to_string(),
            g.y.to_string(),
            "-w".to_string(),
            g.width.to_string(),
            "-h".to_string(),
            g.height.to_string(),
            "-bg".to_string(),
            colors.bg.clone(),
            "-fg".to_string(),
            colors.key.clone(),
            "-e".to_string(),
            "button2=;".to_string(),
        ]
    }

    fn left_bar_args(&self, monitor: usize, g: &Geometry) -> Vec<String> {
        let colors = self.formatter.colors();
        vec![
            "-xs".to_string(),
            (monitor + 1).to_string(),
            "-ta".to_string(),
            "l".to_string(),
            "-fn".to_string(),
            self.font.clone(),
            "-w".to_string(),
            g.width.to_string(),
            "-h".to_string(),
            g.height.to_string(),
            "-x".to_string(),
            g.x.to_string(),
            "-y".to_string(),
            g.y.to_string(),
            "-bg".to_string(),
            colors.bg.clone(),
            "-fg".to_string(),
            colors.key.clone(),
            "-e".to_string(),
            "button2=;".to_string(),
        ]
    }

    /// Spawn a fresh renderer for one slot, feed it, install it, and return
    /// the handle it replaced. On error the slot is left as it was.
    async fn replace_bar(&mut self, monitor: usize, side: BarSide) -> Result<BarProcess, BarError> {
        self.check_index(monitor)?;

        let (args, content) = match side {
            BarSide::Main => {
                let g = geometry::main_bar_geometry(&self.monitors, monitor, &self.layout)?;
                let content = self
                    .formatter
                    .status_line(&self.snapshot, &self.monitors[monitor]);
                (self.main_bar_args(monitor, &g), content)
            }
            BarSide::Left => {
                let g = geometry::left_bar_geometry(&self.monitors, monitor, &self.layout)?;
                let content = self.formatter.left_bar_content(&self.monitors[monitor]);
                (self.left_bar_args(monitor, &g), content)
            }
        };

        let mut bar = BarProcess::spawn(side.bar_name(monitor), &self.renderer, args)?;
        if let Err(e) = bar.write_line(&content).await {
            tracing::warn!(monitor, bar = bar.name(), status = %content, error = %e, "Initial write failed");
        }

        Ok(std::mem::replace(
            self.slots[monitor].get_mut(side),
            bar,
        ))
    }

    async fn draw_bar(&mut self, monitor: usize, side: BarSide) -> Result<&BarProcess, BarError> {
        let previous = self.replace_bar(monitor, side).await?;
        self.reaper.submit(vec![previous], None);
        Ok(self.slots[monitor].get(side))
    }

    /// Respawn the main bar of `monitor` with current geometry and content.
    pub async fn draw_main_bar(&mut self, monitor: usize) -> Result<&BarProcess, BarError> {
        self.draw_bar(monitor, BarSide::Main).await
    }

    /// Respawn the left bar of `monitor`.
    pub async fn draw_left_bar(&mut self, monitor: usize) -> Result<&BarProcess, BarError> {
        self.draw_bar(monitor, BarSide::Left).await
    }

    /// Draw both bars of one monitor, logging failures.
    async fn draw_monitor(&mut self, monitor: usize) {
        for side in [BarSide::Left, BarSide::Main] {
            if let Err(e) = self.draw_bar(monitor, side).await {
                tracing::warn!(monitor, side = side.label(), error = %e, "Failed to draw bar");
            }
        }
    }

    /// Replace every bar on every monitor.
    ///
    /// A failed draw keeps the old bar running. Replaced handles are closed
    /// in the background, after [`SETTLE_DELAY`] in [`RedrawMode::Settle`].
    pub async fn redraw_all(&mut self, mode: RedrawMode) {
        let count = self.monitors.len().min(self.slots.len());
        let mut superseded = Vec::with_capacity(count * 2);

        for monitor in 0..count {
            for side in [BarSide::Left, BarSide::Main] {
                match self.replace_bar(monitor, side).await {
                    Ok(previous) => superseded.push(previous),
                    Err(e) => {
                        tracing::warn!(monitor, side = side.label(), error = %e, "Redraw failed, keeping old bar")
                    }
                }
            }
        }

        let settle = match mode {
            RedrawMode::Immediate => None,
            RedrawMode::Settle => Some(self.settle_delay),
        };
        self.reaper.submit(superseded, settle);

        self.maybe_resize_main_bar().await;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Content
    // ─────────────────────────────────────────────────────────────────────────

    /// Collect fresh metrics and rewrite every main bar in place.
    pub async fn update_content(&mut self) {
        self.collector
            .collect(self.formatter.formats(), &mut self.snapshot);
        self.write_status_lines().await;
        self.maybe_resize_main_bar().await;
    }

    /// Refresh only `keys` and rewrite every main bar in place.
    pub async fn reload_content(&mut self, keys: &[&str]) {
        self.collector
            .refresh(keys, self.formatter.formats(), &mut self.snapshot);
        self.write_status_lines().await;
        self.maybe_resize_main_bar().await;
    }

    async fn write_status_lines(&mut self) {
        let count = self.monitors.len().min(self.slots.len());
        for monitor in 0..count {
            let bar = &self.slots[monitor].main;
            if !bar.is_running() {
                tracing::debug!(monitor, bar = bar.name(), "Skipping hidden bar");
                continue;
            }

            let status = self
                .formatter
                .status_line(&self.snapshot, &self.monitors[monitor]);
            let bar = &mut self.slots[monitor].main;
            if let Err(e) = bar.write_line(&status).await {
                tracing::warn!(monitor, bar = bar.name(), %status, error = %e, "Status write failed");
            }
        }
    }

    /// Track content width under non-contiguous layout.
    ///
    /// When the plain-text width changed, every running main bar is respawned
    /// at the new width and position. Returns whether the width changed.
    pub async fn maybe_resize_main_bar(&mut self) -> bool {
        if self.layout.contiguous {
            return false;
        }

        let width = self
            .layout
            .width_for_len(status_line_length(&self.snapshot));
        if width == self.layout.main_bar_width {
            return false;
        }

        tracing::info!(
            old = self.layout.main_bar_width,
            new = width,
            "Main bar width changed"
        );
        self.layout.main_bar_width = width;

        let count = self.monitors.len().min(self.slots.len());
        let mut superseded = Vec::with_capacity(count);
        for monitor in 0..count {
            // Respawning a hidden main bar would show it without its left
            // bar; it picks up the new width when toggled back
            if !self.slots[monitor].main.is_running() {
                continue;
            }
            match self.replace_bar(monitor, BarSide::Main).await {
                Ok(previous) => superseded.push(previous),
                Err(e) => tracing::warn!(monitor, error = %e, "Resize failed, keeping old main bar"),
            }
        }
        self.reaper.submit(superseded, None);
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Visibility and Teardown
    // ─────────────────────────────────────────────────────────────────────────

    /// Hide a visible monitor's bars, or bring hidden ones back.
    pub async fn toggle_visibility(&mut self, monitor: usize) -> Result<(), BarError> {
        self.check_index(monitor)?;

        if self.slots[monitor].left.is_hidden() {
            tracing::debug!(monitor, "Showing bars");
            self.draw_monitor(monitor).await;
        } else {
            tracing::debug!(monitor, "Hiding bars");
            self.close_monitor(monitor).await?;
        }
        Ok(())
    }

    /// Close both bars of one monitor in place, waiting for them to exit.
    pub async fn close_monitor(&mut self, monitor: usize) -> Result<(), BarError> {
        self.check_index(monitor)?;

        let slots = &mut self.slots[monitor];
        for bar in [&mut slots.left, &mut slots.main] {
            if let Err(e) = bar.close().await {
                tracing::warn!(monitor, bar = ?bar, error = %e, "Failed to close bar");
            }
        }
        Ok(())
    }

    /// Close every bar in place, optionally after the settle delay.
    pub async fn close_all(&mut self, settle: bool) {
        if settle {
            sleep(self.settle_delay).await;
        }

        for (monitor, slots) in self.slots.iter_mut().enumerate() {
            for bar in [&mut slots.left, &mut slots.main] {
                if let Err(e) = bar.close().await {
                    tracing::warn!(monitor, bar = ?bar, error = %e, "Failed to close bar");
                }
            }
        }
    }

    /// Close every bar and wait for background teardowns to finish.
    pub async fn shutdown(&mut self) {
        self.close_all(false).await;
        self.reaper.shutdown().await;
        tracing::info!("Bar manager shut down");
    }
}
