//! Bar lifecycle
//!
//! This module provides:
//! - **Process handles**: one spawned renderer per bar slot
//! - **Reaper**: background teardown of superseded renderers
//! - **Manager**: spawn/redraw/resize/toggle sequencing across monitors
//!
//! # Replacement
//!
//! ```text
//!   draw_main_bar(m)
//!         │
//!         ├── spawn renderer with new geometry
//!         ├── write current status line
//!         ├── install in slots[m].main ──► old handle moved out
//!         │                                      │
//!         ▼                                      ▼
//!   caller continues                    Reaper task per handle
//!                                    (close stdin, wait for exit)
//! ```
//!
//! The new handle is always installed before the old one is handed off, so the
//! slot never looks empty to a reader.

mod manager;
mod process;
mod reaper;


pub use manager::{BarManager, BarSide, BarSlots, RedrawMode};
pub use process::BarProcess;
pub use reaper::Reaper;
