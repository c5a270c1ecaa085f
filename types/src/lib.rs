//! Shared configuration types for barkeep
//!
//! This crate contains the serializable configuration snapshot consumed by the
//! bar lifecycle manager (barkeep-core) and loaded by the daemon.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

fn default_font() -> String {
    "-*-terminus-medium-r-*-*-12-*-*-*-*-*-*-*".to_string()
}

fn default_program() -> String {
    "dzen2".to_string()
}

fn default_char_width() -> f32 {
    7.5
}

fn default_update_interval() -> u64 {
    5
}

fn default_keys() -> Vec<String> {
    vec!["clock".to_string()]
}

fn default_clock_format() -> String {
    "[hour]:[minute]".to_string()
}

fn default_monitors() -> Vec<MonitorConfig> {
    vec![MonitorConfig {
        width: 1920,
        height: 1080,
    }]
}

// ─────────────────────────────────────────────────────────────────────────────
// Palette and Popups
// ─────────────────────────────────────────────────────────────────────────────

/// Color palette used verbatim in renderer markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub sidebars_bg: String,
    pub sidebars_fg: String,
    pub urgent: String,
    pub key: String,
    pub value: String,
    pub bg: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            sidebars_bg: "#1d1f21".to_string(),
            sidebars_fg: "#c5c8c6".to_string(),
            urgent: "#cc6666".to_string(),
            key: "#81a2be".to_string(),
            value: "#c5c8c6".to_string(),
            bg: "#282a36".to_string(),
        }
    }
}

/// Which popup a clickable region invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopupTarget {
    Info,
    Clock,
    Weather,
    User,
}

/// Commands invoked when a clickable region is pressed.
///
/// An empty string disables the region entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupConfig {
    pub info: String,
    pub clock: String,
    pub weather: String,
    pub user: String,
}

impl PopupConfig {
    /// Command for a popup target, `None` when unset.
    pub fn command(&self, target: PopupTarget) -> Option<&str> {
        let cmd = match target {
            PopupTarget::Info => &self.info,
            PopupTarget::Clock => &self.clock,
            PopupTarget::Weather => &self.weather,
            PopupTarget::User => &self.user,
        };
        if cmd.is_empty() { None } else { Some(cmd.as_str()) }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────────────────────────────────────

/// Bar layout options as written by the user.
///
/// Values are unvalidated; the manager derives its cached layout from them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarConfig {
    pub height: i32,
    pub left_bar_width: i32,
    /// "yes" (or empty) for a main bar spanning to the left bar's edge
    pub contiguous: String,
    /// "top" or "bottom"
    pub position: String,
}

/// External renderer invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub program: String,
    /// Arguments placed before the generated geometry arguments
    pub args: Vec<String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub width: i32,
    pub height: i32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Config
// ─────────────────────────────────────────────────────────────────────────────

/// Complete configuration snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default)]
    pub colors: ColorConfig,
    #[serde(default)]
    pub popups: PopupConfig,
    #[serde(default)]
    pub bar: BarConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default = "default_monitors")]
    pub monitors: Vec<MonitorConfig>,
    /// Metric display order
    #[serde(default = "default_keys")]
    pub keys: Vec<String>,
    /// Overrides the login name shown at the end of the bar
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default = "default_clock_format")]
    pub clock_format: String,
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,
    /// Character-width-to-pixel ratio, tied to the configured font
    #[serde(default = "default_char_width")]
    pub char_width: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            font: default_font(),
            colors: ColorConfig::default(),
            popups: PopupConfig::default(),
            bar: BarConfig::default(),
            renderer: RendererConfig::default(),
            monitors: default_monitors(),
            keys: default_keys(),
            username: None,
            clock_format: default_clock_format(),
            update_interval_secs: default_update_interval(),
            char_width: default_char_width(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_popup_is_disabled() {
        let popups = PopupConfig {
            clock: "popup-clock".to_string(),
            ..Default::default()
        };
        assert_eq!(popups.command(PopupTarget::Clock), Some("popup-clock"));
        assert_eq!(popups.command(PopupTarget::Weather), None);
        assert_eq!(popups.command(PopupTarget::User), None);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            font = "fixed"

            [bar]
            height = 20
            position = "bottom"

            [popups]
            user = "popup-user"
            "#,
        )
        .unwrap();

        assert_eq!(config.font, "fixed");
        assert_eq!(config.bar.height, 20);
        assert_eq!(config.bar.position, "bottom");
        assert!(config.bar.contiguous.is_empty());
        assert_eq!(config.popups.user, "popup-user");
        assert_eq!(config.renderer.program, "dzen2");
        assert_eq!(config.monitors.len(), 1);
        assert_eq!(config.char_width, 7.5);
        assert_eq!(config.colors, ColorConfig::default());
    }
}
