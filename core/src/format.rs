//! Renderer markup for bar content
//!
//! Produces dzen-style markup: `^fg(..)`/`^bg(..)` color directives and
//! `^ca(button,command)..^ca()` clickable regions. The markup is opaque to
//! the rest of the manager.

use std::fmt::Write;

use barkeep_types::{ColorConfig, PopupConfig, PopupTarget};

use crate::geometry::{Monitor, bar_width_from_key, reserved_width};
use crate::metrics::MetricSnapshot;

/// Metrics whose segment opens a popup, and which popup.
static POPUP_METRICS: phf::Map<&'static str, PopupTarget> = phf::phf_map! {
    "clock" => PopupTarget::Clock,
    "weather" => PopupTarget::Weather,
};

/// Entry templates derived from the color palette.
///
/// Templates use `{icon}` and `{value}` placeholders, see
/// [`MetricEntry::styled`](crate::metrics::MetricEntry::styled).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFormats {
    pub default: String,
    pub urgent: String,
}

impl EntryFormats {
    pub fn from_colors(colors: &ColorConfig) -> Self {
        Self {
            default: format!("^fg({}){{icon}} ^fg({}){{value}}", colors.key, colors.value),
            urgent: format!("^fg({}){{icon}} {{value}}", colors.urgent),
        }
    }
}

pub struct Formatter {
    colors: ColorConfig,
    popups: PopupConfig,
    username: String,
    char_width: f32,
    formats: EntryFormats,
}

impl Formatter {
    pub fn new(colors: ColorConfig, popups: PopupConfig, username: String, char_width: f32) -> Self {
        let formats = EntryFormats::from_colors(&colors);
        Self {
            colors,
            popups,
            username,
            char_width,
            formats,
        }
    }

    pub fn formats(&self) -> &EntryFormats {
        &self.formats
    }

    pub fn colors(&self) -> &ColorConfig {
        &self.colors
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Swap palette and popup commands after a config reload.
    pub fn set_palette(&mut self, colors: ColorConfig, popups: PopupConfig) {
        self.formats = EntryFormats::from_colors(&colors);
        self.colors = colors;
        self.popups = popups;
    }

    pub fn set_char_width(&mut self, char_width: f32) {
        self.char_width = char_width;
    }

    /// Markup for the main bar of `monitor`.
    pub fn status_line(&self, snapshot: &MetricSnapshot, monitor: &Monitor) -> String {
        let mut bar = String::new();
        let reserved = reserved_width(&self.username);

        for entry in snapshot.ordered() {
            let popup = POPUP_METRICS
                .get(entry.key.as_str())
                .and_then(|target| self.popups.command(*target));

            match popup {
                Some(cmd) => {
                    let region = bar_width_from_key(&entry.key, snapshot, reserved, self.char_width);
                    let _ = write!(
                        bar,
                        " ^ca(1,{} {} {} {} {}){}^ca()",
                        cmd,
                        monitor.screen(),
                        monitor.width,
                        monitor.height,
                        region,
                        entry.formatted
                    );
                }
                None => {
                    let _ = write!(bar, " {}", entry.formatted);
                }
            }
        }

        let c = &self.colors;
        match self.popups.command(PopupTarget::User) {
            Some(cmd) => {
                let _ = write!(
                    bar,
                    " ^ca(1,{} {} {} {})^fg({})^fg({})^bg({}) {} ^ca()",
                    cmd,
                    monitor.screen(),
                    monitor.width,
                    monitor.height,
                    c.sidebars_bg,
                    c.sidebars_fg,
                    c.sidebars_bg,
                    self.username
                );
            }
            None => {
                let _ = write!(
                    bar,
                    " ^fg({})^fg({})^bg({}) {} ",
                    c.sidebars_bg, c.sidebars_fg, c.sidebars_bg, self.username
                );
            }
        }

        bar
    }

    /// Markup for the left bar of `monitor`.
    pub fn left_bar_content(&self, monitor: &Monitor) -> String {
        let c = &self.colors;
        let label = format!(
            "^fg({})^bg({})  info^fg({})^bg({})  ",
            c.sidebars_fg, c.sidebars_bg, c.sidebars_bg, c.bg
        );

        match self.popups.command(PopupTarget::Info) {
            Some(cmd) => format!(
                "^ca(1,{} {} {} {}){}^ca()",
                cmd,
                monitor.screen(),
                monitor.width,
                monitor.height,
                label
            ),
            None => label,
        }
    }
}

/// Visible length of the status line without any markup.
///
/// Used to decide whether a non-contiguous main bar needs a new width; markup
/// is invisible in the rendered bar and must not count.
pub fn status_line_length(snapshot: &MetricSnapshot) -> usize {
    snapshot
        .ordered()
        .map(|entry| 2 + entry.icon.chars().count() + entry.value.chars().count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricEntry;

    fn snapshot(formats: &EntryFormats) -> MetricSnapshot {
        let mut snapshot = MetricSnapshot::new(vec!["volume".to_string(), "clock".to_string()]);
        snapshot.insert(MetricEntry::new("volume", "VOL", "50%").styled(&formats.default));
        snapshot.insert(MetricEntry::new("clock", "", "12:00").styled(&formats.default));
        snapshot
    }

    fn formatter(popups: PopupConfig) -> Formatter {
        Formatter::new(ColorConfig::default(), popups, "alice".to_string(), 7.5)
    }

    #[test]
    fn clock_popup_wraps_only_clock() {
        let formatter = formatter(PopupConfig {
            clock: "popup-clock".to_string(),
            ..Default::default()
        });
        let snapshot = snapshot(formatter.formats());
        let monitor = Monitor::new(0, 1920, 1080);

        let line = formatter.status_line(&snapshot, &monitor);
        let region = bar_width_from_key("clock", &snapshot, reserved_width("alice"), 7.5);

        assert_eq!(line.matches("^ca(1,").count(), 1);
        assert!(line.contains(&format!("^ca(1,popup-clock 1 1920 1080 {region})")));
        let volume = snapshot.get("volume").unwrap();
        assert!(line.starts_with(&format!(" {} ^ca(", volume.formatted)));
    }

    #[test]
    fn weather_popup_uses_screen_number() {
        let formatter = formatter(PopupConfig {
            weather: "popup-weather".to_string(),
            ..Default::default()
        });
        let mut snapshot = snapshot(formatter.formats());
        snapshot.set_keys(vec!["weather".to_string(), "clock".to_string()]);
        snapshot.insert(MetricEntry::new("weather", "", "9C"));

        let line = formatter.status_line(&snapshot, &Monitor::new(1, 1280, 1024));
        // weather (2) + clock (5) + alice (5) + padding (5)
        assert!(line.contains("^ca(1,popup-weather 2 1280 1024 127)9C^ca()"));
        assert_eq!(line.matches("^ca(1,").count(), 1);
    }

    #[test]
    fn username_segment_without_popup() {
        let formatter = formatter(PopupConfig::default());
        let line = formatter.status_line(&MetricSnapshot::default(), &Monitor::new(0, 800, 600));
        assert_eq!(line, " ^fg(#1d1f21)^fg(#c5c8c6)^bg(#1d1f21) alice ");
    }

    #[test]
    fn username_segment_with_popup() {
        let formatter = formatter(PopupConfig {
            user: "popup-user".to_string(),
            ..Default::default()
        });
        let line = formatter.status_line(&MetricSnapshot::default(), &Monitor::new(0, 800, 600));
        assert_eq!(
            line,
            " ^ca(1,popup-user 1 800 600)^fg(#1d1f21)^fg(#c5c8c6)^bg(#1d1f21) alice ^ca()"
        );
    }

    #[test]
    fn length_ignores_markup() {
        let plain = Formatter::new(
            ColorConfig::default(),
            PopupConfig::default(),
            "alice".to_string(),
            7.5,
        );
        let fancy = Formatter::new(
            ColorConfig {
                key: "#ffffffffffff".to_string(),
                ..Default::default()
            },
            PopupConfig {
                clock: "popup-clock".to_string(),
                user: "popup-user".to_string(),
                ..Default::default()
            },
            "alice".to_string(),
            7.5,
        );

        let a = snapshot(plain.formats());
        let b = snapshot(fancy.formats());
        assert_eq!(status_line_length(&a), status_line_length(&b));
        // " VOL 50%" + "  12:00"
        assert_eq!(status_line_length(&a), 15);
    }

    #[test]
    fn left_bar_info_region() {
        let monitor = Monitor::new(0, 1920, 1080);
        let plain = formatter(PopupConfig::default()).left_bar_content(&monitor);
        assert!(!plain.contains("^ca("));
        assert!(plain.contains("  info"));

        let clickable = formatter(PopupConfig {
            info: "popup-info".to_string(),
            ..Default::default()
        })
        .left_bar_content(&monitor);
        assert!(clickable.starts_with("^ca(1,popup-info 1 1920 1080)"));
        assert!(clickable.ends_with("^ca()"));
    }

    #[test]
    fn urgent_template_uses_urgent_color() {
        let formats = EntryFormats::from_colors(&ColorConfig::default());
        let entry = MetricEntry::new("battery", "BAT", "5%").styled(&formats.urgent);
        assert_eq!(entry.formatted, "^fg(#cc6666)BAT 5%");
    }
}
