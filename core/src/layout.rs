//! Cached, validated bar layout

use barkeep_types::BarConfig;

pub const DEFAULT_BAR_HEIGHT: i32 = 15;
pub const DEFAULT_MAIN_BAR_WIDTH: i32 = 500;

/// Empirical character-width-to-pixel ratio for the default font.
pub const DEFAULT_CHAR_WIDTH: f32 = 7.5;

/// Layout fields derived from [`BarConfig`].
///
/// `main_bar_width` is only consulted under non-contiguous layout, where it
/// tracks the width of the rendered status text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub contiguous: bool,
    pub bar_height: i32,
    pub left_bar_width: i32,
    pub top: bool,
    pub main_bar_width: i32,
    pub char_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            contiguous: true,
            bar_height: DEFAULT_BAR_HEIGHT,
            left_bar_width: 0,
            top: true,
            main_bar_width: DEFAULT_MAIN_BAR_WIDTH,
            char_width: DEFAULT_CHAR_WIDTH,
        }
    }
}

impl LayoutConfig {
    pub fn from_bar_config(config: &BarConfig) -> Self {
        let mut layout = Self::default();
        layout.apply(config);
        layout
    }

    /// Recompute the config-derived fields. `main_bar_width` and
    /// `char_width` are left alone.
    pub fn apply(&mut self, config: &BarConfig) {
        self.contiguous = config.contiguous.is_empty() || config.contiguous == "yes";
        self.bar_height = if config.height > 0 {
            config.height
        } else {
            DEFAULT_BAR_HEIGHT
        };
        self.left_bar_width = config.left_bar_width.max(0);
        self.top = config.position != "bottom";
    }

    /// Pixel width of `len` characters of status text.
    pub fn width_for_len(&self, len: usize) -> i32 {
        (len as f32 * self.char_width) as i32
    }

    /// Vertical origin of every bar on a monitor of the given height.
    pub fn y_for(&self, monitor_height: i32) -> i32 {
        if self.top {
            0
        } else {
            monitor_height - self.bar_height
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(height: i32, left: i32, contiguous: &str, position: &str) -> BarConfig {
        BarConfig {
            height,
            left_bar_width: left,
            contiguous: contiguous.to_string(),
            position: position.to_string(),
        }
    }

    #[test]
    fn unset_config_uses_defaults() {
        let layout = LayoutConfig::from_bar_config(&BarConfig::default());
        assert!(layout.contiguous);
        assert_eq!(layout.bar_height, 15);
        assert_eq!(layout.left_bar_width, 0);
        assert!(layout.top);
    }

    #[test]
    fn invalid_values_fall_back() {
        let layout = LayoutConfig::from_bar_config(&bar(-3, -40, "yes", "middle"));
        assert!(layout.contiguous);
        assert_eq!(layout.bar_height, 15);
        assert_eq!(layout.left_bar_width, 0);
        assert!(layout.top);
    }

    #[test]
    fn explicit_values_are_kept() {
        let layout = LayoutConfig::from_bar_config(&bar(22, 180, "no", "bottom"));
        assert!(!layout.contiguous);
        assert_eq!(layout.bar_height, 22);
        assert_eq!(layout.left_bar_width, 180);
        assert!(!layout.top);
        assert_eq!(layout.y_for(1080), 1058);
    }

    #[test]
    fn apply_keeps_tracked_width() {
        let mut layout = LayoutConfig {
            main_bar_width: 640,
            ..Default::default()
        };
        layout.apply(&bar(0, 0, "off", ""));
        assert!(!layout.contiguous);
        assert_eq!(layout.main_bar_width, 640);
    }

    #[test]
    fn width_truncates() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.width_for_len(0), 0);
        assert_eq!(layout.width_for_len(3), 22);
        assert_eq!(layout.width_for_len(10), 75);
    }
}
