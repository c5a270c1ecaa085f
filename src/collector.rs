//! Built-in metric collection

use barkeep_core::{Collector, EntryFormats, MetricEntry, MetricSnapshot};
use barkeep_types::AppConfig;
use time::OffsetDateTime;
use time::format_description;

pub const CLOCK_KEY: &str = "clock";

/// Collects the wall clock.
pub struct ClockCollector {
    format: String,
}

impl ClockCollector {
    /// `format` uses `time`'s format description syntax, e.g.
    /// `[hour]:[minute]`.
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    pub fn set_format(&mut self, format: impl Into<String>) {
        self.format = format.into();
    }

    fn render(&self, now: OffsetDateTime) -> Option<String> {
        let items = match format_description::parse(&self.format) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(format = %self.format, error = %e, "Invalid clock format");
                return None;
            }
        };
        match now.format(&items) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(format = %self.format, error = %e, "Clock formatting failed");
                None
            }
        }
    }
}

impl Collector for ClockCollector {
    fn collect(&mut self, formats: &EntryFormats, snapshot: &mut MetricSnapshot) {
        // Local offset is unavailable once threads exist on some platforms
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        match self.render(now) {
            Some(text) => snapshot.insert(MetricEntry::new(CLOCK_KEY, "", text).styled(&formats.default)),
            None => {
                snapshot.remove(CLOCK_KEY);
            }
        }
    }

    fn refresh(&mut self, keys: &[&str], formats: &EntryFormats, snapshot: &mut MetricSnapshot) {
        if keys.contains(&CLOCK_KEY) {
            self.collect(formats, snapshot);
        }
    }

    fn configure(&mut self, config: &AppConfig) {
        if config.clock_format != self.format {
            tracing::debug!(format = %config.clock_format, "Clock format changed");
            self.set_format(config.clock_format.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barkeep_types::ColorConfig;
    use time::macros::datetime;

    #[test]
    fn renders_configured_format() {
        let collector = ClockCollector::new("[hour]:[minute]");
        let now = datetime!(2024-03-05 09:07 UTC);
        assert_eq!(collector.render(now).as_deref(), Some("09:07"));
    }

    #[test]
    fn invalid_format_drops_clock() {
        let formats = EntryFormats::from_colors(&ColorConfig::default());
        let mut snapshot = MetricSnapshot::new(vec![CLOCK_KEY.to_string()]);

        let mut collector = ClockCollector::new("[hour]:[minute]");
        collector.collect(&formats, &mut snapshot);
        let entry = snapshot.get(CLOCK_KEY).unwrap();
        assert_eq!(entry.length, 5);
        assert!(entry.formatted.starts_with("^fg("));

        collector.set_format("[not a component]");
        collector.collect(&formats, &mut snapshot);
        assert!(snapshot.get(CLOCK_KEY).is_none());
    }

    #[test]
    fn refresh_ignores_other_keys() {
        let formats = EntryFormats::from_colors(&ColorConfig::default());
        let mut snapshot = MetricSnapshot::new(vec![CLOCK_KEY.to_string()]);
        let mut collector = ClockCollector::new("[hour]:[minute]");

        collector.refresh(&["volume"], &formats, &mut snapshot);
        assert!(snapshot.get(CLOCK_KEY).is_none());
        collector.refresh(&["volume", CLOCK_KEY], &formats, &mut snapshot);
        assert!(snapshot.get(CLOCK_KEY).is_some());
    }

    #[test]
    fn reloaded_config_changes_format() {
        let mut collector = ClockCollector::new("[hour]:[minute]");
        let config = AppConfig {
            clock_format: "[hour]h[minute]".to_string(),
            ..Default::default()
        };
        collector.configure(&config);

        let now = datetime!(2024-03-05 09:07 UTC);
        assert_eq!(collector.render(now).as_deref(), Some("09h07"));
    }
}
