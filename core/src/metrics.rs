//! Collected metric snapshot and the collector seam
//!
//! Collectors own the data sources; the manager only reads the snapshot they
//! fill in, in the display order given by the snapshot's key list.

use barkeep_types::AppConfig;
use hashbrown::HashMap;

use crate::format::EntryFormats;

/// One collected value, pre-rendered for the bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricEntry {
    pub key: String,
    pub icon: String,
    pub value: String,
    /// Template the entry was rendered with, if any
    pub format: Option<String>,
    /// Markup shown in the bar
    pub formatted: String,
    /// Visible length of `icon` and `value`
    pub length: usize,
}

impl MetricEntry {
    /// Unstyled entry: `formatted` is the plain text.
    pub fn new(key: impl Into<String>, icon: impl Into<String>, value: impl Into<String>) -> Self {
        let icon = icon.into();
        let value = value.into();
        let formatted = if icon.is_empty() {
            value.clone()
        } else {
            format!("{icon} {value}")
        };
        let length = formatted.chars().count();
        Self {
            key: key.into(),
            icon,
            value,
            format: None,
            formatted,
            length,
        }
    }

    /// Render through a `{icon}`/`{value}` template. Length stays the
    /// visible length, markup excluded.
    pub fn styled(mut self, template: &str) -> Self {
        self.formatted = template
            .replace("{icon}", &self.icon)
            .replace("{value}", &self.value);
        self.format = Some(template.to_string());
        self
    }
}

/// Keyed metrics plus their display order.
#[derive(Debug, Clone, Default)]
pub struct MetricSnapshot {
    keys: Vec<String>,
    entries: HashMap<String, MetricEntry>,
}

impl MetricSnapshot {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            keys,
            entries: HashMap::new(),
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn set_keys(&mut self, keys: Vec<String>) {
        self.keys = keys;
    }

    pub fn get(&self, key: &str) -> Option<&MetricEntry> {
        self.entries.get(key)
    }

    /// Insert under the entry's own key.
    pub fn insert(&mut self, entry: MetricEntry) {
        self.entries.insert(entry.key.clone(), entry);
    }

    pub fn remove(&mut self, key: &str) -> Option<MetricEntry> {
        self.entries.remove(key)
    }

    /// Present entries in display order. Keys without an entry are skipped.
    pub fn ordered(&self) -> impl Iterator<Item = &MetricEntry> {
        self.keys.iter().filter_map(|key| self.entries.get(key))
    }

    /// Present entries from `key` (inclusive) to the end of the order.
    /// Empty when `key` is not part of the order.
    pub fn from_key<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a MetricEntry> {
        let start = self
            .keys
            .iter()
            .position(|k| k == key)
            .unwrap_or(self.keys.len());
        self.keys[start..]
            .iter()
            .filter_map(|k| self.entries.get(k))
    }
}

/// Source of metric values.
pub trait Collector: Send {
    /// Refresh every metric this collector knows about.
    fn collect(&mut self, formats: &EntryFormats, snapshot: &mut MetricSnapshot);

    /// Refresh only `keys`. Collectors that cannot refresh selectively fall
    /// back to a full collection.
    fn refresh(&mut self, keys: &[&str], formats: &EntryFormats, snapshot: &mut MetricSnapshot) {
        let _ = keys;
        self.collect(formats, snapshot);
    }

    /// Pick up settings from a reloaded config.
    fn configure(&mut self, config: &AppConfig) {
        let _ = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> MetricSnapshot {
        let mut snapshot = MetricSnapshot::new(vec![
            "volume".to_string(),
            "battery".to_string(),
            "clock".to_string(),
        ]);
        snapshot.insert(MetricEntry::new("volume", "VOL", "50%"));
        snapshot.insert(MetricEntry::new("clock", "", "12:00"));
        snapshot
    }

    #[test]
    fn entry_length_ignores_empty_icon() {
        assert_eq!(MetricEntry::new("volume", "VOL", "50%").length, 7);
        assert_eq!(MetricEntry::new("clock", "", "12:00").length, 5);
    }

    #[test]
    fn styled_entry_keeps_visible_length() {
        let entry = MetricEntry::new("volume", "VOL", "50%").styled("^fg(red){icon} ^fg(blue){value}");
        assert_eq!(entry.formatted, "^fg(red)VOL ^fg(blue)50%");
        assert_eq!(entry.length, 7);
        assert!(entry.format.is_some());
    }

    #[test]
    fn ordered_skips_missing_keys() {
        let snapshot = snapshot();
        let keys: Vec<&str> = snapshot.ordered().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["volume", "clock"]);
    }

    #[test]
    fn from_key_starts_at_key() {
        let snapshot = snapshot();
        let keys: Vec<&str> = snapshot.from_key("battery").map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["clock"]);
        assert_eq!(snapshot.from_key("weather").count(), 0);
    }
}
