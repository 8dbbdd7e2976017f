//! Time-since milestone engine
//!
//! Each entry pairs a trigger action with a derived attribute and a regex
//! over action names. When the trigger fires its timestamp is recorded
//! (last write wins); the first later action matching the regex receives
//! `attribute = elapsed milliseconds` and the timestamp is cleared. An end
//! milestone arriving with nothing recorded gets no attribute; zero is
//! never substituted.

use crate::error::{Error, Result};
use crate::types::Attributes;
use regex::Regex;
use std::time::Instant;

/// One trigger/attribute/filter rule
#[derive(Debug)]
pub struct TimeSinceEntry {
    trigger: String,
    attribute: String,
    filter: Regex,
    recorded_at: Option<Instant>,
}

impl TimeSinceEntry {
    /// Build an entry; fails if the filter is not a valid regex.
    pub fn new(trigger: &str, attribute: &str, filter: &str) -> Result<Self> {
        let filter = Regex::new(filter).map_err(|source| Error::InvalidFilter {
            pattern: filter.to_string(),
            source,
        })?;
        Ok(Self {
            trigger: trigger.to_string(),
            attribute: attribute.to_string(),
            filter,
            recorded_at: None,
        })
    }

    /// Record the trigger timestamp, overwriting any outstanding one.
    pub fn record(&mut self) {
        self.recorded_at = Some(Instant::now());
    }

    fn is_trigger(&self, action: &str) -> bool {
        self.trigger == action
    }

    fn is_match(&self, action: &str) -> bool {
        self.filter.is_match(action)
    }
}

/// Ordered set of time-since rules for one tracker
#[derive(Debug, Default)]
pub struct TimeSinceTable {
    entries: Vec<TimeSinceEntry>,
}

impl TimeSinceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule.
    pub fn add_entry(&mut self, trigger: &str, attribute: &str, filter: &str) -> Result<()> {
        self.entries.push(TimeSinceEntry::new(trigger, attribute, filter)?);
        Ok(())
    }

    /// Apply the table to an outgoing action: attach and consume elapsed
    /// attributes for matching rules, then record the action as a trigger
    /// where it is one.
    pub fn apply(&mut self, action: &str, attributes: &mut Attributes) {
        for entry in &mut self.entries {
            if entry.is_match(action) {
                if let Some(recorded_at) = entry.recorded_at.take() {
                    let elapsed_ms = recorded_at.elapsed().as_millis() as i64;
                    attributes.insert(entry.attribute.clone(), elapsed_ms.into());
                }
            }
            if entry.is_trigger(action) {
                entry.record();
            }
        }
    }
}

/// Built-in milestone pairs for a content tracker.
///
/// The filter of each pair names the one closing action that consumes the
/// milestone; `timeSinceTrackerReady` is the exception and goes to the
/// first event of any kind.
pub fn content_table() -> TimeSinceTable {
    build_table(&[
        ("TRACKER_READY", "timeSinceTrackerReady", "^[A-Z_]+$"),
        ("CONTENT_REQUEST", "timeSinceRequested", "^CONTENT_START$"),
        ("CONTENT_BUFFER_START", "timeSinceBufferBegin", "^CONTENT_BUFFER_END$"),
        ("CONTENT_SEEK_START", "timeSinceSeekBegin", "^CONTENT_SEEK_END$"),
        ("CONTENT_PAUSE", "timeSincePaused", "^CONTENT_RESUME$"),
    ])
}

/// Built-in milestone pairs for an ad tracker.
///
/// `timeSinceAdRequested` closes at `AD_END` so each ad's closing event
/// reports the full request-to-end duration of that ad; the per-ad values
/// of one break sum to the break's `timeSinceAdBreakBegin`.
pub fn ad_table() -> TimeSinceTable {
    build_table(&[
        ("TRACKER_READY", "timeSinceTrackerReady", "^[A-Z_]+$"),
        ("AD_REQUEST", "timeSinceAdRequested", "^AD_END$"),
        ("AD_BUFFER_START", "timeSinceAdBufferBegin", "^AD_BUFFER_END$"),
        ("AD_SEEK_START", "timeSinceAdSeekBegin", "^AD_SEEK_END$"),
        ("AD_PAUSE", "timeSinceAdPaused", "^AD_RESUME$"),
        ("AD_BREAK_START", "timeSinceAdBreakBegin", "^AD_BREAK_END$"),
    ])
}

fn build_table(rules: &[(&str, &str, &str)]) -> TimeSinceTable {
    let mut table = TimeSinceTable::new();
    for (trigger, attribute, filter) in rules {
        table
            .add_entry(trigger, attribute, filter)
            .expect("built-in filter pattern is valid");
    }
    table
}
