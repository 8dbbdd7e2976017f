//! Core types for Playtrace

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a registered tracker pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackerId(pub u64);

impl std::fmt::Display for TrackerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which sub-session a tracker reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerRole {
    /// Main content playback
    Content,
    /// Ad playback inside an ad break
    Ad,
}

/// Lifecycle actions recognized by the engine
///
/// Every emitted event is one of these. The canonical name (see
/// [`Action::name`]) is what regex filters for time-since entries and
/// custom attributes match against. Actions outside the closed set pass
/// through the dispatcher as [`Action::Custom`] without touching playback
/// state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    TrackerReady,
    PlayerReady,
    ContentRequest,
    ContentStart,
    ContentPause,
    ContentResume,
    ContentBufferStart,
    ContentBufferEnd,
    ContentSeekStart,
    ContentSeekEnd,
    ContentHeartbeat,
    ContentError,
    ContentEnd,
    AdRequest,
    AdStart,
    AdPause,
    AdResume,
    AdBufferStart,
    AdBufferEnd,
    AdSeekStart,
    AdSeekEnd,
    AdHeartbeat,
    AdError,
    AdEnd,
    AdBreakStart,
    AdBreakEnd,
    /// Caller-defined action, dispatched unclassified
    Custom(String),
}

impl Action {
    /// Canonical action name used for filter matching and wire output.
    pub fn name(&self) -> &str {
        match self {
            Action::TrackerReady => "TRACKER_READY",
            Action::PlayerReady => "PLAYER_READY",
            Action::ContentRequest => "CONTENT_REQUEST",
            Action::ContentStart => "CONTENT_START",
            Action::ContentPause => "CONTENT_PAUSE",
            Action::ContentResume => "CONTENT_RESUME",
            Action::ContentBufferStart => "CONTENT_BUFFER_START",
            Action::ContentBufferEnd => "CONTENT_BUFFER_END",
            Action::ContentSeekStart => "CONTENT_SEEK_START",
            Action::ContentSeekEnd => "CONTENT_SEEK_END",
            Action::ContentHeartbeat => "CONTENT_HEARTBEAT",
            Action::ContentError => "CONTENT_ERROR",
            Action::ContentEnd => "CONTENT_END",
            Action::AdRequest => "AD_REQUEST",
            Action::AdStart => "AD_START",
            Action::AdPause => "AD_PAUSE",
            Action::AdResume => "AD_RESUME",
            Action::AdBufferStart => "AD_BUFFER_START",
            Action::AdBufferEnd => "AD_BUFFER_END",
            Action::AdSeekStart => "AD_SEEK_START",
            Action::AdSeekEnd => "AD_SEEK_END",
            Action::AdHeartbeat => "AD_HEARTBEAT",
            Action::AdError => "AD_ERROR",
            Action::AdEnd => "AD_END",
            Action::AdBreakStart => "AD_BREAK_START",
            Action::AdBreakEnd => "AD_BREAK_END",
            Action::Custom(name) => name,
        }
    }

    /// Parse a canonical name back into an action. Unrecognized names
    /// become [`Action::Custom`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "TRACKER_READY" => Action::TrackerReady,
            "PLAYER_READY" => Action::PlayerReady,
            "CONTENT_REQUEST" => Action::ContentRequest,
            "CONTENT_START" => Action::ContentStart,
            "CONTENT_PAUSE" => Action::ContentPause,
            "CONTENT_RESUME" => Action::ContentResume,
            "CONTENT_BUFFER_START" => Action::ContentBufferStart,
            "CONTENT_BUFFER_END" => Action::ContentBufferEnd,
            "CONTENT_SEEK_START" => Action::ContentSeekStart,
            "CONTENT_SEEK_END" => Action::ContentSeekEnd,
            "CONTENT_HEARTBEAT" => Action::ContentHeartbeat,
            "CONTENT_ERROR" => Action::ContentError,
            "CONTENT_END" => Action::ContentEnd,
            "AD_REQUEST" => Action::AdRequest,
            "AD_START" => Action::AdStart,
            "AD_PAUSE" => Action::AdPause,
            "AD_RESUME" => Action::AdResume,
            "AD_BUFFER_START" => Action::AdBufferStart,
            "AD_BUFFER_END" => Action::AdBufferEnd,
            "AD_SEEK_START" => Action::AdSeekStart,
            "AD_SEEK_END" => Action::AdSeekEnd,
            "AD_HEARTBEAT" => Action::AdHeartbeat,
            "AD_ERROR" => Action::AdError,
            "AD_END" => Action::AdEnd,
            "AD_BREAK_START" => Action::AdBreakStart,
            "AD_BREAK_END" => Action::AdBreakEnd,
            other => Action::Custom(other.to_string()),
        }
    }

    /// True for actions of the buffer start/end pair, either role.
    pub fn is_buffer_action(&self) -> bool {
        matches!(
            self,
            Action::ContentBufferStart
                | Action::ContentBufferEnd
                | Action::AdBufferStart
                | Action::AdBufferEnd
        )
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for Action {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Action::from_name(&name))
    }
}

/// Attribute value crossing the engine boundary
///
/// Only flat scalar values are allowed: string, 64-bit integer
/// (milliseconds or counts) and boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        AttributeValue::Integer(value as i64)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Boolean(value)
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::String(s) => write!(f, "{s}"),
            AttributeValue::Integer(n) => write!(f, "{n}"),
            AttributeValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// Attribute set attached to a dispatched event
pub type Attributes = HashMap<String, AttributeValue>;

/// A finished analytics event, as handed past the interception hook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique event ID
    pub id: Uuid,
    /// Wall-clock timestamp at emission
    pub timestamp: DateTime<Utc>,
    /// Per-tracker sequence number, 1-based
    pub sequence: u64,
    /// The action this event reports
    pub action: Action,
    /// Derived and caller-supplied attributes
    pub attributes: Attributes,
}

/// Static identity attributes attached to every event of a tracker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerInfo {
    /// Name of the tracker implementation (e.g. adapter crate name)
    pub tracker_name: Option<String>,
    /// Version of the tracker implementation
    pub tracker_version: Option<String>,
    /// Name of the underlying player
    pub player_name: Option<String>,
    /// Version of the underlying player
    pub player_version: Option<String>,
}
