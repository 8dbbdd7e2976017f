//! Buffer-cause classification
//!
//! Labels each buffering interval with its semantic cause, derived purely
//! from the session's facets and the interval's ordinal position at the
//! moment buffering starts; no player signal is consulted. The label is
//! fixed at buffer start and reported unchanged on the matching buffer
//! end, so consumers can pair the two events.

use crate::state::PlaybackState;
use serde::{Deserialize, Serialize};

/// How many leading intervals classify as `initial`
const INITIAL_INTERVALS: u64 = 2;

/// Semantic cause of a buffering interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferType {
    /// Startup buffering at the beginning of playback
    Initial,
    /// Mid-playback stall caused by the connection
    Connection,
    /// Buffering while the session is paused
    Pause,
    /// Buffering caused by an in-flight seek
    Seek,
    /// Content buffering that covers an ad break
    Ad,
}

impl BufferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BufferType::Initial => "initial",
            BufferType::Connection => "connection",
            BufferType::Pause => "pause",
            BufferType::Seek => "seek",
            BufferType::Ad => "ad",
        }
    }
}

impl std::fmt::Display for BufferType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-session classifier state
#[derive(Debug, Default)]
pub struct BufferClassifier {
    completed_intervals: u64,
    pending: Option<BufferType>,
}

impl BufferClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the interval that is opening and hold the label until
    /// [`BufferClassifier::finish`]. Concurrent facets outrank the
    /// ordinal: ad break, then seeking, then paused; otherwise the first
    /// two intervals are `initial` and later ones `connection`.
    pub fn begin(&mut self, state: &PlaybackState, in_ad_break: bool) -> BufferType {
        let buffer_type = if in_ad_break {
            BufferType::Ad
        } else if state.is_seeking {
            BufferType::Seek
        } else if state.is_paused {
            BufferType::Pause
        } else if self.completed_intervals < INITIAL_INTERVALS {
            BufferType::Initial
        } else {
            BufferType::Connection
        };
        self.pending = Some(buffer_type);
        buffer_type
    }

    /// Label of the interval currently open, if any.
    pub fn current(&self) -> Option<BufferType> {
        self.pending
    }

    /// Close the interval: bump the ordinal and drop the held label.
    pub fn finish(&mut self) {
        self.completed_intervals += 1;
        self.pending = None;
    }

    /// Number of completed (start, end) pairs observed so far.
    pub fn completed_intervals(&self) -> u64 {
        self.completed_intervals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_state() -> PlaybackState {
        let mut state = PlaybackState::new();
        state.go_request();
        state.go_start();
        state
    }

    #[test]
    fn test_first_two_intervals_are_initial() {
        let mut classifier = BufferClassifier::new();
        let state = playing_state();

        assert_eq!(classifier.begin(&state, false), BufferType::Initial);
        classifier.finish();
        assert_eq!(classifier.begin(&state, false), BufferType::Initial);
        classifier.finish();
        assert_eq!(classifier.begin(&state, false), BufferType::Connection);
    }

    #[test]
    fn test_paused_interval_reads_pause() {
        let mut classifier = BufferClassifier::new();
        classifier.finish();
        classifier.finish();
        classifier.finish();

        let mut state = playing_state();
        state.go_pause();
        assert_eq!(classifier.begin(&state, false), BufferType::Pause);
    }

    #[test]
    fn test_seek_outranks_pause() {
        let mut classifier = BufferClassifier::new();
        let mut state = playing_state();
        state.go_pause();
        state.go_seek_start();
        assert_eq!(classifier.begin(&state, false), BufferType::Seek);
    }

    #[test]
    fn test_ad_break_outranks_everything() {
        let mut classifier = BufferClassifier::new();
        let mut state = playing_state();
        state.go_seek_start();
        assert_eq!(classifier.begin(&state, true), BufferType::Ad);
    }

    #[test]
    fn test_label_held_until_finish() {
        let mut classifier = BufferClassifier::new();
        let state = playing_state();

        assert_eq!(classifier.current(), None);
        classifier.begin(&state, false);
        assert_eq!(classifier.current(), Some(BufferType::Initial));
        classifier.finish();
        assert_eq!(classifier.current(), None);
        assert_eq!(classifier.completed_intervals(), 1);
    }

    #[test]
    fn test_facet_interval_still_counts_toward_ordinal() {
        let mut classifier = BufferClassifier::new();
        let mut state = playing_state();

        classifier.begin(&state, false);
        classifier.finish();

        state.go_pause();
        assert_eq!(classifier.begin(&state, false), BufferType::Pause);
        classifier.finish();
        state.go_resume();

        // Two pairs completed, so `initial` no longer applies
        assert_eq!(classifier.begin(&state, false), BufferType::Connection);
    }
}
