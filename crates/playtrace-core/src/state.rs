//! Playback state machine
//!
//! The state of a tracked session is a set of independent facets rather
//! than one exclusive enum: `playing`, `paused`, `buffering` and `seeking`
//! can overlap (buffering while paused is legal), with the single
//! exception that `playing` and `paused` toggle against each other on
//! pause/resume. Each transition is guarded: a call that finds its facet
//! already in the target value returns `false` and has no side effect.

use serde::{Deserialize, Serialize};

/// Facet state of a single tracked session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Player attached and ready
    pub is_player_ready: bool,
    /// A playback attempt is underway (request seen, end not yet seen)
    pub is_requested: bool,
    /// First frame has been played this attempt
    pub is_started: bool,
    /// Actively playing
    pub is_playing: bool,
    /// Paused by the user
    pub is_paused: bool,
    /// Inside a seek interval
    pub is_seeking: bool,
    /// Inside a buffering interval
    pub is_buffering: bool,
    /// Inside an ad break (ad trackers only)
    pub is_ad_break: bool,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every facet.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Player attached: `player ready` facet goes up once.
    pub fn go_player_ready(&mut self) -> bool {
        if self.is_player_ready {
            return false;
        }
        self.is_player_ready = true;
        true
    }

    /// A new playback attempt begins.
    pub fn go_request(&mut self) -> bool {
        if self.is_requested {
            return false;
        }
        self.is_requested = true;
        true
    }

    /// Playback of the requested video starts.
    pub fn go_start(&mut self) -> bool {
        if !self.is_requested || self.is_started {
            return false;
        }
        self.is_started = true;
        self.is_playing = true;
        true
    }

    /// Playback pauses; mutually exclusive with `playing`.
    pub fn go_pause(&mut self) -> bool {
        if !self.is_started || self.is_paused {
            return false;
        }
        self.is_paused = true;
        self.is_playing = false;
        true
    }

    /// Playback resumes from pause.
    pub fn go_resume(&mut self) -> bool {
        if !self.is_started || !self.is_paused {
            return false;
        }
        self.is_paused = false;
        self.is_playing = true;
        true
    }

    /// A buffering interval opens.
    pub fn go_buffer_start(&mut self) -> bool {
        if !self.is_requested || self.is_buffering {
            return false;
        }
        self.is_buffering = true;
        self.is_playing = false;
        true
    }

    /// The buffering interval closes.
    pub fn go_buffer_end(&mut self) -> bool {
        if !self.is_requested || !self.is_buffering {
            return false;
        }
        self.is_buffering = false;
        self.is_playing = true;
        true
    }

    /// A seek interval opens.
    pub fn go_seek_start(&mut self) -> bool {
        if !self.is_started || self.is_seeking {
            return false;
        }
        self.is_seeking = true;
        self.is_playing = false;
        true
    }

    /// The seek interval closes.
    pub fn go_seek_end(&mut self) -> bool {
        if !self.is_started || !self.is_seeking {
            return false;
        }
        self.is_seeking = false;
        self.is_playing = true;
        true
    }

    /// The playback attempt ends; all playback facets clear, the tracker
    /// stays usable for the next request.
    pub fn go_end(&mut self) -> bool {
        if !self.is_requested {
            return false;
        }
        self.is_requested = false;
        self.is_started = false;
        self.is_playing = false;
        self.is_paused = false;
        self.is_seeking = false;
        self.is_buffering = false;
        true
    }

    /// An ad break opens.
    pub fn go_ad_break_start(&mut self) -> bool {
        if self.is_ad_break {
            return false;
        }
        self.is_ad_break = true;
        true
    }

    /// The ad break closes; any mid-flight ad request is abandoned.
    pub fn go_ad_break_end(&mut self) -> bool {
        if !self.is_ad_break {
            return false;
        }
        self.is_ad_break = false;
        self.is_requested = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_facets() {
        let mut state = PlaybackState::new();

        assert!(state.go_player_ready());
        assert!(state.is_player_ready);

        assert!(state.go_request());
        assert!(state.is_requested);

        assert!(state.go_start());
        assert!(state.is_started && state.is_playing);

        assert!(state.go_pause());
        assert!(state.is_paused && !state.is_playing);

        assert!(state.go_resume());
        assert!(state.is_playing && !state.is_paused);

        assert!(state.go_buffer_start());
        assert!(state.is_buffering);
        assert!(state.go_buffer_end());
        assert!(!state.is_buffering);

        assert!(state.go_seek_start());
        assert!(state.is_seeking);
        assert!(state.go_seek_end());
        assert!(!state.is_seeking);

        assert!(state.go_end());
        assert!(!state.is_started && !state.is_playing && !state.is_requested);
        // Player readiness survives the end of an attempt
        assert!(state.is_player_ready);
    }

    #[test]
    fn test_reentrant_calls_are_rejected() {
        let mut state = PlaybackState::new();
        state.go_request();
        state.go_start();

        assert!(state.go_pause());
        assert!(!state.go_pause());

        assert!(state.go_resume());
        assert!(!state.go_resume());

        assert!(state.go_buffer_start());
        assert!(!state.go_buffer_start());
        assert!(state.go_buffer_end());
        assert!(!state.go_buffer_end());
    }

    #[test]
    fn test_start_requires_request() {
        let mut state = PlaybackState::new();
        assert!(!state.go_start());
        assert!(!state.go_pause());
        assert!(!state.go_seek_start());

        state.go_request();
        assert!(state.go_start());
    }

    #[test]
    fn test_buffering_while_paused_coexists() {
        let mut state = PlaybackState::new();
        state.go_request();
        state.go_start();
        state.go_pause();

        assert!(state.go_buffer_start());
        assert!(state.is_buffering && state.is_paused);
        // Buffer end flips playing back on; resume then clears paused
        assert!(state.go_buffer_end());
        assert!(state.go_resume());
        assert!(state.is_playing && !state.is_paused && !state.is_buffering);
    }

    #[test]
    fn test_end_allows_new_request() {
        let mut state = PlaybackState::new();
        state.go_request();
        state.go_start();
        assert!(state.go_end());
        assert!(!state.go_end());

        assert!(state.go_request());
        assert!(state.go_start());
    }

    #[test]
    fn test_ad_break_facet() {
        let mut state = PlaybackState::new();
        assert!(state.go_ad_break_start());
        assert!(!state.go_ad_break_start());
        state.go_request();
        assert!(state.go_ad_break_end());
        // Ad-break end abandons the in-flight ad request
        assert!(!state.is_requested);
        assert!(!state.go_ad_break_end());
    }
}
