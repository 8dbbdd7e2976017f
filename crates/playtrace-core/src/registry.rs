//! Tracker registry
//!
//! Owns tracker pairs (content plus optional ad tracker) by id, wires the
//! shared ad-break state into both halves of a pair, and guarantees that
//! releasing a tracker mid-view closes the session with exactly one
//! terminal end event.

use crate::error::{Error, Result};
use crate::tracker::VideoTracker;
use crate::types::{TrackerId, TrackerRole};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

struct TrackerPair {
    content: Arc<Mutex<VideoTracker>>,
    ad: Option<Arc<Mutex<VideoTracker>>>,
}

/// Registry of live tracker pairs
pub struct TrackerRegistry {
    session_id: Uuid,
    next_id: u64,
    pairs: HashMap<TrackerId, TrackerPair>,
}

impl TrackerRegistry {
    pub fn new() -> Self {
        let session_id = Uuid::new_v4();
        debug!(%session_id, "tracker registry created");
        Self {
            session_id,
            next_id: 0,
            pairs: HashMap::new(),
        }
    }

    /// Registry-wide session id.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Register a content tracker, optionally paired with an ad tracker.
    ///
    /// When an ad tracker is present both trackers are switched onto one
    /// shared ad-break state, which is the only state they exchange. Each
    /// tracker announces itself with a TRACKER_READY event.
    pub fn start(
        &mut self,
        mut content: VideoTracker,
        ad: Option<VideoTracker>,
    ) -> TrackerId {
        let id = TrackerId(self.next_id);
        self.next_id += 1;

        if content.role() != TrackerRole::Content {
            warn!(tracker_id = %id, "content slot registered with an ad-role tracker");
        }

        let ad = ad.map(|ad_tracker| {
            if ad_tracker.role() != TrackerRole::Ad {
                warn!(tracker_id = %id, "ad slot registered with a content-role tracker");
            }
            content.attach_ad_break_state(ad_tracker.ad_break_state());
            ad_tracker
        });

        content.tracker_ready();
        let ad = ad.map(|mut ad_tracker| {
            ad_tracker.tracker_ready();
            Arc::new(Mutex::new(ad_tracker))
        });

        debug!(tracker_id = %id, paired = ad.is_some(), "tracker pair started");
        self.pairs.insert(
            id,
            TrackerPair {
                content: Arc::new(Mutex::new(content)),
                ad,
            },
        );
        id
    }

    /// Content tracker of a pair, if still registered.
    pub fn content_tracker(&self, id: TrackerId) -> Option<Arc<Mutex<VideoTracker>>> {
        self.pairs.get(&id).map(|pair| Arc::clone(&pair.content))
    }

    /// Ad tracker of a pair, if one was registered.
    pub fn ad_tracker(&self, id: TrackerId) -> Option<Arc<Mutex<VideoTracker>>> {
        self.pairs
            .get(&id)
            .and_then(|pair| pair.ad.as_ref().map(Arc::clone))
    }

    /// Release a pair. Any tracker still mid-view gets a synthesized
    /// terminal end so every session closes with exactly one end event;
    /// an ad tracker also closes a dangling ad break.
    pub fn release(&mut self, id: TrackerId) -> Result<()> {
        let pair = self.pairs.remove(&id).ok_or(Error::TrackerNotFound(id))?;

        if let Some(ad) = &pair.ad {
            let mut ad = ad.lock().expect("ad tracker lock poisoned");
            if ad.state().is_requested {
                debug!(tracker_id = %id, "synthesizing terminal end for ad tracker");
                ad.send_end();
            }
            if ad.state().is_ad_break {
                ad.send_ad_break_end();
            }
        }

        let mut content = pair.content.lock().expect("content tracker lock poisoned");
        if content.state().is_requested {
            debug!(tracker_id = %id, "synthesizing terminal end for content tracker");
            content.send_end();
        }

        debug!(tracker_id = %id, "tracker pair released");
        Ok(())
    }

    /// Number of live pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Default for TrackerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Action;

    #[test]
    fn test_start_assigns_distinct_ids() {
        let mut registry = TrackerRegistry::new();
        let a = registry.start(VideoTracker::content(), None);
        let b = registry.start(VideoTracker::content(), None);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_tracker_ready_emitted_on_start() {
        let mut registry = TrackerRegistry::new();
        let id = registry.start(VideoTracker::content(), Some(VideoTracker::ad()));

        let content = registry.content_tracker(id).unwrap();
        let events = content.lock().unwrap().take_events();
        assert_eq!(events[0].action, Action::TrackerReady);

        let ad = registry.ad_tracker(id).unwrap();
        let events = ad.lock().unwrap().take_events();
        assert_eq!(events[0].action, Action::TrackerReady);
    }

    #[test]
    fn test_lookup_absent_after_release() {
        let mut registry = TrackerRegistry::new();
        let id = registry.start(VideoTracker::content(), None);
        assert!(registry.content_tracker(id).is_some());

        registry.release(id).unwrap();
        assert!(registry.content_tracker(id).is_none());
        assert!(registry.ad_tracker(id).is_none());
    }

    #[test]
    fn test_release_unknown_id_fails() {
        let mut registry = TrackerRegistry::new();
        let err = registry.release(TrackerId(99)).unwrap_err();
        assert!(matches!(err, Error::TrackerNotFound(TrackerId(99))));
    }

    #[test]
    fn test_release_mid_view_synthesizes_end() {
        let mut registry = TrackerRegistry::new();
        let id = registry.start(VideoTracker::content(), None);

        let handle = registry.content_tracker(id).unwrap();
        {
            let mut tracker = handle.lock().unwrap();
            tracker.send_request();
            tracker.send_start();
        }

        registry.release(id).unwrap();

        let mut tracker = handle.lock().unwrap();
        let names: Vec<_> = tracker
            .take_events()
            .into_iter()
            .map(|e| e.action.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["TRACKER_READY", "CONTENT_REQUEST", "CONTENT_START", "CONTENT_END"]
        );
        assert!(!tracker.state().is_requested);
    }

    #[test]
    fn test_release_after_clean_end_adds_nothing() {
        let mut registry = TrackerRegistry::new();
        let id = registry.start(VideoTracker::content(), None);

        let handle = registry.content_tracker(id).unwrap();
        {
            let mut tracker = handle.lock().unwrap();
            tracker.send_request();
            tracker.send_start();
            tracker.send_end();
            tracker.take_events();
        }

        registry.release(id).unwrap();
        assert!(handle.lock().unwrap().take_events().is_empty());
    }

    #[test]
    fn test_pair_shares_ad_break_state() {
        let mut registry = TrackerRegistry::new();
        let id = registry.start(VideoTracker::content(), Some(VideoTracker::ad()));

        let ad = registry.ad_tracker(id).unwrap();
        ad.lock().unwrap().send_ad_break_start();

        // The content tracker sees the open break through the shared state
        let content = registry.content_tracker(id).unwrap();
        let mut content = content.lock().unwrap();
        content.send_request();
        content.send_buffer_start();

        let events = content.take_events();
        let buffer_start = events
            .iter()
            .find(|e| e.action == Action::ContentBufferStart)
            .unwrap();
        assert_eq!(buffer_start.attributes["bufferType"].as_str(), Some("ad"));
    }
}
