//! Video tracker - lifecycle dispatch and attribute assembly
//!
//! One `VideoTracker` follows one sub-session (content or ad). Lifecycle
//! calls drive the facet state machine, and every accepted call flows
//! through a single dispatch point that assembles the event's attribute
//! set (identity, counters, playtime, buffer cause, milestone timings),
//! offers it to the interception hook, and appends the finished record to
//! the tracker's event buffer.
//!
//! A tracker is not internally thread-safe: callers serialize lifecycle
//! calls into one instance. The only state shared between the two
//! trackers of a pair is the ad-break correlation block, which is behind
//! its own lock.

use crate::attributes::CustomAttributes;
use crate::classify::BufferClassifier;
use crate::error::Result;
use crate::playtime::PlaytimeAccumulator;
use crate::state::PlaybackState;
use crate::timing::{ad_table, content_table, TimeSinceTable};
use crate::types::{Action, Attributes, EventRecord, TrackerInfo, TrackerRole};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

/// Hook invoked once per emitted event, before delivery
///
/// The hook may audit or rewrite the attribute set; returning `true`
/// suppresses delivery. State transitions have already been applied by
/// the time the hook runs, so suppression only drops the outgoing record.
pub trait EventInterceptor {
    fn on_before_send(&mut self, action: &Action, attributes: &mut Attributes) -> bool;
}

impl<F> EventInterceptor for F
where
    F: FnMut(&Action, &mut Attributes) -> bool,
{
    fn on_before_send(&mut self, action: &Action, attributes: &mut Attributes) -> bool {
        self(action, attributes)
    }
}

/// Ad-break correlation state shared by the trackers of a pair
///
/// The content tracker only reads it (buffer classification, ad counters
/// on its attributes); the ad tracker writes it. Access is serialized by
/// the embedded lock, independently of how the two trackers themselves
/// are driven.
#[derive(Debug, Default)]
pub struct AdBreakState {
    /// An ad break is currently open
    pub break_active: bool,
    /// Ads started over the pair's lifetime
    pub number_of_ads: u64,
    /// Accumulated ad playtime of the current break, ms
    pub total_ad_playtime_ms: u64,
    /// When the most recent ad finished
    pub last_ad_ended_at: Option<Instant>,
}

/// Telemetry tracker for a single playback sub-session
pub struct VideoTracker {
    role: TrackerRole,
    info: TrackerInfo,
    state: PlaybackState,
    playtime: PlaytimeAccumulator,
    time_since: TimeSinceTable,
    classifier: BufferClassifier,
    custom: CustomAttributes,
    ad_break: Arc<Mutex<AdBreakState>>,
    view_session: Uuid,
    view_index: u64,
    number_of_videos: u64,
    number_of_errors: u64,
    interceptor: Option<Box<dyn EventInterceptor + Send>>,
    events: Vec<EventRecord>,
    sequence: u64,
}

impl VideoTracker {
    /// Create a tracker for the given role.
    pub fn new(role: TrackerRole) -> Self {
        let time_since = match role {
            TrackerRole::Content => content_table(),
            TrackerRole::Ad => ad_table(),
        };
        Self {
            role,
            info: TrackerInfo::default(),
            state: PlaybackState::new(),
            playtime: PlaytimeAccumulator::new(),
            time_since,
            classifier: BufferClassifier::new(),
            custom: CustomAttributes::new(),
            ad_break: Arc::new(Mutex::new(AdBreakState::default())),
            view_session: Uuid::new_v4(),
            view_index: 0,
            number_of_videos: 0,
            number_of_errors: 0,
            interceptor: None,
            events: Vec::new(),
            sequence: 0,
        }
    }

    /// Create a content tracker.
    pub fn content() -> Self {
        Self::new(TrackerRole::Content)
    }

    /// Create an ad tracker.
    pub fn ad() -> Self {
        Self::new(TrackerRole::Ad)
    }

    /// Attach static identity attributes.
    pub fn with_info(mut self, info: TrackerInfo) -> Self {
        self.info = info;
        self
    }

    /// Install the interception hook.
    pub fn set_interceptor(&mut self, interceptor: impl EventInterceptor + Send + 'static) {
        self.interceptor = Some(Box::new(interceptor));
    }

    pub fn role(&self) -> TrackerRole {
        self.role
    }

    /// Current facet state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// View session id, stable for the tracker's lifetime.
    pub fn view_session(&self) -> Uuid {
        self.view_session
    }

    /// Identifier of the current playback attempt. A fresh value is
    /// assigned on every accepted request and never reused.
    pub fn view_id(&self) -> String {
        format!("{}-{}", self.view_session, self.view_index)
    }

    /// Videos completed over the tracker's lifetime.
    pub fn number_of_videos(&self) -> u64 {
        self.number_of_videos
    }

    /// Errors observed over the tracker's lifetime.
    pub fn number_of_errors(&self) -> u64 {
        self.number_of_errors
    }

    /// Drain the buffered events.
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    /// Events emitted and not yet drained.
    pub fn pending_events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Set a custom attribute for every event.
    pub fn set_attribute(&mut self, key: &str, value: impl Into<crate::types::AttributeValue>) {
        self.custom.set(key, value);
    }

    /// Set a custom attribute for events whose action name matches the
    /// regex `filter`.
    pub fn set_attribute_for(
        &mut self,
        key: &str,
        value: impl Into<crate::types::AttributeValue>,
        filter: &str,
    ) -> Result<()> {
        self.custom.set_filtered(key, value, filter)
    }

    /// Register a custom time-since pair: recording `trigger` arms a
    /// timestamp, and the first later action matching `filter` receives
    /// `attribute` with the elapsed milliseconds.
    pub fn add_time_since_entry(
        &mut self,
        trigger: &str,
        attribute: &str,
        filter: &str,
    ) -> Result<()> {
        self.time_since.add_entry(trigger, attribute, filter)
    }

    pub(crate) fn attach_ad_break_state(&mut self, shared: Arc<Mutex<AdBreakState>>) {
        self.ad_break = shared;
    }

    pub(crate) fn ad_break_state(&self) -> Arc<Mutex<AdBreakState>> {
        Arc::clone(&self.ad_break)
    }

    /// Announce the tracker itself; emitted once by the registry when the
    /// tracker is started.
    pub fn tracker_ready(&mut self) {
        self.dispatch(Action::TrackerReady, Attributes::new());
    }

    /// Player attached. The readiness event is emitted exactly once.
    pub fn set_player_ready(&mut self) {
        if self.state.is_player_ready {
            debug!(role = ?self.role, "player already ready");
            return;
        }
        self.dispatch(Action::PlayerReady, Attributes::new());
        self.state.go_player_ready();
    }

    /// A playback attempt is requested; assigns a fresh view id.
    pub fn send_request(&mut self) {
        if !self.state.go_request() {
            debug!(role = ?self.role, "request ignored, attempt already underway");
            return;
        }
        self.view_index += 1;
        self.playtime.disarm();
        let action = self.pick(Action::ContentRequest, Action::AdRequest);
        self.dispatch(action, Attributes::new());
    }

    /// Playback starts. For an ad tracker this also counts the ad toward
    /// the pair's running total.
    pub fn send_start(&mut self) {
        if !self.state.go_start() {
            debug!(role = ?self.role, "start ignored");
            return;
        }
        if self.role == TrackerRole::Ad {
            self.ad_break_guard().number_of_ads += 1;
        }
        let action = self.pick(Action::ContentStart, Action::AdStart);
        self.dispatch(action, Attributes::new());
        self.playtime.arm();
    }

    /// Playback pauses.
    pub fn send_pause(&mut self) {
        if !self.state.go_pause() {
            debug!(role = ?self.role, "pause ignored");
            return;
        }
        let action = self.pick(Action::ContentPause, Action::AdPause);
        self.dispatch(action, Attributes::new());
        self.playtime.disarm();
    }

    /// Playback resumes from pause.
    pub fn send_resume(&mut self) {
        if !self.state.go_resume() {
            debug!(role = ?self.role, "resume ignored");
            return;
        }
        let action = self.pick(Action::ContentResume, Action::AdResume);
        self.dispatch(action, Attributes::new());
        if !self.state.is_buffering && !self.state.is_seeking {
            self.playtime.arm();
        }
    }

    /// A buffering interval opens; its cause is classified here and held
    /// for the matching buffer end.
    pub fn send_buffer_start(&mut self) {
        if !self.state.go_buffer_start() {
            debug!(role = ?self.role, "buffer start ignored");
            return;
        }
        let in_ad_break =
            self.role == TrackerRole::Content && self.ad_break_guard().break_active;
        let buffer_type = self.classifier.begin(&self.state, in_ad_break);
        debug!(buffer_type = %buffer_type, "buffering interval opened");
        let action = self.pick(Action::ContentBufferStart, Action::AdBufferStart);
        self.dispatch(action, Attributes::new());
        self.playtime.disarm();
    }

    /// The buffering interval closes, reporting the same cause as its
    /// start.
    pub fn send_buffer_end(&mut self) {
        if !self.state.go_buffer_end() {
            debug!(role = ?self.role, "buffer end ignored");
            return;
        }
        let action = self.pick(Action::ContentBufferEnd, Action::AdBufferEnd);
        self.dispatch(action, Attributes::new());
        if !self.state.is_seeking && !self.state.is_paused {
            self.playtime.arm();
        }
        self.classifier.finish();
    }

    /// A seek interval opens.
    pub fn send_seek_start(&mut self) {
        if !self.state.go_seek_start() {
            debug!(role = ?self.role, "seek start ignored");
            return;
        }
        let action = self.pick(Action::ContentSeekStart, Action::AdSeekStart);
        self.dispatch(action, Attributes::new());
        self.playtime.disarm();
    }

    /// The seek interval closes.
    pub fn send_seek_end(&mut self) {
        if !self.state.go_seek_end() {
            debug!(role = ?self.role, "seek end ignored");
            return;
        }
        let action = self.pick(Action::ContentSeekEnd, Action::AdSeekEnd);
        self.dispatch(action, Attributes::new());
        if !self.state.is_buffering && !self.state.is_paused {
            self.playtime.arm();
        }
    }

    /// Periodic heartbeat, driven by the caller. Meaningful only once
    /// playback has started.
    pub fn send_heartbeat(&mut self) {
        if !self.state.is_started {
            debug!(role = ?self.role, "heartbeat ignored before start");
            return;
        }
        let action = self.pick(Action::ContentHeartbeat, Action::AdHeartbeat);
        self.dispatch(action, Attributes::new());
    }

    /// The playback attempt ends. The END event carries the final
    /// playtime totals and the bumped completed-video count; afterwards
    /// the per-attempt playtime resets for the next request.
    pub fn send_end(&mut self) {
        if !self.state.go_end() {
            debug!(role = ?self.role, "end ignored");
            return;
        }
        self.number_of_videos += 1;
        let action = self.pick(Action::ContentEnd, Action::AdEnd);
        self.dispatch(action, Attributes::new());
        if self.role == TrackerRole::Ad {
            let total = self.playtime.total_ms();
            let mut ad_break = self.ad_break_guard();
            ad_break.total_ad_playtime_ms += total;
            ad_break.last_ad_ended_at = Some(Instant::now());
        }
        self.playtime.reset();
    }

    /// Report a playback error. Counts toward the lifetime error counter;
    /// no facet changes.
    pub fn send_error(&mut self, code: i64, message: &str) {
        self.number_of_errors += 1;
        let mut extra = Attributes::new();
        extra.insert("errorCode".to_string(), code.into());
        extra.insert("errorMessage".to_string(), message.into());
        let action = self.pick(Action::ContentError, Action::AdError);
        self.dispatch(action, extra);
    }

    /// An ad break opens. Ad trackers only; resets the break's playtime
    /// accumulator.
    pub fn send_ad_break_start(&mut self) {
        if self.role != TrackerRole::Ad {
            warn!("ad break start sent to a content tracker");
            return;
        }
        if !self.state.go_ad_break_start() {
            debug!("ad break start ignored, break already open");
            return;
        }
        {
            let mut ad_break = self.ad_break_guard();
            ad_break.break_active = true;
            ad_break.total_ad_playtime_ms = 0;
        }
        self.dispatch(Action::AdBreakStart, Attributes::new());
    }

    /// The ad break closes, reporting the break's elapsed time and the
    /// accumulated ad playtime.
    pub fn send_ad_break_end(&mut self) {
        if self.role != TrackerRole::Ad {
            warn!("ad break end sent to a content tracker");
            return;
        }
        if !self.state.go_ad_break_end() {
            debug!("ad break end ignored, no break open");
            return;
        }
        self.ad_break_guard().break_active = false;
        self.dispatch(Action::AdBreakEnd, Attributes::new());
    }

    /// Dispatch a caller-defined action. No playback facet is touched;
    /// the event still receives the full derived attribute set and can
    /// trigger or consume custom time-since entries.
    pub fn send_custom(&mut self, name: &str) {
        self.send_custom_with(name, Attributes::new());
    }

    /// Dispatch a caller-defined action with extra attributes.
    pub fn send_custom_with(&mut self, name: &str, attributes: Attributes) {
        self.dispatch(Action::Custom(name.to_string()), attributes);
    }

    fn pick(&self, content: Action, ad: Action) -> Action {
        match self.role {
            TrackerRole::Content => content,
            TrackerRole::Ad => ad,
        }
    }

    fn ad_break_guard(&self) -> MutexGuard<'_, AdBreakState> {
        self.ad_break.lock().expect("ad break state lock poisoned")
    }

    /// The single choke point every outward-bound event passes through.
    fn dispatch(&mut self, action: Action, extra: Attributes) {
        self.playtime.tick();

        let mut attributes = extra;
        self.custom.apply(action.name(), &mut attributes);
        self.assemble(&action, &mut attributes);
        self.time_since.apply(action.name(), &mut attributes);

        debug!(action = %action, attributes = attributes.len(), "dispatch");

        if let Some(interceptor) = self.interceptor.as_mut() {
            if interceptor.on_before_send(&action, &mut attributes) {
                debug!(action = %action, "event suppressed by interceptor");
                return;
            }
        }

        self.sequence += 1;
        self.events.push(EventRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            sequence: self.sequence,
            action,
            attributes,
        });
    }

    /// Derived and identity attributes for one action.
    fn assemble(&self, action: &Action, attributes: &mut Attributes) {
        if let Some(name) = &self.info.tracker_name {
            attributes.insert("trackerName".to_string(), name.as_str().into());
        }
        if let Some(version) = &self.info.tracker_version {
            attributes.insert("trackerVersion".to_string(), version.as_str().into());
        }
        if let Some(name) = &self.info.player_name {
            attributes.insert("playerName".to_string(), name.as_str().into());
        }
        if let Some(version) = &self.info.player_version {
            attributes.insert("playerVersion".to_string(), version.as_str().into());
        }

        attributes.insert("viewSession".to_string(), self.view_session.to_string().into());
        attributes.insert("viewId".to_string(), self.view_id().into());
        attributes.insert("numberOfVideos".to_string(), self.number_of_videos.into());
        attributes.insert("numberOfErrors".to_string(), self.number_of_errors.into());
        attributes.insert("totalPlaytime".to_string(), self.playtime.total_ms().into());
        attributes.insert(
            "playtimeSinceLastEvent".to_string(),
            self.playtime.since_last_ms().into(),
        );

        let (number_of_ads, total_ad_playtime, last_ad_ended_at) = {
            let ad_break = self.ad_break_guard();
            (
                ad_break.number_of_ads,
                ad_break.total_ad_playtime_ms,
                ad_break.last_ad_ended_at,
            )
        };
        attributes.insert("numberOfAds".to_string(), number_of_ads.into());

        if matches!(action, Action::ContentStart | Action::AdBreakEnd) {
            attributes.insert("totalAdPlaytime".to_string(), total_ad_playtime.into());
        }

        if self.role == TrackerRole::Content && action.name().starts_with("CONTENT_") {
            if let Some(ended_at) = last_ad_ended_at {
                let elapsed_ms = ended_at.elapsed().as_millis() as i64;
                attributes.insert("timeSinceLastAd".to_string(), elapsed_ms.into());
            }
        }

        if action.is_buffer_action() {
            if let Some(buffer_type) = self.classifier.current() {
                attributes.insert("bufferType".to_string(), buffer_type.as_str().into());
            }
        }
    }
}

impl std::fmt::Debug for VideoTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoTracker")
            .field("role", &self.role)
            .field("state", &self.state)
            .field("view_id", &self.view_id())
            .field("pending_events", &self.events.len())
            .finish()
    }
}
