//! Playtrace Core - Playback Telemetry Engine
//!
//! This crate turns raw player lifecycle notifications (request, start,
//! pause, buffer start/end, seek start/end, heartbeat, error, end, ad
//! break start/end) into a stream of semantically enriched analytics
//! events:
//! - Facet-based playback state machine with guarded transitions
//! - Time-since milestone attributes, built-in and caller-registered
//! - Cumulative and per-event playtime accounting
//! - Buffer-cause classification (initial, connection, pause, seek, ad)
//! - Per-tracker view ids and lifetime counters
//! - Ad-break correlation between a content and an ad tracker
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Playtrace Core                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │   Playback   │  │  Time-Since  │  │   Playtime   │           │
//! │  │    State     │  │    Table     │  │ Accumulator  │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐       ┌──────────────┐       │
//! │                    │    Video    │───────│    Buffer    │       │
//! │                    │   Tracker   │       │  Classifier  │       │
//! │                    └──────┬──────┘       └──────────────┘       │
//! │                           │                                     │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐            │
//! │  │   Tracker    │  │ Interceptor │  │   Ad-Break   │            │
//! │  │   Registry   │  │    Hook     │  │    State     │            │
//! │  └──────────────┘  └─────────────┘  └──────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Trackers are not internally thread-safe: one logical producer (the
//! player callback stream) drives each tracker, and the registry hands
//! out `Arc<Mutex<VideoTracker>>` so callers serialize access. The only
//! state crossing between the content and ad tracker of a pair is the
//! shared [`AdBreakState`].

pub mod attributes;
pub mod classify;
pub mod error;
pub mod playtime;
pub mod registry;
pub mod state;
pub mod timing;
pub mod tracker;
pub mod types;

pub use classify::{BufferClassifier, BufferType};
pub use error::{Error, Result};
pub use registry::TrackerRegistry;
pub use state::PlaybackState;
pub use timing::{TimeSinceEntry, TimeSinceTable};
pub use tracker::{AdBreakState, EventInterceptor, VideoTracker};
pub use types::{
    Action, AttributeValue, Attributes, EventRecord, TrackerId, TrackerInfo, TrackerRole,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the engine library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "Playtrace Core initialized");
}
