//! CLI command implementations

use crate::output;
use anyhow::Context;
use playtrace_core::{TrackerRegistry, VideoTracker};
use serde::Deserialize;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

/// Which tracker of the pair a step addresses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Target {
    #[default]
    Content,
    Ad,
}

/// One scenario step: an optional delay followed by an optional call.
///
/// Calls outside the recognized set are dispatched as custom actions,
/// mirroring the engine's unknown-action passthrough.
#[derive(Debug, Deserialize)]
struct Step {
    #[serde(default)]
    target: Target,
    #[serde(default)]
    wait_ms: Option<u64>,
    #[serde(default)]
    call: Option<String>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    /// Pair the content tracker with an ad tracker
    #[serde(default)]
    with_ads: bool,
    steps: Vec<Step>,
}

/// The recognized lifecycle calls
const CALLS: &[&str] = &[
    "player_ready",
    "request",
    "start",
    "pause",
    "resume",
    "buffer_start",
    "buffer_end",
    "seek_start",
    "seek_end",
    "heartbeat",
    "error",
    "end",
    "ad_break_start",
    "ad_break_end",
];

/// Replay a scenario file and print every emitted event.
pub fn replay(path: &Path, pretty: bool) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    let scenario: Scenario =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

    let mut registry = TrackerRegistry::new();
    let ad = scenario.with_ads.then(VideoTracker::ad);
    let id = registry.start(VideoTracker::content(), ad);

    let content = registry
        .content_tracker(id)
        .context("content tracker vanished")?;
    let ad = registry.ad_tracker(id);

    let mut emitted = 0usize;
    for (index, step) in scenario.steps.iter().enumerate() {
        if let Some(wait_ms) = step.wait_ms {
            sleep(Duration::from_millis(wait_ms));
        }

        let Some(call) = &step.call else { continue };

        let handle = match step.target {
            Target::Content => &content,
            Target::Ad => ad
                .as_ref()
                .with_context(|| format!("step {index}: scenario has no ad tracker"))?,
        };
        let mut tracker = handle.lock().expect("tracker lock poisoned");

        match call.as_str() {
            "player_ready" => tracker.set_player_ready(),
            "request" => tracker.send_request(),
            "start" => tracker.send_start(),
            "pause" => tracker.send_pause(),
            "resume" => tracker.send_resume(),
            "buffer_start" => tracker.send_buffer_start(),
            "buffer_end" => tracker.send_buffer_end(),
            "seek_start" => tracker.send_seek_start(),
            "seek_end" => tracker.send_seek_end(),
            "heartbeat" => tracker.send_heartbeat(),
            "end" => tracker.send_end(),
            "ad_break_start" => tracker.send_ad_break_start(),
            "ad_break_end" => tracker.send_ad_break_end(),
            "error" => tracker.send_error(
                step.code.unwrap_or(0),
                step.message.as_deref().unwrap_or("<unknown error>"),
            ),
            other => tracker.send_custom(other),
        }

        emitted += output::print_events(tracker.take_events(), pretty)?;
    }

    registry.release(id)?;
    emitted += output::print_events(content.lock().expect("tracker lock poisoned").take_events(), pretty)?;
    if let Some(ad) = &ad {
        emitted += output::print_events(ad.lock().expect("tracker lock poisoned").take_events(), pretty)?;
    }

    eprintln!("replayed {} steps, {} events", scenario.steps.len(), emitted);
    Ok(())
}

/// Print the lifecycle vocabulary.
pub fn list_calls() {
    println!("Recognized lifecycle calls:");
    for call in CALLS {
        println!("  {call}");
    }
    println!("\nAny other call name is dispatched as a custom action.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_parses() {
        let raw = r#"{
            "with_ads": true,
            "steps": [
                { "call": "player_ready" },
                { "call": "request" },
                { "wait_ms": 10 },
                { "call": "start" },
                { "target": "ad", "call": "ad_break_start" },
                { "call": "error", "code": 404, "message": "gone" },
                { "call": "MY_MARKER" },
                { "call": "end" }
            ]
        }"#;
        let scenario: Scenario = serde_json::from_str(raw).unwrap();
        assert!(scenario.with_ads);
        assert_eq!(scenario.steps.len(), 8);
        assert_eq!(scenario.steps[4].target, Target::Ad);
        assert_eq!(scenario.steps[5].code, Some(404));
    }
}
