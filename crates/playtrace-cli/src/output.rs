//! Output formatting for CLI

use playtrace_core::EventRecord;

/// Print a batch of events, one JSON object per line (or pretty-printed),
/// returning how many were printed.
pub fn print_events(events: Vec<EventRecord>, pretty: bool) -> anyhow::Result<usize> {
    let count = events.len();
    for event in events {
        let rendered = if pretty {
            serde_json::to_string_pretty(&event)?
        } else {
            serde_json::to_string(&event)?
        };
        println!("{rendered}");
    }
    Ok(count)
}
