//! Playtime accumulation
//!
//! Integrates the time a session spends actually playing. The accumulator
//! is "armed" exactly while playing time should accrue; every event
//! emission ticks it, folding the elapsed interval into the running total
//! when armed. `total_ms` at any event therefore equals the sum of every
//! `since_last_ms` reported so far.

use std::time::Instant;

/// Running playtime state for one session
#[derive(Debug, Default)]
pub struct PlaytimeAccumulator {
    checkpoint: Option<Instant>,
    total_ms: u64,
    since_last_ms: u64,
}

impl PlaytimeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Integrate playtime up to now. Called once per emitted event,
    /// before attributes are assembled.
    pub fn tick(&mut self) {
        match self.checkpoint {
            Some(checkpoint) => {
                let elapsed = checkpoint.elapsed().as_millis() as u64;
                self.since_last_ms = elapsed;
                self.total_ms += elapsed;
                self.checkpoint = Some(Instant::now());
            }
            None => {
                self.since_last_ms = 0;
            }
        }
    }

    /// Start accruing playtime from now.
    pub fn arm(&mut self) {
        self.checkpoint = Some(Instant::now());
    }

    /// Stop accruing playtime.
    pub fn disarm(&mut self) {
        self.checkpoint = None;
    }

    /// Forget the session's accumulated playtime. Used when an attempt
    /// ends, after its final event has reported the totals.
    pub fn reset(&mut self) {
        self.checkpoint = None;
        self.total_ms = 0;
        self.since_last_ms = 0;
    }

    /// Cumulative playtime in milliseconds as of the last tick.
    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    /// Playtime accrued between the two most recent ticks.
    pub fn since_last_ms(&self) -> u64 {
        self.since_last_ms
    }
}
