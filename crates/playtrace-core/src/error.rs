//! Error types for Playtrace Core

use crate::types::TrackerId;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Engine error types
///
/// Lifecycle noise (a resume without a pause, a repeated buffer start) is
/// not an error: the state machine absorbs it as a no-op. Errors exist
/// only at the API boundary.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid action filter pattern: {pattern}")]
    InvalidFilter {
        pattern: String,
        source: regex::Error,
    },

    #[error("No tracker registered under id {0}")]
    TrackerNotFound(TrackerId),
}
