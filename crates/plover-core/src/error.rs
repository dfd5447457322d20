use chrono::{DateTime, Utc};

/// Result alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, InterpolateError>;

/// Errors raised while interpolating a state sequence.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InterpolateError {
    #[error("Cannot interpolate an empty state sequence")]
    EmptySequence,

    #[error("All times are outside of the state sequence's time range ({min} -> {max})")]
    AllTimesOutOfRange {
        min: DateTime<Utc>,
        max: DateTime<Utc>,
    },

    /// The predecessor cursor ran past the last timeline entry.
    #[error("No timeline state follows {time}; the timeline is exhausted")]
    ExhaustedTimeline { time: DateTime<Utc> },

    #[error("State at {timestamp} has {actual} components, expected {expected}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        timestamp: DateTime<Utc>,
    },
}
