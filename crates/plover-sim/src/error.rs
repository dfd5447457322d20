use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, SimError>;

/// Configurations the simulator refuses to run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("{name} must be a finite positive number, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("a {duration_s} s run starting at {start} ends outside the representable time range")]
    TimeOverflow {
        start: DateTime<Utc>,
        duration_s: f64,
    },

    #[error("{duration_s} s at a {mean_interval_s} s mean interval needs ~{expected:.0} samples (limit {limit})")]
    TooManySamples {
        duration_s: f64,
        mean_interval_s: f64,
        expected: f64,
        limit: usize,
    },
}
