//! # Plover Core
//!
//! Time-series utilities for tracking and state estimation:
//! - Timestamped state types (`State`, `GaussianState`, `GroundTruthState`)
//! - Ordered state sequences (`Track`, `GroundTruthPath`)
//! - Linear interpolation of a sequence at arbitrary times
//! - Inclusive time range generation
//!
//! Interpolation never extrapolates. Query times outside a sequence's span are
//! dropped with a `tracing` warning, and only state vectors are interpolated;
//! everything else on a synthesized state is copied from the state before it.

pub mod cursor;
pub mod error;
pub mod interpolate;
pub mod normalize;
pub mod sequence;
pub mod state;
pub mod time_range;

// Re-export core types
pub use cursor::PredecessorCursor;
pub use error::{InterpolateError, Result};
pub use interpolate::{interpolate_sequence, interpolate_state, resample, Resampled};
pub use normalize::{clip_times, ClippedTimes, Timeline};
pub use sequence::{GroundTruthPath, StateSequence, Track};
pub use state::{GaussianState, GroundTruthState, Metadata, State, TimestampedState};
pub use time_range::{time_range, time_range_secs, TimeRange};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
