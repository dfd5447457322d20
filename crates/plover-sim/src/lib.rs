//! Plover Simulation Library
//!
//! Generates synthetic ground truth and noisy estimate tracks, and scores how
//! well a resampled track matches its truth.

pub mod error;
pub mod metrics;
pub mod track;
pub mod truth;

// Re-export main types
pub use error::SimError;
pub use metrics::{resample_error, ResampleMetrics};
pub use track::{generate_track, TrackConfig};
pub use truth::{simulate_truth, TruthConfig, POSITION_INDICES};
