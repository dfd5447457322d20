use chrono::{DateTime, Utc};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form string attributes attached to a state or a track entry.
pub type Metadata = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// A state vector pinned to a point in time.
///
/// Anything beyond the timestamp and the vector (covariance, labels, ...) is
/// opaque to interpolation. [`with_override`](TimestampedState::with_override)
/// is the only way new states are synthesized: it keeps every other attribute
/// of `self` and swaps in the new time and vector.
pub trait TimestampedState: Clone {
    fn timestamp(&self) -> DateTime<Utc>;

    fn state_vector(&self) -> &DVector<f64>;

    fn with_override(&self, timestamp: DateTime<Utc>, state_vector: DVector<f64>) -> Self;

    /// Number of components in the state vector.
    fn ndim(&self) -> usize {
        self.state_vector().len()
    }
}

// ---------------------------------------------------------------------------
// Plain state
// ---------------------------------------------------------------------------
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub timestamp: DateTime<Utc>,
    pub state_vector: DVector<f64>,
}

impl State {
    pub fn new(timestamp: DateTime<Utc>, state_vector: DVector<f64>) -> Self {
        Self {
            timestamp,
            state_vector,
        }
    }

    /// Convenience constructor from a slice of components.
    pub fn from_slice(timestamp: DateTime<Utc>, components: &[f64]) -> Self {
        Self::new(timestamp, DVector::from_column_slice(components))
    }
}

impl TimestampedState for State {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn state_vector(&self) -> &DVector<f64> {
        &self.state_vector
    }

    fn with_override(&self, timestamp: DateTime<Utc>, state_vector: DVector<f64>) -> Self {
        Self::new(timestamp, state_vector)
    }
}

// ---------------------------------------------------------------------------
// Gaussian state
// ---------------------------------------------------------------------------

/// State with an attached covariance. The covariance is never interpolated;
/// synthesized states inherit it from their template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GaussianState {
    pub timestamp: DateTime<Utc>,
    pub state_vector: DVector<f64>,
    pub covar: DMatrix<f64>,
}

impl GaussianState {
    pub fn new(timestamp: DateTime<Utc>, state_vector: DVector<f64>, covar: DMatrix<f64>) -> Self {
        Self {
            timestamp,
            state_vector,
            covar,
        }
    }

    /// Build a state whose covariance is diagonal with the given variances.
    pub fn with_variances(
        timestamp: DateTime<Utc>,
        state_vector: DVector<f64>,
        variances: &[f64],
    ) -> Self {
        let covar = DMatrix::from_diagonal(&DVector::from_column_slice(variances));
        Self::new(timestamp, state_vector, covar)
    }

    pub fn mean(&self) -> &DVector<f64> {
        &self.state_vector
    }
}

impl TimestampedState for GaussianState {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn state_vector(&self) -> &DVector<f64> {
        &self.state_vector
    }

    fn with_override(&self, timestamp: DateTime<Utc>, state_vector: DVector<f64>) -> Self {
        Self {
            timestamp,
            state_vector,
            covar: self.covar.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Ground truth state
// ---------------------------------------------------------------------------
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthState {
    pub timestamp: DateTime<Utc>,
    pub state_vector: DVector<f64>,
    pub metadata: Metadata,
}

impl GroundTruthState {
    pub fn new(timestamp: DateTime<Utc>, state_vector: DVector<f64>) -> Self {
        Self {
            timestamp,
            state_vector,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl TimestampedState for GroundTruthState {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn state_vector(&self) -> &DVector<f64> {
        &self.state_vector
    }

    fn with_override(&self, timestamp: DateTime<Utc>, state_vector: DVector<f64>) -> Self {
        Self {
            timestamp,
            state_vector,
            metadata: self.metadata.clone(),
        }
    }
}
