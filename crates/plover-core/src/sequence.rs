use crate::state::{Metadata, TimestampedState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Index;

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// An ordered collection of timestamped states.
///
/// Implementors decide what a "working copy" keeps: `with_states` returns a
/// sequence with the same identity but a new state list, dropping any
/// per-state side channel that would no longer line up with the states.
pub trait StateSequence: Sized {
    type State: TimestampedState;

    fn states(&self) -> &[Self::State];

    fn with_states(&self, states: Vec<Self::State>) -> Self;

    fn len(&self) -> usize {
        self.states().len()
    }

    fn is_empty(&self) -> bool {
        self.states().is_empty()
    }

    fn first(&self) -> Option<&Self::State> {
        self.states().first()
    }

    fn last(&self) -> Option<&Self::State> {
        self.states().last()
    }

    /// The current (most recently appended) state.
    fn state(&self) -> Option<&Self::State> {
        self.last()
    }

    fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.states().iter().map(|s| s.timestamp()).collect()
    }

    /// Earliest and latest timestamp present, regardless of storage order.
    fn time_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let mut iter = self.states().iter().map(|s| s.timestamp());
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// Estimated states of one target, with an optional metadata entry per state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track<S> {
    pub id: String,
    pub states: Vec<S>,
    /// Per-state side channel. Cleared by interpolation since synthesized
    /// states have no counterpart entry.
    pub metadatas: Vec<Metadata>,
}

impl<S: TimestampedState> Track<S> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            states: Vec::new(),
            metadatas: Vec::new(),
        }
    }

    pub fn from_states(id: impl Into<String>, states: Vec<S>) -> Self {
        Self {
            id: id.into(),
            states,
            metadatas: Vec::new(),
        }
    }

    pub fn push(&mut self, state: S) {
        self.states.push(state);
    }

    pub fn push_with_metadata(&mut self, state: S, metadata: Metadata) {
        self.states.push(state);
        self.metadatas.push(metadata);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.states.iter()
    }
}

impl<S: TimestampedState> StateSequence for Track<S> {
    type State = S;

    fn states(&self) -> &[S] {
        &self.states
    }

    fn with_states(&self, states: Vec<S>) -> Self {
        Self {
            id: self.id.clone(),
            states,
            metadatas: Vec::new(),
        }
    }
}

impl<S> Index<usize> for Track<S> {
    type Output = S;

    fn index(&self, idx: usize) -> &S {
        &self.states[idx]
    }
}

// ---------------------------------------------------------------------------
// Ground truth path
// ---------------------------------------------------------------------------
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthPath<S> {
    pub id: String,
    pub states: Vec<S>,
}

impl<S: TimestampedState> GroundTruthPath<S> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            states: Vec::new(),
        }
    }

    pub fn from_states(id: impl Into<String>, states: Vec<S>) -> Self {
        Self {
            id: id.into(),
            states,
        }
    }

    pub fn push(&mut self, state: S) {
        self.states.push(state);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.states.iter()
    }
}

impl<S: TimestampedState> StateSequence for GroundTruthPath<S> {
    type State = S;

    fn states(&self) -> &[S] {
        &self.states
    }

    fn with_states(&self, states: Vec<S>) -> Self {
        Self {
            id: self.id.clone(),
            states,
        }
    }
}

impl<S> Index<usize> for GroundTruthPath<S> {
    type Output = S;

    fn index(&self, idx: usize) -> &S {
        &self.states[idx]
    }
}
