//! Linear interpolation of state sequences at arbitrary times.
//!
//! Times already present in the sequence reuse the existing state. Every other
//! in-range time gets a new state whose vector is interpolated component by
//! component and whose remaining attributes are copied from the state
//! immediately before it. Times outside the sequence's span are dropped with a
//! warning; nothing is extrapolated.

use crate::cursor::PredecessorCursor;
use crate::error::Result;
use crate::normalize::{clip_times, Timeline};
use crate::sequence::StateSequence;
use crate::state::TimestampedState;
use chrono::{DateTime, TimeDelta, Utc};
use nalgebra::{DMatrix, DVector};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Output of [`resample`]: the new sequence plus the times that were dropped
/// for lying outside the input's span.
#[derive(Clone, Debug, PartialEq)]
pub struct Resampled<Q> {
    pub sequence: Q,
    pub discarded: Vec<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Interpolates `sequence` at each of `times`.
///
/// The returned sequence has the same identity as the input, holds one state
/// per in-range entry of `times` in the caller's order, and carries no
/// per-state metadata.
pub fn interpolate_sequence<Q: StateSequence>(sequence: &Q, times: &[DateTime<Utc>]) -> Result<Q> {
    resample(sequence, times).map(|r| r.sequence)
}

/// Interpolates `sequence` at a single time.
pub fn interpolate_state<Q: StateSequence>(sequence: &Q, time: DateTime<Utc>) -> Result<Q::State> {
    let (mut states, _) = interpolate_states(sequence.states(), std::slice::from_ref(&time))?;
    debug_assert_eq!(states.len(), 1);
    // A successful pass yields exactly one state for a single in-range time.
    Ok(states.swap_remove(0))
}

/// Like [`interpolate_sequence`] but also reports the discarded times.
pub fn resample<Q: StateSequence>(sequence: &Q, times: &[DateTime<Utc>]) -> Result<Resampled<Q>> {
    let (states, discarded) = interpolate_states(sequence.states(), times)?;
    Ok(Resampled {
        sequence: sequence.with_states(states),
        discarded,
    })
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

type Interpolated<S> = (Vec<S>, Vec<DateTime<Utc>>);

fn interpolate_states<S: TimestampedState>(
    states: &[S],
    times: &[DateTime<Utc>],
) -> Result<Interpolated<S>> {
    let timeline = Timeline::build(states)?;
    let (min, max) = timeline.bounds();
    let clipped = clip_times(times, min, max)?;

    let missing: Vec<DateTime<Utc>> = clipped
        .kept
        .iter()
        .filter(|t| !timeline.contains(t))
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut synthesized: HashMap<DateTime<Utc>, S> = HashMap::with_capacity(missing.len());
    if !missing.is_empty() {
        let known = timeline.states();
        debug!(
            known = known.len(),
            missing = missing.len(),
            ndim = timeline.ndim(),
            "interpolating state vectors"
        );

        let vectors = interpolate_vectors(&known, &missing, timeline.ndim());
        let mut cursor = PredecessorCursor::new(&known);
        for (idx, &time) in missing.iter().enumerate() {
            let template = cursor.predecessor(time)?;
            let state = template.with_override(time, vectors.column(idx).into_owned());
            synthesized.insert(time, state);
        }
    }

    let out = clipped
        .kept
        .iter()
        .map(|time| match timeline.get(time) {
            Some(existing) => existing.clone(),
            None => synthesized[time].clone(),
        })
        .collect();

    Ok((out, clipped.discarded))
}

/// Interpolates every component of the `known` vectors at the ascending
/// `missing` times. Column `i` of the result belongs to `missing[i]`.
fn interpolate_vectors<S: TimestampedState>(
    known: &[&S],
    missing: &[DateTime<Utc>],
    ndim: usize,
) -> DMatrix<f64> {
    let origin = known[0].timestamp();
    let xp: Vec<f64> = known
        .iter()
        .map(|s| seconds(s.timestamp() - origin))
        .collect();
    let x: Vec<f64> = missing.iter().map(|&t| seconds(t - origin)).collect();

    // D x N, one column per known state
    let columns: Vec<DVector<f64>> = known.iter().map(|s| s.state_vector().clone()).collect();
    let fp = DMatrix::from_columns(&columns);

    let mut out = DMatrix::zeros(ndim, x.len());
    for row in 0..ndim {
        let fp_row: Vec<f64> = fp.row(row).iter().copied().collect();
        let values = interp_sorted(&x, &xp, &fp_row);
        for (col, value) in values.into_iter().enumerate() {
            out[(row, col)] = value;
        }
    }
    out
}

/// One-dimensional piecewise linear interpolation with constant extension past
/// either end.
///
/// Both `x` and `xp` must be ascending and `xp` must be non-empty with the
/// same length as `fp`. The segment pointer only moves forward, so the whole
/// evaluation is a single merge over both inputs.
pub(crate) fn interp_sorted(x: &[f64], xp: &[f64], fp: &[f64]) -> Vec<f64> {
    let n = xp.len();
    let mut out = Vec::with_capacity(x.len());
    let mut seg = 0;

    for &xi in x {
        if xi <= xp[0] {
            out.push(fp[0]);
            continue;
        }
        if xi >= xp[n - 1] {
            out.push(fp[n - 1]);
            continue;
        }
        while xp[seg + 1] < xi {
            seg += 1;
        }

        let (x0, x1) = (xp[seg], xp[seg + 1]);
        let alpha = (xi - x0) / (x1 - x0);
        out.push(fp[seg] + (fp[seg + 1] - fp[seg]) * alpha);
    }

    out
}

fn seconds(delta: TimeDelta) -> f64 {
    delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) * 1e-9
}
