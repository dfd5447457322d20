//! Input preparation: deduplicated timeline and range clipping of query times.

use crate::error::{InterpolateError, Result};
use crate::state::TimestampedState;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// Deduplicated, ascending view of a state list.
pub struct Timeline<'a, S> {
    entries: BTreeMap<DateTime<Utc>, &'a S>,
    ndim: usize,
    bounds: (DateTime<Utc>, DateTime<Utc>),
}

impl<'a, S: TimestampedState> Timeline<'a, S> {
    /// Builds the timeline in input order so that a later state replaces an
    /// earlier one with the same timestamp.
    pub fn build(states: &'a [S]) -> Result<Self> {
        let first = states.first().ok_or(InterpolateError::EmptySequence)?;
        let ndim = first.ndim();
        let (mut min, mut max) = (first.timestamp(), first.timestamp());

        let mut entries = BTreeMap::new();
        for state in states {
            if state.ndim() != ndim {
                return Err(InterpolateError::DimensionMismatch {
                    expected: ndim,
                    actual: state.ndim(),
                    timestamp: state.timestamp(),
                });
            }
            let time = state.timestamp();
            min = min.min(time);
            max = max.max(time);
            entries.insert(time, state);
        }

        Ok(Self {
            entries,
            ndim,
            bounds: (min, max),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn get(&self, time: &DateTime<Utc>) -> Option<&'a S> {
        self.entries.get(time).copied()
    }

    pub fn contains(&self, time: &DateTime<Utc>) -> bool {
        self.entries.contains_key(time)
    }

    /// Earliest and latest timestamp; the valid interpolation range.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        self.bounds
    }

    /// States in ascending timestamp order.
    pub fn states(&self) -> Vec<&'a S> {
        self.entries.values().copied().collect()
    }
}

/// Query times split against a timeline's valid range.
#[derive(Debug, Clone, PartialEq)]
pub struct ClippedTimes {
    /// In-range times, caller order and duplicates preserved.
    pub kept: Vec<DateTime<Utc>>,
    /// Distinct out-of-range times in first-seen order.
    pub discarded: Vec<DateTime<Utc>>,
}

/// Drops every time outside `[min, max]`, warning about what was removed.
///
/// Fails when nothing is left to interpolate.
pub fn clip_times(
    times: &[DateTime<Utc>],
    min: DateTime<Utc>,
    max: DateTime<Utc>,
) -> Result<ClippedTimes> {
    let (kept, outside): (Vec<_>, Vec<_>) =
        times.iter().copied().partition(|&t| min <= t && t <= max);

    if kept.is_empty() {
        return Err(InterpolateError::AllTimesOutOfRange { min, max });
    }

    let mut seen = HashSet::new();
    let discarded: Vec<DateTime<Utc>> = outside.into_iter().filter(|t| seen.insert(*t)).collect();

    if !discarded.is_empty() {
        warn!(
            range_start = %min,
            range_end = %max,
            discarded = ?discarded,
            "Trying to interpolate states outside the sequence time range; \
             these times are not included in the output"
        );
    }

    Ok(ClippedTimes { kept, discarded })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::State;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Collects the fields of every WARN event as `name=value` strings.
    #[derive(Clone, Default)]
    struct WarnCapture(Arc<Mutex<Vec<Vec<String>>>>);

    struct FieldList(Vec<String>);

    impl Visit for FieldList {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.0.push(format!("{}={:?}", field.name(), value));
        }
    }

    impl<S: Subscriber> Layer<S> for WarnCapture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                let mut fields = FieldList(Vec::new());
                event.record(&mut fields);
                self.0.lock().unwrap().push(fields.0);
            }
        }
    }

    fn warnings_during<R>(f: impl FnOnce() -> R) -> (R, Vec<Vec<String>>) {
        let capture = WarnCapture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let out = tracing::subscriber::with_default(subscriber, f);
        let events = capture.0.lock().unwrap().clone();
        (out, events)
    }

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_later_duplicate_wins() {
        let states = vec![
            State::from_slice(t(0), &[0.0]),
            State::from_slice(t(5), &[1.0]),
            State::from_slice(t(5), &[2.0]),
            State::from_slice(t(10), &[3.0]),
        ];
        let timeline = Timeline::build(&states).unwrap();

        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline.get(&t(5)).unwrap().state_vector[0], 2.0);
    }

    #[test]
    fn test_unsorted_input_is_ordered() {
        let states = vec![
            State::from_slice(t(10), &[1.0]),
            State::from_slice(t(0), &[0.0]),
            State::from_slice(t(4), &[0.4]),
        ];
        let timeline = Timeline::build(&states).unwrap();

        assert_eq!(timeline.bounds(), (t(0), t(10)));
        let order: Vec<_> = timeline.states().iter().map(|s| s.timestamp).collect();
        assert_eq!(order, vec![t(0), t(4), t(10)]);
    }

    #[test]
    fn test_empty_and_ragged_input_rejected() {
        let empty: Vec<State> = Vec::new();
        assert!(matches!(
            Timeline::build(&empty),
            Err(InterpolateError::EmptySequence)
        ));

        let ragged = vec![
            State::from_slice(t(0), &[0.0, 0.0]),
            State::from_slice(t(1), &[1.0]),
        ];
        assert!(matches!(
            Timeline::build(&ragged),
            Err(InterpolateError::DimensionMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_clip_reports_exact_discarded_set() {
        let times = vec![t(15), t(5), t(-1), t(15), t(10)];
        let clipped = clip_times(&times, t(0), t(10)).unwrap();

        assert_eq!(clipped.kept, vec![t(5), t(10)]);
        assert_eq!(clipped.discarded, vec![t(15), t(-1)]);
    }

    #[test]
    fn test_clip_warns_about_dropped_times() {
        let (clipped, warnings) = warnings_during(|| clip_times(&[t(5), t(15)], t(0), t(10)));
        assert_eq!(clipped.unwrap().discarded, vec![t(15)]);

        assert_eq!(warnings.len(), 1);
        let fields = &warnings[0];
        assert!(fields.iter().any(|f| f.starts_with("message=") && f.contains("outside")));
        assert!(fields.iter().any(|f| f.starts_with("discarded=")));
        assert!(fields.iter().any(|f| f.starts_with("range_end=")));
    }

    #[test]
    fn test_clip_in_range_is_silent() {
        let (clipped, warnings) = warnings_during(|| clip_times(&[t(0), t(5)], t(0), t(10)));
        assert!(clipped.unwrap().discarded.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_clip_all_outside_fails() {
        let err = clip_times(&[t(15), t(20)], t(0), t(10)).unwrap_err();
        assert_eq!(
            err,
            InterpolateError::AllTimesOutOfRange {
                min: t(0),
                max: t(10)
            }
        );
    }

    #[test]
    fn test_clip_keeps_bounds_inclusive() {
        let clipped = clip_times(&[t(0), t(10)], t(0), t(10)).unwrap();
        assert_eq!(clipped.kept, vec![t(0), t(10)]);
        assert!(clipped.discarded.is_empty());
    }
}
