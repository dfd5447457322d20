use crate::error::{InterpolateError, Result};
use crate::state::TimestampedState;
use chrono::{DateTime, Utc};

/// Walks consecutive pairs of an ascending timeline to find the state that
/// precedes a query time.
///
/// Queries must arrive in non-decreasing order. Each call only moves forward,
/// so a full pass over `N` timeline entries costs O(N) regardless of how many
/// times are looked up.
pub struct PredecessorCursor<'a, S> {
    timeline: &'a [&'a S],
    /// Index of the earlier element of the current pair.
    index: usize,
    last_query: Option<DateTime<Utc>>,
}

impl<'a, S: TimestampedState> PredecessorCursor<'a, S> {
    /// `timeline` must be sorted ascending by timestamp with no duplicates.
    pub fn new(timeline: &'a [&'a S]) -> Self {
        Self {
            timeline,
            index: 0,
            last_query: None,
        }
    }

    /// Returns the earlier state of the first pair whose later timestamp is
    /// at or after `time`.
    pub fn predecessor(&mut self, time: DateTime<Utc>) -> Result<&'a S> {
        debug_assert!(
            self.last_query.map_or(true, |last| last <= time),
            "predecessor queried out of order: {:?} after {:?}",
            time,
            self.last_query
        );
        self.last_query = Some(time);

        loop {
            let after = self
                .timeline
                .get(self.index + 1)
                .ok_or(InterpolateError::ExhaustedTimeline { time })?;
            if after.timestamp() < time {
                self.index += 1;
            } else {
                return Ok(self.timeline[self.index]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::State;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn timeline(secs: &[i64]) -> Vec<State> {
        secs.iter()
            .map(|&s| State::from_slice(t(s), &[s as f64]))
            .collect()
    }

    #[test]
    fn test_monotonic_walk() {
        let states = timeline(&[0, 10, 20, 30]);
        let refs: Vec<&State> = states.iter().collect();
        let mut cursor = PredecessorCursor::new(&refs);

        assert_eq!(cursor.predecessor(t(1)).unwrap().timestamp, t(0));
        assert_eq!(cursor.predecessor(t(9)).unwrap().timestamp, t(0));
        // A time equal to a pair's later entry stays on that pair.
        assert_eq!(cursor.predecessor(t(10)).unwrap().timestamp, t(0));
        assert_eq!(cursor.predecessor(t(11)).unwrap().timestamp, t(10));
        assert_eq!(cursor.predecessor(t(25)).unwrap().timestamp, t(20));
        assert_eq!(cursor.predecessor(t(30)).unwrap().timestamp, t(20));
    }

    #[test]
    fn test_skips_several_pairs_in_one_call() {
        let states = timeline(&[0, 1, 2, 3, 4, 5]);
        let refs: Vec<&State> = states.iter().collect();
        let mut cursor = PredecessorCursor::new(&refs);

        assert_eq!(cursor.predecessor(t(4)).unwrap().timestamp, t(3));
    }

    #[test]
    fn test_exhausted_past_last_entry() {
        let states = timeline(&[0, 10]);
        let refs: Vec<&State> = states.iter().collect();
        let mut cursor = PredecessorCursor::new(&refs);

        assert_eq!(
            cursor.predecessor(t(11)),
            Err(InterpolateError::ExhaustedTimeline { time: t(11) })
        );
    }

    #[test]
    fn test_single_entry_timeline_has_no_pairs() {
        let states = timeline(&[0]);
        let refs: Vec<&State> = states.iter().collect();
        let mut cursor = PredecessorCursor::new(&refs);

        assert!(cursor.predecessor(t(0)).is_err());
    }
}
