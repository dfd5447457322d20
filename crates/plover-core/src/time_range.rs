use chrono::{DateTime, TimeDelta, Utc};

/// Inclusive range of timestamps from `start` towards `end` in fixed steps.
///
/// Yields `start + k * step` for `k = 0 ..= floor((end - start) / step)`, so
/// the last value never overshoots `end`. Clone before iterating to walk the
/// same range again.
#[derive(Clone, Debug)]
pub struct TimeRange {
    start: DateTime<Utc>,
    step_ns: i128,
    next: u64,
    count: u64,
}

/// Timestamps from `start` to `end` inclusive, `step` apart.
///
/// A non-positive `step` or an `end` before `start` gives an empty range.
pub fn time_range(start: DateTime<Utc>, end: DateTime<Utc>, step: TimeDelta) -> TimeRange {
    let span = nanos(end - start);
    let step_ns = nanos(step);
    let count = if span >= 0 && step_ns > 0 {
        u64::try_from(span / step_ns + 1).unwrap_or(u64::MAX)
    } else {
        0
    };

    TimeRange {
        start,
        step_ns,
        next: 0,
        count,
    }
}

/// [`time_range`] with the default one-second step.
pub fn time_range_secs(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeRange {
    time_range(start, end, TimeDelta::seconds(1))
}

const NANOS_PER_SEC: i128 = 1_000_000_000;

fn nanos(delta: TimeDelta) -> i128 {
    i128::from(delta.num_seconds()) * NANOS_PER_SEC + i128::from(delta.subsec_nanos())
}

/// Non-negative nanosecond count back to a `TimeDelta`; `None` past its range.
fn from_nanos(ns: i128) -> Option<TimeDelta> {
    let secs = i64::try_from(ns / NANOS_PER_SEC).ok()?;
    let subsec = u32::try_from(ns % NANOS_PER_SEC).ok()?;
    TimeDelta::new(secs, subsec)
}

impl Iterator for TimeRange {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let offset = self.step_ns * i128::from(self.next);
        self.next += 1;
        self.start.checked_add_signed(from_nanos(offset)?)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TimeRange {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_does_not_overshoot_end() {
        let got: Vec<_> = time_range(t(0), t(10), TimeDelta::seconds(3)).collect();
        assert_eq!(got, vec![t(0), t(3), t(6), t(9)]);
    }

    #[test]
    fn test_inclusive_when_divisible() {
        let got: Vec<_> = time_range(t(0), t(9), TimeDelta::seconds(3)).collect();
        assert_eq!(got, vec![t(0), t(3), t(6), t(9)]);
    }

    #[test]
    fn test_default_step_and_restart() {
        let range = time_range_secs(t(100), t(103));
        assert_eq!(range.len(), 4);

        let first: Vec<_> = range.clone().collect();
        let second: Vec<_> = range.collect();
        assert_eq!(first, second);
        assert_eq!(first.last(), Some(&t(103)));
    }

    #[test]
    fn test_sub_second_step() {
        let got: Vec<_> = time_range(t(0), t(1), TimeDelta::milliseconds(400)).collect();
        assert_eq!(
            got,
            vec![
                t(0),
                t(0) + TimeDelta::milliseconds(400),
                t(0) + TimeDelta::milliseconds(800)
            ]
        );
    }

    #[test]
    fn test_keeps_yielding_past_i32_steps() {
        let mut range = time_range(t(0), t(3), TimeDelta::nanoseconds(1));
        assert_eq!(range.len(), 3_000_000_001);

        range.next = 1 << 31;
        let remaining = range.len();
        assert_eq!(
            range.next(),
            Some(t(2) + TimeDelta::nanoseconds(147_483_648))
        );
        assert_eq!(range.len(), remaining - 1);

        range.next = 3_000_000_000;
        assert_eq!(range.next(), Some(t(3)));
        assert_eq!(range.next(), None);
    }

    #[test]
    fn test_degenerate_ranges() {
        assert_eq!(time_range(t(5), t(5), TimeDelta::seconds(1)).count(), 1);
        assert_eq!(time_range(t(5), t(4), TimeDelta::seconds(1)).count(), 0);
        assert_eq!(time_range(t(0), t(4), TimeDelta::zero()).count(), 0);
        assert_eq!(time_range(t(0), t(4), TimeDelta::seconds(-1)).count(), 0);
    }
}
