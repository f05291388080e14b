//! Per-day resource timelines.
//!
//! Minutes are offsets from the day's shift start. Intervals are half-open
//! `[start, end)`.

/// One operator's day: a cursor that only moves forward and a hard horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OperatorDay {
    cursor: i64,
    horizon: i64,
    busy: i64,
}

impl OperatorDay {
    pub(crate) fn new(horizon: i64) -> Self {
        Self {
            cursor: 0,
            horizon: horizon.max(0),
            busy: 0,
        }
    }

    /// Earliest minute the next entry may start.
    pub(crate) fn cursor(&self) -> i64 {
        self.cursor
    }

    pub(crate) fn horizon(&self) -> i64 {
        self.horizon
    }

    /// Minutes already booked today.
    pub(crate) fn busy(&self) -> i64 {
        self.busy
    }

    pub(crate) fn has_room(&self) -> bool {
        self.cursor < self.horizon
    }

    /// Books `[start, start + duration)`; `start` must not precede the cursor.
    pub(crate) fn book(&mut self, start: i64, duration: i64) {
        debug_assert!(start >= self.cursor);
        debug_assert!(start + duration <= self.horizon);
        self.cursor = start + duration;
        self.busy += duration;
    }
}

/// One station's day: booked intervals under a concurrency limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StationDay {
    capacity: usize,
    intervals: Vec<(i64, i64)>,
}

impl StationDay {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            intervals: Vec::new(),
        }
    }

    /// Number of intervals covering minute `t`.
    pub(crate) fn load_at(&self, t: i64) -> usize {
        self.intervals
            .iter()
            .filter(|&&(s, e)| s <= t && t < e)
            .count()
    }

    /// Finds the earliest window of at least `min_len` minutes, starting no
    /// earlier than `from` and ending no later than `horizon`, in which the
    /// station has a free slot throughout.
    ///
    /// Returns `(start, limit)`; any booking inside `[start, limit)` keeps
    /// the concurrency within capacity.
    ///
    /// # Algorithm
    /// Load only drops at interval ends, so the candidate starts are `from`
    /// and every end after it. Load only rises at interval starts, so the
    /// window from a candidate extends to the first later start where the
    /// load reaches capacity.
    pub(crate) fn earliest_window(&self, from: i64, horizon: i64, min_len: i64) -> Option<(i64, i64)> {
        if self.capacity == 0 || min_len <= 0 {
            return None;
        }

        let mut candidates: Vec<i64> = std::iter::once(from)
            .chain(self.intervals.iter().map(|&(_, e)| e).filter(|&e| e > from))
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        let mut rises: Vec<i64> = self.intervals.iter().map(|&(s, _)| s).collect();
        rises.sort_unstable();
        rises.dedup();

        for start in candidates {
            if start.saturating_add(min_len) > horizon {
                break;
            }
            if self.load_at(start) >= self.capacity {
                continue;
            }
            let limit = rises
                .iter()
                .copied()
                .filter(|&s| s > start && s < horizon)
                .find(|&s| self.load_at(s) >= self.capacity)
                .unwrap_or(horizon);
            if limit - start >= min_len {
                return Some((start, limit));
            }
        }
        None
    }

    pub(crate) fn book(&mut self, start: i64, end: i64) {
        self.intervals.push((start, end));
    }
}

/// Rounds `minutes` up to a multiple of `step`; `None` on overflow.
pub(crate) fn round_up(minutes: i64, step: i64) -> Option<i64> {
    if step <= 1 {
        return Some(minutes);
    }
    minutes.checked_add(step - 1).map(|m| m / step * step)
}

/// Minutes occupied by a batch of `units`; `None` on overflow.
pub(crate) fn batch_minutes(units: u32, minutes_per_unit: i64, step: i64) -> Option<i64> {
    (units as i64)
        .checked_mul(minutes_per_unit)
        .and_then(|m| round_up(m, step))
}

/// Largest batch that fits a window of `window` minutes.
///
/// A batch of `n` units occupies `batch_minutes(n, ..)` minutes and never
/// exceeds `open` units. A unit too long to measure never fits.
pub(crate) fn units_that_fit(window: i64, minutes_per_unit: i64, step: i64, open: u32) -> u32 {
    if minutes_per_unit <= 0 || window <= 0 {
        return 0;
    }
    let mut n = (window / minutes_per_unit).min(open as i64) as u32;
    while n > 0 && batch_minutes(n, minutes_per_unit, step).map_or(true, |m| m > window) {
        n -= 1;
    }
    n
}
