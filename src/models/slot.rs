use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Half-open interval `[start, end)` within a single day.
///
/// `NaiveTime` has no 24:00, so the latest representable end is 23:59:59. A rule
/// written as "until midnight" must end at 23:59 and its final slot is lost.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Window of `duration_minutes` starting at `start`, or `None` when it would run past midnight.
    pub fn starting_at(start: NaiveTime, duration_minutes: u32) -> Option<Self> {
        let end = duration_minutes
            .checked_mul(60)
            .and_then(|seconds| seconds.checked_add(seconds_of(start)))
            .and_then(time_from_seconds)?;
        Some(Self { start, end })
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &TimeWindow) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn duration_minutes(&self) -> u32 {
        seconds_of(self.end).saturating_sub(seconds_of(self.start)) / 60
    }
}

/// Merge overlapping or touching windows into a sorted, disjoint list.
pub fn union(windows: impl IntoIterator<Item = TimeWindow>) -> Vec<TimeWindow> {
    let mut windows: Vec<TimeWindow> = windows.into_iter().filter(|w| !w.is_empty()).collect();
    windows.sort();

    let mut merged: Vec<TimeWindow> = Vec::with_capacity(windows.len());
    for window in windows {
        match merged.last_mut() {
            Some(last) if window.start <= last.end => {
                last.end = last.end.max(window.end);
            }
            _ => merged.push(window),
        }
    }

    merged
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSlot {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start)
    }
}

pub(crate) fn seconds_of(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight()
}

pub(crate) fn time_from_seconds(seconds: u32) -> Option<NaiveTime> {
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
}
