//! Lesson period table and time-of-day buckets.
//!
//! The portal publishes sessions as period ranges (`"1 -> 3"`). Mapping a
//! period to clock time is a fixed lookup; anything outside the table falls
//! back to [`FALLBACK_BOUNDS`].

use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveTime, Timelike};
use regex::Regex;
use serde::Serialize;

use crate::session::Session;

/// Start and end of each period, as `(hour, minute)` pairs. Index 0 is period 1.
const PERIOD_TABLE: [((u32, u32), (u32, u32)); 14] = [
    ((7, 0), (7, 50)),
    ((7, 55), (8, 45)),
    ((8, 50), (9, 40)),
    ((9, 50), (10, 40)),
    ((10, 45), (11, 35)),
    ((12, 30), (13, 20)),
    ((13, 25), (14, 15)),
    ((14, 20), (15, 10)),
    ((15, 20), (16, 10)),
    ((16, 15), (17, 5)),
    ((17, 30), (18, 20)),
    ((18, 25), (19, 15)),
    ((19, 20), (20, 10)),
    ((20, 15), (21, 5)),
];

/// Bounds used when a period string is not a valid `"a -> b"` range.
pub const FALLBACK_BOUNDS: ((u32, u32), (u32, u32)) = ((7, 0), (7, 45));

static PERIOD_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*->\s*(\d+)\s*$").unwrap());

static FIRST_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

fn period_entry(period: u32) -> Option<((u32, u32), (u32, u32))> {
    let index = usize::try_from(period.checked_sub(1)?).ok()?;
    PERIOD_TABLE.get(index).copied()
}

/// Returns the clock bounds for a period range such as `"1 -> 3"`.
///
/// The start is the start of the first period and the end is the end of the
/// last one. Total: malformed or out-of-table input yields [`FALLBACK_BOUNDS`].
pub fn period_bounds(lesson_period: &str) -> (NaiveTime, NaiveTime) {
    let lookup = || {
        let caps = PERIOD_RANGE_RE.captures(lesson_period)?;
        let first: u32 = caps[1].parse().ok()?;
        let last: u32 = caps[2].parse().ok()?;
        let (start, _) = period_entry(first)?;
        let (_, end) = period_entry(last)?;
        Some((hm(start.0, start.1), hm(end.0, end.1)))
    };

    lookup().unwrap_or_else(|| {
        let (start, end) = FALLBACK_BOUNDS;
        (hm(start.0, start.1), hm(end.0, end.1))
    })
}

/// Returns the first period number mentioned in a period string.
///
/// Tolerates decorations like `"Tiết (1) -> 3"`.
pub fn first_period(lesson_period: &str) -> Option<u32> {
    let head = lesson_period.split("->").next()?;
    FIRST_NUMBER_RE.find(head)?.as_str().parse().ok()
}

/// Coarse part of the day used by the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    /// All buckets in display order.
    pub const ALL: [Self; 3] = [Self::Morning, Self::Afternoon, Self::Evening];

    /// Buckets a period number: 1-5 morning, 6-10 afternoon, 11-14 evening.
    #[must_use]
    pub const fn from_period(period: u32) -> Option<Self> {
        match period {
            1..=5 => Some(Self::Morning),
            6..=10 => Some(Self::Afternoon),
            11..=14 => Some(Self::Evening),
            _ => None,
        }
    }

    /// Buckets a clock time: before noon morning, before 18:00 afternoon.
    #[must_use]
    pub fn from_clock(time: NaiveTime) -> Self {
        match time.hour() {
            0..12 => Self::Morning,
            12..18 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    /// Buckets a session by its first period, falling back to its start time.
    #[must_use]
    pub fn of(session: &Session) -> Self {
        first_period(&session.lesson_period)
            .and_then(Self::from_period)
            .unwrap_or_else(|| Self::from_clock(session.start))
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
