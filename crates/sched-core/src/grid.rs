//! Weekly grid model: sessions bucketed by week, weekday and part of day.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::period::TimeOfDay;
use crate::session::Session;

/// Sessions of one week, indexed by `[time of day][weekday from Monday]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Week<'a> {
    cells: [[Vec<&'a Session>; 7]; 3],
}

impl<'a> Week<'a> {
    /// Sessions in one cell, sorted by start time.
    pub fn cell(&self, slot: TimeOfDay, weekday: usize) -> &[&'a Session] {
        self.cells[slot_index(slot)]
            .get(weekday)
            .map_or(&[], Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(Vec::is_empty)
    }
}

/// Sessions grouped by the Monday of their week.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekGrid<'a> {
    weeks: BTreeMap<NaiveDate, Week<'a>>,
}

impl<'a> WeekGrid<'a> {
    /// Buckets sessions; those without a decodable date are left out.
    pub fn build(sessions: &'a [Session]) -> Self {
        let mut weeks: BTreeMap<NaiveDate, Week<'a>> = BTreeMap::new();
        for session in sessions {
            let Some(day) = session.date.day() else {
                continue;
            };
            let weekday = day.weekday().num_days_from_monday();
            let monday = day - Duration::days(i64::from(weekday));
            let slot = TimeOfDay::of(session);
            weeks.entry(monday).or_default().cells[slot_index(slot)][weekday as usize]
                .push(session);
        }
        for week in weeks.values_mut() {
            for cell in week.cells.iter_mut().flatten() {
                cell.sort_by_key(|s| (s.start, s.end));
            }
        }
        Self { weeks }
    }

    /// Weeks in chronological order, keyed by their Monday.
    pub fn weeks(&self) -> impl Iterator<Item = (&NaiveDate, &Week<'a>)> {
        self.weeks.iter()
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

const fn slot_index(slot: TimeOfDay) -> usize {
    match slot {
        TimeOfDay::Morning => 0,
        TimeOfDay::Afternoon => 1,
        TimeOfDay::Evening => 2,
    }
}
