//! Time conflict detection.
//!
//! Two sessions conflict when they fall on the same date and their half-open
//! intervals `[start, end)` overlap. Sessions that merely touch (one ends when
//! the other starts) do not conflict.
//!
//! # Algorithm
//!
//! 1. Sort by `(date, start, end)`; unparsed dates sort after every real day
//! 2. For each session, scan forward while the date is unchanged
//! 3. Report each overlapping pair once, in discovery order
//!
//! Cost is `O(n log n + n·k)` where `k` is the largest number of sessions on a
//! single date.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::options::{OptionKey, OptionMap};
use crate::session::Session;

/// A pair of overlapping sessions, in sweep order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Conflict<'a> {
    pub first: &'a Session,
    pub second: &'a Session,
}

/// Returns true if the two sessions overlap in time on the same date.
pub fn overlaps(a: &Session, b: &Session) -> bool {
    a.date == b.date && a.start < b.end && b.start < a.end
}

/// Sorts tagged sessions by sweep key and calls `visit` for each overlapping
/// pair until it returns `false`.
fn sweep<'a, T: Copy>(
    items: &mut [(&'a Session, T)],
    mut visit: impl FnMut((&'a Session, T), (&'a Session, T)) -> bool,
) {
    items.sort_by(|(a, _), (b, _)| a.sweep_key().cmp(&b.sweep_key()));

    for i in 0..items.len() {
        let current = items[i];
        for &next in &items[i + 1..] {
            if next.0.date != current.0.date {
                break;
            }
            // Sorted by start, so once `next` starts at or after `current`
            // ends nothing later on this date can overlap it.
            if next.0.start >= current.0.end {
                break;
            }
            if overlaps(current.0, next.0) && !visit(current, next) {
                return;
            }
        }
    }
}

/// Finds every pair of overlapping sessions.
///
/// Each unordered pair is reported exactly once and a session is never paired
/// with itself. Identical sessions at different positions do overlap.
pub fn find_conflicts(sessions: &[Session]) -> Vec<Conflict<'_>> {
    let mut items: Vec<(&Session, ())> = sessions.iter().map(|s| (s, ())).collect();
    let mut conflicts = Vec::new();
    sweep(&mut items, |(first, ()), (second, ())| {
        conflicts.push(Conflict { first, second });
        true
    });
    tracing::debug!(
        sessions = sessions.len(),
        conflicts = conflicts.len(),
        "conflict sweep finished"
    );
    conflicts
}

/// Returns true if adding `candidate` to `selected` would introduce a conflict.
///
/// A conflict counts when at least one member of the pair comes from
/// `candidate`, which includes overlaps inside the candidate itself. Returns
/// false if either side is empty.
pub fn conflicts_with_selection(selected: &[Session], candidate: &[Session]) -> bool {
    if selected.is_empty() || candidate.is_empty() {
        return false;
    }

    let mut items: Vec<(&Session, bool)> = selected
        .iter()
        .map(|s| (s, false))
        .chain(candidate.iter().map(|s| (s, true)))
        .collect();

    let mut found = false;
    sweep(&mut items, |(_, a_is_candidate), (_, b_is_candidate)| {
        found = a_is_candidate || b_is_candidate;
        !found
    });
    found
}

/// Lists options that can still be offered alongside the current selection.
///
/// Drops options that are already selected, options for a subject that is
/// already selected, and options whose sessions conflict with the selection.
pub fn available_options<'a>(options: &'a OptionMap, selected: &[OptionKey]) -> Vec<&'a OptionKey> {
    let chosen_subjects: BTreeSet<&str> = selected
        .iter()
        .map(|key| key.subject_name.as_str())
        .collect();
    let selected_sessions: Vec<Session> = selected
        .iter()
        .filter_map(|key| options.get(key))
        .flatten()
        .cloned()
        .collect();

    options
        .iter()
        .filter(|(key, _)| !chosen_subjects.contains(key.subject_name.as_str()))
        .filter(|(_, sessions)| !conflicts_with_selection(&selected_sessions, sessions))
        .map(|(key, _)| key)
        .collect()
}
