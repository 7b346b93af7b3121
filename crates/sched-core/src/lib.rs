//! Schedule reconciliation engine.
//!
//! This crate contains the fundamental types and logic for:
//! - Options: grouping class sessions into selectable course options
//! - Conflicts: detecting overlapping sessions and pruning candidate options
//! - Calendar: projecting sessions onto neutral calendar events and a weekly grid
//! - Markup: extracting sessions from saved portal schedule pages

pub mod calendar;
mod conflict;
mod error;
pub mod grid;
pub mod markup;
pub mod options;
pub mod period;
pub mod session;

#[cfg(test)]
mod test_support;

pub use calendar::{CalendarEvent, CalendarZone, project_events};
pub use conflict::{Conflict, available_options, conflicts_with_selection, find_conflicts, overlaps};
pub use error::ScheduleError;
pub use grid::WeekGrid;
pub use markup::{ClassSchedule, load_class_dir, parse_schedule_html};
pub use options::{
    OptionKey, OptionMap, OptionSummary, ResolvedSelection, build_options, option_sessions,
    resolve_selection, subjects,
};
pub use period::{TimeOfDay, period_bounds};
pub use session::{Session, SessionDate, SubjectType};
