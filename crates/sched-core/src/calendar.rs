//! Projection of sessions onto neutral calendar events.
//!
//! The projector only maps fields; serializing to an interchange format is
//! left to the caller.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Fixed civil time zone that all sessions are expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarZone {
    /// Zone identifier written as `TZID` (e.g. `Asia/Bangkok`).
    pub tzid: String,
    /// Short zone name (e.g. `ICT`).
    pub name: String,
    /// Offset from UTC in minutes. No daylight saving.
    pub utc_offset_minutes: i32,
}

impl Default for CalendarZone {
    fn default() -> Self {
        Self {
            tzid: "Asia/Bangkok".to_string(),
            name: "ICT".to_string(),
            utc_offset_minutes: 7 * 60,
        }
    }
}

impl CalendarZone {
    /// Returns the zone offset, or `None` if it is out of range.
    pub fn offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.checked_mul(60)?)
    }

    /// Formats the offset as `+HHMM`.
    pub fn offset_label(&self) -> String {
        let sign = if self.utc_offset_minutes < 0 { '-' } else { '+' };
        let minutes = self.utc_offset_minutes.unsigned_abs();
        format!("{sign}{:02}{:02}", minutes / 60, minutes % 60)
    }
}

/// A serializer-neutral calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    /// Synthetic identifier derived from the input position.
    pub uid: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub title: String,
    pub description: String,
    pub location: String,
}

impl CalendarEvent {
    /// Wall-clock start in the event's zone.
    pub fn local_start(&self) -> NaiveDateTime {
        self.start.naive_local()
    }

    /// Wall-clock end in the event's zone.
    pub fn local_end(&self) -> NaiveDateTime {
        self.end.naive_local()
    }
}

/// Builds the structured description text for a session.
pub fn describe(session: &Session) -> String {
    [
        format!("Type: {}", session.subject_type.label()),
        format!("Class: {}", session.class_name),
        format!("Group: {}", session.group),
        format!("Lecturer: {}", session.lecturer_name),
        format!("Room: {}", session.room),
        format!("Periods: {}", session.lesson_period),
    ]
    .join("\n")
}

/// Maps sessions to calendar events in `zone`.
///
/// The `n`th session (1-based) gets uid `event{n}@schedule.local`. Sessions
/// whose date cannot be decoded are skipped without shifting later uids. An
/// invalid zone offset falls back to UTC.
pub fn project_events(sessions: &[Session], zone: &CalendarZone) -> Vec<CalendarEvent> {
    let offset = zone.offset().unwrap_or_else(|| {
        tracing::warn!(
            minutes = zone.utc_offset_minutes,
            "invalid zone offset, using UTC"
        );
        Utc.fix()
    });

    sessions
        .iter()
        .enumerate()
        .filter_map(|(index, session)| {
            let Some(day) = session.date.day() else {
                tracing::warn!(
                    subject = %session.subject_name,
                    date = %session.date,
                    "skipping session with unparsed date"
                );
                return None;
            };
            let start = offset.from_local_datetime(&day.and_time(session.start)).single()?;
            let end = offset.from_local_datetime(&day.and_time(session.end)).single()?;
            Some(CalendarEvent {
                uid: format!("event{}@schedule.local", index + 1),
                start,
                end,
                title: session.subject_name.clone(),
                description: describe(session),
                location: session.room.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionDate;
    use crate::test_support::session;

    #[test]
    fn projects_fields_and_offset() {
        let s = session("Networks", 2, 10, "1 -> 3");
        let events = project_events(std::slice::from_ref(&s), &CalendarZone::default());
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.uid, "event1@schedule.local");
        assert_eq!(event.title, "Networks");
        assert_eq!(event.location, "A101");
        assert_eq!(event.start.to_rfc3339(), "2026-03-10T07:00:00+07:00");
        assert_eq!(event.end.to_rfc3339(), "2026-03-10T09:40:00+07:00");
        insta::assert_snapshot!(event.description, @r"
        Type: Theory
        Class: CLASS-A
        Group: 2
        Lecturer: Nguyen A
        Room: A101
        Periods: 1 -> 3
        ");
    }

    #[test]
    fn uids_follow_input_position_and_skip_unparsed() {
        let mut bad = session("Broken", 0, 2, "1 -> 1");
        bad.date = SessionDate::Unparsed("n/a".to_string());
        let sessions = vec![
            session("A", 0, 1, "1 -> 1"),
            bad,
            session("C", 0, 3, "1 -> 1"),
        ];
        let uids: Vec<String> = project_events(&sessions, &CalendarZone::default())
            .into_iter()
            .map(|e| e.uid)
            .collect();
        assert_eq!(uids, vec!["event1@schedule.local", "event3@schedule.local"]);
    }

    #[test]
    fn empty_input_projects_nothing() {
        assert!(project_events(&[], &CalendarZone::default()).is_empty());
    }

    #[test]
    fn offset_label_formats_sign() {
        assert_eq!(CalendarZone::default().offset_label(), "+0700");
        let zone = CalendarZone {
            utc_offset_minutes: -(3 * 60 + 30),
            ..CalendarZone::default()
        };
        assert_eq!(zone.offset_label(), "-0330");
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let zone = CalendarZone {
            utc_offset_minutes: 48 * 60,
            ..CalendarZone::default()
        };
        assert!(zone.offset().is_none());
        let events = project_events(&[session("A", 0, 1, "1 -> 1")], &zone);
        assert_eq!(events[0].start.to_rfc3339(), "2026-03-01T07:00:00+00:00");
    }
}
