//! Export command: writes the selection as an iCalendar (.ics) file.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDateTime, Utc};
use icalendar::{Calendar, Component, EventLike, Property};

use sched_core::{CalendarEvent, CalendarZone, find_conflicts, project_events};
use sched_db::Database;

use super::catalog::{Catalog, selected_sessions};
use super::conflicts::write_conflicts;
use crate::Config;

const ICS_DATETIME: &str = "%Y%m%dT%H%M%S";

/// Fixed-offset `VTIMEZONE` for `zone`, CRLF terminated.
fn timezone_block(zone: &CalendarZone) -> String {
    let offset = zone.offset_label();
    [
        "BEGIN:VTIMEZONE".to_string(),
        format!("TZID:{}", zone.tzid),
        "BEGIN:STANDARD".to_string(),
        "DTSTART:19700101T000000".to_string(),
        format!("TZOFFSETFROM:{offset}"),
        format!("TZOFFSETTO:{offset}"),
        format!("TZNAME:{}", zone.name),
        "END:STANDARD".to_string(),
        "END:VTIMEZONE".to_string(),
    ]
    .iter()
    .map(|line| format!("{line}\r\n"))
    .collect()
}

/// Adds a wall-clock datetime property qualified with `TZID`.
fn add_zoned_datetime(ics_event: &mut icalendar::Event, name: &str, at: NaiveDateTime, tzid: &str) {
    let value = at.format(ICS_DATETIME).to_string();
    let mut prop = Property::new(name, value.as_str());
    prop.add_parameter("TZID", tzid);
    ics_event.append_property(prop);
}

/// Serializes events into one calendar with a `VTIMEZONE` for `zone`.
pub fn render_ics(events: &[CalendarEvent], zone: &CalendarZone, stamp: DateTime<Utc>) -> String {
    let dtstamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();
    let mut calendar = Calendar::new();

    for event in events {
        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&event.uid);
        ics_event.add_property("DTSTAMP", dtstamp.as_str());
        ics_event.add_property("SEQUENCE", "0");
        add_zoned_datetime(&mut ics_event, "DTSTART", event.local_start(), &zone.tzid);
        add_zoned_datetime(&mut ics_event, "DTEND", event.local_end(), &zone.tzid);
        ics_event.summary(&event.title);
        ics_event.description(&event.description);
        ics_event.location(&event.location);
        calendar.push(ics_event.done());
    }

    // icalendar has no VTIMEZONE builder; it goes ahead of the first event.
    let mut ics = calendar.done().to_string();
    let at = ics
        .find("BEGIN:VEVENT")
        .or_else(|| ics.find("END:VCALENDAR"))
        .unwrap_or(ics.len());
    ics.insert_str(at, &timezone_block(zone));
    ics
}

/// Returns the number of events written.
pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    config: &Config,
    output: Option<&Path>,
    force: bool,
) -> Result<usize> {
    if config.timezone.offset().is_none() {
        bail!(
            "invalid timezone offset: {} minutes",
            config.timezone.utc_offset_minutes
        );
    }

    let mut catalog = Catalog::load(db)?;
    let sessions = selected_sessions(writer, db, &mut catalog)?;
    if sessions.is_empty() {
        bail!("nothing selected; add options with `sched select add`");
    }

    let conflicts = find_conflicts(&sessions);
    if !conflicts.is_empty() {
        if !force {
            write_conflicts(writer, &conflicts)?;
            bail!(
                "selection has {} conflicts; resolve them or pass --force",
                conflicts.len()
            );
        }
        tracing::warn!(conflicts = conflicts.len(), "exporting despite conflicts");
    }

    let events = project_events(&sessions, &config.timezone);
    let ics = render_ics(&events, &config.timezone, Utc::now());

    let path = output.map_or_else(|| config.ics_path(), Path::to_path_buf);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, ics).with_context(|| format!("failed to write {}", path.display()))?;

    for session in &sessions {
        if let Err(e) = session.date.strict() {
            writeln!(writer, "Skipped {}: {e}", session.subject_name)?;
        }
    }
    writeln!(writer, "Wrote {} events to {}", events.len(), path.display())?;
    Ok(events.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{seeded_db, theory};

    use chrono::TimeZone;
    use sched_core::{OptionKey, SessionDate};

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()
    }

    fn test_config(dir: &Path) -> Config {
        Config {
            database_path: dir.join("sched.db"),
            html_dir: dir.join("html"),
            output_dir: dir.join("out"),
            timezone: CalendarZone::default(),
        }
    }

    #[test]
    fn render_ics_places_timezone_before_events() {
        let zone = CalendarZone::default();
        let sessions = vec![theory("Networks", 0, 2, "1 -> 3")];
        let events = project_events(&sessions, &zone);
        let ics = render_ics(&events, &zone, stamp());

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.contains(
            "BEGIN:VTIMEZONE\r\nTZID:Asia/Bangkok\r\nBEGIN:STANDARD\r\n\
             DTSTART:19700101T000000\r\nTZOFFSETFROM:+0700\r\nTZOFFSETTO:+0700\r\n\
             TZNAME:ICT\r\nEND:STANDARD\r\nEND:VTIMEZONE\r\n"
        ));
        let tz_at = ics.find("BEGIN:VTIMEZONE").unwrap();
        let event_at = ics.find("BEGIN:VEVENT").unwrap();
        assert!(tz_at < event_at);

        assert!(ics.contains("UID:event1@schedule.local\r\n"));
        assert!(ics.contains("DTSTAMP:20260201T000000Z\r\n"));
        assert!(ics.contains("SEQUENCE:0\r\n"));
        assert!(ics.contains("DTSTART;TZID=Asia/Bangkok:20260302T070000\r\n"));
        assert!(ics.contains("DTEND;TZID=Asia/Bangkok:20260302T094000\r\n"));
        assert!(ics.contains("SUMMARY:Networks\r\n"));
        assert!(ics.contains("LOCATION:A101\r\n"));
        assert!(ics.trim_end().ends_with("END:VCALENDAR"));
    }

    #[test]
    fn render_ics_without_events_still_has_timezone() {
        let ics = render_ics(&[], &CalendarZone::default(), stamp());
        let tz_at = ics.find("BEGIN:VTIMEZONE").unwrap();
        let end_at = ics.find("END:VCALENDAR").unwrap();
        assert!(tz_at < end_at);
        assert!(!ics.contains("BEGIN:VEVENT"));
    }

    #[test]
    fn export_refuses_conflicts_unless_forced() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let mut db = seeded_db(&[
            theory("Algebra", 0, 2, "2 -> 3"),
            theory("Networks", 0, 2, "1 -> 2"),
        ]);
        db.add_selection(&OptionKey::new("C-Algebra", "Algebra", "CLASS-A", 0))
            .unwrap();
        db.add_selection(&OptionKey::new("C-Networks", "Networks", "CLASS-A", 0))
            .unwrap();

        let mut output = Vec::new();
        let err = run(&mut output, &mut db, &config, None, false).unwrap_err();
        assert!(err.to_string().contains("selection has 1 conflicts"));
        assert!(!config.ics_path().exists());

        let mut output = Vec::new();
        let written = run(&mut output, &mut db, &config, None, true).unwrap();
        assert_eq!(written, 2);
        let ics = fs::read_to_string(config.ics_path()).unwrap();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
    }

    #[test]
    fn export_writes_to_explicit_path() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let mut db = seeded_db(&[theory("Algebra", 0, 2, "1 -> 3")]);
        db.add_selection(&OptionKey::new("C-Algebra", "Algebra", "CLASS-A", 0))
            .unwrap();

        let path = temp.path().join("nested/me.ics");
        let mut output = Vec::new();
        run(&mut output, &mut db, &config, Some(&path), false).unwrap();
        assert!(path.exists());
        let output = String::from_utf8(output).unwrap();
        assert_eq!(
            output,
            format!("Wrote 1 events to {}\n", path.display())
        );
    }

    #[test]
    fn export_reports_sessions_with_malformed_dates() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let mut undated = theory("Algebra", 0, 3, "1 -> 3");
        undated.date = SessionDate::Unparsed("Thứ 2".to_string());
        let mut db = seeded_db(&[theory("Algebra", 0, 2, "1 -> 3"), undated]);
        db.add_selection(&OptionKey::new("C-Algebra", "Algebra", "CLASS-A", 0))
            .unwrap();

        let mut output = Vec::new();
        assert_eq!(run(&mut output, &mut db, &config, None, false).unwrap(), 1);
        let output = String::from_utf8(output).unwrap();
        assert_eq!(
            output,
            format!(
                "Skipped Algebra: malformed schedule data in date: \"Thứ 2\"\nWrote 1 events to {}\n",
                config.ics_path().display()
            )
        );
    }

    #[test]
    fn export_requires_a_selection() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let mut db = seeded_db(&[theory("Algebra", 0, 2, "1 -> 3")]);
        let err = run(&mut Vec::new(), &mut db, &config, None, false).unwrap_err();
        assert!(err.to_string().starts_with("nothing selected"));
    }
}
