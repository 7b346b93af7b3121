//! Show command: every session of one numbered option.

use std::io::Write;

use anyhow::Result;

use sched_core::{OptionSummary, Session, SessionDate, TimeOfDay, option_sessions};
use sched_db::Database;

use super::catalog::Catalog;

fn day_label(date: &SessionDate) -> String {
    match date {
        SessionDate::Day(day) => day.format("%a %d-%m-%Y").to_string(),
        SessionDate::Unparsed(raw) => raw.clone(),
    }
}

fn session_line(session: &Session) -> String {
    format!(
        "{} - {} - {}, periods {}, {}, room {}",
        day_label(&session.date),
        TimeOfDay::of(session),
        session.subject_type.label(),
        session.lesson_period,
        session.time_range(),
        session.room,
    )
}

pub fn run<W: Write>(writer: &mut W, db: &Database, number: usize) -> Result<()> {
    let catalog = Catalog::load(db)?;
    let key = catalog.key_at(number)?;
    let sessions = option_sessions(&catalog.options, key)?;
    let summary = OptionSummary::of(sessions);

    let mut ordered: Vec<&Session> = sessions.iter().collect();
    ordered.sort_by(|a, b| a.sweep_key().cmp(&b.sweep_key()));

    let marker = if catalog.is_selected(key) { " (selected)" } else { "" };
    writeln!(writer, "{} [{}]{marker}", key.subject_name, key.course_code)?;
    let group = if key.group == 0 {
        "No group".to_string()
    } else {
        format!("Group {}", key.group)
    };
    writeln!(writer, "Class: {} | {group}", key.class_name)?;
    if summary.lecturers.is_empty() {
        writeln!(writer, "Lecturers: none listed")?;
    } else {
        writeln!(writer, "Lecturers: {}", summary.lecturers.join(", "))?;
    }
    writeln!(writer, "Sessions: {}", summary.session_count)?;
    for session in ordered {
        writeln!(writer, "  {}", session_line(session))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{practice, seeded_db, theory};

    use insta::assert_snapshot;
    use sched_core::OptionKey;

    fn networks_db() -> Database {
        let mut undated = theory("Networks", 1, 9, "11 -> 12");
        undated.date = SessionDate::Unparsed("Thứ 2".to_string());
        seeded_db(&[
            theory("Algebra", 0, 5, "4 -> 5"),
            undated,
            theory("Networks", 1, 3, "1 -> 3"),
            practice("Networks", 1, 2, "6 -> 8"),
        ])
    }

    #[test]
    fn shows_sessions_in_chronological_order() {
        let mut db = networks_db();
        db.add_selection(&OptionKey::new("C-Networks", "Networks", "CLASS-A", 1))
            .unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, 2).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Networks [C-Networks] (selected)
        Class: CLASS-A | Group 1
        Lecturers: Nguyen A, Tran B
        Sessions: 3
          Mon 02-03-2026 - Afternoon - Practice, periods 6 -> 8, 12:30 - 15:10, room Lab 2
          Tue 03-03-2026 - Morning - Theory, periods 1 -> 3, 07:00 - 09:40, room A101
          Thứ 2 - Evening - Theory, periods 11 -> 12, 17:30 - 19:15, room A101
        ");
    }

    #[test]
    fn ungrouped_option_header() {
        let db = networks_db();
        let mut output = Vec::new();
        run(&mut output, &db, 1).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Algebra [C-Algebra]\nClass: CLASS-A | No group\n"));
        assert!(output.contains("Thu 05-03-2026 - Morning - Theory, periods 4 -> 5"));
    }

    #[test]
    fn rejects_unknown_number() {
        let db = networks_db();
        let err = run(&mut Vec::new(), &db, 3).unwrap_err();
        assert!(err.to_string().contains("no option number 3"));
        let err = run(&mut Vec::new(), &db, 0).unwrap_err();
        assert!(err.to_string().contains("no option number 0"));
    }
}
