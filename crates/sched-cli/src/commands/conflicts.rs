//! Conflicts command: overlapping sessions within the selection.

use std::io::Write;

use anyhow::Result;

use sched_core::{Conflict, Session, find_conflicts};
use sched_db::Database;

use super::catalog::{Catalog, selected_sessions};

fn describe(session: &Session) -> String {
    let group = if session.group == 0 {
        String::new()
    } else {
        format!(", group {}", session.group)
    };
    format!(
        "{} {} ({}{group}, {})",
        session.time_range(),
        session.subject_name,
        session.subject_type,
        session.class_name
    )
}

/// Writes one line per conflicting pair.
pub fn write_conflicts<W: Write>(writer: &mut W, conflicts: &[Conflict<'_>]) -> Result<()> {
    for conflict in conflicts {
        writeln!(
            writer,
            "{}: {} <-> {}",
            conflict.first.date,
            describe(conflict.first),
            describe(conflict.second)
        )?;
    }
    Ok(())
}

/// Returns the number of conflicting pairs found.
pub fn run<W: Write>(writer: &mut W, db: &mut Database) -> Result<usize> {
    let mut catalog = Catalog::load(db)?;
    let sessions = selected_sessions(writer, db, &mut catalog)?;
    if catalog.selection.is_empty() {
        writeln!(writer, "Nothing selected.")?;
        return Ok(0);
    }

    let conflicts = find_conflicts(&sessions);
    if conflicts.is_empty() {
        writeln!(writer, "No conflicts.")?;
    } else {
        writeln!(writer, "Found {} conflicts:", conflicts.len())?;
        write_conflicts(writer, &conflicts)?;
    }
    Ok(conflicts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{practice, seeded_db, theory};

    use insta::assert_snapshot;
    use sched_core::OptionKey;

    #[test]
    fn lists_each_overlapping_pair_once() {
        let mut db = seeded_db(&[
            theory("Algebra", 0, 2, "2 -> 3"),
            theory("Networks", 0, 2, "1 -> 2"),
            practice("Networks", 1, 3, "6 -> 8"),
        ]);
        db.add_selection(&OptionKey::new("C-Networks", "Networks", "CLASS-A", 1))
            .unwrap();
        db.add_selection(&OptionKey::new("C-Algebra", "Algebra", "CLASS-A", 0))
            .unwrap();

        let mut output = Vec::new();
        let count = run(&mut output, &mut db).unwrap();
        assert_eq!(count, 1);
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Found 1 conflicts:
        02-03-2026: 07:00 - 08:45 Networks (theory, CLASS-A) <-> 07:55 - 09:40 Algebra (theory, CLASS-A)
        ");
    }

    #[test]
    fn consecutive_sessions_do_not_conflict() {
        let mut db = seeded_db(&[
            theory("Algebra", 0, 2, "1 -> 2"),
            theory("History", 0, 2, "3 -> 4"),
        ]);
        db.add_selection(&OptionKey::new("C-Algebra", "Algebra", "CLASS-A", 0))
            .unwrap();
        db.add_selection(&OptionKey::new("C-History", "History", "CLASS-A", 0))
            .unwrap();

        let mut output = Vec::new();
        assert_eq!(run(&mut output, &mut db).unwrap(), 0);
        assert_eq!(String::from_utf8(output).unwrap(), "No conflicts.\n");
    }

    #[test]
    fn stale_only_selection_reports_nothing_selected() {
        let mut db = seeded_db(&[theory("Algebra", 0, 2, "1 -> 2")]);
        db.add_selection(&OptionKey::new("C-Gone", "Gone", "CLASS-A", 0))
            .unwrap();

        let mut output = Vec::new();
        assert_eq!(run(&mut output, &mut db).unwrap(), 0);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Dropped stale selection: [C-Gone] Gone / CLASS-A / group 0\nNothing selected.\n"
        );
    }
}
