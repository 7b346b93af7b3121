//! Options command: the numbered listing `select` refers to.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use sched_core::{OptionKey, OptionSummary, Session, subjects};
use sched_db::Database;

use super::catalog::Catalog;

/// One listed option, as emitted by `--json`.
#[derive(Debug, Serialize)]
pub struct OptionEntry<'a> {
    pub number: usize,
    #[serde(flatten)]
    pub key: &'a OptionKey,
    pub label: String,
    pub selected: bool,
    #[serde(flatten)]
    pub summary: OptionSummary,
}

impl<'a> OptionEntry<'a> {
    pub fn new(catalog: &Catalog, number: usize, key: &'a OptionKey, sessions: &[Session]) -> Self {
        let summary = OptionSummary::of(sessions);
        Self {
            number,
            key,
            label: summary.label(key),
            selected: catalog.is_selected(key),
            summary,
        }
    }
}

/// Writes entries as a numbered list, or as a JSON array.
///
/// Selected options are marked with `*`.
pub fn write_entries<W: Write>(writer: &mut W, entries: &[OptionEntry<'_>], json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *writer, entries)?;
        writeln!(writer)?;
        return Ok(());
    }
    for entry in entries {
        let marker = if entry.selected { '*' } else { ' ' };
        writeln!(writer, "{marker} {:>3}. {}", entry.number, entry.label)?;
    }
    Ok(())
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    subject: Option<&str>,
    json: bool,
) -> Result<()> {
    let catalog = Catalog::load(db)?;
    let entries: Vec<OptionEntry<'_>> = catalog
        .numbered()
        .filter(|(_, key, _)| subject.is_none_or(|s| key.subject_name == s))
        .map(|(number, key, sessions)| OptionEntry::new(&catalog, number, key, sessions))
        .collect();

    if entries.is_empty() && !json {
        match subject {
            Some(s) if !catalog.options.is_empty() => {
                writeln!(writer, "No options for subject {s:?}.")?;
                writeln!(writer, "Subjects: {}", subjects(&catalog.options).join(", "))?;
            }
            _ => writeln!(writer, "No options. Run `sched import` first.")?,
        }
        return Ok(());
    }

    write_entries(writer, &entries, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{practice, seeded_db, theory};

    use insta::assert_snapshot;

    fn networks_db() -> Database {
        seeded_db(&[
            theory("Networks", 0, 2, "1 -> 3"),
            practice("Networks", 1, 3, "6 -> 8"),
            practice("Networks", 2, 4, "6 -> 8"),
            theory("Algebra", 0, 5, "4 -> 5"),
        ])
    }

    #[test]
    fn lists_options_in_key_order_with_selection_marker() {
        let mut db = networks_db();
        db.add_selection(&OptionKey::new("C-Networks", "Networks", "CLASS-A", 2))
            .unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, None, false).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
            1. Algebra (Theory) - No group - class CLASS-A - Nguyen A
            2. Networks (Theory + Practice) - Group 1 - class CLASS-A - Nguyen A, Tran B
        *   3. Networks (Theory + Practice) - Group 2 - class CLASS-A - Nguyen A, Tran B
        ");
    }

    #[test]
    fn subject_filter_keeps_original_numbers() {
        let db = networks_db();
        let mut output = Vec::new();
        run(&mut output, &db, Some("Networks"), false).unwrap();
        let output = String::from_utf8(output).unwrap();
        let numbers: Vec<&str> = output
            .lines()
            .map(|line| line.trim_start_matches([' ', '*']).split('.').next().unwrap())
            .collect();
        assert_eq!(numbers, vec!["2", "3"]);
    }

    #[test]
    fn unknown_subject_and_empty_store() {
        let db = networks_db();
        let mut output = Vec::new();
        run(&mut output, &db, Some("History"), false).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "No options for subject \"History\".\nSubjects: Algebra, Networks\n"
        );

        let empty = seeded_db(&[]);
        let mut output = Vec::new();
        run(&mut output, &empty, None, false).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "No options. Run `sched import` first.\n"
        );
    }

    #[test]
    fn json_output_flattens_key_and_summary() {
        let db = networks_db();
        let mut output = Vec::new();
        run(&mut output, &db, Some("Algebra"), true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let entry = &value[0];
        assert_eq!(entry["number"], 1);
        assert_eq!(entry["course_code"], "C-Algebra");
        assert_eq!(entry["group"], 0);
        assert_eq!(entry["selected"], false);
        assert_eq!(entry["session_count"], 1);
        assert_eq!(entry["subject_types"][0], "theory");
    }
}
