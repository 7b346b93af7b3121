//! Select command for editing the saved selection.

use std::io::Write;

use anyhow::Result;

use sched_core::{OptionSummary, conflicts_with_selection, option_sessions, resolve_selection};
use sched_db::Database;

use super::catalog::Catalog;
use crate::SelectAction;

pub fn run<W: Write>(writer: &mut W, db: &mut Database, action: &SelectAction) -> Result<()> {
    match action {
        SelectAction::Add { numbers } => add(writer, db, numbers),
        SelectAction::Remove { numbers } => remove(writer, db, numbers),
        SelectAction::List => list(writer, db),
        SelectAction::Clear => {
            let cleared = db.clear_selection()?;
            writeln!(writer, "Cleared {cleared} selections.")?;
            Ok(())
        }
    }
}

fn label(catalog: &Catalog, number: usize) -> Result<String> {
    let key = catalog.key_at(number)?;
    let sessions = option_sessions(&catalog.options, key)?;
    Ok(format!("{number}. {}", OptionSummary::of(sessions).label(key)))
}

/// Adds options one at a time, so later numbers see earlier additions.
///
/// A second option for an already selected subject is skipped. An option
/// that clashes with the selection is added with a warning.
fn add<W: Write>(writer: &mut W, db: &mut Database, numbers: &[usize]) -> Result<()> {
    let mut catalog = Catalog::load(db)?;
    // Validate every number before touching the store.
    for &number in numbers {
        catalog.key_at(number)?;
    }

    for &number in numbers {
        let key = catalog.key_at(number)?.clone();
        let line = label(&catalog, number)?;

        if db.is_selected(&key)? {
            writeln!(writer, "Already selected: {line}")?;
            continue;
        }
        let live = catalog.live_selection();
        if let Some(other) = live.iter().find(|k| k.subject_name == key.subject_name) {
            let other_number = catalog.number_of(other).unwrap_or_default();
            writeln!(
                writer,
                "Skipped {line} ({} is already selected as {other_number})",
                key.subject_name
            )?;
            continue;
        }

        let selected = resolve_selection(&catalog.options, &live).sessions;
        let candidate = option_sessions(&catalog.options, &key)?;
        let clashes = conflicts_with_selection(&selected, candidate);

        db.add_selection(&key)?;
        catalog.selection.push(key);
        if clashes {
            writeln!(writer, "Added {line} (conflicts with the current selection)")?;
        } else {
            writeln!(writer, "Added {line}")?;
        }
    }
    Ok(())
}

fn remove<W: Write>(writer: &mut W, db: &mut Database, numbers: &[usize]) -> Result<()> {
    let catalog = Catalog::load(db)?;
    for &number in numbers {
        catalog.key_at(number)?;
    }

    for &number in numbers {
        let key = catalog.key_at(number)?;
        let line = label(&catalog, number)?;
        if db.remove_selection(key)? {
            writeln!(writer, "Removed {line}")?;
        } else {
            writeln!(writer, "Not selected: {line}")?;
        }
    }
    Ok(())
}

fn list<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let catalog = Catalog::load(db)?;
    if catalog.selection.is_empty() {
        writeln!(writer, "Nothing selected.")?;
        return Ok(());
    }
    for key in &catalog.selection {
        match catalog.number_of(key) {
            Some(number) => writeln!(writer, "{}", label(&catalog, number)?)?,
            None => writeln!(writer, "stale: {key}")?,
        }
    }
    Ok(())
}
