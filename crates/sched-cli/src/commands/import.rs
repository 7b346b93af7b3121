//! Import command for loading saved schedule pages into the local `SQLite` store.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use sched_core::{OptionKey, build_options, load_class_dir};
use sched_db::Database;

/// Parses every page in `dir` and replaces each class's stored sessions.
///
/// Selected options that the new data no longer produces are dropped.
/// Returns the number of sessions stored.
pub fn run<W: Write>(writer: &mut W, db: &mut Database, dir: &Path) -> Result<usize> {
    let schedules = load_class_dir(dir)
        .with_context(|| format!("failed to read schedule pages from {}", dir.display()))?;

    if schedules.is_empty() {
        writeln!(writer, "No schedule pages found in {}.", dir.display())?;
        return Ok(0);
    }

    let mut total = 0;
    for schedule in &schedules {
        let stored = db
            .replace_class_sessions(&schedule.class_name, &schedule.sessions)
            .with_context(|| format!("failed to store class {}", schedule.class_name))?;
        writeln!(writer, "{}: {stored} sessions", schedule.class_name)?;
        total += stored;
    }
    writeln!(
        writer,
        "Imported {total} sessions from {} classes.",
        schedules.len()
    )?;

    let sessions = db.list_sessions().context("failed to reload sessions")?;
    let valid: Vec<OptionKey> = build_options(&sessions).into_keys().collect();
    for key in db.retain_selection(&valid)? {
        writeln!(writer, "Dropped stale selection: {key}")?;
    }

    tracing::info!(sessions = total, classes = schedules.len(), "import finished");
    Ok(total)
}
