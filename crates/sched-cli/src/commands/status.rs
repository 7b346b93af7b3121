//! Status command for showing what is stored.

use std::io::Write;

use anyhow::Result;

use sched_db::Database;

use super::catalog::Catalog;
use crate::Config;

pub fn run<W: Write>(writer: &mut W, db: &Database, config: &Config) -> Result<()> {
    let classes = db.list_classes()?;
    let catalog = Catalog::load(db)?;
    let live = catalog.live_selection().len();
    let stale = catalog.selection.len() - live;

    writeln!(writer, "Timetable status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;

    if classes.is_empty() {
        writeln!(writer, "No classes imported.")?;
    } else {
        writeln!(writer, "Classes:")?;
        for class in &classes {
            writeln!(
                writer,
                "- {}: {} sessions (imported {})",
                class.name, class.session_count, class.imported_at
            )?;
        }
    }

    writeln!(writer, "Sessions: {}", db.session_count()?)?;
    writeln!(writer, "Options: {}", catalog.options.len())?;
    writeln!(writer, "Selected: {live}")?;
    if stale > 0 {
        writeln!(
            writer,
            "Stale selections: {stale} (dropped by the next `sched import`, `sched conflicts`, `sched export` or `sched grid`)"
        )?;
    }
    Ok(())
}
