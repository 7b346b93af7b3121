//! Available command: options that still fit beside the current selection.

use std::io::Write;

use anyhow::Result;

use sched_core::{available_options, option_sessions};
use sched_db::Database;

use super::catalog::Catalog;
use super::options::{OptionEntry, write_entries};

pub fn run<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let catalog = Catalog::load(db)?;
    let selection = catalog.live_selection();
    let keys = available_options(&catalog.options, &selection);

    let mut entries = Vec::with_capacity(keys.len());
    for key in keys {
        let Some(number) = catalog.number_of(key) else {
            continue;
        };
        let sessions = option_sessions(&catalog.options, key)?;
        entries.push(OptionEntry::new(&catalog, number, key, sessions));
    }

    if entries.is_empty() && !json {
        writeln!(writer, "No options fit the current selection.")?;
        return Ok(());
    }
    write_entries(writer, &entries, json)
}
