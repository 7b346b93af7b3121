//! Stored sessions rebuilt into numbered options, plus the saved selection.

use std::io::Write;

use anyhow::{Context, Result, bail};

use sched_core::{OptionKey, OptionMap, Session, build_options, resolve_selection};
use sched_db::Database;

/// Options as currently derivable from the store.
///
/// Options are numbered from 1 in key order; the numbers are what `select`
/// takes.
pub struct Catalog {
    pub options: OptionMap,
    pub selection: Vec<OptionKey>,
}

impl Catalog {
    pub fn load(db: &Database) -> Result<Self> {
        let sessions = db.list_sessions().context("failed to load sessions")?;
        let selection = db.load_selection().context("failed to load selection")?;
        Ok(Self {
            options: build_options(&sessions),
            selection,
        })
    }

    /// Options with their 1-based numbers.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &OptionKey, &[Session])> {
        self.options
            .iter()
            .enumerate()
            .map(|(idx, (key, sessions))| (idx + 1, key, sessions.as_slice()))
    }

    pub fn number_of(&self, key: &OptionKey) -> Option<usize> {
        self.options.keys().position(|k| k == key).map(|idx| idx + 1)
    }

    pub fn key_at(&self, number: usize) -> Result<&OptionKey> {
        let Some(key) = number
            .checked_sub(1)
            .and_then(|idx| self.options.keys().nth(idx))
        else {
            bail!(
                "no option number {number} (run `sched options`; {} available)",
                self.options.len()
            );
        };
        Ok(key)
    }

    pub fn is_selected(&self, key: &OptionKey) -> bool {
        self.selection.contains(key)
    }

    /// Selected keys that still resolve to an option.
    pub fn live_selection(&self) -> Vec<OptionKey> {
        self.selection
            .iter()
            .filter(|key| self.options.contains_key(*key))
            .cloned()
            .collect()
    }
}

/// Resolves the selection to sessions, dropping stale keys from the store.
///
/// Each dropped key is reported on `writer`.
pub fn selected_sessions<W: Write>(
    writer: &mut W,
    db: &mut Database,
    catalog: &mut Catalog,
) -> Result<Vec<Session>> {
    let resolved = resolve_selection(&catalog.options, &catalog.selection);
    if !resolved.stale.is_empty() {
        let valid: Vec<OptionKey> = catalog.options.keys().cloned().collect();
        db.retain_selection(&valid)
            .context("failed to drop stale selections")?;
        for key in &resolved.stale {
            writeln!(writer, "Dropped stale selection: {key}")?;
        }
        catalog.selection = catalog.live_selection();
    }
    Ok(resolved.sessions)
}
