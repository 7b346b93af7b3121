//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Timetable planner.
///
/// Imports saved class schedule pages, lists the options each subject can be
/// taken in, checks the chosen options for clashes and exports them as a
/// calendar.
#[derive(Debug, Parser)]
#[command(name = "sched", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse saved schedule pages and store their sessions.
    Import {
        /// Directory of `*.html` pages, one per class (defaults to `html_dir`).
        dir: Option<PathBuf>,
    },

    /// List every option, numbered for `select`.
    Options {
        /// Only show options of this subject.
        #[arg(long)]
        subject: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List options that still fit the current selection.
    Available {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Manage the selected options.
    #[command(subcommand)]
    Select(SelectAction),

    /// Show every session of one option.
    Show {
        /// Option number from `sched options`.
        number: usize,
    },

    /// Report overlapping sessions in the current selection.
    Conflicts,

    /// Write the selection as an iCalendar file.
    Export {
        /// Destination file (defaults to `<output_dir>/timetable.ics`).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export even if the selection has conflicts.
        #[arg(long)]
        force: bool,
    },

    /// Write the selection as a weekly HTML grid.
    Grid {
        /// Destination file (defaults to `<output_dir>/timetable.html`).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show what is stored.
    Status,
}

/// Selection subcommands.
#[derive(Debug, Subcommand)]
pub enum SelectAction {
    /// Add options by their number in `sched options`.
    Add {
        #[arg(required = true)]
        numbers: Vec<usize>,
    },
    /// Remove options by their number in `sched options`.
    Remove {
        #[arg(required = true)]
        numbers: Vec<usize>,
    },
    /// List the selected options in the order they were chosen.
    List,
    /// Remove every selected option.
    Clear,
}
