//! Timetable planner CLI library.
//!
//! This crate provides the CLI interface for the timetable planner.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, SelectAction};
pub use config::Config;
