//! CLI subcommand implementations.

pub mod available;
pub mod catalog;
pub mod conflicts;
pub mod export;
pub mod grid;
pub mod import;
pub mod options;
pub mod select;
pub mod show;
pub mod status;

#[cfg(test)]
mod test_support;
