use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sched_cli::commands::{available, conflicts, export, grid, import, options, select, show, status};
use sched_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(sched_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = sched_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Import { dir } => {
            let dir = dir.as_deref().unwrap_or(&config.html_dir);
            import::run(&mut out, &mut db, dir)?;
        }
        Commands::Options { subject, json } => {
            options::run(&mut out, &db, subject.as_deref(), *json)?;
        }
        Commands::Available { json } => available::run(&mut out, &db, *json)?,
        Commands::Select(action) => select::run(&mut out, &mut db, action)?,
        Commands::Show { number } => show::run(&mut out, &db, *number)?,
        Commands::Conflicts => {
            conflicts::run(&mut out, &mut db)?;
        }
        Commands::Export { output, force } => {
            export::run(&mut out, &mut db, &config, output.as_deref(), *force)?;
        }
        Commands::Grid { output } => {
            grid::run(&mut out, &mut db, &config, output.as_deref())?;
        }
        Commands::Status => status::run(&mut out, &db, &config)?,
    }

    out.flush()?;
    Ok(())
}
