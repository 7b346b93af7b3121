//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use sched_core::CalendarZone;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Directory `import` reads saved schedule pages from.
    pub html_dir: PathBuf,
    /// Directory `export` and `grid` write to.
    pub output_dir: PathBuf,
    /// Zone exported events are expressed in.
    pub timezone: CalendarZone,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("sched.db"),
            html_dir: PathBuf::from("html_all_classes"),
            output_dir: PathBuf::from("ics_output"),
            timezone: CalendarZone::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, the user config file, `config_path`, then
    /// `SCHED_*` environment variables (nested keys split on `__`, e.g.
    /// `SCHED_TIMEZONE__TZID`).
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("SCHED_").split("__"));

        figment.extract()
    }

    /// Default export destination.
    pub fn ics_path(&self) -> PathBuf {
        self.output_dir.join("timetable.ics")
    }

    /// Default grid destination.
    pub fn grid_path(&self) -> PathBuf {
        self.output_dir.join("timetable.html")
    }
}

/// Returns the platform-specific config directory for sched.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sched"))
}

/// Returns the platform-specific data directory for sched.
///
/// On Linux: `~/.local/share/sched`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("sched"))
}
