//! Error types for the reconciliation engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::options::OptionKey;

/// Errors raised by schedule operations.
///
/// Most core operations are total and never return these; they surface from
/// strict decoding, option lookup, and reading saved markup.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// A session field could not be decoded.
    #[error("malformed schedule data in {field}: {value:?}")]
    MalformedScheduleData { field: &'static str, value: String },

    /// An option key is not present in the current option map.
    ///
    /// Usually means the key was selected before a reload changed the data.
    #[error("unknown option: {0}")]
    UnknownOption(OptionKey),

    /// Failed to read saved markup.
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
