//! Session records: one scheduled meeting of a class.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// Date format used by the portal (`dd-mm-yyyy`).
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Kind of teaching session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubjectType {
    Theory,
    Practice,
}

impl SubjectType {
    /// Stable identifier used for storage and JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Theory => "theory",
            Self::Practice => "practice",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Theory => "Theory",
            Self::Practice => "Practice",
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectType {
    type Err = UnknownSubjectType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "theory" | "Theory" | "Lý thuyết" => Ok(Self::Theory),
            "practice" | "Practice" | "Thực hành" => Ok(Self::Practice),
            other => Err(UnknownSubjectType(other.to_string())),
        }
    }
}

impl Serialize for SubjectType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SubjectType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown subject type strings.
#[derive(Debug, Clone)]
pub struct UnknownSubjectType(String);

impl fmt::Display for UnknownSubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown subject type: {}", self.0)
    }
}

impl std::error::Error for UnknownSubjectType {}

/// Calendar date of a session.
///
/// Dates that fail to decode are kept verbatim instead of rejected, so a single
/// bad row cannot take down the whole schedule. Ordering is total: decoded days
/// come first in chronological order, then unparsed values by their raw text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionDate {
    Day(NaiveDate),
    Unparsed(String),
}

impl SessionDate {
    /// Decodes a `dd-mm-yyyy` date, keeping anything else as [`SessionDate::Unparsed`].
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map_or_else(|_| Self::Unparsed(trimmed.to_string()), Self::Day)
    }

    /// Returns the decoded day, if any.
    #[must_use]
    pub const fn day(&self) -> Option<NaiveDate> {
        match self {
            Self::Day(day) => Some(*day),
            Self::Unparsed(_) => None,
        }
    }

    /// Returns the decoded day or a [`ScheduleError::MalformedScheduleData`].
    pub fn strict(&self) -> Result<NaiveDate, ScheduleError> {
        match self {
            Self::Day(day) => Ok(*day),
            Self::Unparsed(raw) => Err(ScheduleError::MalformedScheduleData {
                field: "date",
                value: raw.clone(),
            }),
        }
    }
}

impl From<NaiveDate> for SessionDate {
    fn from(day: NaiveDate) -> Self {
        Self::Day(day)
    }
}

impl Ord for SessionDate {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Day(a), Self::Day(b)) => a.cmp(b),
            (Self::Day(_), Self::Unparsed(_)) => Ordering::Less,
            (Self::Unparsed(_), Self::Day(_)) => Ordering::Greater,
            (Self::Unparsed(a), Self::Unparsed(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for SessionDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SessionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day(day) => write!(f, "{}", day.format(DATE_FORMAT)),
            Self::Unparsed(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for SessionDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SessionDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// One scheduled meeting of a class, as produced by the markup parser.
///
/// Sessions have no identity beyond their fields; two identical records are
/// indistinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    pub course_code: String,
    pub subject_name: String,
    pub subject_type: SubjectType,
    /// Practice group number; 0 means shared by every group.
    pub group: u32,
    /// Period range as shown by the portal, e.g. `"1 -> 3"`.
    pub lesson_period: String,
    pub lecturer_name: String,
    pub room: String,
    /// Administrative class the schedule was fetched for.
    pub class_name: String,
    pub date: SessionDate,
    #[serde(with = "clock")]
    pub start: NaiveTime,
    #[serde(with = "clock")]
    pub end: NaiveTime,
}

impl Session {
    /// Sort key used by the conflict sweep.
    #[must_use]
    pub const fn sweep_key(&self) -> (&SessionDate, NaiveTime, NaiveTime) {
        (&self.date, self.start, self.end)
    }

    /// Formats the time range as `HH:MM - HH:MM`.
    #[must_use]
    pub fn time_range(&self) -> String {
        format!("{} - {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Serde adapter for the portal's `HHMMSS` clock format.
pub mod clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Clock format used by the portal.
    pub const FORMAT: &str = "%H%M%S";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid clock time: {s}")))
    }

    /// Parses `HHMMSS`, `HH:MM:SS` or `HH:MM`.
    pub fn parse(s: &str) -> Option<NaiveTime> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .ok()
    }
}
