//! Course options: grouping sessions into selectable timetable units.
//!
//! A subject taught to one administrative class may be split into practice
//! groups. Every group attends the shared (group 0) sessions, so an option for
//! group `g` is the shared sessions followed by the sessions of `g` alone.
//! A subject with no groups yields a single group-0 option.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::session::{Session, SubjectType};

/// Identifies one selectable option.
///
/// Ordered by `(subject_name, class_name, group, course_code)`, which is the
/// order options are presented in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionKey {
    pub course_code: String,
    pub subject_name: String,
    pub class_name: String,
    pub group: u32,
}

impl OptionKey {
    pub fn new(
        course_code: impl Into<String>,
        subject_name: impl Into<String>,
        class_name: impl Into<String>,
        group: u32,
    ) -> Self {
        Self {
            course_code: course_code.into(),
            subject_name: subject_name.into(),
            class_name: class_name.into(),
            group,
        }
    }

    /// Partition a session falls into before splitting by group.
    fn partition_of(session: &Session) -> (&str, &str, &str) {
        (
            session.course_code.as_str(),
            session.subject_name.as_str(),
            session.class_name.as_str(),
        )
    }
}

impl Ord for OptionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.subject_name
            .cmp(&other.subject_name)
            .then_with(|| self.class_name.cmp(&other.class_name))
            .then_with(|| self.group.cmp(&other.group))
            .then_with(|| self.course_code.cmp(&other.course_code))
    }
}

impl PartialOrd for OptionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} / {} / group {}",
            self.course_code, self.subject_name, self.class_name, self.group
        )
    }
}

/// Options keyed in presentation order.
pub type OptionMap = BTreeMap<OptionKey, Vec<Session>>;

/// Groups sessions into course options.
///
/// Sessions are partitioned by `(course_code, subject_name, class_name)` and
/// then by group. Within each option the shared sessions come first, and each
/// part keeps its input order. Identical input sessions are kept as-is.
pub fn build_options(sessions: &[Session]) -> OptionMap {
    let mut partitions: HashMap<(&str, &str, &str), BTreeMap<u32, Vec<&Session>>> =
        HashMap::new();
    for session in sessions {
        partitions
            .entry(OptionKey::partition_of(session))
            .or_default()
            .entry(session.group)
            .or_default()
            .push(session);
    }

    let mut options = OptionMap::new();
    for ((course_code, subject_name, class_name), groups) in partitions {
        let shared: &[&Session] = groups.get(&0).map_or(&[], Vec::as_slice);
        let mut own_groups = groups.iter().filter(|(group, _)| **group != 0).peekable();

        if own_groups.peek().is_none() {
            options.insert(
                OptionKey::new(course_code, subject_name, class_name, 0),
                shared.iter().map(|s| (*s).clone()).collect(),
            );
            continue;
        }

        for (group, own) in own_groups {
            let option = shared.iter().chain(own).map(|s| (*s).clone()).collect();
            options.insert(
                OptionKey::new(course_code, subject_name, class_name, *group),
                option,
            );
        }
    }

    tracing::debug!(
        sessions = sessions.len(),
        options = options.len(),
        "built course options"
    );
    options
}

/// Returns the distinct subject names in sorted order.
pub fn subjects(options: &OptionMap) -> Vec<&str> {
    options
        .keys()
        .map(|key| key.subject_name.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Looks up the sessions of one option.
pub fn option_sessions<'a>(
    options: &'a OptionMap,
    key: &OptionKey,
) -> Result<&'a [Session], ScheduleError> {
    options
        .get(key)
        .map(Vec::as_slice)
        .ok_or_else(|| ScheduleError::UnknownOption(key.clone()))
}

/// Display information derived from an option's sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionSummary {
    /// Distinct session kinds, sorted.
    pub subject_types: Vec<SubjectType>,
    /// Distinct non-empty lecturer names, sorted.
    pub lecturers: Vec<String>,
    pub session_count: usize,
}

impl OptionSummary {
    pub fn of(sessions: &[Session]) -> Self {
        let subject_types = sessions
            .iter()
            .map(|s| s.subject_type)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let lecturers = sessions
            .iter()
            .map(|s| s.lecturer_name.trim())
            .filter(|name| !name.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            subject_types,
            lecturers,
            session_count: sessions.len(),
        }
    }

    /// One-line label: `Networks (Theory + Practice) - Group 1 - class D20 - Lecturer A`.
    pub fn label(&self, key: &OptionKey) -> String {
        let types = if self.subject_types.is_empty() {
            "Unknown type".to_string()
        } else {
            self.subject_types
                .iter()
                .map(SubjectType::label)
                .collect::<Vec<_>>()
                .join(" + ")
        };
        let group = if key.group == 0 {
            "No group".to_string()
        } else {
            format!("Group {}", key.group)
        };
        let lecturers = if self.lecturers.is_empty() {
            "No lecturer listed".to_string()
        } else {
            self.lecturers.join(", ")
        };
        format!(
            "{} ({types}) - {group} - class {} - {lecturers}",
            key.subject_name, key.class_name
        )
    }
}

/// Sessions gathered for a selection, with keys that no longer resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSelection {
    pub sessions: Vec<Session>,
    /// Selected keys absent from the option map; callers should drop them.
    pub stale: Vec<OptionKey>,
}

/// Concatenates the sessions of the selected keys, in selection order.
pub fn resolve_selection(options: &OptionMap, selected: &[OptionKey]) -> ResolvedSelection {
    let mut resolved = ResolvedSelection::default();
    for key in selected {
        match options.get(key) {
            Some(sessions) => resolved.sessions.extend(sessions.iter().cloned()),
            None => {
                tracing::warn!(key = %key, "selected option no longer exists");
                resolved.stale.push(key.clone());
            }
        }
    }
    resolved
}
