//! Fixtures shared by unit tests.

use chrono::{NaiveDate, NaiveTime};

use crate::period::period_bounds;
use crate::session::{Session, SessionDate, SubjectType};

pub fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

/// A theory session of `subject` for class `CLASS-A` on March `day`, 2026.
///
/// Course code is `C-{subject}`; clock times follow the period table.
pub fn session(subject: &str, group: u32, day: u32, lesson_period: &str) -> Session {
    let (start, end) = period_bounds(lesson_period);
    Session {
        course_code: format!("C-{subject}"),
        subject_name: subject.to_string(),
        subject_type: SubjectType::Theory,
        group,
        lesson_period: lesson_period.to_string(),
        lecturer_name: "Nguyen A".to_string(),
        room: "A101".to_string(),
        class_name: "CLASS-A".to_string(),
        date: SessionDate::Day(NaiveDate::from_ymd_opt(2026, 3, day).unwrap()),
        start,
        end,
    }
}
