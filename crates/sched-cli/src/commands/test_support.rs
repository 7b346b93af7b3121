//! Fixtures shared by command tests.

use chrono::NaiveDate;

use sched_core::{Session, SessionDate, SubjectType, period_bounds};
use sched_db::Database;

/// A theory session of `subject` for class `CLASS-A` on March `day`, 2026.
pub fn theory(subject: &str, group: u32, day: u32, lesson_period: &str) -> Session {
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

pub fn practice(subject: &str, group: u32, day: u32, lesson_period: &str) -> Session {
    Session {
        subject_type: SubjectType::Practice,
        lecturer_name: "Tran B".to_string(),
        room: "Lab 2".to_string(),
        ..theory(subject, group, day, lesson_period)
    }
}

/// In-memory store holding `sessions` under class `CLASS-A`.
pub fn seeded_db(sessions: &[Session]) -> Database {
    let mut db = Database::open_in_memory().unwrap();
    db.replace_class_sessions("CLASS-A", sessions).unwrap();
    db
}
