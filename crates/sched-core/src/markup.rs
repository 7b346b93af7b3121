//! Extraction of sessions from saved portal schedule pages.
//!
//! Each saved page holds the schedule of one administrative class, and the
//! file stem is the class name. Rows live in `table.table-lich_hoc` tables with
//! six leading cells: course code, subject, period range, lecturer, room, and
//! the date text.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScheduleError;
use crate::period::period_bounds;
use crate::session::{Session, SessionDate, SubjectType};

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.table-lich_hoc tr").unwrap());

static CELL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// `Name (Kind: N periods) [Nhóm g]`, where the last parenthesised part is the kind.
static SUBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.*?)\s*\((?P<kind>[^()]*)\)\s*(?:(?i:nhóm)\s*(?P<group>\S+))?\s*$")
        .unwrap()
});

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{2}-\d{2}-\d{4}").unwrap());

/// Minimum cells a row needs to describe a session.
const MIN_CELLS: usize = 6;

/// Sessions parsed from one class's saved page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSchedule {
    pub class_name: String,
    pub sessions: Vec<Session>,
}

/// Joins an element's text nodes with single spaces, dropping blank nodes.
fn cell_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits subject cell text into the subject name and group number.
///
/// Text without a trailing parenthesised kind is returned whole with group 0,
/// as is a group label that is not a number.
pub fn split_subject(text: &str) -> (String, u32) {
    let Some(caps) = SUBJECT_RE.captures(text) else {
        return (text.trim().to_string(), 0);
    };
    let group = caps
        .name("group")
        .and_then(|g| g.as_str().parse().ok())
        .unwrap_or(0);
    (caps["name"].trim().to_string(), group)
}

fn subject_type_of(text: &str) -> SubjectType {
    if text.contains("Lý thuyết") {
        SubjectType::Theory
    } else {
        SubjectType::Practice
    }
}

fn date_of(text: &str) -> SessionDate {
    DATE_RE
        .find(text)
        .map_or_else(|| SessionDate::parse(text), |m| SessionDate::parse(m.as_str()))
}

/// Parses every session row in a saved schedule page.
///
/// Rows without enough cells and "end of course" rows are skipped.
pub fn parse_schedule_html(html: &str, class_name: &str) -> Vec<Session> {
    let document = Html::parse_document(html);
    let mut sessions = Vec::new();

    for row in document.select(&ROW_SELECTOR) {
        let cells: Vec<String> = row.select(&CELL_SELECTOR).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }
        if cells.len() < MIN_CELLS {
            tracing::debug!(class = class_name, cells = cells.len(), "skipping short row");
            continue;
        }
        if cells[1].to_lowercase().contains("kết thúc") {
            continue;
        }

        let (subject_name, group) = split_subject(&cells[1]);
        let lesson_period = cells[2].clone();
        let (start, end) = period_bounds(&lesson_period);
        let date = date_of(&cells[5]);
        if let SessionDate::Unparsed(raw) = &date {
            tracing::warn!(class = class_name, subject = %subject_name, date = %raw, "unrecognised date");
        }

        sessions.push(Session {
            course_code: cells[0].clone(),
            subject_name,
            subject_type: subject_type_of(&cells[1]),
            group,
            lesson_period,
            lecturer_name: cells[3].clone(),
            room: cells[4].clone(),
            class_name: class_name.to_string(),
            date,
            start,
            end,
        });
    }

    sessions
}

/// Reads and parses one saved page.
pub fn parse_html_file(path: &Path, class_name: &str) -> Result<Vec<Session>, ScheduleError> {
    let html = fs::read_to_string(path).map_err(|source| ScheduleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_schedule_html(&html, class_name))
}

/// Parses every `*.html` page in `dir`, one class per file.
///
/// Files are parsed in parallel. Unreadable files are logged and skipped.
/// Results are sorted by class name.
pub fn load_class_dir(dir: &Path) -> Result<Vec<ClassSchedule>, ScheduleError> {
    let io_err = |source: std::io::Error| ScheduleError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut pages: Vec<(PathBuf, String)> = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_html = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
        if !is_html {
            continue;
        }
        let Some(class_name) = path.file_stem().and_then(|s| s.to_str()) else {
            tracing::warn!(path = ?path, "skipping page with non UTF-8 name");
            continue;
        };
        let class_name = class_name.to_string();
        pages.push((path, class_name));
    }

    let mut schedules: Vec<ClassSchedule> = pages
        .par_iter()
        .filter_map(|(path, class_name)| match parse_html_file(path, class_name) {
            Ok(sessions) => Some(ClassSchedule {
                class_name: class_name.clone(),
                sessions,
            }),
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "skipping unreadable page");
                None
            }
        })
        .collect();

    schedules.sort_by(|a, b| a.class_name.cmp(&b.class_name));
    Ok(schedules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    const PAGE: &str = r#"
<html><body>
<table class="table-lich_hoc">
  <tr><th>Mã HP</th><th>Tên môn</th><th>Tiết</th><th>Giảng viên</th><th>Phòng</th><th>Thời gian</th></tr>
  <tr>
    <td>010100472805</td>
    <td>Quản trị mạng<br>(Lý thuyết: 30 tiết)</td>
    <td>1 -> 3</td>
    <td>Nguyễn Văn A</td>
    <td>A101</td>
    <td>Từ: 10-03-2026<br>Đến: 10-03-2026</td>
  </tr>
  <tr>
    <td>010100472805</td>
    <td>Quản trị mạng (Thực hành: 48 tiết) Nhóm 2</td>
    <td>6 -> 8</td>
    <td>Trần Thị B</td>
    <td>Lab 3</td>
    <td>Thứ 5 (12-03-2026)</td>
  </tr>
  <tr>
    <td>010100472805</td>
    <td>Kết thúc học phần</td>
    <td></td><td></td><td></td><td></td>
  </tr>
  <tr><td>short</td><td>row</td></tr>
</table>
<table class="other"><tr><td>1</td><td>2</td><td>3</td><td>4</td><td>5</td><td>6</td></tr></table>
</body></html>
"#;

    #[test]
    fn parses_theory_and_practice_rows() {
        let sessions = parse_schedule_html(PAGE, "D20CQCN01-N");
        assert_eq!(sessions.len(), 2);

        let theory = &sessions[0];
        assert_eq!(theory.course_code, "010100472805");
        assert_eq!(theory.subject_name, "Quản trị mạng");
        assert_eq!(theory.subject_type, SubjectType::Theory);
        assert_eq!(theory.group, 0);
        assert_eq!(theory.lesson_period, "1 -> 3");
        assert_eq!(theory.lecturer_name, "Nguyễn Văn A");
        assert_eq!(theory.room, "A101");
        assert_eq!(theory.class_name, "D20CQCN01-N");
        assert_eq!(theory.date.to_string(), "10-03-2026");
        assert_eq!(theory.start, NaiveTime::from_hms_opt(7, 0, 0).unwrap());
        assert_eq!(theory.end, NaiveTime::from_hms_opt(9, 40, 0).unwrap());

        let practice = &sessions[1];
        assert_eq!(practice.subject_name, "Quản trị mạng");
        assert_eq!(practice.subject_type, SubjectType::Practice);
        assert_eq!(practice.group, 2);
        assert_eq!(practice.date.to_string(), "12-03-2026");
        assert_eq!(practice.start, NaiveTime::from_hms_opt(12, 30, 0).unwrap());
    }

    #[test]
    fn split_subject_variants() {
        assert_eq!(
            split_subject("Tiếng Anh (B1) (Lý thuyết: 30 tiết)"),
            ("Tiếng Anh (B1)".to_string(), 0)
        );
        assert_eq!(
            split_subject("Mạng máy tính (Thực hành: 30 tiết) nhóm 12"),
            ("Mạng máy tính".to_string(), 12)
        );
        assert_eq!(
            split_subject("Đồ án (Thực hành: 30 tiết) Nhóm X"),
            ("Đồ án".to_string(), 0)
        );
        assert_eq!(split_subject("Plain name"), ("Plain name".to_string(), 0));
    }

    #[test]
    fn unrecognised_date_is_kept_verbatim() {
        let page = r#"<table class="table-lich_hoc"><tr>
            <td>X1</td><td>Algebra (Lý thuyết: 30 tiết)</td><td>1 -> 2</td>
            <td>L</td><td>R</td><td>Thứ 2</td></tr></table>"#;
        let sessions = parse_schedule_html(page, "C1");
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].date, SessionDate::Unparsed("Thứ 2".to_string()));
    }

    #[test]
    fn load_class_dir_uses_file_stem_as_class() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("D20CN02.html"), PAGE).unwrap();
        fs::write(dir.path().join("D20CN01.HTML"), PAGE).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let schedules = load_class_dir(dir.path()).unwrap();
        let classes: Vec<&str> = schedules.iter().map(|c| c.class_name.as_str()).collect();
        assert_eq!(classes, vec!["D20CN01", "D20CN02"]);
        assert!(schedules.iter().all(|c| c.sessions.len() == 2));
        assert!(
            schedules[1]
                .sessions
                .iter()
                .all(|s| s.class_name == "D20CN02")
        );
    }

    #[test]
    fn load_class_dir_reports_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(matches!(
            load_class_dir(&missing),
            Err(ScheduleError::Io { .. })
        ));
    }
}
