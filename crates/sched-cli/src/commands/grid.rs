//! Grid command: writes the selection as a static weekly HTML timetable.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Duration;

use sched_core::{Session, SubjectType, TimeOfDay, WeekGrid};
use sched_db::Database;

use super::catalog::{Catalog, selected_sessions};
use crate::Config;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const STYLE: &str = "\
body { font-family: sans-serif; margin: 1.5em; }
table { border-collapse: collapse; width: 100%; margin-bottom: 2em; table-layout: fixed; }
th, td { border: 1px solid #bbb; padding: 4px; vertical-align: top; }
th { background: #eee; }
.session { border-radius: 4px; padding: 4px; margin-bottom: 4px; font-size: 0.85em; }
.theory { background: #dbeafe; }
.practice { background: #dcfce7; }
";

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn session_block(out: &mut String, session: &Session) {
    let class = match session.subject_type {
        SubjectType::Theory => "theory",
        SubjectType::Practice => "practice",
    };
    let group = if session.group == 0 {
        String::new()
    } else {
        format!(" | Group {}", session.group)
    };
    out.push_str(&format!(
        "<div class=\"session {class}\"><strong>{}</strong><br>{}<br>{} | {}{}<br>{}</div>",
        escape(&session.subject_name),
        session.time_range(),
        escape(&session.room),
        session.subject_type.label(),
        escape(&group),
        escape(&session.lecturer_name),
    ));
}

/// Renders one table per week: rows are parts of the day, columns Mon..Sun.
pub fn render_grid_html(grid: &WeekGrid<'_>) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Timetable</title>\n<style>\n");
    out.push_str(STYLE);
    out.push_str("</style>\n</head>\n<body>\n<h1>Timetable</h1>\n");

    if grid.is_empty() {
        out.push_str("<p>No sessions with a known date.</p>\n");
    }

    for (monday, week) in grid.weeks() {
        out.push_str(&format!("<h2>Week of {}</h2>\n", monday.format("%d-%m-%Y")));
        out.push_str("<table>\n<tr><th></th>");
        for (offset, name) in (0_i64..).zip(WEEKDAYS) {
            let day = *monday + Duration::days(offset);
            out.push_str(&format!("<th>{name}<br>{}</th>", day.format("%d-%m")));
        }
        out.push_str("</tr>\n");

        for slot in TimeOfDay::ALL {
            out.push_str(&format!("<tr><th>{}</th>", slot.label()));
            for weekday in 0..WEEKDAYS.len() {
                out.push_str("<td>");
                for session in week.cell(slot, weekday) {
                    session_block(&mut out, session);
                }
                out.push_str("</td>");
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</table>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

/// Returns the number of weeks written.
pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    config: &Config,
    output: Option<&Path>,
) -> Result<usize> {
    let mut catalog = Catalog::load(db)?;
    let sessions = selected_sessions(writer, db, &mut catalog)?;
    if sessions.is_empty() {
        bail!("nothing selected; add options with `sched select add`");
    }

    let grid = WeekGrid::build(&sessions);
    let html = render_grid_html(&grid);

    let path = output.map_or_else(|| config.grid_path(), Path::to_path_buf);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, html).with_context(|| format!("failed to write {}", path.display()))?;

    writeln!(writer, "Wrote {} weeks to {}", grid.len(), path.display())?;
    Ok(grid.len())
}
