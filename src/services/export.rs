use chrono::{Datelike, SecondsFormat};

use crate::errors::ExportError;
use crate::model::session::AttendanceSession;

pub const EXPORT_HEADER: &str = "date,check_in,check_out,location,project,task,status";

/// Checkout column value for a session that is still open.
const STILL_OPEN: &str = "-";

/// Serializes one user's sessions for a calendar month as CSV. Filtering is
/// on the session's calendar day, not the raw timestamp. Column order is
/// fixed and identical input produces byte-identical output; an empty month
/// yields a header-only document.
pub fn export_month(
    sessions: &[AttendanceSession],
    year: i32,
    month: u32,
    year_bounds: (i32, i32),
) -> Result<String, ExportError> {
    let (min_year, max_year) = year_bounds;
    if !(1..=12).contains(&month) || year < min_year || year > max_year {
        return Err(ExportError::InvalidRange { year, month });
    }

    let mut rows: Vec<&AttendanceSession> = sessions
        .iter()
        .filter(|s| s.date.year() == year && s.date.month() == month)
        .collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.check_in.cmp(&b.check_in)));

    let mut out = String::with_capacity(64 + rows.len() * 96);
    out.push_str(EXPORT_HEADER);
    out.push('\n');

    for session in rows {
        let check_out = session
            .check_out
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| STILL_OPEN.to_string());
        let (project, task, status) = match &session.task {
            Some(task) => (
                task.project_name.as_str(),
                task.description.as_str(),
                task.status.to_string(),
            ),
            None => ("", "", String::new()),
        };

        let fields = [
            session.date.to_string(),
            session
                .check_in
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            check_out,
            session.location.name.clone(),
            project.to_string(),
            task.to_string(),
            status,
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    Ok(out)
}

/// RFC 4180 quoting: fields containing commas, quotes, or line breaks are
/// wrapped in double quotes with inner quotes doubled.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::location::Location;
    use crate::model::session::TaskRecord;
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    const BOUNDS: (i32, i32) = (2000, 2100);

    fn at(year: i32, month: u32, day: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, h, 0, 0).unwrap()
    }

    fn closed(year: i32, month: u32, day: u32, task: &str) -> AttendanceSession {
        let check_in = at(year, month, day, 9);
        AttendanceSession {
            id: Uuid::new_v4(),
            user_id: 7,
            date: check_in.date_naive(),
            check_in,
            check_out: Some(at(year, month, day, 17)),
            location: Location::gps(12.97, 77.59, "Bangalore Office".to_string()),
            task: Some(TaskRecord::new(task, "completed", "Auth", Vec::new()).unwrap()),
        }
    }

    fn open(year: i32, month: u32, day: u32) -> AttendanceSession {
        let check_in = at(year, month, day, 9);
        AttendanceSession {
            id: Uuid::new_v4(),
            user_id: 7,
            date: check_in.date_naive(),
            check_in,
            check_out: None,
            location: Location::gps(12.97, 77.59, "Bangalore Office".to_string()),
            task: None,
        }
    }

    #[test]
    fn empty_month_is_header_only() {
        let out = export_month(&[], 2025, 3, BOUNDS).unwrap();
        assert_eq!(out, format!("{EXPORT_HEADER}\n"));
    }

    #[test]
    fn month_thirteen_is_rejected() {
        let err = export_month(&[], 2025, 13, BOUNDS).unwrap_err();
        assert!(matches!(err, ExportError::InvalidRange { month: 13, .. }));
    }

    #[test]
    fn out_of_bound_years_are_rejected() {
        assert!(export_month(&[], 1999, 3, BOUNDS).is_err());
        assert!(export_month(&[], 2101, 3, BOUNDS).is_err());
        assert!(export_month(&[], 2000, 1, BOUNDS).is_ok());
        assert!(export_month(&[], 2100, 12, BOUNDS).is_ok());
    }

    #[test]
    fn only_the_requested_month_is_exported() {
        let sessions = vec![
            closed(2025, 2, 28, "February work"),
            closed(2025, 3, 3, "March work"),
            closed(2025, 4, 1, "April work"),
        ];
        let out = export_month(&sessions, 2025, 3, BOUNDS).unwrap();
        assert_eq!(out.lines().count(), 2);
        assert!(out.contains("March work"));
        assert!(!out.contains("February work"));
    }

    #[test]
    fn rows_are_date_ordered_and_byte_stable() {
        let sessions = vec![
            closed(2025, 3, 20, "Later work"),
            closed(2025, 3, 5, "Earlier work"),
        ];
        let first = export_month(&sessions, 2025, 3, BOUNDS).unwrap();
        let second = export_month(&sessions, 2025, 3, BOUNDS).unwrap();
        assert_eq!(first, second);

        let lines: Vec<&str> = first.lines().collect();
        assert_eq!(lines[0], EXPORT_HEADER);
        assert!(lines[1].starts_with("2025-03-05"));
        assert!(lines[2].starts_with("2025-03-20"));
    }

    #[test]
    fn open_sessions_use_the_sentinel() {
        let out = export_month(&[open(2025, 3, 10)], 2025, 3, BOUNDS).unwrap();
        let row = out.lines().nth(1).unwrap();
        assert_eq!(row, "2025-03-10,2025-03-10T09:00:00Z,-,Bangalore Office,,,");
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let sessions = vec![closed(2025, 3, 10, "Fixed login, signup and reset")];
        let out = export_month(&sessions, 2025, 3, BOUNDS).unwrap();
        assert!(out.contains("\"Fixed login, signup and reset\""));
    }
}
