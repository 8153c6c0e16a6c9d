use std::collections::HashSet;

use serde::Serialize;
use utoipa::ToSchema;

use crate::model::session::{AttendanceSession, TaskStatus};

/// Session counts by task status. Sessions without a task (still open) are
/// excluded from the denominator.
#[derive(Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TaskStats {
    #[schema(example = 12)]
    pub completed: usize,
    #[schema(example = 3)]
    pub pending: usize,
    #[schema(example = 1)]
    pub blockage: usize,
    #[schema(example = 16)]
    pub total: usize,
}

/// Total fractional hours over closed sessions; open sessions contribute 0.
pub fn total_hours(sessions: &[AttendanceSession]) -> f64 {
    sessions.iter().filter_map(|s| s.hours()).sum()
}

pub fn task_stats(sessions: &[AttendanceSession]) -> TaskStats {
    let mut stats = TaskStats::default();
    for task in sessions.iter().filter_map(|s| s.task.as_ref()) {
        match task.status {
            TaskStatus::Completed => stats.completed += 1,
            TaskStatus::Pending => stats.pending += 1,
            TaskStatus::Blockage => stats.blockage += 1,
        }
        stats.total += 1;
    }
    stats
}

/// Count of unique location names, case-sensitive, empty names excluded.
pub fn distinct_locations(sessions: &[AttendanceSession]) -> usize {
    sessions
        .iter()
        .map(|s| s.location.name.as_str())
        .filter(|name| !name.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// The `n` most recently closed sessions; ties on checkout time break by
/// check-in descending, and fully tied inputs keep their input order, so
/// identical inputs always produce identical output.
pub fn recent(sessions: &[AttendanceSession], n: usize) -> Vec<AttendanceSession> {
    let mut closed: Vec<AttendanceSession> =
        sessions.iter().filter(|s| !s.is_open()).cloned().collect();
    closed.sort_by(|a, b| b.check_out.cmp(&a.check_out).then(b.check_in.cmp(&a.check_in)));
    closed.truncate(n);
    closed
}
