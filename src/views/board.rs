use super::{cmp_custom, TaskFilter};
use crate::db::models::{Task, TaskStatus};
use serde::Serialize;

/// One status column of the board
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub label: &'static str,
    pub tasks: Vec<Task>,
}

impl BoardColumn {
    pub fn count(&self) -> usize {
        self.tasks.len()
    }
}

/// Group filtered tasks into the fixed todo / in progress / done columns.
///
/// Each column keeps manual order regardless of the list's sort mode.
pub fn project_board(tasks: &[Task], filter: &TaskFilter) -> Vec<BoardColumn> {
    let mut ordered: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t)).collect();
    ordered.sort_by(|a, b| cmp_custom(a, b));

    TaskStatus::ALL
        .iter()
        .map(|&status| BoardColumn {
            status,
            label: status.label(),
            tasks: ordered
                .iter()
                .filter(|t| t.status == status)
                .map(|t| (*t).clone())
                .collect(),
        })
        .collect()
}
