//! Read-only projections of a task snapshot.
//!
//! Every view is a pure function of (tasks, categories, filter, sort). The
//! snapshot itself is never reordered or mutated here.

pub mod board;
pub mod calendar;
pub mod timeline;

use crate::db::models::{Category, Priority, Task, TaskStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

pub use board::{project_board, BoardColumn};
pub use calendar::{project_calendar, project_month, CalendarWeek, DayCell, MAX_VISIBLE_PER_DAY};
pub use timeline::{project_timeline, Timeline, TimelineBar, TimelineTick};

/// How the list view orders tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Manual order index
    #[default]
    Custom,
    Status,
    Priority,
    Category,
    DueDate,
}

impl SortMode {
    pub fn parse(s: &str) -> crate::error::Result<Self> {
        match s.to_lowercase().as_str() {
            "custom" | "manual" => Ok(Self::Custom),
            "status" => Ok(Self::Status),
            "priority" => Ok(Self::Priority),
            "category" => Ok(Self::Category),
            "due" | "due_date" | "due-date" => Ok(Self::DueDate),
            _ => Err(crate::error::SprintError::Validation(format!(
                "Invalid sort '{}'. Valid values: custom, status, priority, category, due_date",
                s
            ))),
        }
    }
}

/// Status and project filters. An empty project list means every project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub projects: Vec<String>,
}

impl TaskFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_projects(mut self, projects: Vec<String>) -> Self {
        self.projects = projects;
        self
    }

    pub fn is_all(&self) -> bool {
        self.status.is_none() && self.projects.is_empty()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        self.projects.is_empty() || self.projects.iter().any(|p| *p == task.project_id)
    }
}

/// Filter plus sort: everything the list projection depends on besides data
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewConfig {
    pub filter: TaskFilter,
    pub sort: SortMode,
}

impl ViewConfig {
    pub fn new(filter: TaskFilter, sort: SortMode) -> Self {
        Self { filter, sort }
    }

    /// Manual reordering only makes sense on the unfiltered custom order
    pub fn allows_reorder(&self) -> bool {
        self.sort == SortMode::Custom && self.filter.is_all()
    }
}

/// Manual order: indexed tasks first by index, unindexed after, ties by age
pub(crate) fn cmp_custom(a: &Task, b: &Task) -> Ordering {
    match (a.order_index, b.order_index) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.created_at.cmp(&b.created_at))
}

fn category_key(task: &Task, names: &HashMap<&str, String>) -> Option<String> {
    task.category_id
        .as_deref()
        .and_then(|id| names.get(id))
        .cloned()
}

/// Filter then sort. The sort is stable, so equal keys keep snapshot order.
pub fn project_list(tasks: &[Task], categories: &[Category], config: &ViewConfig) -> Vec<Task> {
    let mut visible: Vec<Task> = tasks
        .iter()
        .filter(|t| config.filter.matches(t))
        .cloned()
        .collect();

    match config.sort {
        SortMode::Custom => visible.sort_by(cmp_custom),
        SortMode::Status => visible.sort_by_key(|t| t.status.rank()),
        SortMode::Priority => visible.sort_by_key(|t| Priority::rank(t.priority)),
        SortMode::DueDate => visible.sort_by_key(|t| t.due_date),
        SortMode::Category => {
            let names: HashMap<&str, String> = categories
                .iter()
                .map(|c| (c.id.as_str(), c.name.to_lowercase()))
                .collect();
            // Uncategorized (or dangling) tasks sort last
            visible.sort_by(|a, b| {
                match (category_key(a, &names), category_key(b, &names)) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            });
        },
    }

    visible
}

/// Memoised list projection.
///
/// Entries are keyed by the snapshot generation, so any mutation of the
/// underlying tasks or categories invalidates everything at once.
#[derive(Debug, Default)]
pub struct ProjectionCache {
    generation: u64,
    entries: HashMap<ViewConfig, Vec<Task>>,
}

impl ProjectionCache {
    pub fn get_or_compute(
        &mut self,
        generation: u64,
        config: &ViewConfig,
        tasks: &[Task],
        categories: &[Category],
    ) -> Vec<Task> {
        if generation != self.generation {
            self.entries.clear();
            self.generation = generation;
        }

        if let Some(hit) = self.entries.get(config) {
            return hit.clone();
        }

        let projected = project_list(tasks, categories, config);
        self.entries.insert(config.clone(), projected.clone());
        projected
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
