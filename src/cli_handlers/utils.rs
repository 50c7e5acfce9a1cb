//! Shared plumbing for CLI handlers: opening the workspace, resolving
//! names to records, and printing.

use crate::backend::SqliteBackend;
use crate::db::models::{Category, Priority, Project, Task, TaskStatus};
use crate::error::{Result, SprintError};
use crate::gateway::MutationGateway;
use crate::notifications::{Notification, NotificationLevel, NotificationSender};
use crate::session::Session;
use crate::store::{Scope, TaskStore};
use crate::views::{SortMode, TaskFilter, ViewConfig};
use crate::workspace::WorkspaceContext;
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::mpsc::UnboundedReceiver;

/// An opened workspace plus the session acting on it
pub struct CommandContext {
    pub workspace: WorkspaceContext,
    pub session: Session,
}

impl CommandContext {
    pub async fn load() -> Result<Self> {
        let workspace = WorkspaceContext::load_or_init().await?;
        let session = Session::resolve(&workspace.pool).await?;
        Ok(Self { workspace, session })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.workspace.pool
    }

    pub fn gateway(&self) -> MutationGateway<SqliteBackend> {
        MutationGateway::new(
            SqliteBackend::new(self.workspace.pool.clone()),
            self.session.clone(),
        )
    }

    /// Open a task store with a notification channel attached
    pub async fn store(
        &self,
        scope: Scope,
    ) -> Result<(TaskStore<SqliteBackend>, UnboundedReceiver<Notification>)> {
        let (notifier, rx) = NotificationSender::channel();
        let store = TaskStore::open(self.gateway(), scope, notifier).await?;
        Ok((store, rx))
    }

    /// Open the store for the project a task belongs to
    pub async fn store_for_task(
        &self,
        task_id: &str,
    ) -> Result<(TaskStore<SqliteBackend>, UnboundedReceiver<Notification>)> {
        let project_id: Option<String> =
            sqlx::query_scalar("SELECT project_id FROM tasks WHERE id = ?")
                .bind(task_id)
                .fetch_optional(self.pool())
                .await?;
        let project_id = project_id.ok_or_else(|| SprintError::not_found("Task", task_id))?;
        self.store(Scope::Project(project_id)).await
    }

    /// Find a project by id, or by name ignoring case
    pub async fn resolve_project(&self, key: &str) -> Result<Project> {
        let projects = self.gateway().list_projects().await?;
        find_by_key(projects, key, |p| (&p.id, &p.name))
            .ok_or_else(|| SprintError::not_found("Project", key))
    }

    /// Scope for an optional `--project` argument
    pub async fn scope_for(&self, project: Option<&str>) -> Result<Scope> {
        match project {
            Some(key) => Ok(Scope::Project(self.resolve_project(key).await?.id)),
            None => Ok(Scope::All),
        }
    }

    /// Resolve several `--only` project arguments to ids
    pub async fn resolve_projects(&self, keys: &[String]) -> Result<Vec<String>> {
        let mut ids = Vec::with_capacity(keys.len());
        for key in keys {
            ids.push(self.resolve_project(key).await?.id);
        }
        Ok(ids)
    }

    pub async fn resolve_category(&self, key: &str) -> Result<Category> {
        let categories = self.gateway().load_categories().await?;
        find_by_key(categories, key, |c| (&c.id, &c.name))
            .ok_or_else(|| SprintError::not_found("Category", key))
    }
}

fn find_by_key<T>(items: Vec<T>, key: &str, fields: impl Fn(&T) -> (&String, &String)) -> Option<T> {
    let key = key.trim();
    items.into_iter().find(|item| {
        let (id, name) = fields(item);
        id == key || name.eq_ignore_ascii_case(key)
    })
}

/// Build a view config from list-style arguments
pub fn view_config(status: Option<&str>, projects: Vec<String>, sort: &str) -> Result<ViewConfig> {
    let mut filter = TaskFilter::all().with_projects(projects);
    if let Some(status) = status {
        filter = filter.with_status(TaskStatus::parse(status)?);
    }
    Ok(ViewConfig::new(filter, SortMode::parse(sort)?))
}

/// `none` (or empty) clears an optional text value
pub fn optional_text(value: String) -> Option<String> {
    match value.trim() {
        "" | "none" => None,
        _ => Some(value),
    }
}

/// Print failure notifications to stderr; returns how many there were
pub fn drain_failures(rx: &mut UnboundedReceiver<Notification>) -> usize {
    let mut failures = 0;
    while let Ok(notification) = rx.try_recv() {
        if notification.level == NotificationLevel::Failure {
            eprintln!("✗ {}", notification.message);
            failures += 1;
        }
    }
    failures
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Get a status badge icon for task status
pub fn get_status_badge(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Done => "✓",
        TaskStatus::InProgress => "→",
        TaskStatus::Todo => "○",
    }
}

pub fn priority_label(priority: Option<Priority>) -> &'static str {
    match priority {
        Some(Priority::High) => "high",
        Some(Priority::Medium) => "medium",
        Some(Priority::Low) => "low",
        None => "-",
    }
}

/// One-line task summary used by list-style output
pub fn print_task_line(task: &Task) {
    let order = task
        .order_index
        .map(|i| format!("#{:<3}", i))
        .unwrap_or_else(|| "#-  ".to_string());
    println!(
        "{} {} {}  (due {}, {}) [{}]",
        order,
        get_status_badge(task.status),
        task.title,
        task.due_date,
        priority_label(task.priority),
        task.id
    );
}

/// Multi-line task detail
pub fn print_task_detail(task: &Task, category: Option<&Category>) {
    println!("{} {}", get_status_badge(task.status), task.title);
    println!("  ID: {}", task.id);
    println!("  Project: {}", task.project_id);
    println!("  Status: {}", task.status.label());
    println!("  Priority: {}", priority_label(task.priority));
    if let Some(category) = category {
        println!("  Category: {}", category.name);
    }
    if let Some(start) = task.start_date {
        println!("  Start: {}", start);
    }
    println!("  Due: {}", task.due_date);
    if let Some(index) = task.order_index {
        println!("  Order: {}", index);
    }
    if let Some(description) = &task.description {
        println!("\n{}", description);
    }
}
