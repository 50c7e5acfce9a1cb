//! Mutation gateway: the single path from the application to the backing store.
//!
//! The gateway validates input before any I/O, normalises partial updates,
//! stamps ownership from the explicit [`Session`], and translates raw store
//! failures into the three error kinds callers handle: `Validation`,
//! `NotFound` and `Persistence`.

use crate::backend::Backend;
use crate::categories::resolve_color;
use crate::db::models::{
    Category, Priority, Project, ProjectPatch, ProjectStatus, Task, TaskPatch, TaskStatus,
};
use crate::error::{Result, SprintError};
use crate::session::Session;
use crate::store::Scope;
use chrono::{NaiveDate, Utc};

/// Fields for a new project
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub target_end_date: Option<NaiveDate>,
    pub status: Option<ProjectStatus>,
}

pub struct MutationGateway<B> {
    backend: B,
    session: Session,
}

fn non_empty(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SprintError::Validation(format!("{} is required", what)));
    }
    Ok(trimmed.to_string())
}

fn check_date_order(start: Option<NaiveDate>, end: NaiveDate, end_name: &str) -> Result<()> {
    if let Some(start) = start {
        if start > end {
            return Err(SprintError::Validation(format!(
                "Start date {} is after {} {}",
                start, end_name, end
            )));
        }
    }
    Ok(())
}

fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl<B: Backend> MutationGateway<B> {
    pub fn new(backend: B, session: Session) -> Self {
        Self { backend, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ── Reads ───────────────────────────────────────────────────────

    pub async fn load_tasks(&self, scope: &Scope) -> Result<Vec<Task>> {
        self.backend.list_tasks(scope).await
    }

    pub async fn load_categories(&self) -> Result<Vec<Category>> {
        self.backend.list_categories().await
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.backend.list_projects().await
    }

    pub async fn get_project(&self, id: &str) -> Result<Project> {
        self.backend.get_project(id).await
    }

    // ── Tasks ───────────────────────────────────────────────────────

    /// Build a complete task record from creation fields.
    ///
    /// Pure validation: no I/O happens here, so a rejected input never
    /// reaches the store. The order index is left for the store to assign.
    pub fn prepare_task(&self, patch: TaskPatch, default_project: Option<&str>) -> Result<Task> {
        let title = non_empty(patch.title.as_deref().unwrap_or_default(), "Title")?;
        let due_date = patch
            .due_date
            .ok_or_else(|| SprintError::Validation("Due date is required".to_string()))?;
        let project_id = patch
            .project_id
            .or_else(|| default_project.map(str::to_string))
            .ok_or_else(|| SprintError::Validation("Project is required".to_string()))?;

        let start_date = patch.start_date.flatten();
        check_date_order(start_date, due_date, "due date")?;

        let now = Utc::now();
        Ok(Task {
            id: uuid::Uuid::new_v4().to_string(),
            project_id,
            title,
            description: normalize_text(patch.description.flatten()),
            status: patch.status.unwrap_or(TaskStatus::Todo),
            priority: patch.priority.unwrap_or(Some(Priority::Medium)),
            category_id: patch.category_id.flatten(),
            start_date,
            due_date,
            order_index: None,
            user_id: self.session.user_id().to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Validate a partial update against the current record and drop every
    /// field that would not change anything.
    pub fn normalize_task_patch(&self, current: &Task, patch: TaskPatch) -> Result<TaskPatch> {
        let mut normalized = TaskPatch::default();

        if let Some(project_id) = patch.project_id {
            if project_id != current.project_id {
                return Err(SprintError::Validation(
                    "Tasks cannot be moved between projects".to_string(),
                ));
            }
        }
        if let Some(title) = patch.title {
            let title = non_empty(&title, "Title")?;
            if title != current.title {
                normalized.title = Some(title);
            }
        }
        if let Some(description) = patch.description {
            let description = normalize_text(description);
            if description != current.description {
                normalized.description = Some(description);
            }
        }
        if let Some(status) = patch.status.filter(|s| *s != current.status) {
            normalized.status = Some(status);
        }
        if let Some(priority) = patch.priority.filter(|p| *p != current.priority) {
            normalized.priority = Some(priority);
        }
        if let Some(category_id) = patch.category_id.filter(|c| *c != current.category_id) {
            normalized.category_id = Some(category_id);
        }
        if let Some(start_date) = patch.start_date.filter(|d| *d != current.start_date) {
            normalized.start_date = Some(start_date);
        }
        if let Some(due_date) = patch.due_date.filter(|d| *d != current.due_date) {
            normalized.due_date = Some(due_date);
        }
        if let Some(order_index) = patch.order_index.filter(|i| Some(*i) != current.order_index) {
            normalized.order_index = Some(order_index);
        }

        let start = normalized.start_date.unwrap_or(current.start_date);
        let due = normalized.due_date.unwrap_or(current.due_date);
        check_date_order(start, due, "due date")?;

        Ok(normalized)
    }

    async fn ensure_category(&self, category_id: Option<&str>) -> Result<()> {
        if let Some(category_id) = category_id {
            if !self.backend.category_exists(category_id).await? {
                return Err(SprintError::not_found("Category", category_id));
            }
        }
        Ok(())
    }

    /// Persist a prepared task and return the stored record
    pub async fn create_task(&self, task: &Task) -> Result<Task> {
        let result = async {
            if !self.backend.project_exists(&task.project_id).await? {
                return Err(SprintError::not_found("Project", task.project_id.as_str()));
            }
            self.ensure_category(task.category_id.as_deref()).await?;
            self.backend.insert_task(task).await
        }
        .await;

        result.map_err(|e| e.into_persistence("create task", "Task", &task.id))
    }

    /// Persist a normalised patch; all fields land together or none do
    pub async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        let result = async {
            if let Some(category_id) = &patch.category_id {
                self.ensure_category(category_id.as_deref()).await?;
            }
            self.backend.update_task(id, patch).await
        }
        .await;

        result.map_err(|e| e.into_persistence("update task", "Task", id))
    }

    pub async fn delete_task(&self, id: &str) -> Result<()> {
        self.backend
            .delete_task(id)
            .await
            .map_err(|e| e.into_persistence("delete task", "Task", id))
    }

    /// Write one task's manual order index
    pub async fn set_order_index(&self, id: &str, order_index: i64) -> Result<Task> {
        let patch = TaskPatch {
            order_index: Some(order_index),
            ..Default::default()
        };
        self.backend
            .update_task(id, &patch)
            .await
            .map_err(|e| e.into_persistence("reorder task", "Task", id))
    }

    // ── Projects ────────────────────────────────────────────────────

    pub async fn create_project(&self, input: NewProject) -> Result<Project> {
        let name = non_empty(&input.name, "Project name")?;
        if let Some(end) = input.target_end_date {
            check_date_order(input.start_date, end, "target end date")?;
        }

        let now = Utc::now();
        let project = Project {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description: normalize_text(input.description),
            start_date: input.start_date,
            target_end_date: input.target_end_date,
            status: input.status.unwrap_or(ProjectStatus::Active),
            user_id: self.session.user_id().to_string(),
            created_at: now,
            updated_at: now,
        };

        let saved = self
            .backend
            .insert_project(&project)
            .await
            .map_err(|e| e.into_persistence("create project", "Project", &project.id))?;

        tracing::info!(project_id = %saved.id, name = %saved.name, "Project created");
        Ok(saved)
    }

    pub async fn update_project(&self, id: &str, patch: ProjectPatch) -> Result<Project> {
        let current = self
            .backend
            .get_project(id)
            .await
            .map_err(|e| e.into_persistence("update project", "Project", id))?;

        let mut normalized = ProjectPatch::default();
        if let Some(name) = patch.name {
            let name = non_empty(&name, "Project name")?;
            if name != current.name {
                normalized.name = Some(name);
            }
        }
        if let Some(description) = patch.description {
            let description = normalize_text(description);
            if description != current.description {
                normalized.description = Some(description);
            }
        }
        normalized.start_date = patch.start_date.filter(|d| *d != current.start_date);
        normalized.target_end_date = patch
            .target_end_date
            .filter(|d| *d != current.target_end_date);
        normalized.status = patch.status.filter(|s| *s != current.status);

        let start = normalized.start_date.unwrap_or(current.start_date);
        if let Some(end) = normalized
            .target_end_date
            .unwrap_or(current.target_end_date)
        {
            check_date_order(start, end, "target end date")?;
        }

        if normalized.is_empty() {
            return Ok(current);
        }

        self.backend
            .update_project(id, &normalized)
            .await
            .map_err(|e| e.into_persistence("update project", "Project", id))
    }

    pub async fn delete_project(&self, id: &str) -> Result<()> {
        self.backend
            .delete_project(id)
            .await
            .map_err(|e| e.into_persistence("delete project", "Project", id))?;
        tracing::info!(project_id = %id, "Project deleted with its tasks");
        Ok(())
    }

    // ── Categories ──────────────────────────────────────────────────

    pub async fn create_category(&self, name: &str, color: Option<&str>) -> Result<Category> {
        let name = non_empty(name, "Category name")?;
        let color = resolve_color(color)?;

        let category = Category {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            color,
            user_id: self.session.user_id().to_string(),
            created_at: Utc::now(),
        };

        self.backend
            .insert_category(&category)
            .await
            .map_err(|e| e.into_persistence("create category", "Category", &category.id))
    }

    pub async fn delete_category(&self, id: &str) -> Result<()> {
        self.backend
            .delete_category(id)
            .await
            .map_err(|e| e.into_persistence("delete category", "Category", id))
    }
}
