use crate::db::models::{Task, TaskPatch};
use crate::error::{Result, SprintError};
use crate::store::Scope;
use chrono::Utc;
use sqlx::SqlitePool;

const TASK_COLUMNS: &str = "id, project_id, title, description, status, priority, category_id, \
                            start_date, due_date, order_index, user_id, created_at, updated_at";

/// SQLite access to the `tasks` table.
///
/// This is the raw record layer: no validation, no defaults. Callers go
/// through the mutation gateway.
pub struct TaskManager<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TaskManager<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Tasks for a scope, in creation order
    pub async fn list_tasks(&self, scope: &Scope) -> Result<Vec<Task>> {
        let tasks = match scope {
            Scope::Project(project_id) => {
                let query = format!(
                    "SELECT {} FROM tasks WHERE project_id = ? ORDER BY created_at ASC, rowid ASC",
                    TASK_COLUMNS
                );
                sqlx::query_as::<_, Task>(&query)
                    .bind(project_id)
                    .fetch_all(self.pool)
                    .await?
            },
            Scope::All => {
                let query = format!(
                    "SELECT {} FROM tasks ORDER BY created_at ASC, rowid ASC",
                    TASK_COLUMNS
                );
                sqlx::query_as::<_, Task>(&query)
                    .fetch_all(self.pool)
                    .await?
            },
        };

        Ok(tasks)
    }

    pub async fn get_task(&self, id: &str) -> Result<Task> {
        let query = format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS);
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| SprintError::not_found("Task", id))
    }

    /// Insert a task, assigning the next order index for its project.
    ///
    /// The index is computed inside the INSERT so concurrent creations in one
    /// project never receive the same value.
    pub async fn insert_task(&self, task: &Task) -> Result<Task> {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, project_id, title, description, status, priority, category_id,
                               start_date, due_date, order_index, user_id, created_at, updated_at)
            SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, COALESCE(MAX(order_index), -1) + 1, ?, ?, ?
            FROM tasks
            WHERE project_id = ?
            "#,
        )
        .bind(&task.id)
        .bind(&task.project_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.priority)
        .bind(&task.category_id)
        .bind(task.start_date)
        .bind(task.due_date)
        .bind(&task.user_id)
        .bind(task.created_at)
        .bind(task.updated_at)
        .bind(&task.project_id)
        .execute(self.pool)
        .await?;

        self.get_task(&task.id).await
    }

    /// Apply a partial update in a single statement
    pub async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        let now = Utc::now();

        let mut builder: sqlx::QueryBuilder<sqlx::Sqlite> =
            sqlx::QueryBuilder::new("UPDATE tasks SET ");
        let mut fields = builder.separated(", ");

        if let Some(title) = &patch.title {
            fields.push("title = ").push_bind_unseparated(title);
        }
        if let Some(description) = &patch.description {
            fields
                .push("description = ")
                .push_bind_unseparated(description.as_deref());
        }
        if let Some(status) = patch.status {
            fields.push("status = ").push_bind_unseparated(status);
        }
        if let Some(priority) = patch.priority {
            fields.push("priority = ").push_bind_unseparated(priority);
        }
        if let Some(category_id) = &patch.category_id {
            fields
                .push("category_id = ")
                .push_bind_unseparated(category_id.as_deref());
        }
        if let Some(start_date) = patch.start_date {
            fields.push("start_date = ").push_bind_unseparated(start_date);
        }
        if let Some(due_date) = patch.due_date {
            fields.push("due_date = ").push_bind_unseparated(due_date);
        }
        if let Some(order_index) = patch.order_index {
            fields.push("order_index = ").push_bind_unseparated(order_index);
        }
        fields.push("updated_at = ").push_bind_unseparated(now);

        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(SprintError::not_found("Task", id));
        }

        self.get_task(id).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(SprintError::not_found("Task", id));
        }

        Ok(())
    }

    pub async fn project_exists(&self, id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE id = ?")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn category_exists(&self, id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE id = ?")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(count > 0)
    }
}
