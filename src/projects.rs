use crate::db::models::{Project, ProjectPatch, ProjectProgress, ProjectSummary};
use crate::error::{Result, SprintError};
use chrono::Utc;
use sqlx::SqlitePool;

const PROJECT_COLUMNS: &str =
    "id, name, description, start_date, target_end_date, status, user_id, created_at, updated_at";

pub struct ProjectManager<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProjectManager<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All projects ordered by name
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let query = format!(
            "SELECT {} FROM projects ORDER BY name COLLATE NOCASE ASC, created_at ASC",
            PROJECT_COLUMNS
        );
        let projects = sqlx::query_as::<_, Project>(&query)
            .fetch_all(self.pool)
            .await?;
        Ok(projects)
    }

    pub async fn get_project(&self, id: &str) -> Result<Project> {
        let query = format!("SELECT {} FROM projects WHERE id = ?", PROJECT_COLUMNS);
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| SprintError::not_found("Project", id))
    }

    pub async fn insert_project(&self, project: &Project) -> Result<Project> {
        sqlx::query(
            r#"
            INSERT INTO projects (id, name, description, start_date, target_end_date, status,
                                  user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.start_date)
        .bind(project.target_end_date)
        .bind(project.status)
        .bind(&project.user_id)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(self.pool)
        .await?;

        self.get_project(&project.id).await
    }

    pub async fn update_project(&self, id: &str, patch: &ProjectPatch) -> Result<Project> {
        let now = Utc::now();

        let mut builder: sqlx::QueryBuilder<sqlx::Sqlite> =
            sqlx::QueryBuilder::new("UPDATE projects SET ");
        let mut fields = builder.separated(", ");

        if let Some(name) = &patch.name {
            fields.push("name = ").push_bind_unseparated(name);
        }
        if let Some(description) = &patch.description {
            fields
                .push("description = ")
                .push_bind_unseparated(description.as_deref());
        }
        if let Some(start_date) = patch.start_date {
            fields.push("start_date = ").push_bind_unseparated(start_date);
        }
        if let Some(target_end_date) = patch.target_end_date {
            fields
                .push("target_end_date = ")
                .push_bind_unseparated(target_end_date);
        }
        if let Some(status) = patch.status {
            fields.push("status = ").push_bind_unseparated(status);
        }
        fields.push("updated_at = ").push_bind_unseparated(now);

        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(SprintError::not_found("Project", id));
        }

        self.get_project(id).await
    }

    /// Delete a project; its tasks go with it
    pub async fn delete_project(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(SprintError::not_found("Project", id));
        }

        Ok(())
    }

    /// Project counts by status, aggregated in SQL
    pub async fn summary(&self) -> Result<ProjectSummary> {
        let row = sqlx::query_as::<_, (i64, i64, i64, i64)>(
            r#"SELECT
                COUNT(*) as total,
                COALESCE(SUM(CASE WHEN status = 'active' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'on_hold' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0)
            FROM projects"#,
        )
        .fetch_one(self.pool)
        .await?;

        Ok(ProjectSummary {
            total: row.0,
            active: row.1,
            on_hold: row.2,
            completed: row.3,
        })
    }

    /// Done/total task counts per project
    pub async fn progress(&self) -> Result<Vec<ProjectProgress>> {
        let rows = sqlx::query_as::<_, ProjectProgress>(
            r#"
            SELECT p.id AS project_id,
                   p.name AS name,
                   COUNT(t.id) AS total_tasks,
                   COALESCE(SUM(CASE WHEN t.status = 'done' THEN 1 ELSE 0 END), 0) AS done_tasks
            FROM projects p
            LEFT JOIN tasks t ON t.project_id = p.id
            GROUP BY p.id, p.name
            ORDER BY p.name COLLATE NOCASE ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
