use crate::db::models::{Skill, SkillGroup, Task, TaskSkill};
use crate::error::{Result, SprintError};
use crate::session::Session;
use crate::time_utils::days_ago;
use chrono::Utc;
use sqlx::SqlitePool;

/// Bucket name for finished tasks with no skill tags
pub const NO_SKILLS: &str = "No skills";

pub struct SkillManager<'a> {
    pool: &'a SqlitePool,
    session: &'a Session,
}

impl<'a> SkillManager<'a> {
    pub fn new(pool: &'a SqlitePool, session: &'a Session) -> Self {
        Self { pool, session }
    }

    pub async fn list_skills(&self) -> Result<Vec<Skill>> {
        let skills = sqlx::query_as::<_, Skill>(
            "SELECT id, name, user_id, created_at FROM skills ORDER BY name COLLATE NOCASE ASC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(skills)
    }

    pub async fn create_skill(&self, name: &str) -> Result<Skill> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SprintError::Validation("Skill name is required".to_string()));
        }

        let skill = Skill {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            user_id: self.session.user_id().to_string(),
            created_at: Utc::now(),
        };

        let inserted = sqlx::query(
            "INSERT INTO skills (id, name, user_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&skill.id)
        .bind(&skill.name)
        .bind(&skill.user_id)
        .bind(skill.created_at)
        .execute(self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(skill),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                SprintError::Validation(format!("Skill '{}' already exists", name)),
            ),
            Err(e) => Err(SprintError::DatabaseError(e).into_persistence(
                "create skill",
                "Skill",
                &skill.id,
            )),
        }
    }

    /// Delete a skill; its task tags go with it
    pub async fn delete_skill(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM skills WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(SprintError::not_found("Skill", id));
        }
        Ok(())
    }

    /// Look a skill up by id or by exact name
    pub async fn resolve_skill(&self, id_or_name: &str) -> Result<Skill> {
        sqlx::query_as::<_, Skill>(
            "SELECT id, name, user_id, created_at FROM skills WHERE id = ? OR name = ? COLLATE NOCASE",
        )
        .bind(id_or_name)
        .bind(id_or_name)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| SprintError::not_found("Skill", id_or_name))
    }

    async fn ensure_task(&self, task_id: &str) -> Result<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?)")
            .bind(task_id)
            .fetch_one(self.pool)
            .await?;
        if !exists {
            return Err(SprintError::not_found("Task", task_id));
        }
        Ok(())
    }

    /// Tag a task with a skill; tagging twice is a no-op
    pub async fn attach(&self, task_id: &str, skill_id: &str) -> Result<()> {
        self.ensure_task(task_id).await?;
        let skill = self.resolve_skill(skill_id).await?;

        sqlx::query("INSERT OR IGNORE INTO task_skills (task_id, skill_id) VALUES (?, ?)")
            .bind(task_id)
            .bind(&skill.id)
            .execute(self.pool)
            .await?;

        tracing::debug!(task_id = %task_id, skill = %skill.name, "Skill attached");
        Ok(())
    }

    pub async fn detach(&self, task_id: &str, skill_id: &str) -> Result<()> {
        let skill = self.resolve_skill(skill_id).await?;
        let result = sqlx::query("DELETE FROM task_skills WHERE task_id = ? AND skill_id = ?")
            .bind(task_id)
            .bind(&skill.id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(SprintError::not_found(
                "Task skill",
                format!("{}/{}", task_id, skill.name),
            ));
        }
        Ok(())
    }

    /// Skill tags for a set of tasks, with names resolved
    pub async fn skills_for_tasks(&self, task_ids: &[String]) -> Result<Vec<TaskSkill>> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: sqlx::QueryBuilder<sqlx::Sqlite> = sqlx::QueryBuilder::new(
            "SELECT ts.task_id AS task_id, ts.skill_id AS skill_id, s.name AS skill_name \
             FROM task_skills ts JOIN skills s ON s.id = ts.skill_id WHERE ts.task_id IN (",
        );
        let mut ids = builder.separated(", ");
        for id in task_ids {
            ids.push_bind(id);
        }
        builder.push(") ORDER BY s.name COLLATE NOCASE ASC");

        let rows = builder
            .build_query_as::<TaskSkill>()
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Tasks finished in the last `days` days, grouped by their skill names.
    ///
    /// Group keys are the task's skill names joined with ", "; untagged
    /// tasks land in [`NO_SKILLS`]. Groups appear in order of their most
    /// recently finished task.
    pub async fn growth_digest(&self, days: i64) -> Result<Vec<SkillGroup>> {
        if days < 0 {
            return Err(SprintError::Validation(
                "Digest window must not be negative".to_string(),
            ));
        }

        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, priority, category_id,
                   start_date, due_date, order_index, user_id, created_at, updated_at
            FROM tasks
            WHERE status = 'done' AND updated_at >= ?
            ORDER BY updated_at DESC
            "#,
        )
        .bind(days_ago(days))
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<String> = tasks.iter().map(|t| t.id.clone()).collect();
        let tags = self.skills_for_tasks(&ids).await?;

        let mut groups: Vec<SkillGroup> = Vec::new();
        for task in tasks {
            let names: Vec<&str> = tags
                .iter()
                .filter(|tag| tag.task_id == task.id)
                .map(|tag| tag.skill_name.as_str())
                .collect();
            let key = if names.is_empty() {
                NO_SKILLS.to_string()
            } else {
                names.join(", ")
            };

            match groups.iter_mut().find(|g| g.skills == key) {
                Some(group) => group.tasks.push(task),
                None => groups.push(SkillGroup {
                    skills: key,
                    tasks: vec![task],
                }),
            }
        }

        Ok(groups)
    }
}
