#[cfg(test)]
pub mod test_helpers {
    use crate::backend::SqliteBackend;
    use crate::db::models::{Project, ProjectStatus};
    use crate::db::{create_pool, run_migrations};
    use crate::session::Session;
    use chrono::{NaiveDate, Utc};
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    pub const TEST_USER: &str = "user-test";

    pub struct TestContext {
        pub pool: SqlitePool,
        pub _temp_dir: TempDir,
    }

    impl TestContext {
        pub async fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();

            let sprint_dir = temp_dir.path().join(".skillsprint");
            std::fs::create_dir_all(&sprint_dir).unwrap();

            let db_path = sprint_dir.join("sprint.db");

            let pool = create_pool(&db_path).await.unwrap();
            run_migrations(&pool).await.unwrap();

            Self {
                pool,
                _temp_dir: temp_dir,
            }
        }

        pub fn pool(&self) -> &SqlitePool {
            &self.pool
        }

        pub fn backend(&self) -> SqliteBackend {
            SqliteBackend::new(self.pool.clone())
        }

        pub fn session(&self) -> Session {
            Session::new(TEST_USER).unwrap()
        }

        /// Insert a project row directly, bypassing the gateway
        pub async fn seed_project(&self, id: &str, name: &str) -> Project {
            let now = Utc::now();
            sqlx::query(
                r#"
                INSERT INTO projects (id, name, status, user_id, created_at, updated_at)
                VALUES (?, ?, 'active', ?, ?, ?)
                "#,
            )
            .bind(id)
            .bind(name)
            .bind(TEST_USER)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .unwrap();

            Project {
                id: id.to_string(),
                name: name.to_string(),
                description: None,
                start_date: None,
                target_end_date: None,
                status: ProjectStatus::Active,
                user_id: TEST_USER.to_string(),
                created_at: now,
                updated_at: now,
            }
        }
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
}

/// A backend wrapper that fails selected task writes on demand.
#[cfg(test)]
pub mod flaky {
    use crate::backend::{CategoryBackend, ProjectBackend, SqliteBackend, TaskBackend};
    use crate::db::models::{Category, Project, ProjectPatch, Task, TaskPatch};
    use crate::error::{Result, SprintError};
    use crate::store::Scope;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    pub struct FlakyBackend {
        inner: SqliteBackend,
        fail_ids: Mutex<HashSet<String>>,
        fail_inserts: Mutex<bool>,
        update_delay: Mutex<Option<(String, Duration)>>,
    }

    impl FlakyBackend {
        pub fn new(inner: SqliteBackend) -> Self {
            Self {
                inner,
                fail_ids: Mutex::new(HashSet::new()),
                fail_inserts: Mutex::new(false),
                update_delay: Mutex::new(None),
            }
        }

        /// Updates and deletes targeting `id` fail until cleared
        pub fn fail_writes_for(&self, id: &str) {
            self.fail_ids.lock().unwrap().insert(id.to_string());
        }

        pub fn clear_failures(&self) {
            self.fail_ids.lock().unwrap().clear();
            *self.fail_inserts.lock().unwrap() = false;
        }

        pub fn fail_inserts(&self) {
            *self.fail_inserts.lock().unwrap() = true;
        }

        /// Hold updates for `id` back by `delay` before writing
        pub fn delay_updates_for(&self, id: &str, delay: Duration) {
            *self.update_delay.lock().unwrap() = Some((id.to_string(), delay));
        }

        pub fn clear_update_delay(&self) {
            *self.update_delay.lock().unwrap() = None;
        }

        fn should_fail(&self, id: &str) -> bool {
            self.fail_ids.lock().unwrap().contains(id)
        }

        fn injected() -> SprintError {
            SprintError::DatabaseError(sqlx::Error::Protocol("injected failure".to_string()))
        }
    }

    impl TaskBackend for FlakyBackend {
        async fn list_tasks(&self, scope: &Scope) -> Result<Vec<Task>> {
            self.inner.list_tasks(scope).await
        }

        async fn get_task(&self, id: &str) -> Result<Task> {
            self.inner.get_task(id).await
        }

        async fn insert_task(&self, task: &Task) -> Result<Task> {
            if *self.fail_inserts.lock().unwrap() {
                return Err(Self::injected());
            }
            self.inner.insert_task(task).await
        }

        async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
            let delay = self
                .update_delay
                .lock()
                .unwrap()
                .as_ref()
                .filter(|(target, _)| target == id)
                .map(|(_, d)| *d);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.should_fail(id) {
                return Err(Self::injected());
            }
            self.inner.update_task(id, patch).await
        }

        async fn delete_task(&self, id: &str) -> Result<()> {
            if self.should_fail(id) {
                return Err(Self::injected());
            }
            self.inner.delete_task(id).await
        }

        async fn project_exists(&self, id: &str) -> Result<bool> {
            self.inner.project_exists(id).await
        }

        async fn category_exists(&self, id: &str) -> Result<bool> {
            self.inner.category_exists(id).await
        }
    }

    impl ProjectBackend for FlakyBackend {
        async fn list_projects(&self) -> Result<Vec<Project>> {
            self.inner.list_projects().await
        }

        async fn get_project(&self, id: &str) -> Result<Project> {
            self.inner.get_project(id).await
        }

        async fn insert_project(&self, project: &Project) -> Result<Project> {
            self.inner.insert_project(project).await
        }

        async fn update_project(&self, id: &str, patch: &ProjectPatch) -> Result<Project> {
            self.inner.update_project(id, patch).await
        }

        async fn delete_project(&self, id: &str) -> Result<()> {
            self.inner.delete_project(id).await
        }
    }

    impl CategoryBackend for FlakyBackend {
        async fn list_categories(&self) -> Result<Vec<Category>> {
            self.inner.list_categories().await
        }

        async fn insert_category(&self, category: &Category) -> Result<Category> {
            self.inner.insert_category(category).await
        }

        async fn delete_category(&self, id: &str) -> Result<()> {
            if self.should_fail(id) {
                return Err(Self::injected());
            }
            self.inner.delete_category(id).await
        }
    }
}
