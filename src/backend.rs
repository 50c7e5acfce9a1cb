//! The record-collection boundary the gateway talks to.
//!
//! Each trait covers one table family. `SqliteBackend` implements all of them
//! on top of the SQLite managers; tests wrap it to inject failures.

use std::future::Future;

use crate::categories::CategoryManager;
use crate::db::models::{Category, Project, ProjectPatch, Task, TaskPatch};
use crate::error::Result;
use crate::projects::ProjectManager;
use crate::store::Scope;
use crate::tasks::TaskManager;
use sqlx::SqlitePool;

/// Task records.
pub trait TaskBackend: Send + Sync {
    // ── Read ────────────────────────────────────────────────────────

    fn list_tasks(&self, scope: &Scope) -> impl Future<Output = Result<Vec<Task>>> + Send;

    fn get_task(&self, id: &str) -> impl Future<Output = Result<Task>> + Send;

    fn project_exists(&self, id: &str) -> impl Future<Output = Result<bool>> + Send;

    fn category_exists(&self, id: &str) -> impl Future<Output = Result<bool>> + Send;

    // ── Write ───────────────────────────────────────────────────────

    /// Insert a fully-formed task; the backend assigns `order_index`
    fn insert_task(&self, task: &Task) -> impl Future<Output = Result<Task>> + Send;

    fn update_task(
        &self,
        id: &str,
        patch: &TaskPatch,
    ) -> impl Future<Output = Result<Task>> + Send;

    fn delete_task(&self, id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Project records. Deleting a project removes its tasks.
pub trait ProjectBackend: Send + Sync {
    fn list_projects(&self) -> impl Future<Output = Result<Vec<Project>>> + Send;

    fn get_project(&self, id: &str) -> impl Future<Output = Result<Project>> + Send;

    fn insert_project(&self, project: &Project) -> impl Future<Output = Result<Project>> + Send;

    fn update_project(
        &self,
        id: &str,
        patch: &ProjectPatch,
    ) -> impl Future<Output = Result<Project>> + Send;

    fn delete_project(&self, id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Category records. Deleting a category detaches it from tasks.
pub trait CategoryBackend: Send + Sync {
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>>> + Send;

    fn insert_category(
        &self,
        category: &Category,
    ) -> impl Future<Output = Result<Category>> + Send;

    fn delete_category(&self, id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Everything the gateway needs from a store
pub trait Backend: TaskBackend + ProjectBackend + CategoryBackend {}

impl<T: TaskBackend + ProjectBackend + CategoryBackend> Backend for T {}

/// SQLite-backed implementation of every backend trait
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl TaskBackend for SqliteBackend {
    async fn list_tasks(&self, scope: &Scope) -> Result<Vec<Task>> {
        TaskManager::new(&self.pool).list_tasks(scope).await
    }

    async fn get_task(&self, id: &str) -> Result<Task> {
        TaskManager::new(&self.pool).get_task(id).await
    }

    async fn project_exists(&self, id: &str) -> Result<bool> {
        TaskManager::new(&self.pool).project_exists(id).await
    }

    async fn category_exists(&self, id: &str) -> Result<bool> {
        TaskManager::new(&self.pool).category_exists(id).await
    }

    async fn insert_task(&self, task: &Task) -> Result<Task> {
        TaskManager::new(&self.pool).insert_task(task).await
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        TaskManager::new(&self.pool).update_task(id, patch).await
    }

    async fn delete_task(&self, id: &str) -> Result<()> {
        TaskManager::new(&self.pool).delete_task(id).await
    }
}

impl ProjectBackend for SqliteBackend {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        ProjectManager::new(&self.pool).list_projects().await
    }

    async fn get_project(&self, id: &str) -> Result<Project> {
        ProjectManager::new(&self.pool).get_project(id).await
    }

    async fn insert_project(&self, project: &Project) -> Result<Project> {
        ProjectManager::new(&self.pool).insert_project(project).await
    }

    async fn update_project(&self, id: &str, patch: &ProjectPatch) -> Result<Project> {
        ProjectManager::new(&self.pool).update_project(id, patch).await
    }

    async fn delete_project(&self, id: &str) -> Result<()> {
        ProjectManager::new(&self.pool).delete_project(id).await
    }
}

impl CategoryBackend for SqliteBackend {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        CategoryManager::new(&self.pool).list_categories().await
    }

    async fn insert_category(&self, category: &Category) -> Result<Category> {
        CategoryManager::new(&self.pool).insert_category(category).await
    }

    async fn delete_category(&self, id: &str) -> Result<()> {
        CategoryManager::new(&self.pool).delete_category(id).await
    }
}
