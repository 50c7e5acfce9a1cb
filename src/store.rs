//! In-memory task snapshot with optimistic mutations.
//!
//! A `TaskStore` holds the last known-good tasks for one scope. Mutations
//! are applied to the snapshot first, then sent through the gateway; each
//! one is tracked as a [`PendingMutation`] that ends either confirmed (the
//! backend's record replaces the optimistic one) or rolled back.
//!
//! The snapshot lock is a plain mutex that is never held across an await,
//! so readers always see a complete snapshot and never wait on I/O.

use crate::backend::Backend;
use crate::db::models::{Category, Task, TaskPatch, TaskStatus};
use crate::error::{Result, SprintError};
use crate::gateway::MutationGateway;
use crate::notifications::{Notification, NotificationSender};
use crate::views::{project_board, BoardColumn, ProjectionCache, ViewConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Which tasks a store (or a backend query) covers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "project_id")]
pub enum Scope {
    Project(String),
    /// Every project merged; read-mostly
    All,
}

impl Scope {
    pub fn project_id(&self) -> Option<&str> {
        match self {
            Scope::Project(id) => Some(id),
            Scope::All => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingState {
    /// Visible in the snapshot, write in flight
    Applied,
    Confirmed,
    RolledBack,
}

#[derive(Debug, Clone)]
enum PendingOp {
    Create(Task),
    Update(TaskPatch),
    Delete { position: usize },
}

#[derive(Debug, Clone)]
struct PendingMutation {
    ticket: u64,
    task_id: String,
    op: PendingOp,
    previous: Option<Task>,
    state: PendingState,
}

#[derive(Debug, Default)]
struct Snapshot {
    tasks: Vec<Task>,
    /// Last record the backend acknowledged for each task
    confirmed: HashMap<String, Task>,
    categories: Vec<Category>,
    generation: u64,
    next_ticket: u64,
    pending: Vec<PendingMutation>,
    cache: ProjectionCache,
}

impl Snapshot {
    fn touch(&mut self) {
        self.generation += 1;
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// One past the highest index in the project, or 0 for an empty project
    fn next_order_index(&self, project_id: &str) -> i64 {
        self.tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .filter_map(|t| t.order_index)
            .max()
            .map_or(0, |max| max + 1)
    }

    fn begin(&mut self, task_id: &str, op: PendingOp, previous: Option<Task>) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending.push(PendingMutation {
            ticket,
            task_id: task_id.to_string(),
            op,
            previous,
            state: PendingState::Applied,
        });
        self.touch();
        ticket
    }

    /// Remove a finished mutation from the in-flight list
    fn finish(&mut self, ticket: u64, state: PendingState) -> Option<PendingMutation> {
        let index = self.pending.iter().position(|p| p.ticket == ticket)?;
        let mut mutation = self.pending.remove(index);
        mutation.state = state;
        Some(mutation)
    }

    /// Re-apply in-flight field edits for `id` on top of a fresh record
    fn replay_updates(&mut self, id: &str) {
        let patches: Vec<TaskPatch> = self
            .pending
            .iter()
            .filter(|p| p.task_id == id)
            .filter_map(|p| match &p.op {
                PendingOp::Update(patch) => Some(patch.clone()),
                _ => None,
            })
            .collect();

        if let Some(task) = self.find_mut(id) {
            for patch in &patches {
                patch.apply_to(task);
            }
        }
    }

    /// Accept the backend's record for a task (last acknowledgment wins)
    fn accept(&mut self, saved: Task) {
        let id = saved.id.clone();
        self.confirmed.insert(id.clone(), saved.clone());
        match self.position(&id) {
            Some(index) => self.tasks[index] = saved,
            None => self.tasks.push(saved),
        }
        self.replay_updates(&id);
        self.touch();
    }

    fn confirm(&mut self, ticket: u64, saved: Option<Task>) {
        let Some(mutation) = self.finish(ticket, PendingState::Confirmed) else {
            return;
        };
        match saved {
            Some(task) => self.accept(task),
            None => {
                self.confirmed.remove(&mutation.task_id);
                self.touch();
            },
        }
    }

    /// Replace the acknowledged records with freshly loaded ones
    fn load(&mut self, tasks: Vec<Task>) {
        self.confirmed = tasks.iter().map(|t| (t.id.clone(), t.clone())).collect();
        self.tasks = tasks;
    }

    fn roll_back(&mut self, ticket: u64) {
        let Some(mutation) = self.finish(ticket, PendingState::RolledBack) else {
            return;
        };

        match (&mutation.op, mutation.previous) {
            (PendingOp::Create(_), _) => {
                self.tasks.retain(|t| t.id != mutation.task_id);
            },
            (PendingOp::Update(patch), Some(previous)) => {
                // Later acknowledged writes to the same fields must survive
                let base = self
                    .confirmed
                    .get(&mutation.task_id)
                    .cloned()
                    .unwrap_or(previous);
                if let Some(task) = self.find_mut(&mutation.task_id) {
                    restore_fields(patch, &base, task);
                }
                self.replay_updates(&mutation.task_id);
            },
            (PendingOp::Delete { position }, Some(previous)) => {
                if self.position(&previous.id).is_none() {
                    let at = (*position).min(self.tasks.len());
                    self.tasks.insert(at, previous);
                }
            },
            _ => {},
        }
        self.touch();
    }

    /// Lay the in-flight mutations over freshly loaded data
    fn replay_pending(&mut self) {
        let pending = self.pending.clone();
        for mutation in pending {
            match mutation.op {
                PendingOp::Create(task) => {
                    if self.position(&task.id).is_none() {
                        self.tasks.push(task);
                    }
                },
                PendingOp::Update(patch) => {
                    if let Some(task) = self.find_mut(&mutation.task_id) {
                        patch.apply_to(task);
                    }
                },
                PendingOp::Delete { .. } => {
                    self.tasks.retain(|t| t.id != mutation.task_id);
                },
            }
        }
    }
}

/// Put back the fields a failed patch touched, leaving the rest alone
fn restore_fields(patch: &TaskPatch, base: &Task, task: &mut Task) {
    if patch.title.is_some() {
        task.title = base.title.clone();
    }
    if patch.description.is_some() {
        task.description = base.description.clone();
    }
    if patch.status.is_some() {
        task.status = base.status;
    }
    if patch.priority.is_some() {
        task.priority = base.priority;
    }
    if patch.category_id.is_some() {
        task.category_id = base.category_id.clone();
    }
    if patch.start_date.is_some() {
        task.start_date = base.start_date;
    }
    if patch.due_date.is_some() {
        task.due_date = base.due_date;
    }
    if patch.order_index.is_some() {
        task.order_index = base.order_index;
    }
}

pub struct TaskStore<B> {
    gateway: MutationGateway<B>,
    scope: Scope,
    notifier: NotificationSender,
    state: Mutex<Snapshot>,
    reorder_lock: tokio::sync::Mutex<()>,
}

impl<B: Backend> TaskStore<B> {
    /// An empty store; call [`refresh`](Self::refresh) to load it
    pub fn new(gateway: MutationGateway<B>, scope: Scope, notifier: NotificationSender) -> Self {
        Self {
            gateway,
            scope,
            notifier,
            state: Mutex::new(Snapshot::default()),
            reorder_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Create a store and load its scope
    pub async fn open(
        gateway: MutationGateway<B>,
        scope: Scope,
        notifier: NotificationSender,
    ) -> Result<Self> {
        let store = Self::new(gateway, scope, notifier);
        store.refresh().await?;
        Ok(store)
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn gateway(&self) -> &MutationGateway<B> {
        &self.gateway
    }

    pub(crate) fn notifier(&self) -> &NotificationSender {
        &self.notifier
    }

    pub(crate) fn reorder_lock(&self) -> &tokio::sync::Mutex<()> {
        &self.reorder_lock
    }

    /// Bumped on every change to the snapshot
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Mutations applied locally whose writes have not finished
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// The current snapshot in creation order
    pub fn list(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.lock().tasks.iter().find(|t| t.id == id).cloned()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.lock().categories.clone()
    }

    /// Filtered and sorted list view, memoised per generation
    pub fn view(&self, config: &ViewConfig) -> Vec<Task> {
        let mut guard = self.lock();
        let snapshot = &mut *guard;
        snapshot.cache.get_or_compute(
            snapshot.generation,
            config,
            &snapshot.tasks,
            &snapshot.categories,
        )
    }

    pub fn board(&self, config: &ViewConfig) -> Vec<BoardColumn> {
        project_board(&self.lock().tasks, &config.filter)
    }

    /// Reload tasks and categories from the backend.
    ///
    /// The previous snapshot stays readable until the new data arrives;
    /// mutations still in flight are laid back over the fresh records.
    pub async fn refresh(&self) -> Result<()> {
        let tasks = self.gateway.load_tasks(&self.scope).await?;
        let categories = self.gateway.load_categories().await?;

        let mut snapshot = self.lock();
        snapshot.load(tasks);
        snapshot.categories = categories;
        snapshot.replay_pending();
        snapshot.touch();

        tracing::debug!(
            scope = ?self.scope,
            tasks = snapshot.tasks.len(),
            generation = snapshot.generation,
            "Task store refreshed"
        );
        Ok(())
    }

    /// Record a failure and refresh when the target has gone stale
    async fn report_failure(&self, operation: &str, id: &str, error: &SprintError) {
        self.notifier
            .send(Notification::failure(operation, "Task", id, &error.to_string()));

        if matches!(error, SprintError::NotFound { .. }) {
            if let Err(e) = self.refresh().await {
                tracing::warn!(error = %e, "Refresh after stale write failed");
            }
        }
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Create a task (`id` = `None`) or merge fields into an existing one
    pub async fn upsert(&self, patch: TaskPatch, id: Option<&str>) -> Result<Task> {
        match id {
            None => self.create(patch).await,
            Some(id) => self.update(id, patch).await,
        }
    }

    async fn create(&self, patch: TaskPatch) -> Result<Task> {
        if let (Some(scope_project), Some(requested)) = (self.scope.project_id(), &patch.project_id)
        {
            if scope_project != requested.as_str() {
                return Err(SprintError::Validation(format!(
                    "Task belongs to project {}, not {}",
                    requested, scope_project
                )));
            }
        }

        let mut task = self.gateway.prepare_task(patch, self.scope.project_id())?;

        let ticket = {
            let mut snapshot = self.lock();
            task.order_index = Some(snapshot.next_order_index(&task.project_id));
            snapshot.tasks.push(task.clone());
            snapshot.begin(&task.id, PendingOp::Create(task.clone()), None)
        };

        match self.gateway.create_task(&task).await {
            Ok(saved) => {
                self.lock().confirm(ticket, Some(saved.clone()));
                self.notifier
                    .send(Notification::success("create task", "Task", &saved.id));
                Ok(saved)
            },
            Err(e) => {
                self.lock().roll_back(ticket);
                self.report_failure("create task", &task.id, &e).await;
                Err(e)
            },
        }
    }

    async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task> {
        let (ticket, normalized) = {
            let mut snapshot = self.lock();
            let current = snapshot
                .tasks
                .iter()
                .find(|t| t.id == id)
                .cloned()
                .ok_or_else(|| SprintError::not_found("Task", id))?;

            let normalized = self.gateway.normalize_task_patch(&current, patch)?;
            if normalized.is_empty() {
                return Ok(current);
            }

            if let Some(task) = snapshot.find_mut(id) {
                normalized.apply_to(task);
            }
            let ticket = snapshot.begin(id, PendingOp::Update(normalized.clone()), Some(current));
            (ticket, normalized)
        };

        match self.gateway.update_task(id, &normalized).await {
            Ok(saved) => {
                self.lock().confirm(ticket, Some(saved.clone()));
                self.notifier
                    .send(Notification::success("update task", "Task", id));
                Ok(saved)
            },
            Err(e) => {
                self.lock().roll_back(ticket);
                self.report_failure("update task", id, &e).await;
                Err(e)
            },
        }
    }

    /// Change only a task's status, as a board drop does
    pub async fn move_to_status(&self, id: &str, status: TaskStatus) -> Result<Task> {
        self.update(id, TaskPatch::default().status(status)).await
    }

    /// Delete a task. Sibling order indices are left as they are.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let ticket = {
            let mut snapshot = self.lock();
            let position = snapshot
                .position(id)
                .ok_or_else(|| SprintError::not_found("Task", id))?;
            let previous = snapshot.tasks.remove(position);
            snapshot.begin(id, PendingOp::Delete { position }, Some(previous))
        };

        match self.gateway.delete_task(id).await {
            Ok(()) => {
                self.lock().confirm(ticket, None);
                self.notifier
                    .send(Notification::success("delete task", "Task", id));
                Ok(())
            },
            Err(e) => {
                self.lock().roll_back(ticket);
                self.report_failure("delete task", id, &e).await;
                Err(e)
            },
        }
    }

    /// Store the backend's record after a single index write
    pub(crate) fn accept_write(&self, saved: Task) {
        self.lock().accept(saved);
    }

    // ── Categories ──────────────────────────────────────────────────

    pub async fn create_category(&self, name: &str, color: Option<&str>) -> Result<Category> {
        match self.gateway.create_category(name, color).await {
            Ok(category) => {
                let mut snapshot = self.lock();
                snapshot.categories.push(category.clone());
                snapshot
                    .categories
                    .sort_by_key(|c| c.name.to_lowercase());
                snapshot.touch();
                drop(snapshot);

                self.notifier.send(Notification::success(
                    "create category",
                    "Category",
                    &category.id,
                ));
                Ok(category)
            },
            Err(e) => {
                self.notifier.send(Notification::failure(
                    "create category",
                    "Category",
                    name,
                    &e.to_string(),
                ));
                Err(e)
            },
        }
    }

    /// Delete a category; tasks that referenced it become uncategorized
    pub async fn delete_category(&self, id: &str) -> Result<()> {
        match self.gateway.delete_category(id).await {
            Ok(()) => {
                let mut snapshot = self.lock();
                snapshot.categories.retain(|c| c.id != id);
                for task in snapshot
                    .tasks
                    .iter_mut()
                    .filter(|t| t.category_id.as_deref() == Some(id))
                {
                    task.category_id = None;
                }
                snapshot.touch();
                drop(snapshot);

                self.notifier
                    .send(Notification::success("delete category", "Category", id));
                Ok(())
            },
            Err(e) => {
                self.notifier.send(Notification::failure(
                    "delete category",
                    "Category",
                    id,
                    &e.to_string(),
                ));
                Err(e)
            },
        }
    }
}
