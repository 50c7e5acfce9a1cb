//! Manual reordering of a project's tasks.
//!
//! Planning is pure: a move on the displayed custom-order sequence yields
//! the new sequence plus one index write per task whose stored index no
//! longer matches its position. Applying a plan writes those indices one at
//! a time under a per-store lock, so concurrent reorders land in request
//! order instead of interleaving.

use crate::backend::Backend;
use crate::db::models::Task;
use crate::error::{Result, SprintError};
use crate::notifications::Notification;
use crate::store::{Scope, TaskStore};
use crate::views::ViewConfig;
use serde::Serialize;

/// One persisted index change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderWrite {
    pub id: String,
    pub order_index: i64,
}

#[derive(Debug, Clone)]
pub struct ReorderPlan {
    pub sequence: Vec<Task>,
    pub writes: Vec<OrderWrite>,
}

impl ReorderPlan {
    fn unchanged(sequence: &[Task]) -> Self {
        Self {
            sequence: sequence.to_vec(),
            writes: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Move the task at `from` to `to`.
///
/// `to` of `None`, or past the end, is a drop outside any target and
/// changes nothing. `from` must name an existing position.
pub fn plan_move(sequence: &[Task], from: usize, to: Option<usize>) -> Result<ReorderPlan> {
    if from >= sequence.len() {
        return Err(SprintError::Validation(format!(
            "No task at position {} (list has {})",
            from,
            sequence.len()
        )));
    }

    let to = match to {
        Some(to) if to < sequence.len() => to,
        _ => return Ok(ReorderPlan::unchanged(sequence)),
    };
    if from == to {
        return Ok(ReorderPlan::unchanged(sequence));
    }

    let mut reordered = sequence.to_vec();
    let moved = reordered.remove(from);
    reordered.insert(to, moved);

    let writes = reordered
        .iter()
        .enumerate()
        .filter(|(position, task)| task.order_index != Some(*position as i64))
        .map(|(position, task)| OrderWrite {
            id: task.id.clone(),
            order_index: position as i64,
        })
        .collect();

    Ok(ReorderPlan {
        sequence: reordered,
        writes,
    })
}

/// Drag-and-drop form: move `active_id` onto the slot held by `over_id`
pub fn plan_drag(sequence: &[Task], active_id: &str, over_id: Option<&str>) -> Result<ReorderPlan> {
    let from = sequence
        .iter()
        .position(|t| t.id == active_id)
        .ok_or_else(|| SprintError::not_found("Task", active_id))?;
    let to = over_id.and_then(|over| sequence.iter().position(|t| t.id == over));
    plan_move(sequence, from, to)
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedWrite {
    pub id: String,
    pub error: String,
}

/// What a reorder actually persisted
#[derive(Debug, Clone, Serialize)]
pub struct ReorderOutcome {
    /// Custom-order view after the writes
    pub sequence: Vec<Task>,
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedWrite>,
}

impl ReorderOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl<B: Backend> TaskStore<B> {
    fn check_reorderable(&self, config: &ViewConfig) -> Result<()> {
        if !matches!(self.scope(), Scope::Project(_)) {
            return Err(SprintError::ActionNotAllowed(
                "Tasks can only be reordered within a single project".to_string(),
            ));
        }
        if !config.allows_reorder() {
            return Err(SprintError::ActionNotAllowed(
                "Reordering requires custom sort with no filter".to_string(),
            ));
        }
        Ok(())
    }

    /// Move the task at `from` to `to` in the displayed custom order
    pub async fn reorder(
        &self,
        config: &ViewConfig,
        from: usize,
        to: Option<usize>,
    ) -> Result<ReorderOutcome> {
        self.check_reorderable(config)?;
        let _serial = self.reorder_lock().lock().await;

        let plan = plan_move(&self.view(config), from, to)?;
        self.apply_plan(config, plan).await
    }

    /// Move a task by id onto another task's slot
    pub async fn reorder_by_id(
        &self,
        config: &ViewConfig,
        active_id: &str,
        over_id: Option<&str>,
    ) -> Result<ReorderOutcome> {
        self.check_reorderable(config)?;
        let _serial = self.reorder_lock().lock().await;

        let plan = plan_drag(&self.view(config), active_id, over_id)?;
        self.apply_plan(config, plan).await
    }

    /// Move a task by id to an absolute position
    pub async fn move_task(
        &self,
        config: &ViewConfig,
        id: &str,
        to: usize,
    ) -> Result<ReorderOutcome> {
        self.check_reorderable(config)?;
        let _serial = self.reorder_lock().lock().await;

        let sequence = self.view(config);
        let from = sequence
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| SprintError::not_found("Task", id))?;
        let plan = plan_move(&sequence, from, Some(to))?;
        self.apply_plan(config, plan).await
    }

    /// Write a plan's indices in order; successful writes are kept even
    /// when a later one fails
    async fn apply_plan(&self, config: &ViewConfig, plan: ReorderPlan) -> Result<ReorderOutcome> {
        if plan.is_noop() {
            return Ok(ReorderOutcome {
                sequence: plan.sequence,
                succeeded: Vec::new(),
                failed: Vec::new(),
            });
        }

        let mut succeeded = Vec::with_capacity(plan.writes.len());
        let mut failed = Vec::new();
        let mut stale = false;

        for write in &plan.writes {
            match self
                .gateway()
                .set_order_index(&write.id, write.order_index)
                .await
            {
                Ok(saved) => {
                    self.accept_write(saved);
                    succeeded.push(write.id.clone());
                },
                Err(e) => {
                    stale |= matches!(e, SprintError::NotFound { .. });
                    self.notifier().send(Notification::failure(
                        "reorder task",
                        "Task",
                        &write.id,
                        &e.to_string(),
                    ));
                    failed.push(FailedWrite {
                        id: write.id.clone(),
                        error: e.to_string(),
                    });
                },
            }
        }

        if stale {
            if let Err(e) = self.refresh().await {
                tracing::warn!(error = %e, "Refresh after stale reorder failed");
            }
        }

        if failed.is_empty() {
            let scope_id = self.scope().project_id().unwrap_or_default();
            self.notifier()
                .send(Notification::success("reorder tasks", "Project", scope_id));
        } else {
            tracing::warn!(
                succeeded = succeeded.len(),
                failed = failed.len(),
                "Reorder partially applied"
            );
        }

        Ok(ReorderOutcome {
            sequence: self.view(config),
            succeeded,
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::TaskPatch;
    use crate::gateway::MutationGateway;
    use crate::notifications::NotificationSender;
    use crate::test_utils::flaky::FlakyBackend;
    use crate::test_utils::test_helpers::{date, TestContext};
    use crate::views::fixtures::{ids, task};
    use crate::views::{SortMode, TaskFilter};
    use std::sync::Arc;
    use std::time::Duration;

    fn abcd() -> Vec<Task> {
        vec![task("A", 0), task("B", 1), task("C", 2), task("D", 3)]
    }

    fn write(id: &str, order_index: i64) -> OrderWrite {
        OrderWrite {
            id: id.to_string(),
            order_index,
        }
    }

    #[test]
    fn test_move_forward_writes_changed_positions_only() {
        let plan = plan_move(&abcd(), 0, Some(2)).unwrap();

        assert_eq!(ids(&plan.sequence), vec!["B", "C", "A", "D"]);
        assert_eq!(
            plan.writes,
            vec![write("B", 0), write("C", 1), write("A", 2)]
        );
    }

    #[test]
    fn test_move_backward() {
        let plan = plan_move(&abcd(), 3, Some(1)).unwrap();

        assert_eq!(ids(&plan.sequence), vec!["A", "D", "B", "C"]);
        assert_eq!(
            plan.writes,
            vec![write("D", 1), write("B", 2), write("C", 3)]
        );
    }

    #[test]
    fn test_same_position_is_noop() {
        let plan = plan_move(&abcd(), 2, Some(2)).unwrap();
        assert!(plan.is_noop());
        assert_eq!(ids(&plan.sequence), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_drop_outside_is_noop() {
        assert!(plan_move(&abcd(), 1, None).unwrap().is_noop());
        assert!(plan_move(&abcd(), 1, Some(9)).unwrap().is_noop());
        assert!(plan_drag(&abcd(), "B", Some("nowhere")).unwrap().is_noop());
    }

    #[test]
    fn test_invalid_source() {
        assert!(matches!(
            plan_move(&abcd(), 4, Some(0)),
            Err(SprintError::Validation(_))
        ));
        assert!(matches!(
            plan_drag(&abcd(), "Z", Some("A")),
            Err(SprintError::NotFound { .. })
        ));
    }

    #[test]
    fn test_sparse_indices_are_rewritten_densely() {
        let mut tasks = abcd();
        tasks[2].order_index = Some(10);
        tasks[3].order_index = Some(20);

        let plan = plan_drag(&tasks, "A", Some("B")).unwrap();
        assert_eq!(ids(&plan.sequence), vec!["B", "A", "C", "D"]);
        assert_eq!(
            plan.writes,
            vec![write("B", 0), write("A", 1), write("C", 2), write("D", 3)]
        );
    }

    async fn seeded_store(ctx: &TestContext) -> (TaskStore<FlakyBackend>, Vec<Task>) {
        ctx.seed_project("p1", "Alpha").await;
        let gateway = MutationGateway::new(FlakyBackend::new(ctx.backend()), ctx.session());
        let store = TaskStore::open(
            gateway,
            Scope::Project("p1".into()),
            NotificationSender::default(),
        )
        .await
        .unwrap();

        let mut created = Vec::new();
        for title in ["A", "B", "C", "D"] {
            let patch = TaskPatch::default().title(title).due(date(2025, 3, 1));
            created.push(store.upsert(patch, None).await.unwrap());
        }
        (store, created)
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_reorder_persists_new_order() {
        let ctx = TestContext::new().await;
        let (store, _) = seeded_store(&ctx).await;
        let config = ViewConfig::default();

        let outcome = store.reorder(&config, 0, Some(2)).await.unwrap();

        assert!(outcome.is_complete());
        assert_eq!(outcome.succeeded.len(), 3);
        assert_eq!(titles(&outcome.sequence), vec!["B", "C", "A", "D"]);

        store.refresh().await.unwrap();
        assert_eq!(titles(&store.view(&config)), vec!["B", "C", "A", "D"]);
    }

    #[tokio::test]
    async fn test_reorder_refused_outside_custom_unfiltered() {
        let ctx = TestContext::new().await;
        let (store, _) = seeded_store(&ctx).await;

        let sorted = ViewConfig::new(TaskFilter::all(), SortMode::Priority);
        assert!(matches!(
            store.reorder(&sorted, 0, Some(1)).await,
            Err(SprintError::ActionNotAllowed(_))
        ));

        let filtered = ViewConfig::new(
            TaskFilter::all().with_status(crate::db::models::TaskStatus::Todo),
            SortMode::Custom,
        );
        assert!(matches!(
            store.reorder(&filtered, 0, Some(1)).await,
            Err(SprintError::ActionNotAllowed(_))
        ));
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_successful_writes() {
        let ctx = TestContext::new().await;
        let (store, created) = seeded_store(&ctx).await;
        let b = &created[1];
        store.gateway().backend().fail_writes_for(&b.id);

        let outcome = store
            .reorder(&ViewConfig::default(), 0, Some(2))
            .await
            .unwrap();

        assert!(!outcome.is_complete());
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].id, b.id);
        assert_eq!(
            outcome.succeeded,
            vec![created[2].id.clone(), created[0].id.clone()]
        );

        // C and A were written, B kept its old index
        store.refresh().await.unwrap();
        let a = store.get(&created[0].id).unwrap();
        let c = store.get(&created[2].id).unwrap();
        assert_eq!(a.order_index, Some(2));
        assert_eq!(c.order_index, Some(1));
        assert_eq!(store.get(&b.id).unwrap().order_index, Some(1));
    }

    #[tokio::test]
    async fn test_concurrent_reorders_apply_in_request_order() {
        let ctx = TestContext::new().await;
        let (store, created) = seeded_store(&ctx).await;
        let store = Arc::new(store);

        // Slow down the first write of the first reorder
        store
            .gateway()
            .backend()
            .delay_updates_for(&created[1].id, Duration::from_millis(50));

        let first = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.reorder(&ViewConfig::default(), 0, Some(3)).await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.reorder(&ViewConfig::default(), 0, Some(1)).await })
        };

        first.await.unwrap().unwrap();
        let outcome = second.await.unwrap().unwrap();

        // [A,B,C,D] -> [B,C,D,A] -> [C,B,D,A]
        assert_eq!(titles(&outcome.sequence), vec!["C", "B", "D", "A"]);

        store.refresh().await.unwrap();
        let persisted: Vec<_> = store
            .view(&ViewConfig::default())
            .into_iter()
            .map(|t| (t.title, t.order_index))
            .collect();
        assert_eq!(
            persisted,
            vec![
                ("C".to_string(), Some(0)),
                ("B".to_string(), Some(1)),
                ("D".to_string(), Some(2)),
                ("A".to_string(), Some(3)),
            ]
        );
    }

    #[tokio::test]
    async fn test_reorder_by_id_onto_other_task() {
        let ctx = TestContext::new().await;
        let (store, created) = seeded_store(&ctx).await;
        let config = ViewConfig::default();

        let outcome = store
            .reorder_by_id(&config, &created[0].id, Some(&created[2].id))
            .await
            .unwrap();
        assert_eq!(titles(&outcome.sequence), vec!["B", "C", "A", "D"]);

        let outcome = store
            .reorder_by_id(&config, &created[1].id, None)
            .await
            .unwrap();
        assert!(outcome.succeeded.is_empty());
        assert_eq!(titles(&outcome.sequence), vec!["B", "C", "A", "D"]);
    }

    #[tokio::test]
    async fn test_move_task_by_id() {
        let ctx = TestContext::new().await;
        let (store, created) = seeded_store(&ctx).await;

        let outcome = store
            .move_task(&ViewConfig::default(), &created[3].id, 0)
            .await
            .unwrap();
        assert_eq!(titles(&outcome.sequence), vec!["D", "A", "B", "C"]);

        assert!(matches!(
            store.move_task(&ViewConfig::default(), "ghost", 0).await,
            Err(SprintError::NotFound { .. })
        ));
    }
}
