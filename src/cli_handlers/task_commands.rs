use crate::cli::TaskCommands;
use crate::cli_handlers::utils::{
    drain_failures, optional_text, print_json, print_task_detail, print_task_line, view_config,
    CommandContext,
};
use crate::db::models::{Priority, TaskPatch, TaskStatus};
use crate::error::Result;
use crate::log_task_operation;
use crate::store::Scope;
use crate::time_utils::{parse_date, parse_optional_date};
use crate::views::ViewConfig;
use serde_json::json;

/// Handle all `sprint task` subcommands
pub async fn handle_task_command(cmd: TaskCommands) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            title,
            project,
            due,
            start,
            description,
            priority,
            category,
            status,
            format,
        } => {
            handle_add(
                title,
                project,
                due,
                start,
                description,
                priority,
                category,
                status,
                format,
            )
            .await
        },

        TaskCommands::Get { id, format } => handle_get(id, format).await,

        TaskCommands::List {
            project,
            status,
            only,
            sort,
            format,
        } => handle_list(project, status, only, sort, format).await,

        TaskCommands::Update {
            id,
            title,
            description,
            status,
            priority,
            category,
            start,
            due,
            format,
        } => {
            handle_update(
                id,
                title,
                description,
                status,
                priority,
                category,
                start,
                due,
                format,
            )
            .await
        },

        TaskCommands::Delete { id, format } => handle_delete(id, format).await,

        TaskCommands::Move {
            id,
            position,
            format,
        } => handle_move(id, position, format).await,

        TaskCommands::Drop { id, status, format } => handle_drop(id, status, format).await,
    }
}

// ============================================================================
// Individual command handlers
// ============================================================================

#[allow(clippy::too_many_arguments)]
async fn handle_add(
    title: String,
    project: String,
    due: String,
    start: Option<String>,
    description: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    status: Option<String>,
    format: String,
) -> Result<()> {
    let mut patch = TaskPatch::default().title(title).due(parse_date(&due)?);
    if let Some(start) = start {
        patch = patch.starts(parse_optional_date(&start)?);
    }
    if let Some(priority) = priority {
        patch = patch.priority(Priority::parse_optional(&priority)?);
    }
    if let Some(status) = status {
        patch = patch.status(TaskStatus::parse(&status)?);
    }
    patch.description = description.map(optional_text);

    let ctx = CommandContext::load().await?;
    if let Some(category) = category {
        patch = patch.category(Some(ctx.resolve_category(&category).await?.id));
    }

    let project = ctx.resolve_project(&project).await?;
    let (store, _rx) = ctx.store(Scope::Project(project.id.clone())).await?;
    let task = store.upsert(patch, None).await?;
    log_task_operation!("create", task.id);

    if format == "json" {
        print_json(&task)?;
    } else {
        println!("Task created: {}", task.title);
        println!("  ID: {}", task.id);
        println!("  Project: {}", project.name);
        println!("  Due: {}", task.due_date);
        if let Some(index) = task.order_index {
            println!("  Order: {}", index);
        }
    }

    Ok(())
}

async fn handle_get(id: String, format: String) -> Result<()> {
    let ctx = CommandContext::load().await?;
    let (store, _rx) = ctx.store_for_task(&id).await?;
    let task = store
        .get(&id)
        .ok_or_else(|| crate::error::SprintError::not_found("Task", id.as_str()))?;

    if format == "json" {
        print_json(&task)?;
    } else {
        let categories = store.categories();
        let category = task
            .category_id
            .as_deref()
            .and_then(|cid| categories.iter().find(|c| c.id == cid));
        print_task_detail(&task, category);
    }

    Ok(())
}

async fn handle_list(
    project: Option<String>,
    status: Option<String>,
    only: Vec<String>,
    sort: String,
    format: String,
) -> Result<()> {
    let ctx = CommandContext::load().await?;
    let scope = ctx.scope_for(project.as_deref()).await?;
    let projects = ctx.resolve_projects(&only).await?;
    let config = view_config(status.as_deref(), projects, &sort)?;

    let (store, _rx) = ctx.store(scope).await?;
    let tasks = store.view(&config);

    if format == "json" {
        print_json(&tasks)?;
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks found");
        return Ok(());
    }
    for task in &tasks {
        print_task_line(task);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn handle_update(
    id: String,
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    start: Option<String>,
    due: Option<String>,
    format: String,
) -> Result<()> {
    let mut patch = TaskPatch {
        title,
        description: description.map(optional_text),
        ..Default::default()
    };
    if let Some(status) = status {
        patch.status = Some(TaskStatus::parse(&status)?);
    }
    if let Some(priority) = priority {
        patch.priority = Some(Priority::parse_optional(&priority)?);
    }
    if let Some(start) = start {
        patch.start_date = Some(parse_optional_date(&start)?);
    }
    if let Some(due) = due {
        patch.due_date = Some(parse_date(&due)?);
    }

    let ctx = CommandContext::load().await?;
    if let Some(category) = category {
        patch.category_id = Some(match optional_text(category) {
            Some(key) => Some(ctx.resolve_category(&key).await?.id),
            None => None,
        });
    }

    let (store, _rx) = ctx.store_for_task(&id).await?;
    let task = store.upsert(patch, Some(&id)).await?;
    log_task_operation!("update", task.id);

    if format == "json" {
        print_json(&task)?;
    } else {
        println!("Task updated: {}", task.title);
        println!("  Status: {}", task.status.label());
        println!("  Due: {}", task.due_date);
    }

    Ok(())
}

async fn handle_delete(id: String, format: String) -> Result<()> {
    let ctx = CommandContext::load().await?;
    let (store, _rx) = ctx.store_for_task(&id).await?;
    store.remove(&id).await?;
    log_task_operation!("delete", id);

    if format == "json" {
        print_json(&json!({ "deleted": true, "id": id }))?;
    } else {
        println!("Task deleted: {}", id);
    }

    Ok(())
}

async fn handle_move(id: String, position: usize, format: String) -> Result<()> {
    let ctx = CommandContext::load().await?;
    let (store, mut rx) = ctx.store_for_task(&id).await?;
    let outcome = store.move_task(&ViewConfig::default(), &id, position).await?;
    log_task_operation!("move", id, position);

    if format == "json" {
        print_json(&outcome)?;
    } else {
        drain_failures(&mut rx);
        if outcome.succeeded.is_empty() && outcome.failed.is_empty() {
            println!("Order unchanged");
        } else {
            println!(
                "Reordered: {} written, {} failed",
                outcome.succeeded.len(),
                outcome.failed.len()
            );
        }
        for task in &outcome.sequence {
            print_task_line(task);
        }
        if !outcome.is_complete() {
            eprintln!("Some positions were not saved; run the move again to retry.");
        }
    }

    Ok(())
}

async fn handle_drop(id: String, status: String, format: String) -> Result<()> {
    let status = TaskStatus::parse(&status)?;
    let ctx = CommandContext::load().await?;
    let (store, _rx) = ctx.store_for_task(&id).await?;
    let task = store.move_to_status(&id, status).await?;
    log_task_operation!("drop", task.id, status.as_str());

    if format == "json" {
        print_json(&task)?;
    } else {
        println!("{} → {}", task.title, status.label());
    }

    Ok(())
}
