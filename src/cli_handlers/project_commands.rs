use crate::cli::ProjectCommands;
use crate::cli_handlers::utils::{optional_text, print_json, CommandContext};
use crate::db::models::{ProjectPatch, ProjectStatus};
use crate::error::Result;
use crate::gateway::NewProject;
use crate::log_project_operation;
use crate::projects::ProjectManager;
use crate::time_utils::{parse_date, parse_optional_date};
use serde_json::json;

/// Handle all `sprint project` subcommands
pub async fn handle_project_command(cmd: ProjectCommands) -> Result<()> {
    match cmd {
        ProjectCommands::Add {
            name,
            description,
            start,
            end,
            status,
            format,
        } => {
            let input = NewProject {
                name,
                description,
                start_date: start.as_deref().map(parse_date).transpose()?,
                target_end_date: end.as_deref().map(parse_date).transpose()?,
                status: status.as_deref().map(ProjectStatus::parse).transpose()?,
            };

            let ctx = CommandContext::load().await?;
            let project = ctx.gateway().create_project(input).await?;
            log_project_operation!("create", project.id);

            if format == "json" {
                print_json(&project)?;
            } else {
                println!("Project created: {}", project.name);
                println!("  ID: {}", project.id);
            }
            Ok(())
        },

        ProjectCommands::List { format } => {
            let ctx = CommandContext::load().await?;
            let projects = ctx.gateway().list_projects().await?;

            if format == "json" {
                print_json(&projects)?;
            } else if projects.is_empty() {
                println!("No projects yet. Create one with: sprint project add <name>");
            } else {
                for project in &projects {
                    println!(
                        "{:<10} {}  [{}]",
                        project.status.as_str(),
                        project.name,
                        project.id
                    );
                }
            }
            Ok(())
        },

        ProjectCommands::Get { project, format } => {
            let ctx = CommandContext::load().await?;
            let project = ctx.resolve_project(&project).await?;
            let progress = ProjectManager::new(ctx.pool())
                .progress()
                .await?
                .into_iter()
                .find(|p| p.project_id == project.id);
            let (done, total) = progress
                .map(|p| (p.done_tasks, p.total_tasks))
                .unwrap_or((0, 0));

            if format == "json" {
                let mut value = serde_json::to_value(&project)?;
                value["done_tasks"] = json!(done);
                value["total_tasks"] = json!(total);
                print_json(&value)?;
            } else {
                println!("{}", project.name);
                println!("  ID: {}", project.id);
                println!("  Status: {}", project.status.as_str());
                if let Some(start) = project.start_date {
                    println!("  Start: {}", start);
                }
                if let Some(end) = project.target_end_date {
                    println!("  Target end: {}", end);
                }
                println!("  Tasks: {}/{} done", done, total);
                if let Some(description) = &project.description {
                    println!("\n{}", description);
                }
            }
            Ok(())
        },

        ProjectCommands::Update {
            project,
            name,
            description,
            start,
            end,
            status,
            format,
        } => {
            let patch = ProjectPatch {
                name,
                description: description.map(optional_text),
                start_date: start.as_deref().map(parse_optional_date).transpose()?,
                target_end_date: end.as_deref().map(parse_optional_date).transpose()?,
                status: status.as_deref().map(ProjectStatus::parse).transpose()?,
            };

            let ctx = CommandContext::load().await?;
            let id = ctx.resolve_project(&project).await?.id;
            let updated = ctx.gateway().update_project(&id, patch).await?;
            log_project_operation!("update", updated.id);

            if format == "json" {
                print_json(&updated)?;
            } else {
                println!("Project updated: {}", updated.name);
            }
            Ok(())
        },

        ProjectCommands::Delete { project, format } => {
            let ctx = CommandContext::load().await?;
            let project = ctx.resolve_project(&project).await?;
            ctx.gateway().delete_project(&project.id).await?;
            log_project_operation!("delete", project.id);

            if format == "json" {
                print_json(&json!({ "deleted": true, "id": project.id }))?;
            } else {
                println!("Project deleted: {}", project.name);
            }
            Ok(())
        },

        ProjectCommands::Summary { format } => {
            let ctx = CommandContext::load().await?;
            let manager = ProjectManager::new(ctx.pool());
            let summary = manager.summary().await?;
            let progress = manager.progress().await?;

            if format == "json" {
                print_json(&json!({ "summary": summary, "progress": progress }))?;
            } else {
                println!(
                    "Projects: {} total, {} active, {} on hold, {} completed",
                    summary.total, summary.active, summary.on_hold, summary.completed
                );
                for p in &progress {
                    println!("  {:<30} {}/{} done", p.name, p.done_tasks, p.total_tasks);
                }
            }
            Ok(())
        },
    }
}
