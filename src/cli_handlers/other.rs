use crate::cli::{CategoryCommands, GoalCommands, ReviewCommands, SkillCommands};
use crate::cli_handlers::utils::{get_status_badge, print_json, CommandContext};
use crate::db::models::{OneOnOneCadence, PerformanceCadence, ReviewKind};
use crate::error::{Result, SprintError};
use crate::reviews::ReviewManager;
use crate::skills::SkillManager;
use crate::store::Scope;
use crate::time_utils::parse_date;
use crate::workspace::WorkspaceContext;
use serde_json::json;
use std::path::PathBuf;

pub async fn handle_init_command(at: Option<String>, format: String) -> Result<()> {
    let ctx = match at {
        Some(path) => {
            let root = PathBuf::from(&path);
            if !root.is_dir() {
                return Err(SprintError::Validation(format!(
                    "Directory does not exist: {}",
                    path
                )));
            }
            WorkspaceContext::initialize_at(&root).await?
        },
        None => WorkspaceContext::initialize().await?,
    };

    if format == "json" {
        print_json(&json!({
            "success": true,
            "root": ctx.root.display().to_string(),
            "database_path": ctx.db_path.display().to_string(),
        }))
    } else {
        println!("Workspace ready at {}", ctx.root.display());
        Ok(())
    }
}

pub async fn handle_category_command(cmd: CategoryCommands) -> Result<()> {
    let ctx = CommandContext::load().await?;

    match cmd {
        CategoryCommands::Add {
            name,
            color,
            format,
        } => {
            let (store, _rx) = ctx.store(Scope::All).await?;
            let category = store.create_category(&name, color.as_deref()).await?;

            if format == "json" {
                print_json(&category)?;
            } else {
                println!("Category created: {} ({})", category.name, category.color);
                println!("  ID: {}", category.id);
            }
        },

        CategoryCommands::List { format } => {
            let categories = ctx.gateway().load_categories().await?;
            if format == "json" {
                print_json(&categories)?;
            } else if categories.is_empty() {
                println!("No categories yet");
            } else {
                for category in &categories {
                    println!("{:<8} {}  [{}]", category.color, category.name, category.id);
                }
            }
        },

        CategoryCommands::Delete { category, format } => {
            let category = ctx.resolve_category(&category).await?;
            let (store, _rx) = ctx.store(Scope::All).await?;
            store.delete_category(&category.id).await?;

            if format == "json" {
                print_json(&json!({ "deleted": true, "id": category.id }))?;
            } else {
                println!("Category deleted: {}", category.name);
            }
        },
    }

    Ok(())
}

pub async fn handle_skill_command(cmd: SkillCommands) -> Result<()> {
    let ctx = CommandContext::load().await?;
    let skills = SkillManager::new(ctx.pool(), &ctx.session);

    match cmd {
        SkillCommands::Add { name, format } => {
            let skill = skills.create_skill(&name).await?;
            if format == "json" {
                print_json(&skill)?;
            } else {
                println!("Skill created: {}", skill.name);
            }
        },

        SkillCommands::List { format } => {
            let list = skills.list_skills().await?;
            if format == "json" {
                print_json(&list)?;
            } else if list.is_empty() {
                println!("No skills yet");
            } else {
                for skill in &list {
                    println!("{}  [{}]", skill.name, skill.id);
                }
            }
        },

        SkillCommands::Delete { skill, format } => {
            let skill = skills.resolve_skill(&skill).await?;
            skills.delete_skill(&skill.id).await?;
            if format == "json" {
                print_json(&json!({ "deleted": true, "id": skill.id }))?;
            } else {
                println!("Skill deleted: {}", skill.name);
            }
        },

        SkillCommands::Attach {
            task,
            skill,
            format,
        } => {
            skills.attach(&task, &skill).await?;
            if format == "json" {
                print_json(&json!({ "task_id": task, "skill": skill, "attached": true }))?;
            } else {
                println!("Tagged {} with {}", task, skill);
            }
        },

        SkillCommands::Detach {
            task,
            skill,
            format,
        } => {
            skills.detach(&task, &skill).await?;
            if format == "json" {
                print_json(&json!({ "task_id": task, "skill": skill, "attached": false }))?;
            } else {
                println!("Removed {} from {}", skill, task);
            }
        },

        SkillCommands::Digest { days, format } => {
            let groups = skills.growth_digest(days).await?;
            if format == "json" {
                print_json(&groups)?;
            } else if groups.is_empty() {
                println!("Nothing finished in the last {} days", days);
            } else {
                for group in &groups {
                    println!("{} ({})", group.skills, group.tasks.len());
                    for task in &group.tasks {
                        println!("  {} {}", get_status_badge(task.status), task.title);
                    }
                }
            }
        },
    }

    Ok(())
}

pub async fn handle_goal_command(cmd: GoalCommands) -> Result<()> {
    let ctx = CommandContext::load().await?;
    let reviews = ReviewManager::new(ctx.pool(), &ctx.session);

    match cmd {
        GoalCommands::Add {
            title,
            target,
            description,
            format,
        } => {
            let target = parse_date(&target)?;
            let goal = reviews
                .create_goal(&title, description.as_deref(), Some(target))
                .await?;
            if format == "json" {
                print_json(&goal)?;
            } else {
                println!("Goal created: {} (by {})", goal.title, goal.target_date);
                println!("  ID: {}", goal.id);
            }
        },

        GoalCommands::List { format } => {
            let goals = reviews.list_goals().await?;
            if format == "json" {
                print_json(&goals)?;
            } else if goals.is_empty() {
                println!("No goals yet");
            } else {
                for goal in &goals {
                    println!("{}  {}  [{}]", goal.target_date, goal.title, goal.id);
                }
            }
        },

        GoalCommands::Delete { id, format } => {
            reviews.delete_goal(&id).await?;
            if format == "json" {
                print_json(&json!({ "deleted": true, "id": id }))?;
            } else {
                println!("Goal deleted: {}", id);
            }
        },
    }

    Ok(())
}

pub async fn handle_review_command(cmd: ReviewCommands) -> Result<()> {
    let ctx = CommandContext::load().await?;
    let reviews = ReviewManager::new(ctx.pool(), &ctx.session);

    match cmd {
        ReviewCommands::Cadence {
            one_on_one,
            performance,
            format,
        } => {
            let current = reviews.cadence().await?;
            let cadence = if one_on_one.is_none() && performance.is_none() {
                current
            } else {
                let one_on_one = match one_on_one {
                    Some(value) => OneOnOneCadence::parse(&value)?,
                    None => current
                        .as_ref()
                        .map(|c| c.one_on_one)
                        .unwrap_or(OneOnOneCadence::Biweekly),
                };
                let performance = match performance {
                    Some(value) => PerformanceCadence::parse(&value)?,
                    None => current
                        .as_ref()
                        .map(|c| c.performance)
                        .unwrap_or(PerformanceCadence::Quarterly),
                };
                Some(reviews.set_cadence(one_on_one, performance).await?)
            };

            if format == "json" {
                print_json(&cadence)?;
            } else {
                match cadence {
                    Some(c) => println!(
                        "1:1 reviews: {:?}, performance reviews: {:?}",
                        c.one_on_one, c.performance
                    ),
                    None => println!("No review cadence set"),
                }
            }
        },

        ReviewCommands::Add {
            kind,
            date,
            notes,
            format,
        } => {
            let kind = ReviewKind::parse(&kind)?;
            let date = parse_date(&date)?;
            let session = reviews.create_session(kind, date, notes.as_deref()).await?;
            if format == "json" {
                print_json(&session)?;
            } else {
                println!("Review recorded: {:?} on {}", session.kind, session.scheduled_date);
                println!("  ID: {}", session.id);
            }
        },

        ReviewCommands::List { kind, format } => {
            let kind = kind.as_deref().map(ReviewKind::parse).transpose()?;
            let sessions = reviews.list_sessions(kind).await?;
            if format == "json" {
                print_json(&sessions)?;
            } else if sessions.is_empty() {
                println!("No review sessions recorded");
            } else {
                for session in &sessions {
                    println!(
                        "{}  {:?}  {}  [{}]",
                        session.scheduled_date,
                        session.kind,
                        session.notes.as_deref().unwrap_or(""),
                        session.id
                    );
                }
            }
        },

        ReviewCommands::Delete { id, format } => {
            reviews.delete_session(&id).await?;
            if format == "json" {
                print_json(&json!({ "deleted": true, "id": id }))?;
            } else {
                println!("Review session deleted: {}", id);
            }
        },
    }

    Ok(())
}
