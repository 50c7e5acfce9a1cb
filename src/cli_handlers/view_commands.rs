use crate::cli::ViewCommands;
use crate::cli_handlers::utils::{get_status_badge, print_json, view_config, CommandContext};
use crate::error::Result;
use crate::time_utils::{parse_month, today};
use crate::views::{project_calendar, project_month, project_timeline, TimelineBar, ViewConfig};
use chrono::Datelike;

/// Width of the timeline bar area in characters
const TIMELINE_WIDTH: f64 = 50.0;

/// Handle all `sprint view` subcommands
pub async fn handle_view_command(cmd: ViewCommands) -> Result<()> {
    match cmd {
        ViewCommands::Board {
            project,
            only,
            format,
        } => {
            let ctx = CommandContext::load().await?;
            let scope = ctx.scope_for(project.as_deref()).await?;
            let projects = ctx.resolve_projects(&only).await?;
            let config = view_config(None, projects, "custom")?;
            let (store, _rx) = ctx.store(scope).await?;
            let board = store.board(&config);

            if format == "json" {
                return print_json(&board);
            }
            for column in &board {
                println!("{} ({})", column.label, column.count());
                for task in &column.tasks {
                    println!("  {} {}  [{}]", get_status_badge(task.status), task.title, task.id);
                }
                println!();
            }
            Ok(())
        },

        ViewCommands::Calendar {
            project,
            status,
            sort,
            format,
        } => {
            let (config, tasks) = load_view(project, status, &sort).await?;
            let days = project_calendar(&tasks);
            tracing::debug!(days = days.len(), sort = ?config.sort, "Calendar projected");

            if format == "json" {
                return print_json(&days);
            }
            if days.is_empty() {
                println!("No tasks to show");
            }
            for day in &days {
                println!("{}", day.date.format("%a %Y-%m-%d"));
                for task in &day.visible {
                    println!("  {} {}", get_status_badge(task.status), task.title);
                }
                if let Some(more) = day.more_label() {
                    println!("  {}", more);
                }
            }
            Ok(())
        },

        ViewCommands::Month {
            month,
            project,
            status,
            format,
        } => {
            let month = match month {
                Some(m) => parse_month(&m)?,
                None => today(),
            };
            let (_, tasks) = load_view(project, status, "custom").await?;
            let weeks = project_month(&tasks, month);

            if format == "json" {
                return print_json(&weeks);
            }
            println!("{}", month.format("%B %Y"));
            println!(" Sun  Mon  Tue  Wed  Thu  Fri  Sat");
            for week in &weeks {
                let row: Vec<String> = week
                    .days
                    .iter()
                    .map(|cell| match (cell.in_month, cell.total) {
                        (false, _) => "  .  ".to_string(),
                        (true, 0) => format!(" {:>2}  ", cell.date.day()),
                        (true, n) => format!(" {:>2}*{}", cell.date.day(), n.min(9)),
                    })
                    .collect();
                println!("{}", row.join(""));
            }
            Ok(())
        },

        ViewCommands::Timeline {
            project,
            status,
            sort,
            format,
        } => {
            let (_, tasks) = load_view(project, status, &sort).await?;
            let timeline = project_timeline(&tasks);

            if format == "json" {
                return print_json(&timeline);
            }
            let Some(timeline) = timeline else {
                println!("No tasks to display in timeline view");
                return Ok(());
            };

            let ticks: Vec<String> = timeline
                .ticks
                .iter()
                .map(|t| t.date.format("%b %d").to_string())
                .collect();
            println!("{} .. {} ({} days)", timeline.start, timeline.end, timeline.total_days);
            println!("Ticks: {}", ticks.join(" | "));
            for bar in &timeline.bars {
                let (offset, width) = bar_cells(bar);
                println!(
                    "{:<24} |{}{}",
                    truncate(&bar.task.title, 24),
                    " ".repeat(offset),
                    "█".repeat(width)
                );
            }
            Ok(())
        },
    }
}

async fn load_view(
    project: Option<String>,
    status: Option<String>,
    sort: &str,
) -> Result<(ViewConfig, Vec<crate::db::models::Task>)> {
    let ctx = CommandContext::load().await?;
    let scope = ctx.scope_for(project.as_deref()).await?;
    let config = view_config(status.as_deref(), Vec::new(), sort)?;
    let (store, _rx) = ctx.store(scope).await?;
    let tasks = store.view(&config);
    Ok((config, tasks))
}

/// Leading blank cells and filled cells for a bar; at least one cell is filled
fn bar_cells(bar: &TimelineBar) -> (usize, usize) {
    let offset = (bar.offset_percent / 100.0 * TIMELINE_WIDTH).round() as usize;
    let width = ((bar.width_percent / 100.0 * TIMELINE_WIDTH).round() as usize).max(1);
    (offset, width)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
