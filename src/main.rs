use clap::Parser;
use skillsprint::cli::{Cli, Commands};
use skillsprint::cli_handlers::{
    handle_category_command, handle_config_command, handle_goal_command, handle_init_command,
    handle_project_command, handle_review_command, handle_skill_command, handle_task_command,
    handle_view_command,
};
use skillsprint::error::Result;
use skillsprint::logging::LoggingConfig;

#[tokio::main]
async fn main() {
    // Parse CLI arguments first to get logging configuration
    let cli = Cli::parse();

    let log_config = LoggingConfig::from_args(cli.quiet, cli.verbose, cli.json);
    if let Err(e) = skillsprint::logging::init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        tracing::debug!(error = ?e, "Command failed");
        let response = e.to_error_response();
        match serde_json::to_string_pretty(&response) {
            Ok(body) => eprintln!("{}", body),
            Err(_) => eprintln!("{}: {}", response.code, response.error),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { at, format } => handle_init_command(at, format).await,
        Commands::Project(cmd) => handle_project_command(cmd).await,
        Commands::Task(cmd) => handle_task_command(cmd).await,
        Commands::View(cmd) => handle_view_command(cmd).await,
        Commands::Category(cmd) => handle_category_command(cmd).await,
        Commands::Skill(cmd) => handle_skill_command(cmd).await,
        Commands::Goal(cmd) => handle_goal_command(cmd).await,
        Commands::Review(cmd) => handle_review_command(cmd).await,
        Commands::Config(cmd) => handle_config_command(cmd).await,
    }
}
