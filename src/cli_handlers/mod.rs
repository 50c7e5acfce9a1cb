// CLI command handlers module
//
// Core: project, task, view
// Career: skill, goal, review
// System: init, category, config

pub mod config_commands;
pub mod other;
pub mod project_commands;
pub mod task_commands;
pub mod utils;
pub mod view_commands;

pub use config_commands::handle_config_command;
pub use other::{
    handle_category_command, handle_goal_command, handle_init_command, handle_review_command,
    handle_skill_command,
};
pub use project_commands::handle_project_command;
pub use task_commands::handle_task_command;
pub use utils::{get_status_badge, CommandContext};
pub use view_commands::handle_view_command;
