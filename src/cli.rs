use clap::{Parser, Subcommand};

const LONG_ABOUT: &str = r#"
SkillSprint - projects, tasks and career growth from the terminal

Tasks live in projects. Each project keeps a manual order you can
rearrange, and every task list can be filtered and sorted, or shown as
a board, a calendar or a timeline.

Common workflow:
  sprint init                               ← create .skillsprint/ here
  sprint project add "Certification"        ← start a project
  sprint task add "Read chapter 1" --project Certification --due 2025-03-01
  sprint task list --project Certification  ← manual order
  sprint task move <id> 0                   ← put a task first
  sprint view board --project Certification

Data location:
  SKILLSPRINT_DIR, else the nearest .skillsprint/ above the current
  directory, else ~/.skillsprint/
"#;

#[derive(Parser, Clone)]
#[command(name = "sprint")]
#[command(about = "Track projects, ordered tasks, skills and reviews")]
#[command(long_about = LONG_ABOUT)]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Create a workspace
    ///
    /// Examples:
    ///   sprint init
    ///   sprint init --at ~/work
    Init {
        /// Directory to create .skillsprint/ in (default: SKILLSPRINT_DIR or current dir)
        #[arg(long)]
        at: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Board, calendar and timeline views
    #[command(subcommand)]
    View(ViewCommands),

    /// Manage task categories
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Manage skills and the growth digest
    #[command(subcommand)]
    Skill(SkillCommands),

    /// Manage career goals
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Review cadence and review sessions
    #[command(subcommand)]
    Review(ReviewCommands),

    /// Workspace settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Clone)]
pub enum ProjectCommands {
    /// Create a project
    ///
    /// Examples:
    ///   sprint project add "Certification"
    ///   sprint project add "Rust" --start 2025-01-01 --end 2025-06-30
    Add {
        /// Project name
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Target end date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// active, on_hold or completed (default: active)
        #[arg(short, long)]
        status: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List projects
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show one project with its task progress
    Get {
        /// Project id or name
        project: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Update a project
    ///
    /// Pass `none` to clear a date or the description.
    Update {
        /// Project id or name
        project: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        #[arg(short, long)]
        status: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete a project and all of its tasks
    Delete {
        /// Project id or name
        project: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Project counts by status and per-project progress
    Summary {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum TaskCommands {
    /// Create a task
    ///
    /// New tasks start as todo with medium priority and go to the end of
    /// their project's manual order.
    ///
    /// Examples:
    ///   sprint task add "Write summary" --project Certification --due 2025-03-01
    ///   sprint task add "Mock exam" -p Certification --due 2025-04-01 --priority high
    Add {
        /// Task title
        title: String,

        /// Project id or name
        #[arg(short, long)]
        project: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// low, medium, high or none
        #[arg(long)]
        priority: Option<String>,

        /// Category id or name
        #[arg(short, long)]
        category: Option<String>,

        /// todo, in_progress or done
        #[arg(short, long)]
        status: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show a task
    Get {
        /// Task id
        id: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List tasks
    ///
    /// Without --project, tasks from every project are merged.
    ///
    /// Examples:
    ///   sprint task list --project Certification
    ///   sprint task list --status todo --sort priority
    ///   sprint task list --only Certification --only Rust --sort due_date
    List {
        /// Project id or name
        #[arg(short, long)]
        project: Option<String>,

        /// Filter by status (todo, in_progress, done)
        #[arg(short, long)]
        status: Option<String>,

        /// Filter to these projects (id or name, repeatable)
        #[arg(long = "only")]
        only: Vec<String>,

        /// custom, status, priority, category or due_date
        #[arg(long, default_value = "custom")]
        sort: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Update task fields
    ///
    /// Pass `none` to clear the description, priority, category or start date.
    ///
    /// Examples:
    ///   sprint task update <id> --status in_progress
    ///   sprint task update <id> --priority none --due 2025-05-01
    Update {
        /// Task id
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        status: Option<String>,

        #[arg(long)]
        priority: Option<String>,

        /// Category id or name
        #[arg(short, long)]
        category: Option<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        due: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete a task
    Delete {
        /// Task id
        id: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Move a task within its project's manual order
    ///
    /// Positions are 0-based. A position past the end leaves the order as is.
    ///
    /// Examples:
    ///   sprint task move <id> 0
    Move {
        /// Task id
        id: String,

        /// New 0-based position
        position: usize,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Drop a task into a board column (changes only its status)
    Drop {
        /// Task id
        id: String,

        /// todo, in_progress or done
        status: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum ViewCommands {
    /// Tasks grouped into todo / in progress / done columns
    Board {
        /// Project id or name
        #[arg(short, long)]
        project: Option<String>,

        /// Filter to these projects (id or name, repeatable)
        #[arg(long = "only")]
        only: Vec<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Days with tasks due, at most three shown per day
    Calendar {
        #[arg(short, long)]
        project: Option<String>,

        #[arg(short, long)]
        status: Option<String>,

        #[arg(long, default_value = "custom")]
        sort: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Month grid, Sunday to Saturday
    Month {
        /// Month to show (YYYY-MM, default: current month)
        month: Option<String>,

        #[arg(short, long)]
        project: Option<String>,

        #[arg(short, long)]
        status: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Tasks laid out on a shared date axis
    Timeline {
        #[arg(short, long)]
        project: Option<String>,

        #[arg(short, long)]
        status: Option<String>,

        #[arg(long, default_value = "custom")]
        sort: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum CategoryCommands {
    /// Create a category
    ///
    /// Colors: blue, green, amber, red, purple, pink, teal, slate or #rrggbb
    Add {
        name: String,

        #[arg(long)]
        color: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List categories
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete a category; its tasks become uncategorized
    Delete {
        /// Category id or name
        category: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum SkillCommands {
    /// Create a skill
    Add {
        name: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List skills
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete a skill
    Delete {
        /// Skill id or name
        skill: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Tag a task with a skill
    Attach {
        /// Task id
        task: String,

        /// Skill id or name
        skill: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Remove a skill tag from a task
    Detach {
        task: String,

        skill: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Finished tasks from the last N days grouped by skill
    Digest {
        /// Window in days
        #[arg(long, default_value = "7")]
        days: i64,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum GoalCommands {
    /// Create a career goal
    Add {
        title: String,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        target: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List goals by target date
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete a goal
    Delete {
        id: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum ReviewCommands {
    /// Show or set the review cadence
    ///
    /// Examples:
    ///   sprint review cadence
    ///   sprint review cadence --one-on-one biweekly --performance quarterly
    Cadence {
        /// weekly, biweekly or monthly
        #[arg(long = "one-on-one")]
        one_on_one: Option<String>,

        /// quarterly or annual
        #[arg(long)]
        performance: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Record a review session
    Add {
        /// one_on_one or performance
        kind: String,

        /// Scheduled date (YYYY-MM-DD)
        date: String,

        #[arg(short, long)]
        notes: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List review sessions by date
    List {
        /// one_on_one or performance
        #[arg(long)]
        kind: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete a review session
    Delete {
        id: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Set a configuration value
    ///
    /// Examples:
    ///   sprint config set session.user_id alice
    Set {
        key: String,

        value: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Get a configuration value
    Get {
        key: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List configuration values
    List {
        /// Only keys starting with this prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Remove a configuration value
    Unset {
        key: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
