//! CLI argument parsing for the task board.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tb",
    about = "A local three-column task board",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/taskboard/logs/taskboard.log"
)]
pub struct Cli {
    /// Directory holding the board database (overrides the config file)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Path to a YAML config file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List tasks, newest first
    List {
        /// Only tasks in this column (todo, in-progress, done)
        #[arg(short, long)]
        status: Option<String>,

        /// Case-insensitive text to find in title or description
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Priorities to keep (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        priority: Option<Vec<String>>,

        /// Sort by creation time (newest, oldest)
        #[arg(long)]
        sort: Option<String>,

        /// Filter as a query string, e.g. "q=login&priority=high&sort=newest"
        #[arg(long, conflicts_with_all = ["search", "priority", "sort"])]
        query: Option<String>,
    },

    /// Show the three columns side by side
    Board,

    /// Create a new task
    Add {
        /// Task title
        title: String,

        /// Description
        #[arg(short = 'D', long, default_value = "")]
        description: String,

        /// Column (todo, in-progress, done)
        #[arg(short, long, default_value = "todo")]
        status: String,

        /// Priority (low, medium, high)
        #[arg(short, long, default_value = "medium")]
        priority: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },

    /// Show a task by ID
    Show {
        /// Task ID
        id: String,
    },

    /// Change fields of a task
    Edit {
        /// Task ID
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short = 'D', long)]
        description: Option<String>,

        #[arg(short, long)]
        status: Option<String>,

        #[arg(short, long)]
        priority: Option<String>,

        /// New due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Move a task to another column
    Move {
        /// Task ID
        id: String,

        /// Target column (todo, in-progress, done)
        status: String,
    },

    /// Delete one or more tasks
    Delete {
        /// Task IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Move several tasks to one column
    BatchMove {
        /// Target column (todo, in-progress, done)
        status: String,

        /// Task IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Write all tasks to tasks.json
    Export {
        /// Directory to write into (default: current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Merge tasks from a JSON file; tasks with the same ID are replaced
    Import {
        /// File to import
        file: PathBuf,
    },
}
