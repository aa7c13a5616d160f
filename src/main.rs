//! tb - a local three-column task board.

use chrono::Local;
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use taskboard::config::{self, Config};
use taskboard::{
    Board, CreateTaskInput, Filter, Priority, Repository, SortOrder, SqliteStorage, Status, Task, UpdateTaskInput,
    columns, is_overdue,
};

mod cli;

use cli::{Cli, Command};

fn setup_logging() -> Result<()> {
    let log_dir = config::log_dir();

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("taskboard.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn open_board(cli: &Cli) -> Result<Board<SqliteStorage>> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(dir) = &cli.dir {
        config = config.data_dir(dir);
    }

    let db_path = config.db_path();
    info!("Opening board at {}", db_path.display());
    let storage = SqliteStorage::open(&db_path)
        .context("Failed to open board storage")?
        .with_quota(config.quota_bytes);

    Ok(Board::new(Repository::with_key(storage, config.storage_key)))
}

fn format_status(status: &Status) -> ColoredString {
    match status {
        Status::Todo => status.as_str().blue(),
        Status::InProgress => status.as_str().yellow(),
        Status::Done => status.as_str().green(),
    }
}

fn format_priority(priority: &Priority) -> ColoredString {
    match priority {
        Priority::Low => priority.as_str().green(),
        Priority::Medium => priority.as_str().yellow(),
        Priority::High => priority.as_str().red(),
    }
}

fn format_due(task: &Task) -> String {
    match &task.due_date {
        Some(due) if is_overdue(Some(due.as_str()), Local::now().date_naive()) => format!(" due {}", due.red().bold()),
        Some(due) => format!(" due {}", due).dimmed().to_string(),
        None => String::new(),
    }
}

fn print_task_line(task: &Task) {
    println!(
        "{} {} {} {}{}",
        format_status(&task.status),
        task.id.cyan(),
        format_priority(&task.priority),
        task.title,
        format_due(task)
    );
}

fn parse_status(value: &str) -> Result<Status> {
    value.parse::<Status>().context("Invalid status")
}

fn parse_priority(value: &str) -> Result<Priority> {
    value.parse::<Priority>().context("Invalid priority")
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

async fn run(cli: Cli) -> Result<()> {
    let mut board = open_board(&cli)?;
    board.fetch_tasks().await.context("Failed to load tasks")?;

    match cli.command {
        Command::List {
            status,
            search,
            priority,
            sort,
            query,
        } => {
            let filter = match query {
                Some(query) => Filter::from_query_string(&query),
                None => {
                    let mut filter = Filter::new();
                    if let Some(search) = search {
                        filter = filter.search(search);
                    }
                    for p in priority.unwrap_or_default() {
                        filter = filter.priority(parse_priority(&p)?);
                    }
                    if let Some(sort) = sort {
                        let order: SortOrder = sort.parse().map_err(|e: String| eyre::eyre!(e))?;
                        filter = filter.sort(order);
                    }
                    filter
                }
            };
            let status_filter = status.as_deref().map(parse_status).transpose()?;

            let tasks: Vec<Task> = filter
                .apply(board.tasks())
                .into_iter()
                .filter(|t| status_filter.is_none_or(|s| t.status == s))
                .collect();

            if tasks.is_empty() {
                println!("{}", "No tasks found".dimmed());
            } else {
                for task in &tasks {
                    print_task_line(task);
                }
            }
        }

        Command::Board => {
            for (status, tasks) in columns(board.tasks()) {
                println!("{} ({})", status.label().bold(), tasks.len());
                if tasks.is_empty() {
                    println!("  {}", "empty".dimmed());
                }
                for task in tasks {
                    println!(
                        "  {} {} {}{}",
                        task.id.cyan(),
                        format_priority(&task.priority),
                        task.title,
                        format_due(task)
                    );
                }
            }
        }

        Command::Add {
            title,
            description,
            status,
            priority,
            due,
        } => {
            let mut input = CreateTaskInput::new(title.trim())
                .with_description(description)
                .with_status(parse_status(&status)?)
                .with_priority(parse_priority(&priority)?);
            if let Some(due) = due {
                input = input.with_due_date(due);
            }
            if input.title.is_empty() {
                eyre::bail!("Title is required");
            }

            let task = board.add_task(input).await.context("Failed to create task")?;
            println!("{} Created: {} {}", "✓".green(), task.id.cyan(), task.title);
        }

        Command::Show { id } => match board.get_task_by_id(&id) {
            Some(task) => {
                println!("{}: {}", "ID".bold(), task.id.cyan());
                println!("{}: {}", "Title".bold(), task.title);
                println!("{}: {}", "Status".bold(), format_status(&task.status));
                println!("{}: {}", "Priority".bold(), format_priority(&task.priority));
                if !task.description.is_empty() {
                    println!("{}: {}", "Description".bold(), task.description);
                }
                if let Some(due) = &task.due_date {
                    println!("{}: {}", "Due".bold(), due);
                }
                println!("{}: {}", "Created".bold(), task.created_at);
                println!("{}: {}", "Updated".bold(), task.updated_at);
            }
            None => {
                eprintln!("{} Task not found: {}", "✗".red(), id);
                std::process::exit(1);
            }
        },

        Command::Edit {
            id,
            title,
            description,
            status,
            priority,
            due,
            clear_due,
        } => {
            let mut patch = UpdateTaskInput::new();
            if let Some(title) = title {
                patch = patch.title(title);
            }
            if let Some(description) = description {
                patch = patch.description(description);
            }
            if let Some(status) = status {
                patch = patch.status(parse_status(&status)?);
            }
            if let Some(priority) = priority {
                patch = patch.priority(parse_priority(&priority)?);
            }
            if clear_due {
                patch = patch.due_date(None);
            } else if let Some(due) = due {
                patch = patch.due_date(Some(due));
            }
            if patch.is_empty() {
                eyre::bail!("Nothing to change");
            }

            let task = board.update_task(&id, &patch).await.context("Failed to update task")?;
            println!("{} Updated: {} {}", "✓".green(), task.id.cyan(), task.title);
        }

        Command::Move { id, status } => {
            let status = parse_status(&status)?;
            let task = board.move_task(&id, status).await.context("Failed to move task")?;
            println!("{} Task moved to {}: {}", "→".blue(), status.label(), task.title);
        }

        Command::Delete { ids } => {
            let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            let undo = match id_refs.as_slice() {
                [id] => board.delete_task(id).await.context("Failed to delete task")?,
                _ => board.batch_delete(&id_refs).await.context("Failed to delete tasks")?,
            };
            println!("{} {} task{} deleted", "✓".green(), undo.len(), plural(undo.len()));
        }

        Command::BatchMove { status, ids } => {
            let status = parse_status(&status)?;
            let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            let moved = board
                .batch_move(&id_refs, status)
                .await
                .context("Failed to move tasks")?;
            println!(
                "{} {} task{} moved to {}",
                "→".blue(),
                moved.len(),
                plural(moved.len()),
                status.label()
            );
        }

        Command::Export { out } => {
            let dir = out.unwrap_or_else(|| PathBuf::from("."));
            let path = board.export_to_file(&dir)?;
            let count = board.tasks().len();
            println!(
                "{} Exported {} task{} to {}",
                "✓".green(),
                count,
                plural(count),
                path.display()
            );
        }

        Command::Import { file } => {
            let merged = board.import_from_file(&file).await?;
            println!("{} Tasks imported ({} on the board)", "✓".green(), merged.len());
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    info!("Command: {:?}", std::env::args().collect::<Vec<_>>());

    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("Failed to create runtime")?;

    if let Err(e) = rt.block_on(run(cli)) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
