use clap::{ArgAction, Parser, Subcommand};
use colored::{ColoredString, Colorize};
use eyre::Result;
use std::path::PathBuf;
use todostore::{Config, Filter, Intent, Notification, Session, StorageKind, Task, TaskStore, Theme};
use tracing::Level;

const SHORT_ID_LEN: usize = 8;

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "A local task list: add, toggle, annotate, filter and delete tasks")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory to keep the store in (default: platform data dir)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Path to config.yml (default: platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Storage backend: sqlite, file or memory
    #[arg(long)]
    storage: Option<StorageKind>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        #[arg(required = true)]
        title: Vec<String>,
    },

    /// Mark a task complete, or incomplete again
    Toggle { id: String },

    /// Delete a task
    Remove { id: String },

    /// Set the free-text details of a task (empty clears the text)
    Details { id: String, text: Vec<String> },

    /// Show tasks
    List {
        /// all, active or completed
        #[arg(short, long, default_value = "all")]
        filter: Filter,
    },

    /// Stop showing the welcome banner
    DismissOnboarding,

    /// Show the theme, or set it (toggles when no value is given)
    Theme {
        value: Option<Theme>,

        /// Print the current theme without changing it
        #[arg(long, conflicts_with = "value")]
        show: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(storage) = cli.storage {
        config.storage = storage;
    }

    let mut session = Session::open(&config)?;

    match cli.command {
        Commands::Add { title } => {
            if let Some(task) = session.apply(Intent::Add(title.join(" "))) {
                println!("{} {}", short_id(&task).dimmed(), task.title);
            }
        }
        Commands::Toggle { id } => {
            if let Some(id) = resolve_id(&session.tasks, &id) {
                session.apply(Intent::Toggle(id.clone()));
                if let Some(task) = session.tasks.get(&id) {
                    print_task(task, session.theme.get());
                }
            }
        }
        Commands::Remove { id } => {
            if let Some(id) = resolve_id(&session.tasks, &id) {
                session.apply(Intent::Remove(id));
            }
        }
        Commands::Details { id, text } => {
            if let Some(id) = resolve_id(&session.tasks, &id) {
                session.apply(Intent::UpdateDetails {
                    id: id.clone(),
                    details: text.join(" "),
                });
                if let Some(task) = session.tasks.get(&id) {
                    print_task(task, session.theme.get());
                }
            }
        }
        Commands::List { filter } => {
            session.apply(Intent::SetFilter(filter));
            print_list(&session);
        }
        Commands::DismissOnboarding => {
            session.apply(Intent::DismissOnboarding);
            println!("Welcome banner dismissed");
        }
        Commands::Theme { value, show } => {
            match value {
                Some(theme) => {
                    session.apply(Intent::SetTheme(theme));
                }
                None if !show => {
                    session.apply(Intent::ToggleTheme);
                }
                None => {}
            }
            println!("Theme: {}", accent(session.theme.get().as_str(), session.theme.get()));
        }
    }

    for notification in session.drain_notifications() {
        print_notification(&notification);
    }

    if session.tasks.last_write_failed() {
        eprintln!("{}", "Warning: changes could not be saved to storage".yellow());
    }

    Ok(())
}

/// Match an exact id, or a unique prefix/suffix of one
fn resolve_id(store: &TaskStore, query: &str) -> Option<String> {
    if let Some(task) = store.get(query) {
        return Some(task.id.clone());
    }

    let matches: Vec<&Task> = store
        .tasks()
        .iter()
        .filter(|t| !query.is_empty() && (t.id.starts_with(query) || t.id.ends_with(query)))
        .collect();

    match matches.as_slice() {
        [task] => Some(task.id.clone()),
        [] => {
            eprintln!("{}", format!("No task matches {}", query).yellow());
            None
        }
        _ => {
            eprintln!("{}", format!("{} matches {} tasks, be more specific", query, matches.len()).yellow());
            None
        }
    }
}

/// Trailing characters of the id; the leading ones of a v7 id are a timestamp
fn short_id(task: &Task) -> &str {
    let start = task.id.len().saturating_sub(SHORT_ID_LEN);
    task.id.get(start..).unwrap_or(&task.id)
}

fn accent(text: &str, theme: Theme) -> ColoredString {
    match theme {
        Theme::Light => text.blue().bold(),
        Theme::Dark => text.bright_cyan().bold(),
    }
}

fn print_list(session: &Session) {
    let theme = session.theme.get();

    if session.onboarding.should_show() {
        println!("{}", accent("Welcome to todostore!", theme));
        println!("Add tasks with `todostore add`. Toggle one to mark it complete.");
        println!("Attach notes with `todostore details`. Hide this with `todostore dismiss-onboarding`.");
        println!();
    }

    let mut shown = 0;
    for task in session.visible() {
        print_task(task, theme);
        shown += 1;
    }

    if shown == 0 {
        let (message, hint) = session.filter().empty_message();
        println!("{}", message.bold());
        println!("{}", hint.dimmed());
    }

    println!();
    println!("{} items left", session.tasks.remaining_count());
}

fn print_task(task: &Task, theme: Theme) {
    let id = short_id(task).dimmed();
    if task.completed {
        println!("{} {} {}", accent("✓", theme), id, task.title.strikethrough().dimmed());
    } else {
        println!("{} {} {}", accent("○", theme), id, task.title);
    }

    if let Some(details) = task.details.as_deref().filter(|d| !d.is_empty()) {
        for line in details.lines() {
            println!("      {}", line.italic());
        }
    }
}

fn print_notification(notification: &Notification) {
    let title = if notification.destructive {
        notification.title.red().bold()
    } else {
        notification.title.green().bold()
    };
    println!("{}: {}", title, notification.description);
}
