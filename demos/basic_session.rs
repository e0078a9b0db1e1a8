//! Demo: Basic session
//!
//! Adds, toggles, annotates, filters and removes tasks, then reopens the
//! store to show that everything was persisted.
//!
//! Run with: cargo run --example basic_session

use eyre::Result;
use todostore::{Config, Filter, Intent, Session, StorageKind, Theme};

fn main() -> Result<()> {
    // Create a temporary directory for this demo
    let temp_dir = tempfile::tempdir()?;
    let config = Config {
        data_dir: temp_dir.path().to_path_buf(),
        storage: StorageKind::Sqlite,
        ..Config::default()
    };

    println!("todostore Basic Session Demo");
    println!("============================\n");
    println!("Data dir: {}\n", config.data_dir.display());

    let mut session = Session::open(&config)?;
    println!("Show onboarding banner: {}\n", session.onboarding.should_show());

    // ADD
    println!("1. ADD - Adding three tasks...");
    let mut ids = Vec::new();
    for title in ["Buy milk", "Walk the dog", "Write report"] {
        if let Some(task) = session.apply(Intent::Add(title.to_string())) {
            println!("   Added {} ({})", task.title, task.id);
            ids.push(task.id);
        }
    }
    // Blank titles are ignored
    session.apply(Intent::Add("   ".to_string()));
    println!("   Task count: {}\n", session.tasks.len());

    // TOGGLE + DETAILS
    println!("2. TOGGLE / DETAILS...");
    session.apply(Intent::Toggle(ids[0].clone()));
    session.apply(Intent::UpdateDetails {
        id: ids[2].clone(),
        details: "Due Friday".to_string(),
    });
    println!("   Items left: {}\n", session.tasks.remaining_count());

    // FILTER
    println!("3. FILTER...");
    for filter in [Filter::All, Filter::Active, Filter::Completed] {
        session.apply(Intent::SetFilter(filter));
        let titles: Vec<&str> = session.visible().map(|t| t.title.as_str()).collect();
        println!("   {:<9} {:?}", filter.to_string(), titles);
    }
    println!();

    // REMOVE
    println!("4. REMOVE - Removing \"Walk the dog\" twice...");
    session.apply(Intent::Remove(ids[1].clone()));
    session.apply(Intent::Remove(ids[1].clone()));
    println!("   Task count: {}\n", session.tasks.len());

    for notification in session.drain_notifications() {
        println!("   [{}] {}", notification.title, notification.description);
    }
    println!();

    // PREFERENCES
    session.apply(Intent::DismissOnboarding);
    session.apply(Intent::SetTheme(Theme::Dark));
    drop(session);

    // REOPEN
    println!("5. REOPEN - Loading from storage...");
    let session = Session::open(&config)?;
    for task in session.tasks.tasks() {
        let mark = if task.completed { "x" } else { " " };
        println!("   [{}] {} {:?}", mark, task.title, task.details);
    }
    println!("   Show onboarding banner: {}", session.onboarding.should_show());
    println!("   Theme: {}\n", session.theme.get());

    println!("Demo complete!");
    Ok(())
}
