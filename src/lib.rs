// todostore - A local task list persisted to key-value storage

pub mod config;
pub mod file;
pub mod filter;
pub mod models;
pub mod prefs;
pub mod session;
pub mod sqlite;
pub mod storage;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use file::FileStorage;
pub use filter::Filter;
pub use models::{Notification, NotificationKind, Task, Theme};
pub use prefs::{OnboardingStore, ThemeStore};
pub use session::{Intent, Session};
pub use sqlite::SqliteStorage;
pub use storage::{MemoryStorage, Storage, StorageKind, open_storage};
pub use store::TaskStore;
