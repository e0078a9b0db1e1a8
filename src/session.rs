// Session: the stores of one running application

use crate::config::Config;
use crate::filter::Filter;
use crate::models::{Notification, Task, Theme};
use crate::prefs::{DEFAULT_THEME_KEY, OnboardingStore, ThemeStore};
use crate::storage::{MemoryStorage, Storage, open_storage};
use crate::store::TaskStore;
use eyre::{Context, Result};
use std::rc::Rc;
use tracing::{debug, info};

/// A user action forwarded by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Add(String),
    Toggle(String),
    Remove(String),
    UpdateDetails { id: String, details: String },
    SetFilter(Filter),
    DismissOnboarding,
    SetTheme(Theme),
    ToggleTheme,
}

/// Everything the presentation layer talks to, constructed once at startup
pub struct Session {
    pub tasks: TaskStore,
    pub onboarding: OnboardingStore,
    pub theme: ThemeStore,
    filter: Filter,
}

impl Session {
    /// Open the configured storage and hydrate every store from it
    pub fn open(config: &Config) -> Result<Self> {
        info!(storage = %config.storage, data_dir = %config.data_dir.display(), "Opening session");
        let storage = open_storage(config.storage, &config.data_dir)
            .with_context(|| format!("Failed to open {} storage", config.storage))?;
        Ok(Self::with_storage(storage, &config.theme_key))
    }

    /// A session that forgets everything when dropped
    pub fn in_memory() -> Self {
        Self::with_storage(Rc::new(MemoryStorage::new()), DEFAULT_THEME_KEY)
    }

    pub fn with_storage(storage: Rc<dyn Storage>, theme_key: &str) -> Self {
        Self {
            tasks: TaskStore::load(storage.clone()),
            onboarding: OnboardingStore::load(storage.clone()),
            theme: ThemeStore::load_with_key(storage, theme_key),
            filter: Filter::default(),
        }
    }

    /// Route an intent to the store that owns it
    ///
    /// Returns the created task for `Intent::Add`, `None` otherwise.
    pub fn apply(&mut self, intent: Intent) -> Option<Task> {
        debug!(?intent, "apply");
        match intent {
            Intent::Add(title) => return self.tasks.add(&title),
            Intent::Toggle(id) => self.tasks.toggle(&id),
            Intent::Remove(id) => self.tasks.remove(&id),
            Intent::UpdateDetails { id, details } => self.tasks.update_details(&id, &details),
            Intent::SetFilter(filter) => self.filter = filter,
            Intent::DismissOnboarding => self.onboarding.dismiss(),
            Intent::SetTheme(theme) => self.theme.set(theme),
            Intent::ToggleTheme => {
                self.theme.toggle();
            }
        }
        None
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Tasks under the current filter
    pub fn visible(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.list(self.filter)
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.tasks.drain_notifications()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageKind;
    use tempfile::TempDir;

    #[test]
    fn test_apply_routes_task_intents() {
        let mut session = Session::in_memory();

        let a = session.apply(Intent::Add("A".to_string())).unwrap();
        let b = session.apply(Intent::Add("B".to_string())).unwrap();
        assert!(session.apply(Intent::Add("  ".to_string())).is_none());

        session.apply(Intent::Toggle(a.id.clone()));
        session.apply(Intent::UpdateDetails {
            id: b.id.clone(),
            details: "later".to_string(),
        });

        assert!(session.tasks.get(&a.id).unwrap().completed);
        assert_eq!(session.tasks.get(&b.id).unwrap().details.as_deref(), Some("later"));

        session.apply(Intent::Remove(a.id.clone()));
        assert_eq!(session.tasks.len(), 1);
        assert_eq!(session.drain_notifications().len(), 3);
    }

    #[test]
    fn test_set_filter_changes_visible() {
        let mut session = Session::in_memory();
        let a = session.apply(Intent::Add("A".to_string())).unwrap();
        session.apply(Intent::Add("B".to_string()));
        session.apply(Intent::Toggle(a.id.clone()));

        assert_eq!(session.filter(), Filter::All);
        assert_eq!(session.visible().count(), 2);

        session.apply(Intent::SetFilter(Filter::Completed));
        let visible: Vec<&str> = session.visible().map(|t| t.title.as_str()).collect();
        assert_eq!(visible, vec!["A"]);

        // Remaining count ignores the filter
        assert_eq!(session.tasks.remaining_count(), 1);
    }

    #[test]
    fn test_preference_intents() {
        let mut session = Session::in_memory();
        assert!(session.onboarding.should_show());

        session.apply(Intent::DismissOnboarding);
        assert!(!session.onboarding.should_show());
        session.apply(Intent::DismissOnboarding);
        assert!(!session.onboarding.should_show());

        session.apply(Intent::SetTheme(Theme::Dark));
        assert_eq!(session.theme.get(), Theme::Dark);
        session.apply(Intent::ToggleTheme);
        assert_eq!(session.theme.get(), Theme::Light);
    }

    #[test]
    fn test_open_persists_across_sessions() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp.path().to_path_buf(),
            storage: StorageKind::File,
            theme_key: DEFAULT_THEME_KEY.to_string(),
        };

        {
            let mut session = Session::open(&config).unwrap();
            session.apply(Intent::Add("Remember me".to_string()));
            session.apply(Intent::DismissOnboarding);
            session.apply(Intent::SetTheme(Theme::Dark));
        }

        let session = Session::open(&config).unwrap();
        assert_eq!(session.tasks.tasks()[0].title, "Remember me");
        assert!(!session.onboarding.should_show());
        assert_eq!(session.theme.get(), Theme::Dark);
        // Filter is not persisted
        assert_eq!(session.filter(), Filter::All);
    }
}
