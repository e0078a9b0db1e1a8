// Small persisted preferences: onboarding flag and theme

use crate::models::Theme;
use crate::storage::Storage;
use std::rc::Rc;
use tracing::{debug, warn};

/// Storage key of the onboarding-dismissed marker
pub const ONBOARDING_KEY: &str = "onboardingShown";

/// Default storage key of the theme setting
pub const DEFAULT_THEME_KEY: &str = "todo-app-theme";

/// One-time welcome banner flag
pub struct OnboardingStore {
    storage: Rc<dyn Storage>,
    shown: bool,
}

impl OnboardingStore {
    pub fn load(storage: Rc<dyn Storage>) -> Self {
        let shown = match storage.get(ONBOARDING_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                warn!(key = ONBOARDING_KEY, error = ?e, "Failed to read onboarding flag");
                false
            }
        };

        Self { storage, shown }
    }

    /// True until the banner has been dismissed once
    pub fn should_show(&self) -> bool {
        !self.shown
    }

    /// Mark the banner as shown for good
    pub fn dismiss(&mut self) {
        self.shown = true;
        if let Err(e) = self.storage.set(ONBOARDING_KEY, "true") {
            warn!(key = ONBOARDING_KEY, error = ?e, "Failed to persist onboarding flag");
        }
    }
}

/// Persisted light/dark setting
pub struct ThemeStore {
    storage: Rc<dyn Storage>,
    key: String,
    theme: Theme,
}

impl ThemeStore {
    pub fn load(storage: Rc<dyn Storage>) -> Self {
        Self::load_with_key(storage, DEFAULT_THEME_KEY)
    }

    /// Load from a custom key; anything unset or unrecognised reads as light
    pub fn load_with_key(storage: Rc<dyn Storage>, key: &str) -> Self {
        let theme = match storage.get(key) {
            Ok(Some(value)) => value.parse::<Theme>().unwrap_or_else(|e| {
                warn!(key, error = %e, "Ignoring stored theme");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(key, error = ?e, "Failed to read theme");
                Theme::default()
            }
        };

        Self {
            storage,
            key: key.to_string(),
            theme,
        }
    }

    pub fn get(&self) -> Theme {
        self.theme
    }

    pub fn set(&mut self, theme: Theme) {
        debug!(%theme, "set theme");
        self.theme = theme;
        if let Err(e) = self.storage.set(&self.key, theme.as_str()) {
            warn!(key = %self.key, error = ?e, "Failed to persist theme");
        }
    }

    /// Switch to the other theme and return it
    pub fn toggle(&mut self) -> Theme {
        let next = self.theme.toggled();
        self.set(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_onboarding_shows_by_default() {
        let store = OnboardingStore::load(Rc::new(MemoryStorage::new()));
        assert!(store.should_show());
    }

    #[test]
    fn test_onboarding_dismiss_is_permanent() {
        let storage = Rc::new(MemoryStorage::new());
        let mut store = OnboardingStore::load(storage.clone());

        store.dismiss();
        assert!(!store.should_show());
        store.dismiss();
        assert!(!store.should_show());
        assert_eq!(storage.get(ONBOARDING_KEY).unwrap().as_deref(), Some("true"));

        let reloaded = OnboardingStore::load(storage);
        assert!(!reloaded.should_show());
    }

    #[test]
    fn test_onboarding_only_literal_true_counts() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set(ONBOARDING_KEY, "yes").unwrap();
        assert!(OnboardingStore::load(storage).should_show());
    }

    #[test]
    fn test_theme_defaults_to_light() {
        let store = ThemeStore::load(Rc::new(MemoryStorage::new()));
        assert_eq!(store.get(), Theme::Light);
    }

    #[test]
    fn test_theme_invalid_value_reads_light() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set(DEFAULT_THEME_KEY, "purple").unwrap();
        assert_eq!(ThemeStore::load(storage).get(), Theme::Light);
    }

    #[test]
    fn test_theme_set_and_reload() {
        let storage = Rc::new(MemoryStorage::new());
        let mut store = ThemeStore::load(storage.clone());

        store.set(Theme::Dark);
        assert_eq!(store.get(), Theme::Dark);
        assert_eq!(storage.get(DEFAULT_THEME_KEY).unwrap().as_deref(), Some("dark"));

        assert_eq!(ThemeStore::load(storage).get(), Theme::Dark);
    }

    #[test]
    fn test_theme_toggle() {
        let mut store = ThemeStore::load(Rc::new(MemoryStorage::new()));
        assert_eq!(store.toggle(), Theme::Dark);
        assert_eq!(store.toggle(), Theme::Light);
        assert_eq!(store.get(), Theme::Light);
    }

    #[test]
    fn test_theme_custom_key() {
        let storage = Rc::new(MemoryStorage::new());
        let mut store = ThemeStore::load_with_key(storage.clone(), "theme");
        store.set(Theme::Dark);

        assert_eq!(storage.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(storage.get(DEFAULT_THEME_KEY).unwrap(), None);
    }
}
