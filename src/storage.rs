// Key-value storage the stores persist into

use crate::file::FileStorage;
use crate::sqlite::SqliteStorage;
use eyre::{Result, eyre};
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

/// Name of the directory every on-disk backend keeps its data in
pub const STORE_DIR: &str = ".todostore";

const MAX_KEY_LEN: usize = 128;

/// Durable string-keyed storage
///
/// Implementations are used from a single thread and take `&self`, so a
/// backend shared between several stores through `Rc` can still be written.
pub trait Storage {
    /// Read the value stored under `key`, `None` if the key was never set
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys currently set, sorted
    fn keys(&self) -> Result<Vec<String>>;
}

/// Which backend to open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Sqlite,
    File,
    Memory,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Sqlite => write!(f, "sqlite"),
            StorageKind::File => write!(f, "file"),
            StorageKind::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageKind::Sqlite),
            "file" => Ok(StorageKind::File),
            "memory" => Ok(StorageKind::Memory),
            other => Err(format!("unknown storage backend: {} (expected sqlite, file or memory)", other)),
        }
    }
}

/// Open the configured backend rooted at `data_dir`
pub fn open_storage(kind: StorageKind, data_dir: &Path) -> Result<Rc<dyn Storage>> {
    let storage: Rc<dyn Storage> = match kind {
        StorageKind::Sqlite => Rc::new(SqliteStorage::open(data_dir)?),
        StorageKind::File => Rc::new(FileStorage::open(data_dir)?),
        StorageKind::Memory => Rc::new(MemoryStorage::new()),
    };
    Ok(storage)
}

/// Reject keys that could not be used as a file name
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Storage key cannot be empty"));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(eyre!("Storage key too long: {} chars (max {})", key.len(), MAX_KEY_LEN));
    }
    if key.starts_with('.') {
        return Err(eyre!("Storage key cannot start with '.': {}", key));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(eyre!("Invalid storage key: {} (must be alphanumeric with _/-/.)", key));
    }
    Ok(())
}

/// In-process storage, lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}

/// Current timestamp in milliseconds
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("todos").unwrap(), None);

        storage.set("todos", "[]").unwrap();
        assert_eq!(storage.get("todos").unwrap().as_deref(), Some("[]"));

        storage.set("todos", "[1]").unwrap();
        assert_eq!(storage.get("todos").unwrap().as_deref(), Some("[1]"));

        storage.remove("todos").unwrap();
        assert_eq!(storage.get("todos").unwrap(), None);

        // Removing again is fine
        storage.remove("todos").unwrap();
    }

    #[test]
    fn test_memory_storage_keys_sorted() {
        let storage = MemoryStorage::new();
        storage.set("todos", "[]").unwrap();
        storage.set("onboardingShown", "true").unwrap();
        storage.set("todo-app-theme", "dark").unwrap();

        assert_eq!(
            storage.keys().unwrap(),
            vec!["onboardingShown", "todo-app-theme", "todos"]
        );
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("todos").is_ok());
        assert!(validate_key("todo-app-theme").is_ok());
        assert!(validate_key("onboardingShown").is_ok());
        assert!(validate_key("a.b_c").is_ok());

        assert!(validate_key("").is_err());
        assert!(validate_key("../escape").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("with space").is_err());
        assert!(validate_key(&"k".repeat(129)).is_err());
    }

    #[test]
    fn test_storage_kind_parse() {
        assert_eq!("sqlite".parse::<StorageKind>().unwrap(), StorageKind::Sqlite);
        assert_eq!("FILE".parse::<StorageKind>().unwrap(), StorageKind::File);
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert!("redis".parse::<StorageKind>().is_err());
        assert_eq!(StorageKind::default(), StorageKind::Sqlite);
        assert_eq!(StorageKind::File.to_string(), "file");
    }

    #[test]
    fn test_open_storage_each_kind() {
        let temp = TempDir::new().unwrap();
        for kind in [StorageKind::Sqlite, StorageKind::File, StorageKind::Memory] {
            let storage = open_storage(kind, temp.path()).unwrap();
            storage.set("sample", kind.to_string().as_str()).unwrap();
            assert_eq!(storage.get("sample").unwrap(), Some(kind.to_string()));
        }
    }

    #[test]
    fn test_now_ms() {
        let ts = now_ms();
        // Should be reasonable timestamp (after year 2020)
        assert!(ts > 1_600_000_000_000);
    }
}
