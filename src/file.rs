// One-file-per-key storage

use crate::storage::{STORE_DIR, Storage, validate_key};
use eyre::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const LOCK_FILE: &str = ".lock";

/// Key-value storage where every key is a plain file under
/// `<path>/.todostore/kv/`
///
/// Writes go to a temporary file that is renamed over the old value while
/// holding an exclusive lock on `.lock`, so readers never observe a
/// half-written snapshot.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let dir = path.as_ref().join(STORE_DIR).join("kv");
        fs::create_dir_all(&dir).context("Failed to create key-value directory")?;
        Ok(Self { dir })
    }

    /// Get the directory holding the key files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn lock_file(&self) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(LOCK_FILE))
            .context("Failed to open lock file")
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;

        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let lock = self.lock_file()?;
        FileExt::lock_shared(&lock).context("Failed to acquire shared lock")?;

        let value = fs::read_to_string(&path).with_context(|| format!("Failed to read key file {:?}", path))?;

        // Lock is released when `lock` is dropped
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        debug!(key, bytes = value.len(), "file set");

        let lock = self.lock_file()?;
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        // Valid keys never start with '.', so the staging name cannot shadow one
        let tmp_path = self.dir.join(format!(".{}.tmp", key));
        {
            let mut tmp = File::create(&tmp_path).context("Failed to create temporary file")?;
            tmp.write_all(value.as_bytes())?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, self.key_path(key)).context("Failed to replace key file")?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;

        let lock = self.lock_file()?;
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path).with_context(|| format!("Failed to remove key file {:?}", path))?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = match entry.file_name().to_str() {
                Some(n) => n.to_string(),
                None => continue,
            };
            if name.starts_with('.') {
                continue;
            }
            keys.push(name);
        }
        keys.sort();
        Ok(keys)
    }
}
