//! Key-value persistence with file locking.
//!
//! Playlists and history are stored as JSON documents under fixed keys.
//! [`FileStore`] keeps one file per key in the data directory, taking a
//! shared lock to read and writing atomically through a temp file.
//! Read-modify-write cycles go through [`KeyValueStore::update`], which
//! `FileStore` serializes across processes with an exclusive lock on
//! `<key>.lock`.
//! [`MemoryStore`] is the in-process equivalent used by tests.

use crate::{Error, Result};
use fs2::FileExt;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Minimal string key-value store
pub trait KeyValueStore {
    /// Value stored under `key`, or None if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// Replace the value under `key` with whatever `apply` makes of it
    ///
    /// `apply` receives the current value and returns the new one, or None
    /// to leave the key untouched. No other `update` of the same key runs
    /// in between the read and the write.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<String>) -> Result<Option<String>>,
    ) -> Result<()> {
        if let Some(next) = apply(self.get(key)?)? {
            self.set(key, &next)?;
        }
        Ok(())
    }
}

/// File-backed store: each key lives in `<dir>/<key>.json`
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Path of the lock file guarding updates of `key`
    pub fn lock_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.lock", key))
    }

    fn check_key(key: &str) -> Result<()> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(())
        } else {
            Err(Error::Storage(format!("Invalid storage key: {:?}", key)))
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Self::check_key(key)?;
        let path = self.path_for(key);
        if !path.exists() {
            tracing::debug!("No file for key {} at {:?}", key, path);
            return Ok(None);
        }

        let file = File::open(&path)?;

        // Acquire shared lock for reading
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read = reader.read_to_string(&mut contents);
        file.unlock()?;
        read?;

        tracing::debug!("Read key {} from {:?}", key, path);
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::check_key(key)?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);

        // Create unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(&self.dir)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;

        // Atomically replace the old file
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote key {} to {:?}", key, path);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        Self::check_key(key)?;
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed key {} at {:?}", key, path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<String>) -> Result<Option<String>>,
    ) -> Result<()> {
        Self::check_key(key)?;
        std::fs::create_dir_all(&self.dir)?;

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path_for(key))?;

        // Held until the new value has been persisted
        lock_file.lock_exclusive()?;
        let result = self.get(key).and_then(|current| match apply(current)? {
            Some(next) => self.set(key, &next),
            None => Ok(()),
        });
        lock_file.unlock()?;

        result
    }
}

/// In-memory store, single-threaded like the player it serves
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Read and parse a JSON list stored under `key`
///
/// Missing keys, unreadable files and malformed JSON all degrade to an
/// empty list with a warning; storage problems never reach the caller.
pub fn load_json_list<T, S>(store: &S, key: &str) -> Vec<T>
where
    T: serde::de::DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key) {
        Ok(raw) => parse_json_list(key, raw.as_deref()),
        Err(e) => {
            tracing::warn!("Unable to read {}: {}. Using empty list.", key, e);
            Vec::new()
        }
    }
}

fn parse_json_list<T: serde::de::DeserializeOwned>(key: &str, raw: Option<&str>) -> Vec<T> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<T>>(raw) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("Failed to parse {}: {}. Using empty list.", key, e);
            Vec::new()
        }
    }
}

/// Serialize `items` as a JSON array under `key`
pub fn save_json_list<T, S>(store: &S, key: &str, items: &[T]) -> Result<()>
where
    T: serde::Serialize,
    S: KeyValueStore + ?Sized,
{
    let contents = serde_json::to_string(items)?;
    store.set(key, &contents)
}

/// Load, modify and save the JSON list under `key` as one locked update
///
/// A malformed stored list is treated as empty. `apply` returns whether it
/// changed anything; nothing is written when it did not.
pub fn update_json_list<T, S, F>(store: &S, key: &str, mut apply: F) -> Result<()>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
    S: KeyValueStore + ?Sized,
    F: FnMut(&mut Vec<T>) -> Result<bool>,
{
    store.update(key, &mut |raw: Option<String>| -> Result<Option<String>> {
        let mut items: Vec<T> = parse_json_list(key, raw.as_deref());
        if !apply(&mut items)? {
            return Ok(None);
        }
        Ok(Some(serde_json::to_string(&items)?))
    })
}
