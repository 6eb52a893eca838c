use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::StoreError;

/// Durable string key-value storage, the local equivalent of browser
/// storage. Values are opaque; callers own the encoding.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Write several keys as one logical unit. If any write fails, keys
    /// already written are put back to their earlier values.
    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let mut written: Vec<(&str, Option<String>)> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let previous = self.get(key)?;
            if let Err(e) = self.set(key, value) {
                restore(self, written);
                return Err(e);
            }
            written.push((*key, previous));
        }
        Ok(())
    }
}

/// Undo writes newest first. A failed restore is logged; the original write
/// error is what the caller sees.
fn restore<S: KeyValueStore + ?Sized>(store: &S, written: Vec<(&str, Option<String>)>) {
    for (key, previous) in written.into_iter().rev() {
        let result = match previous {
            Some(value) => store.set(key, &value),
            None => store.remove(key),
        };
        if let Err(e) = result {
            warn!("Could not restore {} after a failed write: {}", key, e);
        }
    }
}

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let mut stored = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        for (key, value) in entries {
            stored.insert(key.to_string(), value.clone());
        }
        Ok(())
    }
}

/// One `<key>.json` file per key under a data directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never sees a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        debug!("File store opened at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn write_temp(&self, key: &str, value: &str) -> Result<(PathBuf, PathBuf), StoreError> {
        let path = self.path_for(key)?;
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, value).map_err(|source| StoreError::Io {
            path: temp.clone(),
            source,
        })?;
        Ok((temp, path))
    }

    fn commit(temp: &Path, path: &Path) -> Result<(), StoreError> {
        fs::rename(temp, path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let (temp, path) = self.write_temp(key, value)?;
        Self::commit(&temp, &path)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Stage every value before renaming any of them into place. A rename
    /// that fails puts the keys already renamed back to their earlier values.
    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let mut staged = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let prepared = self
                .get(key)
                .and_then(|previous| Ok((previous, self.write_temp(key, value)?)));
            match prepared {
                Ok((previous, (temp, path))) => staged.push((*key, previous, temp, path)),
                Err(e) => {
                    discard(staged.iter().map(|(_, _, temp, _)| temp));
                    return Err(e);
                }
            }
        }

        let mut committed = Vec::with_capacity(staged.len());
        for (index, (key, previous, temp, path)) in staged.iter().enumerate() {
            if let Err(e) = Self::commit(temp, path) {
                discard(staged[index..].iter().map(|(_, _, temp, _)| temp));
                restore(self, committed);
                return Err(e);
            }
            committed.push((*key, previous.clone()));
        }
        Ok(())
    }
}

fn discard<'a>(temps: impl Iterator<Item = &'a PathBuf>) {
    for temp in temps {
        let _ = fs::remove_file(temp);
    }
}
