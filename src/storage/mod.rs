//! Small string key/value persistence for client state.
//!
//! Values live as one file per key under a state directory, the native
//! analog of browser local storage. The backing strategy is picked once at
//! construction: when the directory cannot be created or written, the store
//! degrades to a per-instance in-memory map. Individual filesystem failures
//! after construction fall back to the same map for that call, so callers
//! never see a storage error, only missing data.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

#[derive(Debug)]
enum Strategy {
    Persistent(PathBuf),
    Memory,
}

#[derive(Debug)]
pub struct Storage {
    strategy: Strategy,
    memory: Mutex<HashMap<String, String>>,
}

impl Storage {
    /// Storage backed by one file per key under `dir`. Falls back to the
    /// in-memory strategy when the directory is unusable.
    #[must_use]
    pub fn persistent(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let strategy = match probe(&dir) {
            Ok(()) => Strategy::Persistent(dir),
            Err(err) => {
                debug!("state dir {} unusable, using memory storage: {err}", dir.display());
                Strategy::Memory
            }
        };

        Self {
            strategy,
            memory: Mutex::new(HashMap::new()),
        }
    }

    /// Storage kept entirely in this instance's memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            strategy: Strategy::Memory,
            memory: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match &self.strategy {
            Strategy::Persistent(dir) => match fs::read_to_string(entry_path(dir, key)) {
                Ok(value) => Some(value),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    self.memory().get(key).cloned()
                }
                Err(err) => {
                    debug!("read of key {key} failed, using memory value: {err}");
                    self.memory().get(key).cloned()
                }
            },
            Strategy::Memory => self.memory().get(key).cloned(),
        }
    }

    pub fn set(&self, key: &str, value: &str) {
        match &self.strategy {
            Strategy::Persistent(dir) => match fs::write(entry_path(dir, key), value) {
                // the memory entry would otherwise shadow a later remove
                Ok(()) => {
                    self.memory().remove(key);
                }
                Err(err) => {
                    debug!("write of key {key} failed, keeping value in memory: {err}");
                    self.memory().insert(key.to_string(), value.to_string());
                }
            },
            Strategy::Memory => {
                self.memory().insert(key.to_string(), value.to_string());
            }
        }
    }

    /// Removing a key that does not exist is a no-op.
    pub fn remove(&self, key: &str) {
        if let Strategy::Persistent(dir) = &self.strategy {
            if let Err(err) = fs::remove_file(entry_path(dir, key)) {
                if err.kind() != io::ErrorKind::NotFound {
                    debug!("remove of key {key} failed: {err}");
                }
            }
        }

        self.memory().remove(key);
    }

    pub fn clear(&self) {
        if let Strategy::Persistent(dir) = &self.strategy {
            match fs::read_dir(dir) {
                Ok(entries) => {
                    for entry in entries.flatten() {
                        if entry.path().is_file() {
                            if let Err(err) = fs::remove_file(entry.path()) {
                                debug!("clear failed for {}: {err}", entry.path().display());
                            }
                        }
                    }
                }
                Err(err) => debug!("clear failed to list {}: {err}", dir.display()),
            }
        }

        self.memory().clear();
    }

    fn memory(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.memory.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn probe(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    let marker = dir.join(".probe");
    fs::write(&marker, b"")?;
    fs::remove_file(&marker)?;

    Ok(())
}

fn entry_path(dir: &Path, key: &str) -> PathBuf {
    let name: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    dir.join(name)
}
