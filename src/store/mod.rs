//! Key/value blob store for canvas snapshots and tracker state.
//!
//! Values are JSON-encoded with serde_json. Two backends:
//! - `MemoryStore`: in-process map
//! - `DirStore`: one `<key>.json` file per key under a directory

pub mod progress;

pub use progress::{PROGRESS_KEY, ProgressTracker};

use crate::graph::Snapshot;
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("could not encode or decode stored value: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid store key {0:?}")]
    InvalidKey(String),
}

pub trait KvStore {
    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn set_raw(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    /// Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError>
    where
        Self: Sized,
    {
        self.get_raw(key)?
            .map(|v| serde_json::from_slice::<T>(&v))
            .transpose()
            .map_err(Into::into)
    }

    fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        self.set_raw(key, &serde_json::to_vec(value)?)
    }

    fn save_snapshot(&mut self, scenario_key: &str, snapshot: &Snapshot) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        self.set(&snapshot_key(scenario_key), snapshot)
    }

    fn load_snapshot(&self, scenario_key: &str) -> Result<Option<Snapshot>, StoreError>
    where
        Self: Sized,
    {
        self.get(&snapshot_key(scenario_key))
    }

    fn clear_snapshot(&mut self, scenario_key: &str) -> Result<(), StoreError> {
        self.remove(&snapshot_key(scenario_key))
    }
}

/// Store key holding the canvas of one scenario.
pub fn snapshot_key(scenario_key: &str) -> String {
    format!("canvas-{}", scenario_key)
}

/// Write `value` and log instead of failing; persistence never blocks evaluation.
pub fn persist<S: KvStore, T: Serialize>(store: &mut S, key: &str, value: &T) {
    if let Err(e) = store.set(key, value) {
        warn!("failed to persist {}: {}", key, e);
    }
}

/// Save the canvas of one scenario, or drop the stored copy once the canvas
/// is empty. Failures are logged like `persist`.
pub fn persist_snapshot<S: KvStore>(store: &mut S, scenario_key: &str, snapshot: &Snapshot) {
    if !snapshot.is_empty() {
        persist(store, &snapshot_key(scenario_key), snapshot);
    } else if let Err(e) = store.clear_snapshot(scenario_key) {
        warn!("failed to clear {}: {}", snapshot_key(scenario_key), e);
    }
}

fn check_key(key: &str) -> Result<(), StoreError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore(BTreeMap<String, Vec<u8>>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        check_key(key)?;
        Ok(self.0.get(key).cloned())
    }

    fn set_raw(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        check_key(key)?;
        self.0.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.0.remove(key);
        Ok(())
    }
}

/// Directory-backed store. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn open(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path(&self, key: &str) -> Result<PathBuf, StoreError> {
        check_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KvStore for DirStore {
    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match std::fs::read(self.path(key)?) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_raw(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let path = self.path(key)?;
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(path, value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
