/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Persistent key/value flags that survive across connect attempts.
//!
//! The session records a failed connect under [`WIDGET_ERROR_KEY`] so the
//! next successful connect can be reported as a reconnect.

use log::{debug, warn};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

pub const WIDGET_ERROR_KEY: &str = "widget-error";
const ERROR_FLAG_VALUE: &str = "1";
const FLAGS_FILE_NAME: &str = "widget-flags.json";

#[derive(Debug, Error)]
pub enum FlagStoreError {
    #[error("Flag store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Flag store is corrupt: {0}")]
    Serde(#[from] serde_json::Error),
}

pub trait FlagStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>, FlagStoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), FlagStoreError>;
    fn remove(&self, key: &str) -> Result<(), FlagStoreError>;
}

/// Flags held in process memory only.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    flags: Mutex<BTreeMap<String, String>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn flags(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned map is still a valid map.
        self.flags.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Result<Option<String>, FlagStoreError> {
        Ok(self.flags().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), FlagStoreError> {
        self.flags().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), FlagStoreError> {
        self.flags().remove(key);
        Ok(())
    }
}

/// Flags kept as a JSON object in a single file.
///
/// Every write replaces the file through a rename, so readers never observe
/// a half-written map.
#[derive(Debug)]
pub struct FileFlagStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileFlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store `widget-flags.json` under `WIDGET_STATE_DIR`, or the system
    /// temp dir when unset.
    pub fn from_env() -> Self {
        let dir = std::env::var_os("WIDGET_STATE_DIR")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);
        Self::new(dir.join(FLAGS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, FlagStoreError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, flags: &BTreeMap<String, String>) -> Result<(), FlagStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(flags)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), FlagStoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut flags = self.read()?;
        if change(&mut flags) {
            self.write(&flags)?;
        }
        Ok(())
    }
}

impl FlagStore for FileFlagStore {
    fn get(&self, key: &str) -> Result<Option<String>, FlagStoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), FlagStoreError> {
        self.update(|flags| {
            flags.insert(key.to_string(), value.to_string()).as_deref() != Some(value)
        })
    }

    fn remove(&self, key: &str) -> Result<(), FlagStoreError> {
        self.update(|flags| flags.remove(key).is_some())
    }
}

/// Remember that a connect attempt failed.
pub(crate) fn mark_connect_error(store: &dyn FlagStore) {
    if let Err(e) = store.set(WIDGET_ERROR_KEY, ERROR_FLAG_VALUE) {
        warn!("Failed to record {WIDGET_ERROR_KEY}: {e}");
    }
}

/// Whether the last connect attempt failed. Clears the flag.
///
/// An empty value counts as unset.
pub(crate) fn take_connect_error(store: &dyn FlagStore) -> bool {
    let flagged = match store.get(WIDGET_ERROR_KEY) {
        Ok(value) => value.is_some_and(|v| !v.is_empty()),
        Err(e) => {
            warn!("Failed to read {WIDGET_ERROR_KEY}: {e}");
            false
        }
    };
    if flagged {
        debug!("Clearing {WIDGET_ERROR_KEY} after successful connect");
        if let Err(e) = store.remove(WIDGET_ERROR_KEY) {
            warn!("Failed to clear {WIDGET_ERROR_KEY}: {e}");
        }
    }
    flagged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_take_clears_flag() {
        let store = MemoryFlagStore::new();
        assert!(!take_connect_error(&store));

        mark_connect_error(&store);
        assert_eq!(
            store.get(WIDGET_ERROR_KEY).unwrap().as_deref(),
            Some("1")
        );
        assert!(take_connect_error(&store));
        assert!(!take_connect_error(&store));
    }

    #[test]
    fn test_empty_flag_counts_as_unset() {
        let store = MemoryFlagStore::new();
        store.set(WIDGET_ERROR_KEY, "").unwrap();
        assert!(!take_connect_error(&store));
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join(FLAGS_FILE_NAME);

        FileFlagStore::new(&path).set(WIDGET_ERROR_KEY, "1").unwrap();
        FileFlagStore::new(&path).set("other", "x").unwrap();

        let reopened = FileFlagStore::new(&path);
        assert_eq!(reopened.get(WIDGET_ERROR_KEY).unwrap().as_deref(), Some("1"));
        reopened.remove(WIDGET_ERROR_KEY).unwrap();
        assert_eq!(reopened.get(WIDGET_ERROR_KEY).unwrap(), None);
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileFlagStore::new(dir.path().join(FLAGS_FILE_NAME));
        assert_eq!(store.get(WIDGET_ERROR_KEY).unwrap(), None);
        store.remove(WIDGET_ERROR_KEY).unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FLAGS_FILE_NAME);
        fs::write(&path, "not json").unwrap();
        let store = FileFlagStore::new(&path);
        assert!(matches!(store.get(WIDGET_ERROR_KEY), Err(FlagStoreError::Serde(_))));
        // A corrupt store never blocks dispatch.
        assert!(!take_connect_error(&store));
    }
}
