//! Durable local storage for form snapshots.
//!
//! One fixed key holds the latest auto-saved snapshot; every write
//! overwrites unconditionally. Failures are surfaced as `Storage` errors
//! and handled best-effort by callers; nothing here reaches the operator.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::AppError;

/// The single key under which the form snapshot lives.
pub const SNAPSHOT_KEY: &str = "repair_form_snapshot";

pub trait SnapshotStore: Send + Sync {
    fn put(&self, key: &str, value: &str) -> Result<(), AppError>;
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
}

/// File-backed store: each key maps to `<dir>/<key>.json`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SnapshotStore for FileStore {
    fn put(&self, key: &str, value: &str) -> Result<(), AppError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| AppError::Storage(format!("create {}: {e}", self.dir.display())))?;
        std::fs::write(self.path(key), value)
            .map_err(|e| AppError::Storage(format!("write {key}: {e}")))
    }

    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("read {key}: {e}"))),
        }
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn put(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.map
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .map
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }
}
