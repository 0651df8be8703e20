use log::trace;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use super::error::StoreError;

pub const HISTORY_KEY: &str = "mathGameHistory";

/// A single durable key-value slot.
pub trait HistoryStore {
    /// `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError>;
    fn save(&mut self, contents: &[u8]) -> Result<(), StoreError>;
}

/// Stores the slot as `<data_dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
    key: String,
}

impl FileStore {
    pub fn new(data_dir: PathBuf, key: &str) -> Self {
        Self {
            data_dir,
            key: key.to_string(),
        }
    }

    pub fn history(data_dir: PathBuf) -> Self {
        Self::new(data_dir, HISTORY_KEY)
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.key))
    }
}

impl HistoryStore for FileStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        trace!(target: "ledger", "Reading {:?}", path);
        Ok(Some(fs::read(path)?))
    }

    fn save(&mut self, contents: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)?;
        fs::write(self.path(), contents)?;
        Ok(())
    }
}

/// In-memory slots; clones share the same backing map and quota, so a clone
/// handed to a fresh ledger behaves like the same store after a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    key: String,
    quota: Rc<Cell<Option<usize>>>,
}

impl MemoryStore {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    /// Rejects writes larger than `bytes`, like a full browser storage area.
    pub fn with_quota(self, bytes: usize) -> Self {
        self.set_quota(Some(bytes));
        self
    }

    /// Applies to every clone of this store.
    pub fn set_quota(&self, quota: Option<usize>) {
        self.quota.set(quota);
    }

    pub fn put_raw(&self, contents: &[u8]) {
        self.slots
            .borrow_mut()
            .insert(self.key.clone(), contents.to_vec());
    }

    pub fn raw(&self) -> Option<Vec<u8>> {
        self.slots.borrow().get(&self.key).cloned()
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.raw())
    }

    fn save(&mut self, contents: &[u8]) -> Result<(), StoreError> {
        if let Some(quota) = self.quota.get() {
            if contents.len() > quota {
                return Err(StoreError::QuotaExceeded {
                    key: self.key.clone(),
                });
            }
        }
        self.put_raw(contents);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("signos-test-{}", Uuid::new_v4()))
    }

    #[test]
    fn test_file_store_missing_slot_is_none() {
        let store = FileStore::history(scratch_dir());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_save_and_load() {
        let dir = scratch_dir();
        let mut store = FileStore::history(dir.clone());
        store.save(b"[]").unwrap();
        assert_eq!(store.path(), dir.join("mathGameHistory.json"));
        assert_eq!(store.load().unwrap(), Some(b"[]".to_vec()));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_memory_store_clones_share_slot() {
        let mut store = MemoryStore::new(HISTORY_KEY);
        let reopened = store.clone();
        store.save(b"[1]").unwrap();
        assert_eq!(reopened.load().unwrap(), Some(b"[1]".to_vec()));
    }

    #[test]
    fn test_memory_store_quota() {
        let mut store = MemoryStore::new(HISTORY_KEY).with_quota(2);
        assert!(matches!(
            store.save(b"[1,2]"),
            Err(StoreError::QuotaExceeded { .. })
        ));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_memory_store_quota_is_shared_by_clones() {
        let store = MemoryStore::new(HISTORY_KEY).with_quota(0);
        let mut ledger_copy = store.clone();
        assert!(ledger_copy.save(b"[]").is_err());

        store.set_quota(None);
        ledger_copy.save(b"[]").unwrap();
        assert_eq!(store.raw(), Some(b"[]".to_vec()));
    }
}
