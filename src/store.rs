//! Persistent collection store.
//!
//! The whole collection is one JSON array under a single storage key
//! (`rb_sisters` by default). Loading never fails: a missing key or a value
//! that is not a JSON array yields an empty collection, and an array element
//! that is not a valid entry is dropped on its own. Saving rewrites the full
//! array.
//!
//! Saving can be rejected by the storage quota, typically because of large
//! photos. The first rejection in a session raises one notification; after
//! that, rejections are only logged so a run of edits does not bury the
//! visitor in identical warnings.

use crate::notify::Notifier;
use crate::storage::{Storage, StorageError};
use crate::types::Entry;
use std::cell::Cell;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Storage key used by the page.
pub const DEFAULT_KEY: &str = "rb_sisters";

pub const QUOTA_MESSAGE: &str = "Storage full: try smaller photos or remove some entries.";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage quota exceeded")]
    QuotaExceeded(#[source] StorageError),
    #[error("storage error: {0}")]
    Storage(StorageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StorageError> for StoreError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::QuotaExceeded { .. } => StoreError::QuotaExceeded(e),
            other => StoreError::Storage(other),
        }
    }
}

pub struct CollectionStore<S, N> {
    storage: S,
    notifier: N,
    key: String,
    quota_warning_shown: Cell<bool>,
}

impl<S: Storage, N: Notifier> CollectionStore<S, N> {
    pub fn new(storage: S, notifier: N, key: impl Into<String>) -> Self {
        Self {
            storage,
            notifier,
            key: key.into(),
            quota_warning_shown: Cell::new(false),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Read the stored collection. Absent or unreadable data is empty.
    pub fn load(&self) -> Vec<Entry> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, "failed to read stored collection: {e}");
                return Vec::new();
            }
        };
        let records = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(key = %self.key, "stored collection is corrupt, starting empty: {e}");
                return Vec::new();
            }
        };
        let total = records.len();
        let entries: Vec<Entry> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(key = %self.key, index, "dropping unreadable stored entry: {e}");
                    None
                }
            })
            .collect();
        debug!(
            key = %self.key,
            count = entries.len(),
            dropped = total - entries.len(),
            "loaded collection"
        );
        entries
    }

    /// Serialize and write the full collection.
    ///
    /// Failures are logged here and the quota notification is raised at most
    /// once per store; the error is still returned for callers that care.
    pub fn save(&self, entries: &[Entry]) -> Result<(), StoreError> {
        let result = serde_json::to_string(entries)
            .map_err(StoreError::from)
            .and_then(|json| self.storage.set(&self.key, &json).map_err(StoreError::from));

        match &result {
            Ok(()) => debug!(key = %self.key, count = entries.len(), "saved collection"),
            Err(StoreError::QuotaExceeded(source)) => {
                error!(key = %self.key, "failed to save collection: {source}");
                if !self.quota_warning_shown.replace(true) {
                    self.notifier.error(QUOTA_MESSAGE);
                }
            }
            Err(e) => error!(key = %self.key, "failed to save collection: {e}"),
        }
        result
    }
}
