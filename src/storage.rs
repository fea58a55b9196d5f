//! Durable key-value storage port.
//!
//! The page keeps its whole collection under one key in a small, quota-bound
//! key-value store. [`Storage`] is that surface reduced to three calls, so
//! the store and catalog can run against [`MemoryStorage`] in tests and
//! [`FileStorage`] on disk.
//!
//! ## File layout
//!
//! ```text
//! .rakhi-gal/
//! └── rb_sisters.json     # one file per key, value stored verbatim
//! ```
//!
//! A write is rejected with [`StorageError::QuotaExceeded`] when the values
//! of all keys together would exceed the configured byte quota. The default
//! quota is 5 MiB, the common browser local-storage limit.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default quota for [`FileStorage`] and [`MemoryStorage::default`].
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

const VALUE_EXTENSION: &str = "json";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("quota exceeded: writing {attempted} bytes would use {total} of {quota} bytes")]
    QuotaExceeded {
        attempted: usize,
        total: usize,
        quota: usize,
    },
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub trait Storage {
    /// Value stored under `key`, or `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Keys become file names, so they are limited to a safe alphabet.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

fn check_quota(
    others_total: usize,
    attempted: usize,
    quota: usize,
) -> Result<(), StorageError> {
    let total = others_total + attempted;
    if total > quota {
        return Err(StorageError::QuotaExceeded {
            attempted,
            total,
            quota,
        });
    }
    Ok(())
}

/// In-process storage with the same quota semantics as [`FileStorage`].
#[derive(Debug)]
pub struct MemoryStorage {
    values: RefCell<BTreeMap<String, String>>,
    quota: usize,
}

impl MemoryStorage {
    pub fn with_quota(quota: usize) -> Self {
        Self {
            values: RefCell::new(BTreeMap::new()),
            quota,
        }
    }

    /// Seed a raw value, bypassing the quota (e.g. a corrupt payload).
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let others: usize = self
            .values
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(_, v)| v.len())
            .sum();
        check_quota(others, value.len(), self.quota)?;
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// One file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    quota: usize,
}

impl FileStorage {
    /// Open (creating if needed) the data directory.
    pub fn open(dir: &Path, quota: usize) -> Result<Self, StorageError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            quota,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{VALUE_EXTENSION}"))
    }

    /// Bytes used by every key except `key`.
    fn usage_excluding(&self, key: &str) -> Result<usize, StorageError> {
        let skip = self.path_for(key);
        let mut total = 0usize;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path == skip
                || path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXTENSION)
            {
                continue;
            }
            total += fs::metadata(&path)?.len() as usize;
        }
        Ok(total)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        match fs::read_to_string(self.path_for(key)) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        check_quota(self.usage_excluding(key)?, value.len(), self.quota)?;
        // Write-then-rename so a crash never leaves a half-written value.
        let tmp = self.dir.join(format!(".{key}.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, self.path_for(key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
