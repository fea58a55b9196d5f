//! The entry catalog: sole owner of the in-memory collection.
//!
//! ## Lifecycle
//!
//! ```text
//! initialize()   load from store → drop invalid records → prepend missing seeds → save
//! add(new)       trim + validate → assign id/timestamp → prepend → save
//! remove(id)     drop matching entry (if any) → save
//! filter(f)      read only
//! ```
//!
//! Every mutation is followed by a full save before the call returns. Save
//! failures are reported by the [`CollectionStore`] and never surface here:
//! the in-memory collection stays authoritative for the session.
//!
//! The stored collection is never cleared on startup. Entries added in
//! earlier sessions always come back.

use crate::notify::Notifier;
use crate::storage::Storage;
use crate::store::CollectionStore;
use crate::types::{Category, CategoryFilter, Entry, NewEntry};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const EMPTY_NAME_MESSAGE: &str = "Please enter a name.";
pub const ADDED_MESSAGE: &str = "Sister added locally";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("name must not be empty")]
    EmptyName,
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub struct Catalog<S, N> {
    store: CollectionStore<S, N>,
    seed: Vec<Entry>,
    entries: Vec<Entry>,
    initialized: bool,
}

impl<S: Storage, N: Notifier> Catalog<S, N> {
    /// Create an empty catalog. Nothing is read until [`initialize`].
    ///
    /// [`initialize`]: Catalog::initialize
    pub fn new(store: CollectionStore<S, N>, seed: Vec<Entry>) -> Self {
        Self {
            store,
            seed,
            entries: Vec::new(),
            initialized: false,
        }
    }

    pub fn store(&self) -> &CollectionStore<S, N> {
        &self.store
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Load the stored collection and merge the seed set.
    ///
    /// Runs once per session; later calls do nothing and return 0. Returns
    /// the number of seed entries that were added.
    pub fn initialize(&mut self) -> usize {
        if self.initialized {
            debug!("catalog already initialized");
            return 0;
        }
        self.initialized = true;
        self.entries = sanitize(self.store.load());

        let merged = merge_seed(&mut self.entries, &self.seed);
        if merged > 0 {
            info!(merged, total = self.entries.len(), "merged seed entries");
            self.persist();
        }
        merged
    }

    /// Add a new entry at the front of the collection.
    pub fn add(&mut self, new: NewEntry) -> Result<&Entry, CatalogError> {
        let name = new.name.trim();
        if name.is_empty() {
            self.store.notifier().error(EMPTY_NAME_MESSAGE);
            return Err(CatalogError::EmptyName);
        }

        let mut id = uuid::Uuid::new_v4().to_string();
        while self.get(&id).is_some() {
            id = uuid::Uuid::new_v4().to_string();
        }

        let entry = Entry {
            id,
            name: name.to_string(),
            category: new.category,
            photo: new.photo,
            created_at: now_ms(),
        };
        info!(id = %entry.id, category = %entry.category, "added entry");
        self.entries.insert(0, entry);
        self.persist();
        self.store.notifier().success(ADDED_MESSAGE);
        Ok(&self.entries[0])
    }

    /// Remove the entry with `id`. Returns whether anything was removed;
    /// an unknown id is not an error.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;
        if removed {
            info!(id, "removed entry");
        } else {
            debug!(id, "remove: no such entry");
        }
        self.persist();
        removed
    }

    /// Entries matching `filter`, in collection order.
    pub fn filter(&self, filter: CategoryFilter) -> Vec<&Entry> {
        self.entries
            .iter()
            .filter(|e| filter.matches(e.category))
            .collect()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries per category, in [`Category::ALL`] order.
    pub fn counts(&self) -> [(Category, usize); 3] {
        Category::ALL.map(|c| (c, self.entries.iter().filter(|e| e.category == c).count()))
    }

    fn persist(&self) {
        // Errors are logged and surfaced by the store.
        let _ = self.store.save(&self.entries);
    }
}

/// Drop records that break collection invariants (blank names, repeated
/// ids). Hand-edited or foreign data can contain them.
fn sanitize(entries: Vec<Entry>) -> Vec<Entry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter_map(|mut e| {
            let trimmed = e.name.trim().to_string();
            if trimmed.is_empty() {
                warn!(id = %e.id, "dropping stored entry with empty name");
                return None;
            }
            if !seen.insert(e.id.clone()) {
                warn!(id = %e.id, "dropping stored entry with duplicate id");
                return None;
            }
            e.name = trimmed;
            Some(e)
        })
        .collect()
}

/// Prepend seed entries whose name (case-insensitive) is not present yet.
/// Seed entries keep their relative order. Returns how many were added.
fn merge_seed(entries: &mut Vec<Entry>, seed: &[Entry]) -> usize {
    let names: HashSet<String> = entries.iter().map(|e| e.name.to_lowercase()).collect();
    let ids: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    let to_add: Vec<Entry> = seed
        .iter()
        .filter(|s| !names.contains(&s.name.to_lowercase()) && !ids.contains(s.id.as_str()))
        .cloned()
        .collect();
    let added = to_add.len();
    if added > 0 {
        entries.splice(0..0, to_add);
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStorage;
    use crate::store::{DEFAULT_KEY, QUOTA_MESSAGE};
    use crate::test_helpers::{entry, memory_catalog, seed_fixture};

    #[test]
    fn initialize_on_empty_store_adds_seed() {
        let mut catalog = memory_catalog(MemoryStorage::default(), seed_fixture());
        assert_eq!(catalog.initialize(), 2);
        let names: Vec<&str> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Sneha (Dido)", "Manasvi"]);
        // Seed merge is persisted.
        assert_eq!(catalog.store().load().len(), 2);
    }

    #[test]
    fn unreadable_record_does_not_cost_visitor_entries() {
        let storage = MemoryStorage::default();
        storage.insert_raw(
            DEFAULT_KEY,
            r#"[{"id":"u1","name":"Priya","category":"real","createdAt":1},
                {"id":"u2","name":"Tara","category":"aunt","createdAt":2}]"#,
        );
        let mut catalog = memory_catalog(storage, seed_fixture());
        assert_eq!(catalog.initialize(), 2);
        assert!(catalog.get("u1").is_some());
        assert!(catalog.store().load().iter().any(|e| e.name == "Priya"));
    }

    #[test]
    fn seed_is_prepended_ahead_of_loaded_entries() {
        let storage = MemoryStorage::default();
        storage.insert_raw(
            DEFAULT_KEY,
            &serde_json::to_string(&[entry("u1", "Priya", Category::Real)]).unwrap(),
        );
        let mut catalog = memory_catalog(storage, seed_fixture());
        catalog.initialize();
        let ids: Vec<&str> = catalog.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["sneha-dido", "manasvi", "u1"]);
    }

    #[test]
    fn seed_skipped_on_case_insensitive_name_match() {
        let storage = MemoryStorage::default();
        storage.insert_raw(
            DEFAULT_KEY,
            &serde_json::to_string(&[entry("mine", "MANASVI", Category::Real)]).unwrap(),
        );
        let mut catalog = memory_catalog(storage, seed_fixture());
        assert_eq!(catalog.initialize(), 1);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("manasvi").is_none());
        assert_eq!(catalog.get("mine").unwrap().category, Category::Real);
    }

    #[test]
    fn initialize_twice_never_duplicates_seed() {
        let mut catalog = memory_catalog(MemoryStorage::default(), seed_fixture());
        catalog.initialize();
        assert_eq!(catalog.initialize(), 0);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn merge_is_idempotent_across_sessions() {
        let storage = MemoryStorage::default();
        let mut first = memory_catalog(storage, seed_fixture());
        first.initialize();
        let raw = first.store().storage().raw(DEFAULT_KEY).unwrap();

        let next_storage = MemoryStorage::default();
        next_storage.insert_raw(DEFAULT_KEY, &raw);
        let mut second = memory_catalog(next_storage, seed_fixture());
        assert_eq!(second.initialize(), 0);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn corrupt_store_starts_from_seed() {
        let storage = MemoryStorage::default();
        storage.insert_raw(DEFAULT_KEY, "{{{{");
        let mut catalog = memory_catalog(storage, seed_fixture());
        catalog.initialize();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn add_trims_name_and_files_under_category() {
        let mut catalog = memory_catalog(MemoryStorage::default(), Vec::new());
        catalog.initialize();

        let added = catalog
            .add(NewEntry::new("  Priya  ", Category::Real))
            .unwrap()
            .clone();
        assert_eq!(added.name, "Priya");
        assert!(added.photo.is_none());
        assert!(added.created_at > 0);

        let primary = catalog.filter(CategoryFilter::Only(Category::Real));
        assert!(primary.iter().any(|e| e.id == added.id));
        let secondary = catalog.filter(CategoryFilter::Only(Category::Cousin));
        assert!(!secondary.iter().any(|e| e.id == added.id));

        let stored = catalog.store().load();
        assert_eq!(stored[0].name, "Priya");
        assert_eq!(
            catalog.store().notifier().toasts().last().unwrap().message,
            ADDED_MESSAGE
        );
    }

    #[test]
    fn add_prepends_most_recent_first() {
        let mut catalog = memory_catalog(MemoryStorage::default(), Vec::new());
        catalog.initialize();
        catalog.add(NewEntry::new("First", Category::Real)).unwrap();
        catalog.add(NewEntry::new("Second", Category::Vow)).unwrap();
        let names: Vec<&str> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[test]
    fn add_rejects_blank_name() {
        let mut catalog = memory_catalog(MemoryStorage::default(), Vec::new());
        catalog.initialize();
        let err = catalog.add(NewEntry::new("   \t ", Category::Real)).unwrap_err();
        assert_eq!(err, CatalogError::EmptyName);
        assert!(catalog.is_empty());
        assert_eq!(
            catalog.store().notifier().errors(),
            vec![EMPTY_NAME_MESSAGE.to_string()]
        );
    }

    #[test]
    fn added_ids_are_unique() {
        let mut catalog = memory_catalog(MemoryStorage::default(), Vec::new());
        catalog.initialize();
        for i in 0..20 {
            catalog
                .add(NewEntry::new(format!("Sister {i}"), Category::Cousin))
                .unwrap();
        }
        let ids: HashSet<&str> = catalog.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn removed_entry_never_appears_in_all() {
        let mut catalog = memory_catalog(MemoryStorage::default(), seed_fixture());
        catalog.initialize();
        let id = catalog
            .add(NewEntry::new("Asha", Category::Vow))
            .unwrap()
            .id
            .clone();

        assert!(catalog.remove(&id));
        assert!(catalog.filter(CategoryFilter::All).iter().all(|e| e.id != id));
        assert!(catalog.store().load().iter().all(|e| e.id != id));
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut catalog = memory_catalog(MemoryStorage::default(), seed_fixture());
        catalog.initialize();
        assert!(!catalog.remove("nope"));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn filter_all_returns_everything_in_order() {
        let mut catalog = memory_catalog(MemoryStorage::default(), seed_fixture());
        catalog.initialize();
        let all: Vec<&str> = catalog
            .filter(CategoryFilter::All)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(all, vec!["sneha-dido", "manasvi"]);
    }

    #[test]
    fn counts_per_category() {
        let mut catalog = memory_catalog(MemoryStorage::default(), seed_fixture());
        catalog.initialize();
        catalog.add(NewEntry::new("Asha", Category::Vow)).unwrap();
        assert_eq!(
            catalog.counts(),
            [(Category::Real, 1), (Category::Cousin, 0), (Category::Vow, 2)]
        );
    }

    #[test]
    fn stored_invalid_records_are_dropped() {
        let storage = MemoryStorage::default();
        let records = vec![
            entry("a", "  Priya ", Category::Real),
            entry("b", "   ", Category::Real),
            entry("a", "Duplicate", Category::Vow),
        ];
        storage.insert_raw(DEFAULT_KEY, &serde_json::to_string(&records).unwrap());
        let mut catalog = memory_catalog(storage, Vec::new());
        catalog.initialize();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].name, "Priya");
    }

    #[test]
    fn quota_failure_keeps_session_state() {
        let store = CollectionStore::new(
            MemoryStorage::with_quota(300),
            RecordingNotifier::new(),
            DEFAULT_KEY,
        );
        let mut catalog = Catalog::new(store, Vec::new());
        catalog.initialize();

        let photo = format!("data:image/jpeg;base64,{}", "A".repeat(400));
        catalog
            .add(NewEntry::new("Big", Category::Real).with_photo(photo.clone()))
            .unwrap();
        catalog
            .add(NewEntry::new("Bigger", Category::Real).with_photo(photo))
            .unwrap();

        assert_eq!(catalog.len(), 2);
        let errors = catalog.store().notifier().errors();
        assert_eq!(errors, vec![QUOTA_MESSAGE.to_string()]);
    }
}
