use std::collections::HashSet;
use std::rc::Rc;
use thiserror::Error;

use crate::database::{DatabaseError, KeyValueStore};
use crate::models::{Entry, EntryDraft, EntryPatch};

/// Key holding the serialized entry list
pub const ENTRIES_KEY: &str = "diaryEntries";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
    #[error("Entry {0} not found")]
    NotFound(i64),
    #[error("An entry with id {0} already exists")]
    DuplicateId(i64),
    #[error("Entries are read-only")]
    ReadOnly,
    #[error("Invalid entry data: {0}")]
    InvalidData(#[from] serde_json::Error),
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Ordered, newest-first collection of entries persisted under
/// [`ENTRIES_KEY`] of a key-value backend.
///
/// Every operation reads the list from the backend and writes it back, so
/// the backend is the single source of truth.
pub struct EntryStore {
    backend: Rc<dyn KeyValueStore>,
    clock: fn() -> i64,
}

impl EntryStore {
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self::with_clock(backend, now_millis)
    }

    /// Use a custom millisecond clock for id generation
    pub fn with_clock(backend: Rc<dyn KeyValueStore>, clock: fn() -> i64) -> Self {
        Self { backend, clock }
    }

    pub fn is_read_only(&self) -> bool {
        self.backend.is_read_only()
    }

    /// All entries, most recently inserted first. Missing data is an empty
    /// list; corrupt data is logged and also read as empty.
    pub fn list(&self) -> Result<Vec<Entry>, StoreError> {
        let Some(raw) = self.backend.get(ENTRIES_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<Entry>>(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                log::warn!("stored entries are corrupt, treating the store as empty: {}", e);
                Ok(Vec::new())
            }
        }
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.list()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.list()?.is_empty())
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Entry>, StoreError> {
        Ok(self.list()?.into_iter().find(|e| e.id == id))
    }

    /// Insert a new entry at the front, generating an id when the draft has none
    pub fn append(&self, draft: EntryDraft) -> Result<Entry, StoreError> {
        self.ensure_writable()?;
        let mut entries = self.list()?;

        let id = match draft.id {
            Some(id) if entries.iter().any(|e| e.id == id) => {
                return Err(StoreError::DuplicateId(id));
            }
            Some(id) => id,
            None => self.next_id(&entries),
        };

        let entry = draft.into_entry(id);
        entries.insert(0, entry.clone());
        self.save(&entries)?;
        log::info!("added entry {} ({})", entry.id, entry.title);

        Ok(entry)
    }

    /// Patch the entry with `id` in place, keeping its position
    pub fn update(&self, id: i64, patch: EntryPatch) -> Result<Entry, StoreError> {
        self.ensure_writable()?;
        let mut entries = self.list()?;

        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let replaced_image = patch.image.is_some();
        patch.apply_to(entry);
        let updated = entry.clone();

        self.save(&entries)?;
        log::info!("updated entry {} (image replaced: {})", id, replaced_image);

        Ok(updated)
    }

    pub fn delete(&self, id: i64) -> Result<Entry, StoreError> {
        self.ensure_writable()?;
        let mut entries = self.list()?;

        let index = entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let removed = entries.remove(index);

        self.save(&entries)?;
        log::info!("deleted entry {}", id);

        Ok(removed)
    }

    /// The entries as a pretty-printed feed document
    pub fn export_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.list()?)?)
    }

    /// Replace all entries with those of a feed document, keeping its order.
    /// Nothing is written unless the whole document is valid.
    pub fn import_json(&self, json: &str) -> Result<usize, StoreError> {
        self.ensure_writable()?;
        let entries: Vec<Entry> = serde_json::from_str(json)?;

        let mut seen = HashSet::new();
        if let Some(dup) = entries.iter().find(|e| !seen.insert(e.id)) {
            return Err(StoreError::DuplicateId(dup.id));
        }

        self.save(&entries)?;
        log::info!("imported {} entries", entries.len());
        Ok(entries.len())
    }

    fn ensure_writable(&self) -> Result<(), StoreError> {
        if self.backend.is_read_only() {
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }

    fn save(&self, entries: &[Entry]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(entries)?;
        self.backend.set(ENTRIES_KEY, &raw)?;
        Ok(())
    }

    /// Millisecond timestamp, bumped past the largest existing id so ids stay
    /// unique even when several entries are created within one millisecond.
    fn next_id(&self, entries: &[Entry]) -> i64 {
        let now = (self.clock)();
        match entries.iter().map(|e| e.id).max() {
            Some(max) if max >= now => max.saturating_add(1),
            _ => now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::feed::StaticFeed;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn fixed_clock() -> i64 {
        1_700_000_000_000
    }

    fn memory_store() -> (Rc<MemoryStore>, EntryStore) {
        let backend = Rc::new(MemoryStore::new());
        let store = EntryStore::with_clock(backend.clone(), fixed_clock);
        (backend, store)
    }

    fn draft(title: &str) -> EntryDraft {
        EntryDraft::new(
            title.to_string(),
            "Somewhere".to_string(),
            "2024-01-01".to_string(),
            format!("About {}", title),
        )
    }

    #[test]
    fn empty_store_lists_nothing() {
        let (_, store) = memory_store();
        assert_eq!(store.list().unwrap(), Vec::new());
        assert_eq!(store.get_by_id(1).unwrap(), None);
    }

    #[test]
    fn list_is_reverse_insertion_order() {
        let (_, store) = memory_store();
        let titles = ["first", "second", "third", "fourth"];
        for title in titles {
            store.append(draft(title)).unwrap();
        }
        let listed: Vec<String> = store.list().unwrap().into_iter().map(|e| e.title).collect();
        assert_eq!(listed, vec!["fourth", "third", "second", "first"]);
    }

    #[test]
    fn same_millisecond_appends_get_unique_ids() {
        let (_, store) = memory_store();
        let a = store.append(draft("a")).unwrap();
        let b = store.append(draft("b")).unwrap();
        let c = store.append(draft("c")).unwrap();
        assert_eq!(a.id, fixed_clock());
        assert_eq!(b.id, fixed_clock() + 1);
        assert_eq!(c.id, fixed_clock() + 2);
    }

    #[test]
    fn kyoto_gets_generated_id_and_comes_first() {
        let (_, store) = memory_store();
        store.append(draft("older")).unwrap();
        let kyoto = store
            .append(EntryDraft::new(
                "Kyoto".to_string(),
                "Japan".to_string(),
                "2024-03-01".to_string(),
                "Cherry blossoms".to_string(),
            ))
            .unwrap();

        let entries = store.list().unwrap();
        assert_eq!(entries[0], kyoto);
        assert_ne!(entries[0].id, entries[1].id);
    }

    #[test]
    fn supplied_id_is_kept_and_duplicates_rejected() {
        let (_, store) = memory_store();
        let mut d = draft("x");
        d.id = Some(42);
        assert_eq!(store.append(d.clone()).unwrap().id, 42);
        assert!(matches!(store.append(d), Err(StoreError::DuplicateId(42))));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn update_without_image_retains_image() {
        let (_, store) = memory_store();
        let mut d = draft("pic");
        d.image = Some("data:image/png;base64,iVBORw0KGgo=".to_string());
        let entry = store.append(d).unwrap();

        let updated = store
            .update(
                entry.id,
                EntryPatch {
                    title: Some("renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.image, entry.image);
        assert_eq!(store.get_by_id(entry.id).unwrap().unwrap().title, "renamed");
    }

    #[test]
    fn update_with_image_replaces_image() {
        let (_, store) = memory_store();
        let entry = store.append(draft("plain")).unwrap();
        let new_image = "data:image/jpeg;base64,/9j/4AAQ".to_string();

        store
            .update(
                entry.id,
                EntryPatch {
                    image: Some(new_image.clone()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(store.get_by_id(entry.id).unwrap().unwrap().image, Some(new_image));
    }

    #[test]
    fn editing_older_location_keeps_order_and_other_fields() {
        let (_, store) = memory_store();
        let mut a_draft = draft("A");
        a_draft.image = Some("data:image/gif;base64,R0lGOD==".to_string());
        let a = store.append(a_draft).unwrap();
        let b = store.append(draft("B")).unwrap();

        store
            .update(
                a.id,
                EntryPatch {
                    location: Some("Elsewhere".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], b);
        let a_prime = &entries[1];
        assert_eq!(a_prime.location, "Elsewhere");
        assert_eq!(
            Entry {
                location: a.location.clone(),
                ..a_prime.clone()
            },
            a
        );
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let (_, store) = memory_store();
        store.append(draft("only")).unwrap();
        let err = store.update(999, EntryPatch::default()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(999)));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn delete_removes_only_matching_entry() {
        let (_, store) = memory_store();
        let a = store.append(draft("a")).unwrap();
        let b = store.append(draft("b")).unwrap();
        assert_eq!(store.delete(a.id).unwrap(), a);
        assert_eq!(store.list().unwrap(), vec![b]);
        assert!(matches!(store.delete(a.id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn corrupt_data_reads_as_empty() {
        let (backend, store) = memory_store();
        backend.set(ENTRIES_KEY, "{not json").unwrap();
        assert_eq!(store.list().unwrap(), Vec::new());

        // The next write replaces the corrupt payload
        store.append(draft("fresh")).unwrap();
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn reload_from_backend_is_identical() {
        let (backend, store) = memory_store();
        let mut d = draft("with image");
        d.image = Some("data:image/png;base64,AAECAwQFBgcICQ==".to_string());
        store.append(d).unwrap();
        store.append(draft("without image")).unwrap();

        let reloaded = EntryStore::new(backend);
        assert_eq!(reloaded.list().unwrap(), store.list().unwrap());
    }

    #[test]
    fn export_then_import_preserves_entries() {
        let (_, store) = memory_store();
        store.append(draft("one")).unwrap();
        store.append(draft("two")).unwrap();
        let exported = store.export_json().unwrap();

        let (_, other) = memory_store();
        assert_eq!(other.import_json(&exported).unwrap(), 2);
        assert_eq!(other.list().unwrap(), store.list().unwrap());
    }

    #[test]
    fn import_rejects_duplicate_ids_without_writing() {
        let (_, store) = memory_store();
        store.append(draft("keep me")).unwrap();
        let doc = r#"[{"id":1,"title":"a","location":"l","date":"d","desc":"x","image":null},
                      {"id":1,"title":"b","location":"l","date":"d","desc":"y","image":null}]"#;
        assert!(matches!(store.import_json(doc), Err(StoreError::DuplicateId(1))));
        assert_eq!(store.list().unwrap()[0].title, "keep me");
    }

    #[test]
    fn feed_backed_store_is_read_only() {
        let store = EntryStore::new(Rc::new(StaticFeed::empty(PathBuf::from("data.json"))));
        assert!(store.is_read_only());
        assert!(matches!(store.append(draft("nope")), Err(StoreError::ReadOnly)));
        assert!(matches!(store.delete(1), Err(StoreError::ReadOnly)));
        assert_eq!(store.list().unwrap(), Vec::new());
    }
}
