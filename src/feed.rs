use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::database::{DatabaseError, KeyValueStore};
use crate::models::Entry;
use crate::store::{EntryStore, ENTRIES_KEY};
use std::rc::Rc;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to read feed {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Feed {path} is not a list of entries: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read-only backend over a static JSON feed file. The feed is parsed once
/// at load time; every write is rejected.
#[derive(Debug, Clone)]
pub struct StaticFeed {
    path: PathBuf,
    entries_json: String,
}

impl StaticFeed {
    pub fn load(path: &Path) -> Result<Self, FeedError> {
        let contents = fs::read_to_string(path).map_err(|source| FeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<Entry> =
            serde_json::from_str(&contents).map_err(|source| FeedError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("loaded {} entries from feed {}", entries.len(), path.display());
        Ok(Self::from_entries(path.to_path_buf(), &entries))
    }

    /// A feed with no entries, used in place of a feed that failed to load.
    pub fn empty(path: PathBuf) -> Self {
        Self::from_entries(path, &[])
    }

    fn from_entries(path: PathBuf, entries: &[Entry]) -> Self {
        // Re-serializing a Vec<Entry> cannot fail
        let entries_json = serde_json::to_string(entries).unwrap_or_else(|_| "[]".to_string());
        Self { path, entries_json }
    }

    fn reject_write(&self, key: &str) -> Result<(), DatabaseError> {
        log::warn!("rejected write of {} to feed {}", key, self.path.display());
        Err(DatabaseError::ReadOnly)
    }
}

impl KeyValueStore for StaticFeed {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        if key == ENTRIES_KEY {
            Ok(Some(self.entries_json.clone()))
        } else {
            Ok(None)
        }
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), DatabaseError> {
        self.reject_write(key)
    }

    fn remove(&self, key: &str) -> Result<(), DatabaseError> {
        self.reject_write(key)
    }

    fn is_read_only(&self) -> bool {
        true
    }
}

/// Store over the feed at `feed_path` when one is given, otherwise over
/// `local`. A feed that fails to load yields an empty read-only store and
/// the error text, so the caller can show it instead of failing.
pub fn open_entry_store(
    feed_path: Option<&Path>,
    local: Rc<dyn KeyValueStore>,
) -> (EntryStore, Option<String>) {
    let Some(path) = feed_path else {
        return (EntryStore::new(local), None);
    };
    match StaticFeed::load(path) {
        Ok(feed) => (EntryStore::new(Rc::new(feed)), None),
        Err(e) => {
            log::error!("{}", e);
            (
                EntryStore::new(Rc::new(StaticFeed::empty(path.to_path_buf()))),
                Some(e.to_string()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn loads_entries_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":2,"title":"Lisbon","location":"Portugal","date":"2023-06-10","desc":"Trams","image":null}},
                {{"id":1,"title":"Porto","location":"Portugal","date":"2023-06-08","desc":"Port wine"}}]"#
        )
        .unwrap();

        let feed = StaticFeed::load(file.path()).unwrap();
        assert!(feed.is_read_only());

        let raw = feed.get(ENTRIES_KEY).unwrap().unwrap();
        let entries: Vec<Entry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Lisbon");
        assert_eq!(entries[1].image, None);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StaticFeed::load(&dir.path().join("data.json")).unwrap_err();
        assert!(matches!(err, FeedError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"not\": \"a list\"}}").unwrap();
        let err = StaticFeed::load(file.path()).unwrap_err();
        assert!(matches!(err, FeedError::Parse { .. }));
    }

    #[test]
    fn open_without_feed_uses_local_store() {
        let local: Rc<dyn KeyValueStore> = Rc::new(crate::database::MemoryStore::new());
        let (store, error) = open_entry_store(None, local);
        assert!(!store.is_read_only());
        assert_eq!(error, None);
    }

    #[test]
    fn open_with_broken_feed_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let local: Rc<dyn KeyValueStore> = Rc::new(crate::database::MemoryStore::new());
        let (store, error) = open_entry_store(Some(dir.path().join("data.json").as_path()), local);
        assert!(store.is_read_only());
        assert!(store.list().unwrap().is_empty());
        assert!(error.unwrap().contains("data.json"));
    }

    #[test]
    fn writes_are_rejected() {
        let feed = StaticFeed::empty(PathBuf::from("data.json"));
        assert!(matches!(feed.set(ENTRIES_KEY, "[]"), Err(DatabaseError::ReadOnly)));
        assert!(matches!(feed.remove(ENTRIES_KEY), Err(DatabaseError::ReadOnly)));
        assert_eq!(feed.get("preferredLanguage").unwrap(), None);
    }
}
