use pretty_assertions::assert_eq;
use std::fs;
use std::rc::Rc;
use wayfarer::i18n::LANGUAGE_KEY;
use wayfarer::view::render_entries;
use wayfarer::{
    open_entry_store, Database, EntryDraft, EntryPatch, EntryStore, KeyValueStore, Language,
    Localizer,
};

fn open(path: &std::path::Path) -> Rc<Database> {
    Rc::new(Database::new(path.to_str().unwrap()).unwrap())
}

#[test]
fn entries_and_language_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("diary.db");

    {
        let db = open(&path);
        let store = EntryStore::new(db.clone());
        let kyoto = store
            .append(EntryDraft::new(
                "Kyoto".to_string(),
                "Japan".to_string(),
                "2024-03-01".to_string(),
                "Cherry blossoms".to_string(),
            ))
            .unwrap();
        store
            .append(EntryDraft::new(
                "Lisbon".to_string(),
                "Portugal".to_string(),
                "2023-06-10".to_string(),
                "Trams".to_string(),
            ))
            .unwrap();
        store
            .update(
                kyoto.id,
                EntryPatch {
                    location: Some("Kansai".to_string()),
                    ..EntryPatch::default()
                },
            )
            .unwrap();

        let mut localizer = Localizer::default();
        localizer.set_language("cn", &*db).unwrap();
    }

    let db = open(&path);
    assert_eq!(db.get(LANGUAGE_KEY).unwrap().as_deref(), Some("cn"));

    let localizer = Localizer::load(&*db);
    assert_eq!(localizer.active(), Some(Language::Cn));

    let store = EntryStore::new(db);
    let entries = store.list().unwrap();
    let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Lisbon", "Kyoto"]);
    assert_eq!(entries[1].location, "Kansai");

    let view = render_entries(&entries, localizer.language(), true);
    assert_eq!(view.cards()[1].date_label, "2024年3月1日");
}

#[test]
fn export_from_sqlite_opens_as_read_only_feed() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir.path().join("diary.db"));
    let store = EntryStore::new(db.clone());
    store
        .append(EntryDraft::new(
            "Porto".to_string(),
            "Portugal".to_string(),
            "2023-06-08".to_string(),
            "Port wine".to_string(),
        ))
        .unwrap();

    let feed_path = dir.path().join("data.json");
    fs::write(&feed_path, store.export_json().unwrap()).unwrap();

    let (feed_store, error) = open_entry_store(Some(feed_path.as_path()), db);
    assert_eq!(error, None);
    assert!(feed_store.is_read_only());
    assert_eq!(feed_store.list().unwrap(), store.list().unwrap());
    assert!(feed_store
        .append(EntryDraft::new(
            "x".to_string(),
            "y".to_string(),
            "2024-01-01".to_string(),
            "z".to_string()
        ))
        .is_err());
}
