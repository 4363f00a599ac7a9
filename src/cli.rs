use clap::{Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::database::{DatabaseError, KeyValueStore};
use crate::i18n::{Language, Localizer};
use crate::image::{encode_image_file, ImageError};
use crate::models::{EntryDraft, EntryPatch};
use crate::store::{EntryStore, StoreError};
use crate::utils::{get_current_date_string, parse_date};
use crate::view::{render_entries, render_feed_error, DiaryView, EntryCard};

#[derive(Parser)]
#[command(name = "wayfarer")]
#[command(about = "Wayfarer - a travel diary for the terminal")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use development mode (separate config and database)
    #[arg(long)]
    pub dev: bool,

    /// Show a read-only JSON feed instead of the local diary
    #[arg(long)]
    pub feed: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Add a diary entry
    Add {
        /// Entry title
        title: String,
        /// Where it happened
        #[arg(long)]
        location: String,
        /// What happened
        #[arg(long)]
        desc: String,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Image file to attach
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Change fields of an entry; an omitted image keeps the current one
    Edit {
        /// Entry id
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Replacement image file
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete an entry
    Delete {
        /// Entry id
        id: i64,
    },
    /// Print all entries, newest first
    List {
        /// Language for this listing only (en, cn)
        #[arg(long)]
        lang: Option<String>,
    },
    /// Print one entry
    Show {
        /// Entry id
        id: i64,
        #[arg(long)]
        lang: Option<String>,
    },
    /// Show or set the interface language (en, cn)
    Lang {
        code: Option<String>,
        /// Forget the preference so the TUI asks again
        #[arg(long, conflicts_with = "code")]
        reset: bool,
    },
    /// Write all entries as a JSON feed
    Export {
        /// Output file, stdout if omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace all entries with a JSON feed file
    Import {
        path: PathBuf,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("Image error: {0}")]
    ImageError(#[from] ImageError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("Nothing to change")]
    NoChanges,
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),
    #[error("Cannot show entries: {0}")]
    FeedUnavailable(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

fn validate_date(date: &str) -> Result<(), CliError> {
    parse_date(date)
        .map(|_| ())
        .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", date, e)))
}

fn require(field: &'static str, value: String) -> Result<String, CliError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

fn language_for(override_code: Option<&str>, localizer: &Localizer) -> Result<Language, CliError> {
    match override_code {
        Some(code) => {
            Language::from_code(code).ok_or_else(|| CliError::UnknownLanguage(code.to_string()))
        }
        None => Ok(localizer.language()),
    }
}

fn write_card(out: &mut dyn Write, card: &EntryCard) -> Result<(), CliError> {
    writeln!(out, "{}  [#{}]", card.date_label, card.id)?;
    writeln!(out, "{}", card.title)?;
    writeln!(out, "{}", card.location_line)?;
    writeln!(out, "{}", card.description)?;
    if let Some(ref image) = card.image {
        writeln!(out, "🖼 {} · {}", image.mime, image.size_label)?;
    }
    Ok(())
}

fn write_view(out: &mut dyn Write, view: &DiaryView) -> Result<(), CliError> {
    match view {
        DiaryView::Empty { message } => writeln!(out, "{}", message)?,
        DiaryView::Error { message, detail } => {
            writeln!(out, "{}", message)?;
            writeln!(out, "{}", detail)?;
        }
        DiaryView::Cards(cards) => {
            for (i, card) in cards.iter().enumerate() {
                if i > 0 {
                    writeln!(out)?;
                }
                write_card(out, card)?;
            }
        }
    }
    Ok(())
}

/// Handle the add command
pub fn handle_add(
    title: String,
    location: String,
    desc: String,
    date: Option<String>,
    image: Option<PathBuf>,
    store: &EntryStore,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let date = date.unwrap_or_else(get_current_date_string);
    validate_date(&date)?;

    let mut draft = EntryDraft::new(
        require("title", title)?,
        require("location", location)?,
        date,
        require("desc", desc)?,
    );
    if let Some(path) = image {
        draft.image = Some(encode_image_file(&path)?);
    }

    let entry = store.append(draft)?;
    writeln!(out, "Entry created successfully (ID: {})", entry.id)?;
    Ok(())
}

/// Handle the edit command
#[allow(clippy::too_many_arguments)]
pub fn handle_edit(
    id: i64,
    title: Option<String>,
    location: Option<String>,
    desc: Option<String>,
    date: Option<String>,
    image: Option<PathBuf>,
    store: &EntryStore,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    if let Some(ref d) = date {
        validate_date(d)?;
    }
    let patch = EntryPatch {
        title: title.map(|v| require("title", v)).transpose()?,
        location: location.map(|v| require("location", v)).transpose()?,
        date,
        desc: desc.map(|v| require("desc", v)).transpose()?,
        image: image.as_deref().map(encode_image_file).transpose()?,
    };
    if patch.is_empty() {
        return Err(CliError::NoChanges);
    }

    let entry = store.update(id, patch)?;
    writeln!(out, "Entry {} updated", entry.id)?;
    Ok(())
}

/// Handle the delete command
pub fn handle_delete(id: i64, store: &EntryStore, out: &mut dyn Write) -> Result<(), CliError> {
    let entry = store.delete(id)?;
    writeln!(out, "Entry {} ({}) deleted", entry.id, entry.title)?;
    Ok(())
}

/// Handle the list command. A feed that failed to load prints its error
/// state and reports failure.
pub fn handle_list(
    lang: Option<String>,
    store: &EntryStore,
    localizer: &Localizer,
    feed_error: Option<&str>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let language = language_for(lang.as_deref(), localizer)?;
    if let Some(detail) = feed_error {
        write_view(out, &render_feed_error(language, detail))?;
        return Err(CliError::FeedUnavailable(detail.to_string()));
    }
    let entries = store.list()?;
    write_view(out, &render_entries(&entries, language, !store.is_read_only()))
}

/// Handle the show command
pub fn handle_show(
    id: i64,
    lang: Option<String>,
    store: &EntryStore,
    localizer: &Localizer,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let language = language_for(lang.as_deref(), localizer)?;
    let entry = store.get_by_id(id)?.ok_or(StoreError::NotFound(id))?;
    write_view(out, &render_entries(&[entry], language, false))
}

/// Handle the lang command
pub fn handle_lang(
    code: Option<String>,
    reset: bool,
    localizer: &mut Localizer,
    prefs: &dyn KeyValueStore,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    if reset {
        localizer.clear(prefs)?;
        writeln!(out, "Language preference cleared")?;
        return Ok(());
    }
    let Some(code) = code else {
        match localizer.active() {
            Some(language) => writeln!(out, "{} ({})", language.native_name(), language.code())?,
            None => writeln!(out, "No language chosen yet")?,
        }
        return Ok(());
    };
    match localizer.set_language(&code, prefs)? {
        Some(language) => writeln!(out, "Language set to {}", language.native_name())?,
        None => return Err(CliError::UnknownLanguage(code)),
    }
    Ok(())
}

/// Handle the export command
pub fn handle_export(
    output: Option<PathBuf>,
    store: &EntryStore,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let json = store.export_json()?;
    match output {
        Some(path) => {
            fs::write(&path, json)?;
            writeln!(out, "Exported {} entries to {}", store.len()?, path.display())?;
        }
        None => writeln!(out, "{}", json)?,
    }
    Ok(())
}

/// Handle the import command
pub fn handle_import(path: &Path, store: &EntryStore, out: &mut dyn Write) -> Result<(), CliError> {
    let json = fs::read_to_string(path)?;
    let count = store.import_json(&json)?;
    writeln!(out, "Imported {} entries from {}", count, path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::i18n::LANGUAGE_KEY;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn store() -> EntryStore {
        EntryStore::new(Rc::new(MemoryStore::new()))
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    fn add(store: &EntryStore, title: &str, date: &str) {
        handle_add(
            title.to_string(),
            "Japan".to_string(),
            "Cherry blossoms".to_string(),
            Some(date.to_string()),
            None,
            store,
            &mut std::io::sink(),
        )
        .unwrap();
    }

    #[test]
    fn add_then_list_in_chinese() {
        let store = store();
        add(&store, "Kyoto", "2024-03-01");

        let mut buf: Vec<u8> = Vec::new();
        handle_list(Some("cn".to_string()), &store, &Localizer::default(), None, &mut buf).unwrap();
        let text = output(buf);
        assert!(text.starts_with("2024年3月1日"));
        assert!(text.contains("Kyoto\n📍 Japan\nCherry blossoms\n"));
    }

    #[test]
    fn add_rejects_bad_date_and_blank_fields() {
        let store = store();
        let err = handle_add(
            "t".to_string(),
            "l".to_string(),
            "d".to_string(),
            Some("01/03/2024".to_string()),
            None,
            &store,
            &mut std::io::sink(),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::DateParseError(_)));

        let err = handle_add(
            "  ".to_string(),
            "l".to_string(),
            "d".to_string(),
            None,
            None,
            &store,
            &mut std::io::sink(),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::EmptyField("title")));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn edit_changes_only_given_fields() {
        let store = store();
        add(&store, "Kyoto", "2024-03-01");
        let id = store.list().unwrap()[0].id;

        handle_edit(id, None, Some("Osaka".to_string()), None, None, None, &store, &mut std::io::sink())
            .unwrap();
        let entry = store.get_by_id(id).unwrap().unwrap();
        assert_eq!(entry.location, "Osaka");
        assert_eq!(entry.title, "Kyoto");
    }

    #[test]
    fn edit_without_changes_or_unknown_id_fails() {
        let store = store();
        assert!(matches!(
            handle_edit(1, None, None, None, None, None, &store, &mut std::io::sink()),
            Err(CliError::NoChanges)
        ));
        assert!(matches!(
            handle_edit(1, Some("x".to_string()), None, None, None, None, &store, &mut std::io::sink()),
            Err(CliError::StoreError(StoreError::NotFound(1)))
        ));
    }

    #[test]
    fn list_empty_prints_localized_message() {
        let mut buf: Vec<u8> = Vec::new();
        handle_list(None, &store(), &Localizer::default(), None, &mut buf).unwrap();
        assert_eq!(output(buf), "No entries yet. Start your journey!\n");
    }

    #[test]
    fn list_with_feed_error_prints_error_state() {
        let mut buf: Vec<u8> = Vec::new();
        let err = handle_list(None, &store(), &Localizer::default(), Some("missing"), &mut buf)
            .unwrap_err();
        assert!(matches!(err, CliError::FeedUnavailable(_)));
        assert_eq!(output(buf), "Could not load diary entries.\nmissing\n");
    }

    #[test]
    fn lang_persists_and_rejects_unknown() {
        let prefs = MemoryStore::new();
        let mut localizer = Localizer::default();
        handle_lang(Some("cn".to_string()), false, &mut localizer, &prefs, &mut std::io::sink())
            .unwrap();
        assert_eq!(prefs.get(LANGUAGE_KEY).unwrap().as_deref(), Some("cn"));

        assert!(matches!(
            handle_lang(Some("de".to_string()), false, &mut localizer, &prefs, &mut std::io::sink()),
            Err(CliError::UnknownLanguage(_))
        ));
        assert_eq!(localizer.language(), Language::Cn);

        let mut buf: Vec<u8> = Vec::new();
        handle_lang(None, false, &mut localizer, &prefs, &mut buf).unwrap();
        assert_eq!(output(buf), "中文 (cn)\n");

        handle_lang(None, true, &mut localizer, &prefs, &mut std::io::sink()).unwrap();
        assert_eq!(prefs.get(LANGUAGE_KEY).unwrap(), None);
        assert!(localizer.prompt_visible());
    }

    #[test]
    fn delete_and_show_missing() {
        let store = store();
        add(&store, "gone soon", "2024-01-01");
        let id = store.list().unwrap()[0].id;
        handle_delete(id, &store, &mut std::io::sink()).unwrap();
        assert!(matches!(
            handle_show(id, None, &store, &Localizer::default(), &mut std::io::sink()),
            Err(CliError::StoreError(StoreError::NotFound(_)))
        ));
    }

    #[test]
    fn export_and_import_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        let source = store();
        add(&source, "one", "2024-01-01");
        add(&source, "two", "2024-01-02");
        handle_export(Some(path.clone()), &source, &mut std::io::sink()).unwrap();

        let target = store();
        handle_import(&path, &target, &mut std::io::sink()).unwrap();
        assert_eq!(target.list().unwrap(), source.list().unwrap());
    }
}
