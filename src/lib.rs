pub mod cli;
pub mod config;
pub mod database;
pub mod feed;
pub mod i18n;
pub mod image;
pub mod models;
pub mod store;
pub mod tui;
pub mod utils;
pub mod view;

pub use config::Config;
pub use database::{Database, KeyValueStore, MemoryStore};
pub use feed::{open_entry_store, StaticFeed};
pub use i18n::{Language, Localizer};
pub use models::{Entry, EntryDraft, EntryPatch};
pub use store::EntryStore;
pub use utils::Profile;
