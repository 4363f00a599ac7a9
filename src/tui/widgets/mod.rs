pub mod color;
pub mod confirm_delete;
pub mod editor;
pub mod entry_cards;
pub mod form;
pub mod help;
pub mod language_prompt;
pub mod status_bar;
