use crate::Config;
use crate::database::KeyValueStore;
use crate::i18n::{Language, Localizer, TextKey};
use crate::image::encode_image_file;
use crate::models::{Entry, EntryDraft, EntryPatch};
use crate::store::{EntryStore, StoreError};
use crate::tui::widgets::editor::Editor;
use crate::utils::{expand_path, get_current_date_string, parse_date};
use crate::view::{render_entries, render_feed_error, Action, DiaryView, EntryCard};
use ratatui::widgets::ListState;
use std::rc::Rc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    LanguagePrompt,
    #[default]
    View,
    Form,
    Help,
    ConfirmDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Location,
    Date,
    Description,
    Image,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Title,
        FormField::Location,
        FormField::Date,
        FormField::Description,
        FormField::Image,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn is_multi_line(self) -> bool {
        self == FormField::Description
    }

    pub fn label(self) -> TextKey {
        match self {
            FormField::Title => TextKey::LabelTitle,
            FormField::Location => TextKey::LabelLocation,
            FormField::Date => TextKey::LabelDate,
            FormField::Description => TextKey::LabelDescription,
            FormField::Image => TextKey::LabelImage,
        }
    }
}

/// The add/edit modal. `original` is the entry being edited, `None` for a
/// new one.
#[derive(Debug, Clone)]
pub struct EntryForm {
    pub current_field: FormField,
    pub title: Editor,
    pub location: Editor,
    pub date: Editor,
    pub description: Editor,
    pub image_path: Editor,
    pub original: Option<Entry>,
}

/// Validated form contents, image already encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    pub title: String,
    pub location: String,
    pub date: String,
    pub desc: String,
    pub image: Option<String>,
}

impl EntryForm {
    pub fn blank() -> Self {
        Self {
            current_field: FormField::Title,
            title: Editor::new(),
            location: Editor::new(),
            date: Editor::from_string(get_current_date_string()),
            description: Editor::new(),
            image_path: Editor::new(),
            original: None,
        }
    }

    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            current_field: FormField::Title,
            title: Editor::from_string(entry.title.clone()),
            location: Editor::from_string(entry.location.clone()),
            date: Editor::from_string(entry.date.clone()),
            description: Editor::from_string(entry.desc.clone()),
            image_path: Editor::new(),
            original: Some(entry.clone()),
        }
    }

    pub fn editing_id(&self) -> Option<i64> {
        self.original.as_ref().map(|e| e.id)
    }

    pub fn has_image(&self) -> bool {
        self.original.as_ref().is_some_and(|e| e.image.is_some())
    }

    pub fn editor(&self, field: FormField) -> &Editor {
        match field {
            FormField::Title => &self.title,
            FormField::Location => &self.location,
            FormField::Date => &self.date,
            FormField::Description => &self.description,
            FormField::Image => &self.image_path,
        }
    }

    pub fn current_editor_mut(&mut self) -> &mut Editor {
        match self.current_field {
            FormField::Title => &mut self.title,
            FormField::Location => &mut self.location,
            FormField::Date => &mut self.date,
            FormField::Description => &mut self.description,
            FormField::Image => &mut self.image_path,
        }
    }

    /// Check required fields and the date, then read the image if a path
    /// was entered. Errors are the message to show the user.
    pub fn values(&self) -> Result<FormValues, TextKey> {
        let required = [&self.title, &self.location, &self.date, &self.description];
        if required.iter().any(|e| e.is_blank()) {
            return Err(TextKey::RequiredFields);
        }
        let date = self.date.text().trim().to_string();
        if parse_date(&date).is_err() {
            return Err(TextKey::InvalidDate);
        }

        Ok(FormValues {
            title: self.title.text().trim().to_string(),
            location: self.location.text().trim().to_string(),
            date,
            desc: self.description.text().trim().to_string(),
            image: self.image()?,
        })
    }

    /// Patch carrying only the fields that differ from `original`. Untouched
    /// fields are left out so their stored text is kept as is.
    pub fn patch(&self, original: &Entry) -> Result<EntryPatch, TextKey> {
        let title = changed_text(&self.title, &original.title)?;
        let location = changed_text(&self.location, &original.location)?;
        let date = changed_text(&self.date, &original.date)?;
        let desc = changed_text(&self.description, &original.desc)?;
        if date.as_deref().is_some_and(|d| parse_date(d).is_err()) {
            return Err(TextKey::InvalidDate);
        }

        Ok(EntryPatch {
            title,
            location,
            date,
            desc,
            image: self.image()?,
        })
    }

    fn image(&self) -> Result<Option<String>, TextKey> {
        if self.image_path.is_blank() {
            return Ok(None);
        }
        let path = self.image_path.text();
        encode_image_file(&expand_path(path.trim()))
            .map(Some)
            .map_err(|e| {
                log::warn!("{}", e);
                TextKey::ImageFailed
            })
    }
}

/// `None` while the editor still holds `stored` as it was loaded
fn changed_text(editor: &Editor, stored: &str) -> Result<Option<String>, TextKey> {
    if editor.text() == Editor::from_string(stored.to_string()).text() {
        return Ok(None);
    }
    if editor.is_blank() {
        return Err(TextKey::RequiredFields);
    }
    Ok(Some(editor.text().trim().to_string()))
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub mode: Mode,
    pub selected_index: usize,
    pub list_state: ListState,
    pub language_selection: usize,
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

#[derive(Debug, Clone, Default)]
pub struct ModalState {
    pub delete_confirmation: Option<i64>,
    pub delete_modal_selection: usize,
}

pub struct App {
    pub config: Config,
    pub prefs: Rc<dyn KeyValueStore>,
    pub store: EntryStore,
    pub feed_error: Option<String>,
    pub localizer: Localizer,

    pub entries: Vec<Entry>,
    pub view: DiaryView,

    pub ui: UiState,
    pub status: StatusState,
    pub modals: ModalState,
    pub form: Option<EntryForm>,
}

impl App {
    /// `prefs` holds the language preference; it stays writable even when
    /// `store` is a read-only feed.
    pub fn new(
        config: Config,
        prefs: Rc<dyn KeyValueStore>,
        store: EntryStore,
        feed_error: Option<String>,
    ) -> Result<Self, StoreError> {
        let localizer = Localizer::load(prefs.as_ref());
        let mode = if localizer.prompt_visible() {
            Mode::LanguagePrompt
        } else {
            Mode::View
        };

        let mut app = Self {
            config,
            prefs,
            store,
            feed_error,
            localizer,
            entries: Vec::new(),
            view: DiaryView::Cards(Vec::new()),
            ui: UiState {
                mode,
                ..UiState::default()
            },
            status: StatusState::default(),
            modals: ModalState::default(),
            form: None,
        };
        app.load_data()?;
        Ok(app)
    }

    pub fn load_data(&mut self) -> Result<(), StoreError> {
        self.entries = self.store.list()?;
        self.refresh_view();
        Ok(())
    }

    /// Rebuild the cards for the current entries and language
    pub fn refresh_view(&mut self) {
        let language = self.localizer.language();
        self.view = match self.feed_error {
            Some(ref detail) => render_feed_error(language, detail),
            None => render_entries(&self.entries, language, !self.store.is_read_only()),
        };
        self.adjust_selected_index();
    }

    pub fn text(&self, key: TextKey) -> &'static str {
        self.localizer.text(key)
    }

    pub fn language(&self) -> Language {
        self.localizer.language()
    }

    pub fn is_read_only(&self) -> bool {
        self.store.is_read_only()
    }

    pub fn selected_card(&self) -> Option<&EntryCard> {
        self.view.cards().get(self.ui.selected_index)
    }

    fn adjust_selected_index(&mut self) {
        let len = self.view.cards().len();
        if self.ui.selected_index >= len {
            self.ui.selected_index = len.saturating_sub(1);
        }
        self.sync_list_state();
    }

    pub fn sync_list_state(&mut self) {
        if self.view.cards().is_empty() {
            self.ui.list_state.select(None);
        } else {
            self.ui.list_state.select(Some(self.ui.selected_index));
        }
    }

    pub fn move_selection_up(&mut self) {
        if self.ui.selected_index > 0 {
            self.ui.selected_index -= 1;
            self.sync_list_state();
        }
    }

    pub fn move_selection_down(&mut self) {
        if self.ui.selected_index + 1 < self.view.cards().len() {
            self.ui.selected_index += 1;
            self.sync_list_state();
        }
    }

    fn select_entry(&mut self, id: i64) {
        if let Some(index) = self.view.cards().iter().position(|c| c.id == id) {
            self.ui.selected_index = index;
            self.sync_list_state();
        }
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    fn set_status_text(&mut self, key: TextKey) {
        self.set_status_message(self.text(key).to_string());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    /// Check if status message should be auto-cleared (after 3 seconds)
    pub fn check_status_message_timeout(&mut self) {
        const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;
        if let Some(time) = self.status.message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.clear_status_message();
            }
        }
    }

    /// Run a view action
    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::OpenNew => {
                if self.reject_if_read_only() {
                    return;
                }
                self.form = Some(EntryForm::blank());
                self.ui.mode = Mode::Form;
            }
            Action::Edit(id) => {
                if self.reject_if_read_only() {
                    return;
                }
                match self.find_entry(id) {
                    Some(entry) => {
                        self.form = Some(EntryForm::from_entry(&entry));
                        self.ui.mode = Mode::Form;
                    }
                    None => self.set_status_text(TextKey::EntryNotFound),
                }
            }
            Action::Delete(id) => {
                if self.reject_if_read_only() {
                    return;
                }
                if self.find_entry(id).is_some() {
                    self.modals.delete_confirmation = Some(id);
                    self.modals.delete_modal_selection = 0;
                    self.ui.mode = Mode::ConfirmDelete;
                } else {
                    self.set_status_text(TextKey::EntryNotFound);
                }
            }
            Action::SetLanguage(language) => {
                if let Err(e) = self.localizer.set_language(language.code(), self.prefs.as_ref()) {
                    log::error!("could not save language preference: {}", e);
                    self.set_status_message(format!("{} {}", self.text(TextKey::SaveFailed), e));
                }
                if self.ui.mode == Mode::LanguagePrompt {
                    self.ui.mode = Mode::View;
                }
                self.refresh_view();
            }
        }
    }

    /// Look an entry up in the backend, not the cached list, so edits of
    /// entries removed elsewhere are caught.
    fn find_entry(&mut self, id: i64) -> Option<Entry> {
        match self.store.get_by_id(id) {
            Ok(entry) => entry,
            Err(e) => {
                log::error!("failed to read entry {}: {}", id, e);
                self.set_status_message(e.to_string());
                None
            }
        }
    }

    fn reject_if_read_only(&mut self) -> bool {
        if self.is_read_only() {
            self.set_status_text(TextKey::ReadOnlyFeed);
            return true;
        }
        false
    }

    pub fn edit_selected(&mut self) {
        if self.reject_if_read_only() {
            return;
        }
        if let Some(action) = self.selected_card().and_then(|card| card.edit) {
            self.dispatch(action);
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_card().map(|card| card.id) {
            self.dispatch(Action::Delete(id));
        } else if self.is_read_only() {
            self.set_status_text(TextKey::ReadOnlyFeed);
        }
    }

    pub fn toggle_language(&mut self) {
        self.dispatch(Action::SetLanguage(self.language().toggle()));
    }

    pub fn open_language_prompt(&mut self) {
        self.ui.language_selection = Language::ALL
            .iter()
            .position(|l| *l == self.language())
            .unwrap_or(0);
        self.ui.mode = Mode::LanguagePrompt;
    }

    pub fn move_language_selection(&mut self, forward: bool) {
        let len = Language::ALL.len();
        self.ui.language_selection = if forward {
            (self.ui.language_selection + 1) % len
        } else {
            (self.ui.language_selection + len - 1) % len
        };
    }

    pub fn confirm_language_selection(&mut self) {
        let language = Language::ALL[self.ui.language_selection % Language::ALL.len()];
        self.dispatch(Action::SetLanguage(language));
    }

    pub fn enter_help_mode(&mut self) {
        self.ui.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.ui.mode = Mode::View;
    }

    pub fn navigate_form_field(&mut self, forward: bool) {
        if let Some(ref mut form) = self.form {
            form.current_field = if forward {
                form.current_field.next()
            } else {
                form.current_field.previous()
            };
        }
    }

    pub fn get_current_form_editor(&mut self) -> Option<&mut Editor> {
        self.form.as_mut().map(|form| form.current_editor_mut())
    }

    pub fn is_multi_line_field_active(&self) -> bool {
        self.form
            .as_ref()
            .map(|form| form.current_field.is_multi_line())
            .unwrap_or(false)
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.ui.mode = Mode::View;
    }

    /// Validate and store the form. On success the modal closes; on a
    /// validation or save error it stays open with a status message.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let editing_id = form.editing_id();
        let result = match form.original.as_ref() {
            Some(original) => form
                .patch(original)
                .map(|patch| self.store.update(original.id, patch)),
            None => form.values().map(|values| {
                self.store.append(EntryDraft {
                    id: None,
                    title: values.title,
                    location: values.location,
                    date: values.date,
                    desc: values.desc,
                    image: values.image,
                })
            }),
        };
        let result = match result {
            Ok(result) => result,
            Err(key) => {
                self.set_status_text(key);
                return;
            }
        };

        match result {
            Ok(entry) => {
                self.form = None;
                self.ui.mode = Mode::View;
                if let Err(e) = self.load_data() {
                    self.set_status_message(e.to_string());
                    return;
                }
                self.select_entry(entry.id);
                self.set_status_text(if editing_id.is_some() {
                    TextKey::EntryUpdated
                } else {
                    TextKey::EntrySaved
                });
            }
            Err(StoreError::NotFound(id)) => {
                log::warn!("entry {} vanished while being edited", id);
                self.form = None;
                self.ui.mode = Mode::View;
                if let Err(e) = self.load_data() {
                    log::error!("failed to reload entries: {}", e);
                }
                self.set_status_text(TextKey::EntryNotFound);
            }
            Err(StoreError::ReadOnly) => self.set_status_text(TextKey::ReadOnlyFeed),
            Err(e) => {
                log::error!("failed to save entry: {}", e);
                self.set_status_message(format!("{} {}", self.text(TextKey::SaveFailed), e));
            }
        }
    }

    pub fn move_delete_selection(&mut self) {
        self.modals.delete_modal_selection = 1 - self.modals.delete_modal_selection.min(1);
    }

    /// Run the highlighted option of the delete modal (0 = delete, 1 = cancel)
    pub fn confirm_delete(&mut self) {
        let id = self.modals.delete_confirmation.take();
        self.ui.mode = Mode::View;
        let Some(id) = id else {
            return;
        };
        if self.modals.delete_modal_selection != 0 {
            return;
        }

        match self.store.delete(id) {
            Ok(_) => {
                if let Err(e) = self.load_data() {
                    self.set_status_message(e.to_string());
                } else {
                    self.set_status_text(TextKey::EntryDeleted);
                }
            }
            Err(StoreError::NotFound(_)) => {
                if let Err(e) = self.load_data() {
                    log::error!("failed to reload entries: {}", e);
                }
                self.set_status_text(TextKey::EntryNotFound);
            }
            Err(e) => {
                log::error!("failed to delete entry {}: {}", id, e);
                self.set_status_message(e.to_string());
            }
        }
    }

    pub fn cancel_delete(&mut self) {
        self.modals.delete_confirmation = None;
        self.ui.mode = Mode::View;
    }
}
