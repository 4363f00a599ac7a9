//! Two-language UI text and the active-language preference.
//!
//! Every [`TextKey`] has a string in every [`Language`]; `translate` matches
//! exhaustively, so a missing translation is a compile error.

use crate::database::{DatabaseError, KeyValueStore};
use crate::utils::parse_date;

/// Key holding the two-letter language preference
pub const LANGUAGE_KEY: &str = "preferredLanguage";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Cn,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Cn];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Cn => "cn",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "cn" => Some(Language::Cn),
            _ => None,
        }
    }

    /// Name of the language in itself, for the selection prompt
    pub fn native_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Cn => "中文",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Language::En => Language::Cn,
            Language::Cn => Language::En,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKey {
    AppTitle,
    AddEntry,
    HeroTitle,
    HeroSubtitle,
    NoEntries,
    AddEntryTitle,
    EditEntryTitle,
    LabelTitle,
    LabelLocation,
    LabelDate,
    LabelDescription,
    LabelImage,
    ImageKept,
    BtnSave,
    BtnEdit,
    BtnDelete,
    BtnCancel,
    ChooseLanguage,
    FeedError,
    ReadOnlyFeed,
    EntrySaved,
    EntryUpdated,
    EntryDeleted,
    EntryNotFound,
    RequiredFields,
    InvalidDate,
    ImageFailed,
    SaveFailed,
    ConfirmDelete,
    HelpTitle,
    HintQuit,
    HintNavigate,
    HintLanguage,
    HintHelp,
    HintNextField,
    HintClose,
    HintConfirm,
    HintUndo,
}

impl TextKey {
    pub const ALL: [TextKey; 38] = [
        TextKey::AppTitle,
        TextKey::AddEntry,
        TextKey::HeroTitle,
        TextKey::HeroSubtitle,
        TextKey::NoEntries,
        TextKey::AddEntryTitle,
        TextKey::EditEntryTitle,
        TextKey::LabelTitle,
        TextKey::LabelLocation,
        TextKey::LabelDate,
        TextKey::LabelDescription,
        TextKey::LabelImage,
        TextKey::ImageKept,
        TextKey::BtnSave,
        TextKey::BtnEdit,
        TextKey::BtnDelete,
        TextKey::BtnCancel,
        TextKey::ChooseLanguage,
        TextKey::FeedError,
        TextKey::ReadOnlyFeed,
        TextKey::EntrySaved,
        TextKey::EntryUpdated,
        TextKey::EntryDeleted,
        TextKey::EntryNotFound,
        TextKey::RequiredFields,
        TextKey::InvalidDate,
        TextKey::ImageFailed,
        TextKey::SaveFailed,
        TextKey::ConfirmDelete,
        TextKey::HelpTitle,
        TextKey::HintQuit,
        TextKey::HintNavigate,
        TextKey::HintLanguage,
        TextKey::HintHelp,
        TextKey::HintNextField,
        TextKey::HintClose,
        TextKey::HintConfirm,
        TextKey::HintUndo,
    ];
}

pub fn translate(language: Language, key: TextKey) -> &'static str {
    match language {
        Language::En => english(key),
        Language::Cn => chinese(key),
    }
}

fn english(key: TextKey) -> &'static str {
    match key {
        TextKey::AppTitle => "Wayfarer",
        TextKey::AddEntry => "Add Entry",
        TextKey::HeroTitle => "Your Journey, Your Story",
        TextKey::HeroSubtitle => "Capture every moment of your adventures.",
        TextKey::NoEntries => "No entries yet. Start your journey!",
        TextKey::AddEntryTitle => "Add New Memory",
        TextKey::EditEntryTitle => "Edit Memory",
        TextKey::LabelTitle => "Title",
        TextKey::LabelLocation => "Location",
        TextKey::LabelDate => "Date",
        TextKey::LabelDescription => "Description",
        TextKey::LabelImage => "Image (Optional)",
        TextKey::ImageKept => "Leave empty to keep the current image",
        TextKey::BtnSave => "Save Memory",
        TextKey::BtnEdit => "Edit",
        TextKey::BtnDelete => "Delete",
        TextKey::BtnCancel => "Cancel",
        TextKey::ChooseLanguage => "Choose your language",
        TextKey::FeedError => "Could not load diary entries.",
        TextKey::ReadOnlyFeed => "This diary is read-only.",
        TextKey::EntrySaved => "Memory saved.",
        TextKey::EntryUpdated => "Memory updated.",
        TextKey::EntryDeleted => "Memory deleted.",
        TextKey::EntryNotFound => "That memory no longer exists.",
        TextKey::RequiredFields => "Title, location, date and description are required.",
        TextKey::InvalidDate => "Date must look like YYYY-MM-DD.",
        TextKey::ImageFailed => "Could not read the image.",
        TextKey::SaveFailed => "Could not save.",
        TextKey::ConfirmDelete => "Delete this memory?",
        TextKey::HelpTitle => "Help - Key Bindings",
        TextKey::HintQuit => "Quit",
        TextKey::HintNavigate => "Navigate",
        TextKey::HintLanguage => "Language",
        TextKey::HintHelp => "Help",
        TextKey::HintNextField => "Next field",
        TextKey::HintClose => "Close",
        TextKey::HintConfirm => "OK",
        TextKey::HintUndo => "Undo",
    }
}

fn chinese(key: TextKey) -> &'static str {
    match key {
        TextKey::AppTitle => "旅人",
        TextKey::AddEntry => "添加日记",
        TextKey::HeroTitle => "你的旅程，你的故事",
        TextKey::HeroSubtitle => "记录冒险旅途中的每一个精彩瞬间。",
        TextKey::NoEntries => "暂无日记。开始你的旅程吧！",
        TextKey::AddEntryTitle => "添加新回忆",
        TextKey::EditEntryTitle => "编辑回忆",
        TextKey::LabelTitle => "标题",
        TextKey::LabelLocation => "地点",
        TextKey::LabelDate => "日期",
        TextKey::LabelDescription => "描述",
        TextKey::LabelImage => "图片 (可选)",
        TextKey::ImageKept => "留空以保留当前图片",
        TextKey::BtnSave => "保存回忆",
        TextKey::BtnEdit => "编辑",
        TextKey::BtnDelete => "删除",
        TextKey::BtnCancel => "取消",
        TextKey::ChooseLanguage => "请选择语言",
        TextKey::FeedError => "无法加载日记。",
        TextKey::ReadOnlyFeed => "此日记为只读。",
        TextKey::EntrySaved => "回忆已保存。",
        TextKey::EntryUpdated => "回忆已更新。",
        TextKey::EntryDeleted => "回忆已删除。",
        TextKey::EntryNotFound => "该回忆已不存在。",
        TextKey::RequiredFields => "标题、地点、日期和描述为必填项。",
        TextKey::InvalidDate => "日期格式应为 YYYY-MM-DD。",
        TextKey::ImageFailed => "无法读取图片。",
        TextKey::SaveFailed => "保存失败。",
        TextKey::ConfirmDelete => "删除这条回忆？",
        TextKey::HelpTitle => "帮助 - 快捷键",
        TextKey::HintQuit => "退出",
        TextKey::HintNavigate => "导航",
        TextKey::HintLanguage => "语言",
        TextKey::HintHelp => "帮助",
        TextKey::HintNextField => "下一项",
        TextKey::HintClose => "关闭",
        TextKey::HintConfirm => "确定",
        TextKey::HintUndo => "撤销",
    }
}

/// Long-form date: `March 1, 2024` in English, `2024年3月1日` in Chinese.
/// Strings that are not `YYYY-MM-DD` are returned unchanged.
pub fn format_date(date: &str, language: Language) -> String {
    let Ok(parsed) = parse_date(date.trim()) else {
        return date.to_string();
    };
    let layout = match language {
        Language::En => "%B %-d, %Y",
        Language::Cn => "%Y年%-m月%-d日",
    };
    parsed.format(layout).to_string()
}

/// Active-language state. `None` until the user has picked a language,
/// which is when the selection prompt is shown.
#[derive(Debug, Clone, Default)]
pub struct Localizer {
    active: Option<Language>,
}

impl Localizer {
    pub fn new(active: Option<Language>) -> Self {
        Self { active }
    }

    /// Restore the persisted preference. An unreadable or unknown value is
    /// logged and treated as no preference.
    pub fn load(prefs: &dyn KeyValueStore) -> Self {
        let active = match prefs.get(LANGUAGE_KEY) {
            Ok(Some(code)) => {
                let lang = Language::from_code(&code);
                if lang.is_none() {
                    log::warn!("ignoring unknown stored language '{}'", code);
                }
                lang
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("could not read language preference: {}", e);
                None
            }
        };
        Self { active }
    }

    pub fn active(&self) -> Option<Language> {
        self.active
    }

    /// Language used for rendering; English until one has been chosen
    pub fn language(&self) -> Language {
        self.active.unwrap_or_default()
    }

    pub fn prompt_visible(&self) -> bool {
        self.active.is_none()
    }

    /// Switch to `code` and persist it. Unknown codes are a logged no-op and
    /// return `Ok(None)`.
    pub fn set_language(
        &mut self,
        code: &str,
        prefs: &dyn KeyValueStore,
    ) -> Result<Option<Language>, DatabaseError> {
        let Some(language) = Language::from_code(code) else {
            log::warn!("ignoring unknown language code '{}'", code);
            return Ok(None);
        };
        self.active = Some(language);
        prefs.set(LANGUAGE_KEY, language.code())?;
        log::info!("language set to {}", language.code());
        Ok(Some(language))
    }

    /// Forget the preference so the prompt shows again
    pub fn clear(&mut self, prefs: &dyn KeyValueStore) -> Result<(), DatabaseError> {
        self.active = None;
        prefs.remove(LANGUAGE_KEY)
    }

    pub fn text(&self, key: TextKey) -> &'static str {
        translate(self.language(), key)
    }
}
