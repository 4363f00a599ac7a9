use crate::i18n::{format_date, translate, Language, TextKey};
use crate::image::{format_size, inspect_data_uri};
use crate::models::Entry;

/// Something the user can trigger from the diary view. Cards carry these
/// instead of callbacks; the front end decides how to run them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    OpenNew,
    Edit(i64),
    Delete(i64),
    SetLanguage(Language),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlock {
    pub mime: String,
    pub size_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryCard {
    pub id: i64,
    pub date_label: String,
    pub title: String,
    pub location_line: String,
    pub description: String,
    pub image: Option<ImageBlock>,
    pub edit: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiaryView {
    Empty { message: String },
    Error { message: String, detail: String },
    Cards(Vec<EntryCard>),
}

impl DiaryView {
    pub fn cards(&self) -> &[EntryCard] {
        match self {
            DiaryView::Cards(cards) => cards,
            _ => &[],
        }
    }
}

pub const LOCATION_GLYPH: &str = "📍";

/// Build the view for `entries` in `language`. Card order follows the
/// slice; `editable` controls whether cards expose an edit action.
pub fn render_entries(entries: &[Entry], language: Language, editable: bool) -> DiaryView {
    if entries.is_empty() {
        return DiaryView::Empty {
            message: translate(language, TextKey::NoEntries).to_string(),
        };
    }
    DiaryView::Cards(
        entries
            .iter()
            .map(|entry| render_card(entry, language, editable))
            .collect(),
    )
}

pub fn render_feed_error(language: Language, detail: &str) -> DiaryView {
    DiaryView::Error {
        message: translate(language, TextKey::FeedError).to_string(),
        detail: detail.to_string(),
    }
}

fn render_card(entry: &Entry, language: Language, editable: bool) -> EntryCard {
    let image = entry.image.as_deref().map(|uri| match inspect_data_uri(uri) {
        Some(info) => ImageBlock {
            mime: info.mime,
            size_label: format_size(info.byte_len),
        },
        None => ImageBlock {
            mime: "image".to_string(),
            size_label: format_size(uri.len()),
        },
    });

    EntryCard {
        id: entry.id,
        date_label: format_date(&entry.date, language),
        title: entry.title.clone(),
        location_line: format!("{} {}", LOCATION_GLYPH, entry.location),
        description: entry.desc.clone(),
        image,
        edit: editable.then_some(Action::Edit(entry.id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::encode_data_uri;
    use pretty_assertions::assert_eq;

    fn entry(id: i64, title: &str, date: &str) -> Entry {
        Entry {
            id,
            title: title.to_string(),
            location: "Japan".to_string(),
            date: date.to_string(),
            desc: "Cherry blossoms".to_string(),
            image: None,
        }
    }

    #[test]
    fn empty_store_renders_only_message() {
        assert_eq!(
            render_entries(&[], Language::En, true),
            DiaryView::Empty {
                message: "No entries yet. Start your journey!".to_string()
            }
        );
        assert_eq!(
            render_entries(&[], Language::Cn, true),
            DiaryView::Empty {
                message: "暂无日记。开始你的旅程吧！".to_string()
            }
        );
        assert!(render_entries(&[], Language::En, true).cards().is_empty());
    }

    #[test]
    fn card_fields_follow_language() {
        let entries = vec![entry(5, "Kyoto", "2024-03-01")];

        let en = render_entries(&entries, Language::En, true);
        let card = &en.cards()[0];
        assert_eq!(card.date_label, "March 1, 2024");
        assert_eq!(card.location_line, "📍 Japan");
        assert_eq!(card.description, "Cherry blossoms");
        assert_eq!(card.edit, Some(Action::Edit(5)));
        assert_eq!(card.image, None);

        let cn = render_entries(&entries, Language::Cn, true);
        assert_eq!(cn.cards()[0].date_label, "2024年3月1日");
    }

    #[test]
    fn language_round_trip_restores_dates() {
        let entries = vec![entry(1, "a", "2024-03-01"), entry(2, "b", "2023-11-20")];
        let before = render_entries(&entries, Language::En, true);
        let _ = render_entries(&entries, Language::Cn, true);
        assert_eq!(render_entries(&entries, Language::En, true), before);
    }

    #[test]
    fn cards_keep_store_order() {
        let entries = vec![entry(1, "newest", "2020-01-01"), entry(9, "oldest", "2024-01-01")];
        let ids: Vec<i64> = render_entries(&entries, Language::En, false)
            .cards()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![1, 9]);
    }

    #[test]
    fn read_only_cards_have_no_edit_action() {
        let view = render_entries(&[entry(1, "x", "2024-01-01")], Language::En, false);
        assert_eq!(view.cards()[0].edit, None);
    }

    #[test]
    fn image_block_only_when_image_attached() {
        let mut with_image = entry(1, "pic", "2024-01-01");
        with_image.image = Some(encode_data_uri("image/png", &[0u8; 2048]));
        let view = render_entries(&[with_image, entry(2, "plain", "2024-01-02")], Language::En, true);

        assert_eq!(
            view.cards()[0].image,
            Some(ImageBlock {
                mime: "image/png".to_string(),
                size_label: "2.0 KB".to_string()
            })
        );
        assert_eq!(view.cards()[1].image, None);
    }

    #[test]
    fn feed_error_is_localized() {
        assert_eq!(
            render_feed_error(Language::Cn, "not found"),
            DiaryView::Error {
                message: "无法加载日记。".to_string(),
                detail: "not found".to_string()
            }
        );
    }
}
