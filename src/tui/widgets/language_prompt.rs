use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use crate::i18n::{translate, Language, TextKey};
use crate::tui::layout::fixed_popup_area;
use crate::tui::widgets::color::Palette;

/// Language chooser shown until a preference is stored. The heading is
/// given in every language since none has been picked yet.
pub fn render_language_prompt(f: &mut Frame, area: Rect, selection: usize, palette: &Palette) {
    let mut lines: Vec<Line> = Language::ALL
        .iter()
        .map(|lang| Line::from(translate(*lang, TextKey::ChooseLanguage)))
        .collect();
    lines.push(Line::from(""));

    for (index, lang) in Language::ALL.iter().enumerate() {
        let selected = index == selection;
        let prefix = if selected { "> " } else { "  " };
        let style = if selected { palette.highlight() } else { palette.base() };
        lines.push(Line::from(Span::styled(
            format!("{}{}", prefix, lang.native_name()),
            style,
        )));
    }

    let height = lines.len() as u16 + 2;
    let popup = fixed_popup_area(area, 36, height);
    f.render_widget(Clear, popup);

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("🌐")
                .title_alignment(Alignment::Center)
                .style(palette.base()),
        )
        .alignment(Alignment::Center);
    f.render_widget(paragraph, popup);
}
