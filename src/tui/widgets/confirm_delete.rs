use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use crate::i18n::{Localizer, TextKey};
use crate::tui::layout::popup_area;
use crate::tui::widgets::color::Palette;

/// Delete/Cancel modal for the entry titled `entry_title`.
/// `selection` is 0 for delete, 1 for cancel.
pub fn render_confirm_delete(
    f: &mut Frame,
    area: Rect,
    entry_title: &str,
    selection: usize,
    localizer: &Localizer,
    palette: &Palette,
) {
    let popup_area = popup_area(area, 50, 35);
    f.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from(localizer.text(TextKey::ConfirmDelete)),
        Line::from(""),
        Line::from(Span::styled(entry_title.to_string(), palette.accent())),
        Line::from(""),
    ];

    let options = [TextKey::BtnDelete, TextKey::BtnCancel];
    for (index, option) in options.iter().enumerate() {
        let is_selected = index == selection;
        let prefix = if is_selected { "> " } else { "  " };
        let style = if is_selected { palette.highlight() } else { palette.base() };
        lines.push(Line::from(Span::styled(
            format!("{}{}", prefix, localizer.text(*option)),
            style,
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(localizer.text(TextKey::BtnDelete))
                .title_alignment(Alignment::Center)
                .style(palette.base()),
        )
        .style(palette.base())
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
