use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation,
    ScrollbarState, StatefulWidget, Wrap,
};
use ratatui::Frame;
use crate::tui::widgets::color::Palette;
use crate::view::{DiaryView, EntryCard};

/// Lines shown for a description before it is cut off
const MAX_DESCRIPTION_LINES: usize = 3;

fn truncate(text: &str, max_width: usize) -> String {
    let width = Span::raw(text).width();
    if width <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        let candidate = format!("{}{}", out, ch);
        if Span::raw(candidate.as_str()).width() + 3 > max_width {
            break;
        }
        out = candidate;
    }
    out + "..."
}

/// The lines of one card, each cut to `max_width` columns
pub fn card_lines(card: &EntryCard, max_width: usize, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            truncate(&card.date_label, max_width),
            Style::default().fg(palette.accent),
        )),
        Line::from(Span::styled(
            truncate(&card.title, max_width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(truncate(&card.location_line, max_width)),
    ];

    let desc_lines: Vec<&str> = card.description.lines().collect();
    for line in desc_lines.iter().take(MAX_DESCRIPTION_LINES) {
        lines.push(Line::from(truncate(line, max_width)));
    }
    if desc_lines.len() > MAX_DESCRIPTION_LINES {
        lines.push(Line::from("..."));
    }

    if let Some(ref image) = card.image {
        lines.push(Line::from(Span::styled(
            truncate(&format!("🖼 {} · {}", image.mime, image.size_label), max_width),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    lines.push(Line::from(""));
    lines
}

pub fn render_diary_view(
    f: &mut Frame,
    area: Rect,
    view: &DiaryView,
    list_state: &mut ListState,
    title: &str,
    palette: &Palette,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .style(palette.base());

    let cards = match view {
        DiaryView::Empty { message } => {
            let paragraph = Paragraph::new(message.as_str())
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            f.render_widget(paragraph, area);
            return;
        }
        DiaryView::Error { message, detail } => {
            let text = vec![
                Line::from(Span::styled(message.clone(), palette.accent())),
                Line::from(""),
                Line::from(detail.clone()),
            ];
            let paragraph = Paragraph::new(text)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            f.render_widget(paragraph, area);
            return;
        }
        DiaryView::Cards(cards) => cards,
    };

    // Reserve a column for the scrollbar
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let list_area = areas[0];
    let scrollbar_area = areas[1];

    let max_width = list_area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = cards
        .iter()
        .map(|card| ListItem::new(card_lines(card, max_width, palette)))
        .collect();
    let total_height: usize = items.iter().map(|item| item.height()).sum();

    let list = List::new(items)
        .block(block)
        .style(palette.base())
        .highlight_style(palette.highlight())
        .highlight_symbol("▌ ");
    StatefulWidget::render(list, list_area, f.buffer_mut(), list_state);

    let inner_height = list_area.height.saturating_sub(2) as usize;
    if total_height > inner_height && scrollbar_area.width > 0 && list_area.height > 2 {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            list_area.y + 1,
            scrollbar_area.width,
            list_area.height.saturating_sub(2),
        );
        let mut scrollbar_state = ScrollbarState::new(cards.len())
            .position(list_state.selected().unwrap_or(0));
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");
        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::view::ImageBlock;
    use pretty_assertions::assert_eq;

    fn card(description: &str, image: Option<ImageBlock>) -> EntryCard {
        EntryCard {
            id: 1,
            date_label: "March 1, 2024".to_string(),
            title: "Kyoto".to_string(),
            location_line: "📍 Japan".to_string(),
            description: description.to_string(),
            image,
            edit: None,
        }
    }

    fn text(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn card_shows_fields_in_order() {
        let palette = Palette::from_theme(&Theme::default());
        let lines = card_lines(&card("Cherry blossoms", None), 40, &palette);
        assert_eq!(
            text(&lines),
            vec!["March 1, 2024", "Kyoto", "📍 Japan", "Cherry blossoms", ""]
        );
    }

    #[test]
    fn long_descriptions_are_cut() {
        let palette = Palette::from_theme(&Theme::default());
        let image = ImageBlock {
            mime: "image/png".to_string(),
            size_label: "2.0 KB".to_string(),
        };
        let lines = card_lines(&card("a\nb\nc\nd", Some(image)), 40, &palette);
        assert_eq!(&text(&lines)[3..], &["a", "b", "c", "...", "🖼 image/png · 2.0 KB", ""]);
    }

    #[test]
    fn truncate_counts_display_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
        assert_eq!(truncate("京都京都京都", 7), "京都...");
    }
}
