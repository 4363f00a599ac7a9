use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use crate::i18n::{Localizer, TextKey};
use crate::tui::app::{EntryForm, FormField};
use crate::tui::layout::popup_area;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::editor::Editor;

/// Rows given to the description field, borders included
const DESCRIPTION_HEIGHT: u16 = 7;

/// Inner height of the description field in a modal drawn over `area`
pub fn description_viewport_height(area: Rect) -> usize {
    let modal = popup_area(area, 70, 90);
    let available = modal.height.saturating_sub(2 + 3 * 4 + 1);
    available.min(DESCRIPTION_HEIGHT).saturating_sub(2) as usize
}

fn field_constraints() -> [Constraint; 6] {
    [
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Max(DESCRIPTION_HEIGHT),
        Constraint::Length(3),
        Constraint::Length(1),
    ]
}

/// Visible lines of `editor`, starting at its scroll offset
fn visible_lines(editor: &Editor, height: usize) -> Vec<Line<'static>> {
    editor
        .lines
        .iter()
        .skip(editor.scroll_offset)
        .take(height.max(1))
        .map(|l| Line::from(l.clone()))
        .collect()
}

/// Screen position of the cursor inside a bordered field at `area`
fn cursor_position(editor: &Editor, area: Rect) -> (u16, u16) {
    let line = editor.lines.get(editor.cursor_line).map(String::as_str).unwrap_or("");
    let before: String = line.chars().take(editor.cursor_col).collect();
    let x = area.x + 1 + Span::raw(before).width() as u16;
    let y = area.y + 1 + editor.cursor_line.saturating_sub(editor.scroll_offset) as u16;
    (
        x.min(area.right().saturating_sub(2)),
        y.min(area.bottom().saturating_sub(2)),
    )
}

pub fn render_entry_form(
    f: &mut Frame,
    area: Rect,
    form: &EntryForm,
    localizer: &Localizer,
    palette: &Palette,
) {
    let modal = popup_area(area, 70, 90);
    f.render_widget(Clear, modal);

    let title_key = if form.editing_id().is_some() {
        TextKey::EditEntryTitle
    } else {
        TextKey::AddEntryTitle
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(localizer.text(title_key))
        .title_alignment(Alignment::Center)
        .style(palette.base());
    let inner = block.inner(modal);
    f.render_widget(block, modal);

    if inner.width < 4 || inner.height < 4 {
        return;
    }

    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(field_constraints())
        .split(inner);

    let inactive_style = Style::default().fg(palette.fg).add_modifier(Modifier::DIM);
    let mut cursor = None;

    for (index, field) in FormField::ALL.iter().enumerate() {
        let field_area = areas[index];
        if field_area.height < 3 {
            continue;
        }
        let active = form.current_field == *field;
        let editor = form.editor(*field);

        let mut label = localizer.text(field.label()).to_string();
        if *field == FormField::Date {
            label.push_str(" (YYYY-MM-DD)");
        }
        let mut block = Block::default().borders(Borders::ALL).title(label);
        if *field == FormField::Image && form.has_image() {
            block = block.title_bottom(localizer.text(TextKey::ImageKept));
        }

        let height = field_area.height.saturating_sub(2) as usize;
        let paragraph = Paragraph::new(visible_lines(editor, height))
            .block(block)
            .style(if active { palette.highlight() } else { inactive_style });
        f.render_widget(paragraph, field_area);

        if active {
            cursor = Some(cursor_position(editor, field_area));
        }
    }

    let hint = format!(
        "[{}]  Esc: {}",
        localizer.text(TextKey::BtnSave),
        localizer.text(TextKey::BtnCancel)
    );
    f.render_widget(
        Paragraph::new(hint)
            .alignment(Alignment::Center)
            .style(palette.accent()),
        areas[5],
    );

    if let Some(position) = cursor {
        f.set_cursor_position(position);
    }
}
