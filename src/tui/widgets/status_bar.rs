use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use crate::tui::widgets::color::Palette;

const SEPARATOR: &str = " • ";
const ELLIPSIS: &str = "...";

fn width(text: &str) -> usize {
    Span::raw(text).width()
}

/// Longest prefix of `text` that fits in `columns` terminal cells
fn clip(text: &str, columns: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = Span::raw(ch.to_string()).width();
        if used + w > columns {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

/// Join as many hints as fit in `max_width` columns, ending with an ellipsis
/// when some had to be left out
pub fn fit_hints(key_hints: &[String], max_width: usize) -> String {
    let mut text = String::new();
    for (i, hint) in key_hints.iter().enumerate() {
        let current = width(&text);
        let would_be = if i == 0 {
            width(hint)
        } else {
            current + width(SEPARATOR) + width(hint)
        };

        if would_be > max_width {
            if !text.is_empty() && current + ELLIPSIS.len() <= max_width {
                return text + ELLIPSIS;
            }
            let source = if text.is_empty() { hint.as_str() } else { text.as_str() };
            return clip(source, max_width.saturating_sub(ELLIPSIS.len())) + ELLIPSIS;
        }

        if i > 0 {
            text.push_str(SEPARATOR);
        }
        text.push_str(hint);
    }
    text
}

/// One-line status bar: the status message when there is one, key hints otherwise
pub fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    message: Option<&String>,
    key_hints: &[String],
    palette: &Palette,
) {
    let max_width = area.width as usize;
    let paragraph = match message {
        Some(msg) => {
            let content = if width(msg) > max_width {
                clip(msg, max_width.saturating_sub(ELLIPSIS.len())) + ELLIPSIS
            } else {
                msg.clone()
            };
            Paragraph::new(content).style(palette.highlight().add_modifier(Modifier::BOLD))
        }
        None => Paragraph::new(fit_hints(key_hints, max_width)).style(palette.base()),
    };
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hints() -> Vec<String> {
        vec!["q: Quit".to_string(), "n: New".to_string(), "F1: Help".to_string()]
    }

    #[test]
    fn all_hints_fit() {
        assert_eq!(fit_hints(&hints(), 80), "q: Quit • n: New • F1: Help");
    }

    #[test]
    fn overflow_ends_with_ellipsis() {
        assert_eq!(fit_hints(&hints(), 20), "q: Quit • n: New...");
        assert_eq!(fit_hints(&hints(), 5), "q:...");
    }

    #[test]
    fn wide_hints_are_measured_in_columns() {
        let hints = vec!["q: 退出".to_string(), "n: 新建".to_string()];
        assert_eq!(fit_hints(&hints, 17), "q: 退出 • n: 新建");
        assert_eq!(fit_hints(&hints, 14), "q: 退出...");
        assert_eq!(fit_hints(&hints[..1], 6), "q: ...");
        assert_eq!(clip("京都京都", 5), "京都");
    }
}
