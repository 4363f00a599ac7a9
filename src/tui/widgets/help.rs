use ratatui::layout::{Alignment, Rect};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use crate::Config;
use crate::i18n::{Localizer, TextKey};
use crate::tui::layout::popup_area;
use crate::tui::widgets::color::Palette;
use crate::utils::format_key_binding_for_display as key;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config, localizer: &Localizer, palette: &Palette) {
    let popup_area = popup_area(area, 60, 70);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config, localizer))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(localizer.text(TextKey::HelpTitle))
                .title_alignment(Alignment::Center)
                .style(palette.base()),
        )
        .style(palette.base())
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

/// Help text built from the configured key bindings
pub fn build_help_text(config: &Config, localizer: &Localizer) -> String {
    let kb = &config.key_bindings;
    let t = |k| localizer.text(k);
    let mut text = String::new();

    text.push_str(&format!("{}:\n", t(TextKey::AppTitle)));
    text.push_str(&format!("  {} / {}, ↑ / ↓: {}\n", key(&kb.list_up), key(&kb.list_down), t(TextKey::HintNavigate)));
    text.push_str(&format!("  {}: {}\n", key(&kb.new), t(TextKey::AddEntry)));
    text.push_str(&format!("  {}, Enter: {}\n", key(&kb.edit), t(TextKey::BtnEdit)));
    text.push_str(&format!("  {}: {}\n", key(&kb.delete), t(TextKey::BtnDelete)));
    text.push_str(&format!("  {}: {} (EN / 中文)\n", key(&kb.toggle_language), t(TextKey::HintLanguage)));
    text.push_str(&format!("  Shift+{}: {}\n", key(&kb.toggle_language).to_uppercase(), t(TextKey::ChooseLanguage)));
    text.push('\n');

    text.push_str(&format!("{} / {}:\n", t(TextKey::AddEntryTitle), t(TextKey::EditEntryTitle)));
    text.push_str(&format!("  Tab / Shift+Tab: {}\n", t(TextKey::HintNextField)));
    text.push_str(&format!("  {}: {}\n", key(&kb.save), t(TextKey::BtnSave)));
    text.push_str(&format!("  Ctrl+z: {}\n", t(TextKey::HintUndo)));
    text.push_str(&format!("  Esc: {}\n", t(TextKey::BtnCancel)));
    text.push('\n');

    text.push_str(&format!("  {}: {}\n", key(&kb.help), t(TextKey::HintHelp)));
    text.push_str(&format!("  {}: {}\n", key(&kb.quit), t(TextKey::HintQuit)));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;

    #[test]
    fn help_lists_configured_keys() {
        let mut config = Config::default();
        config.key_bindings.new = "a".to_string();
        let text = build_help_text(&config, &Localizer::new(Some(Language::En)));
        assert!(text.contains("  a: Add Entry\n"));
        assert!(text.contains("Tab / Shift+Tab: Next field"));
    }

    #[test]
    fn help_follows_language() {
        let text = build_help_text(&Config::default(), &Localizer::new(Some(Language::Cn)));
        assert!(text.contains("  q: 退出\n"));
        assert!(text.contains("  Ctrl+z: 撤销\n"));
        assert!(!text.contains("Undo"));
    }
}
