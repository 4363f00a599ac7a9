use ratatui::layout::Alignment;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use crate::i18n::TextKey;
use crate::tui::app::Mode;
use crate::tui::widgets::{
    color::Palette,
    confirm_delete::render_confirm_delete,
    entry_cards::render_diary_view,
    form::render_entry_form,
    help::render_help,
    language_prompt::render_language_prompt,
    status_bar::render_status_bar,
};
use crate::tui::{App, Layout};
use crate::utils::format_key_binding_for_display as key;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let palette = Palette::from_theme(&app.config.get_active_theme());

    let mut title = format!(" {} ", app.text(TextKey::AppTitle));
    if app.is_read_only() {
        title = format!(" {} · {} ", app.text(TextKey::AppTitle), app.text(TextKey::ReadOnlyFeed));
    }
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
        .style(palette.base());
    f.render_widget(outer_block, f.area());

    let header = vec![
        Line::from(Span::styled(app.text(TextKey::HeroTitle), palette.accent())),
        Line::from(Span::styled(
            app.text(TextKey::HeroSubtitle),
            palette.base().add_modifier(Modifier::ITALIC),
        )),
    ];
    f.render_widget(
        Paragraph::new(header).alignment(Alignment::Center).style(palette.base()),
        layout.header_area,
    );

    let cards_title = format!(" {} ({}) ", app.language().native_name(), app.view.cards().len());
    render_diary_view(
        f,
        layout.cards_area,
        &app.view,
        &mut app.ui.list_state,
        &cards_title,
        &palette,
    );

    // Overlays go on top of the cards
    match app.ui.mode {
        Mode::LanguagePrompt => {
            render_language_prompt(f, f.area(), app.ui.language_selection, &palette);
        }
        Mode::Form => {
            if let Some(ref form) = app.form {
                render_entry_form(f, f.area(), form, &app.localizer, &palette);
            }
        }
        Mode::Help => render_help(f, f.area(), &app.config, &app.localizer, &palette),
        Mode::ConfirmDelete => {
            let title = app
                .modals
                .delete_confirmation
                .and_then(|id| app.entries.iter().find(|e| e.id == id))
                .map(|e| e.title.clone())
                .unwrap_or_default();
            render_confirm_delete(
                f,
                f.area(),
                &title,
                app.modals.delete_modal_selection,
                &app.localizer,
                &palette,
            );
        }
        Mode::View => {}
    }

    let key_hints = get_key_hints(app);
    render_status_bar(f, layout.status_area, app.status.message.as_ref(), &key_hints, &palette);
}

fn get_key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    match app.ui.mode {
        Mode::LanguagePrompt => vec![
            format!("↑/↓: {}", app.text(TextKey::HintNavigate)),
            format!("Enter: {}", app.text(TextKey::HintConfirm)),
        ],
        Mode::Help => vec![format!("Esc / {}: {}", key(&kb.help), app.text(TextKey::HintClose))],
        Mode::Form => vec![
            format!("Tab: {}", app.text(TextKey::HintNextField)),
            format!("{}: {}", key(&kb.save), app.text(TextKey::BtnSave)),
            format!("Esc: {}", app.text(TextKey::BtnCancel)),
        ],
        Mode::ConfirmDelete => vec![
            format!("↑/↓: {}", app.text(TextKey::HintNavigate)),
            format!("Enter: {}", app.text(TextKey::HintConfirm)),
            format!("Esc: {}", app.text(TextKey::BtnCancel)),
        ],
        Mode::View => {
            let mut hints = vec![format!("{}: {}", key(&kb.quit), app.text(TextKey::HintQuit))];
            if !app.is_read_only() {
                hints.push(format!("{}: {}", key(&kb.new), app.text(TextKey::AddEntry)));
                hints.push(format!("{}: {}", key(&kb.edit), app.text(TextKey::BtnEdit)));
                hints.push(format!("{}: {}", key(&kb.delete), app.text(TextKey::BtnDelete)));
            }
            hints.push(format!(
                "{}/{}: {}",
                key(&kb.list_up),
                key(&kb.list_down),
                app.text(TextKey::HintNavigate)
            ));
            hints.push(format!("{}: {}", key(&kb.toggle_language), app.text(TextKey::HintLanguage)));
            hints.push(format!("{}: {}", key(&kb.help), app.text(TextKey::HintHelp)));
            hints
        }
    }
}
