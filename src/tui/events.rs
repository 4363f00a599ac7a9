use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, size as terminal_size, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use std::time::Duration;
use crate::tui::app::Mode;
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::tui::widgets::form::description_viewport_height;
use crate::tui::App;
use crate::utils::{has_primary_modifier, key_matches};
use crate::view::Action;

/// Restores the terminal when dropped, so a panic does not leave it in raw
/// mode or on the alternate screen.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Errors are ignored, we may already be unwinding
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Checked before entering the alternate screen so the message stays visible
    let (width, height) = terminal_size()?;
    let min_width = Layout::MIN_WIDTH + 2;
    let min_height = Layout::MIN_HEIGHT + 2;
    if width < min_width || height < min_height {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width, min_height
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    log::info!("tui started with {} entries", app.entries.len());

    loop {
        app.check_status_message_timeout();

        let size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, size.width, size.height);

        if app.ui.mode == Mode::Form {
            let viewport_height = if app.is_multi_line_field_active() {
                description_viewport_height(terminal_rect)
            } else {
                1
            };
            if let Some(editor) = app.get_current_form_editor() {
                editor.update_scroll(viewport_height);
            }
        }

        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Only Press events, Windows also reports Release
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event) {
                    break;
                }
            }
        }
    }

    guard.restore()?;
    log::info!("tui closed");
    Ok(())
}

/// Handle one key press. Returns true when the user asked to quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> bool {
    match app.ui.mode {
        Mode::LanguagePrompt => handle_language_prompt(app, key_event),
        Mode::Form => handle_form(app, key_event),
        Mode::Help => {
            if key_event.code == KeyCode::Esc || key_matches(&key_event, &app.config.key_bindings.help) {
                app.exit_help_mode();
            }
            false
        }
        Mode::ConfirmDelete => {
            match key_event.code {
                KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
                    app.move_delete_selection()
                }
                KeyCode::Enter => app.confirm_delete(),
                KeyCode::Esc => app.cancel_delete(),
                _ => {}
            }
            false
        }
        Mode::View => handle_view(app, key_event),
    }
}

fn handle_language_prompt(app: &mut App, key_event: KeyEvent) -> bool {
    match key_event.code {
        KeyCode::Up | KeyCode::Left => app.move_language_selection(false),
        KeyCode::Down | KeyCode::Right | KeyCode::Tab => app.move_language_selection(true),
        KeyCode::Enter => app.confirm_language_selection(),
        KeyCode::Esc if app.localizer.active().is_some() => app.ui.mode = Mode::View,
        _ => {
            if key_matches(&key_event, &app.config.key_bindings.quit) {
                return true;
            }
        }
    }
    false
}

fn handle_view(app: &mut App, key_event: KeyEvent) -> bool {
    let kb = app.config.key_bindings.clone();

    if key_matches(&key_event, &kb.quit) {
        return true;
    }
    // Shifted language key brings back the chooser
    if let KeyCode::Char(c) = key_event.code {
        if c.is_uppercase() && key_matches(&key_event, &kb.toggle_language) {
            app.open_language_prompt();
            return false;
        }
    }

    if key_matches(&key_event, &kb.new) {
        app.dispatch(Action::OpenNew);
    } else if key_matches(&key_event, &kb.edit) || key_event.code == KeyCode::Enter {
        app.edit_selected();
    } else if key_matches(&key_event, &kb.delete) {
        app.delete_selected();
    } else if key_matches(&key_event, &kb.toggle_language) {
        app.toggle_language();
    } else if key_matches(&key_event, &kb.help) {
        app.enter_help_mode();
    } else if key_matches(&key_event, &kb.list_up) || key_event.code == KeyCode::Up {
        app.move_selection_up();
    } else if key_matches(&key_event, &kb.list_down) || key_event.code == KeyCode::Down {
        app.move_selection_down();
    }
    false
}

fn handle_form(app: &mut App, key_event: KeyEvent) -> bool {
    if key_matches(&key_event, &app.config.key_bindings.save) {
        app.submit_form();
        return false;
    }

    let ctrl = has_primary_modifier(key_event.modifiers);
    let multi_line = app.is_multi_line_field_active();
    match key_event.code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Tab => app.navigate_form_field(true),
        KeyCode::BackTab => app.navigate_form_field(false),
        KeyCode::Enter if !multi_line => app.navigate_form_field(true),
        KeyCode::Up if !multi_line => app.navigate_form_field(false),
        KeyCode::Down if !multi_line => app.navigate_form_field(true),
        code => {
            let Some(editor) = app.get_current_form_editor() else {
                return false;
            };
            match code {
                KeyCode::Char('z') if ctrl => {
                    editor.undo();
                }
                KeyCode::Char(c) if !ctrl => editor.insert_char(c),
                KeyCode::Enter => editor.insert_newline(),
                KeyCode::Backspace => editor.delete_char(),
                KeyCode::Delete => editor.delete_forward(),
                KeyCode::Left => editor.move_cursor_left(),
                KeyCode::Right => editor.move_cursor_right(),
                KeyCode::Up => editor.move_cursor_up(),
                KeyCode::Down => editor.move_cursor_down(),
                KeyCode::Home => editor.move_cursor_home(),
                KeyCode::End => editor.move_cursor_end(),
                _ => {}
            }
        }
    }
    false
}
