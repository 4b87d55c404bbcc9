use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode};
use crate::tui::AppEvent;
use crate::widgets::MessageLog;

const PAGE: u16 = 10;
const WHEEL_STEP: u16 = 3;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Enter | KeyCode::Tab => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('j') | KeyCode::Down => app.log.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.log.scroll_up(1),
        KeyCode::PageDown => app.log.scroll_down(PAGE),
        KeyCode::PageUp => app.log.scroll_up(PAGE),
        KeyCode::Char('g') | KeyCode::Home => app.log.scroll_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.log.scroll_to_bottom(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Tab => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.submit(),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Delete => app.input.delete(),
        KeyCode::Left => app.input.move_left(),
        KeyCode::Right => app.input.move_right(),
        KeyCode::Home => app.input.move_home(),
        KeyCode::End => app.input.move_end(),
        KeyCode::Up => app.log.scroll_up(1),
        KeyCode::Down => app.log.scroll_down(1),
        KeyCode::PageUp => app.log.scroll_up(PAGE),
        KeyCode::PageDown => app.log.scroll_down(PAGE),
        KeyCode::Char(c) => app.input.insert_char(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.log.scroll_down(WHEEL_STEP),
        MouseEventKind::ScrollUp => app.log.scroll_up(WHEEL_STEP),
        _ => {}
    }
}
