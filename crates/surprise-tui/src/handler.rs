use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use surprise_core::{Action, Stage, WishTone};

use crate::app::App;
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(w, h) => app.resize(w, h),
        AppEvent::Tick => app.tick().await,
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work on any screen
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }
    if key.code == KeyCode::Char('q') {
        app.should_quit = true;
        return;
    }

    match app.stage() {
        Stage::Welcome => handle_welcome(app, key),
        Stage::Reasons => handle_reasons(app, key),
        stage => {
            let action = stage_action(stage, key.code).unwrap_or(Action::StrayClick);
            app.dispatch(action);
        }
    }
}

fn handle_welcome(app: &mut App, key: KeyEvent) {
    match key.code {
        // Moving focus is not a click
        KeyCode::Tab | KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') => {
            app.focus_next_decoy()
        }
        KeyCode::BackTab | KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => {
            app.focus_prev_decoy()
        }
        KeyCode::Enter | KeyCode::Char(' ') => app.press_focused_decoy(),
        _ => app.dispatch(Action::StrayClick),
    }
}

fn handle_reasons(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_reasons_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_reasons_up(),
        code => {
            let action = stage_action(Stage::Reasons, code).unwrap_or(Action::StrayClick);
            app.dispatch(action);
        }
    }
}

/// The control a key stands for on a screen, if any.
pub fn stage_action(stage: Stage, code: KeyCode) -> Option<Action> {
    let action = match (stage, code) {
        (Stage::Roast, KeyCode::Char('n') | KeyCode::Enter) => Action::Next,
        (Stage::Fact, KeyCode::Char('m') | KeyCode::Enter) => Action::ShowMore,
        (Stage::Reasons, KeyCode::Char('c') | KeyCode::Enter) => Action::Continue,
        (Stage::Shayari, KeyCode::Char('p') | KeyCode::Enter) => Action::LetsParty,
        (Stage::Celebration, KeyCode::Char('1') | KeyCode::Char('h')) => {
            Action::ChooseTone(WishTone::Heartfelt)
        }
        (Stage::Celebration, KeyCode::Char('2') | KeyCode::Char('f')) => {
            Action::ChooseTone(WishTone::Funny)
        }
        (Stage::Celebration, KeyCode::Char('3') | KeyCode::Char('r')) => {
            Action::ChooseTone(WishTone::Roast)
        }
        (Stage::Celebration, KeyCode::Char('o') | KeyCode::Enter) => Action::OneMoreThing,
        (Stage::AiWish, KeyCode::Char('b') | KeyCode::Esc | KeyCode::Backspace) => Action::Back,
        (Stage::AiWish, KeyCode::Char('g')) => Action::Regenerate,
        (Stage::Impact, KeyCode::Char('r') | KeyCode::Enter) => Action::Reset,
        _ => return None,
    };
    Some(action)
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
        let action = app.action_at(mouse.column, mouse.row);
        app.dispatch(action);
    }
}
