//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use quizdeck_core::{CardTarget, Route};

use crate::app::{can_add_password_char, can_add_username_char, App, AppState, GridMove, LoginFocus};

/// Lines scrolled by PageUp/PageDown in the detail view
const PAGE_SCROLL_SIZE: usize = 10;

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // The login form takes every key, including q and ?
    if app.route == Route::Login {
        handle_login_input(app, key);
        return Ok(false);
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        _ => {}
    }

    match app.route {
        Route::Home => handle_list_input(app, key),
        Route::QuizDetail(_) => handle_detail_input(app, key),
        Route::EditQuiz(_) | Route::AddQuiz | Route::Upload => {
            if key.code == KeyCode::Esc {
                app.navigate(Route::Home);
            }
        }
        Route::Login => {}
    }

    Ok(false)
}

fn handle_list_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(GridMove::Up),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(GridMove::Down),
        KeyCode::Left | KeyCode::Char('h') => app.move_selection(GridMove::Left),
        KeyCode::Right | KeyCode::Char('l') => app.move_selection(GridMove::Right),
        KeyCode::Home => app.move_selection(GridMove::First),
        KeyCode::End => app.move_selection(GridMove::Last),
        KeyCode::Tab => {
            app.card_target = app.card_target.next();
        }
        KeyCode::BackTab => {
            app.card_target = app.card_target.prev();
        }
        KeyCode::Enter => {
            let target = app.card_target;
            app.activate(target);
        }
        KeyCode::Char('o') => app.activate(CardTarget::Body),
        KeyCode::Char('d') => app.activate(CardTarget::Delete),
        KeyCode::Char('e') => app.activate(CardTarget::Edit),
        KeyCode::Char('a') => app.navigate(Route::AddQuiz),
        KeyCode::Char('U') => app.navigate(Route::Upload),
        KeyCode::Char('r') => app.refresh_quizzes(),
        KeyCode::Char('L') => {
            if app.session.is_authenticated() {
                app.logout();
            }
        }
        KeyCode::Char('i') => app.navigate(Route::Login),
        KeyCode::Esc => {
            app.card_target = CardTarget::Body;
        }
        _ => {}
    }
}

fn handle_detail_input(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Backspace) {
        app.navigate(Route::Home);
        return;
    }

    let detail = &mut app.detail;
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            detail.scroll = detail.scroll.saturating_add(1);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            detail.scroll = detail.scroll.saturating_sub(1);
        }
        KeyCode::PageDown => {
            detail.scroll = detail.scroll.saturating_add(PAGE_SCROLL_SIZE);
        }
        KeyCode::PageUp => {
            detail.scroll = detail.scroll.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::Home => {
            detail.scroll = 0;
        }
        _ => {}
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) {
    if app.login_pending {
        return;
    }

    match key.code {
        KeyCode::Esc => {
            app.navigate(Route::Home);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = app.login_focus.prev();
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password | LoginFocus::Button => {
                app.attempt_login();
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            // Ignore character input on button
            LoginFocus::Button => {}
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use quizdeck_core::auth::MemoryStorage;

    use crate::test_support::{build_app, mounted, settle, FakeBackend};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, key(code)).expect("input handling failed")
    }

    #[tokio::test]
    async fn test_enter_activates_focused_control() {
        let (mut app, backend, _) = mounted(&["math-101", "bio-201"]).await;

        // Body -> Delete
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.card_target, CardTarget::Delete);
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;

        assert_eq!(app.route, Route::Home);
        assert!(backend.calls().contains(&"delete math-101".to_string()));
    }

    #[tokio::test]
    async fn test_shortcut_keys_navigate() {
        let (mut app, _, _) = mounted(&["math-101"]).await;

        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.route, Route::EditQuiz("math-101".to_string()));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.route, Route::Home);
        settle(&mut app).await;

        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.route, Route::AddQuiz);
        press(&mut app, KeyCode::Esc);
        settle(&mut app).await;

        press(&mut app, KeyCode::Char('U'));
        assert_eq!(app.route, Route::Upload);
    }

    #[tokio::test]
    async fn test_logout_key() {
        let (mut app, _, _) = mounted(&["math-101"]).await;

        press(&mut app, KeyCode::Char('L'));
        assert_eq!(app.route, Route::Login);
        assert!(!app.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_form_typing() {
        let mut app = build_app(MemoryStorage::new(), FakeBackend::with_quizzes(&[]));
        app.login_username.clear();
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.route, Route::Login);
        assert_eq!(app.login_focus, LoginFocus::Username);

        // q is text here, not quit
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.login_username, "q");
        assert_eq!(app.state, AppState::Normal);

        press(&mut app, KeyCode::Backspace);
        assert!(app.login_username.is_empty());

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.login_password, "x");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.route, Route::Home);
    }

    #[tokio::test]
    async fn test_quit_confirmation() {
        let (mut app, _, _) = mounted(&[]).await;

        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!press(&mut app, KeyCode::Char('n')));
        assert_eq!(app.state, AppState::Normal);

        press(&mut app, KeyCode::Char('q'));
        assert!(press(&mut app, KeyCode::Char('y')));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test]
    async fn test_help_overlay_swallows_keys() {
        let (mut app, _, _) = mounted(&["math-101"]).await;

        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.state, AppState::ShowingHelp);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.page.len(), 1);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_detail_scroll() {
        let (mut app, _, _) = mounted(&["math-101"]).await;
        press(&mut app, KeyCode::Char('o'));
        settle(&mut app).await;

        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.detail.scroll, 0);
        press(&mut app, KeyCode::PageDown);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.detail.scroll, PAGE_SCROLL_SIZE + 1);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.route, Route::Home);
    }
}
