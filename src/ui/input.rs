//! Input handling for the TUI.
//!
//! Key presses are routed by focus: the search box takes text, the story
//! list takes navigation and item commands.

use crate::app::{App, Focus};
use crate::util::{validate_url_for_open, MAX_SEARCH_TERM_LENGTH};
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Main input dispatch function.
pub(super) async fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match app.focus {
        Focus::Search => handle_search_input(app, code).await,
        Focus::Stories => handle_stories_input(app, code),
    }
}

/// Handle input while the search box has focus.
///
/// Enter commits the edited term. Esc drops the edit and restores the
/// committed term. With `live_search`, every edit commits immediately.
async fn handle_search_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Enter => {
            let term = app.search_input.clone();
            app.on_search_term_changed(term).await;
            app.focus = Focus::Stories;
        }
        KeyCode::Esc => {
            app.search_input.clone_from(&app.search_term);
            app.focus = Focus::Stories;
        }
        KeyCode::Tab | KeyCode::Down => {
            app.focus = Focus::Stories;
        }
        KeyCode::Backspace => {
            if app.search_input.pop().is_some() {
                commit_if_live(app).await;
            }
        }
        KeyCode::Char(c) => {
            if app.search_input.len() >= MAX_SEARCH_TERM_LENGTH {
                app.set_status(format!(
                    "Search term at max length ({} chars)",
                    MAX_SEARCH_TERM_LENGTH
                ));
                return Action::Continue;
            }
            app.search_input.push(c);
            commit_if_live(app).await;
        }
        _ => {}
    }
    Action::Continue
}

async fn commit_if_live(app: &mut App) {
    if app.live_search {
        let term = app.search_input.clone();
        app.on_search_term_changed(term).await;
    }
}

/// Handle input while the story list has focus.
fn handle_stories_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(id) = app.selected_story().map(|s| s.id.clone()) {
                app.on_item_dismissed(id);
            }
        }
        KeyCode::Char('o') | KeyCode::Enter => open_selected(app),
        KeyCode::Char('r') => app.on_refresh(),
        KeyCode::Char('/') | KeyCode::Tab => app.focus = Focus::Search,
        _ => {}
    }
    Action::Continue
}

fn open_selected(app: &mut App) {
    let Some(url) = app.selected_story().map(|s| s.url.clone()) else {
        return;
    };

    // SEC: Validate URL before open::that() to prevent command injection
    match validate_url_for_open(&url) {
        Ok(valid) => {
            if let Err(e) = open::that(valid.as_str()) {
                app.set_status(format!("Failed to open browser: {}", e));
            }
        }
        Err(e) => app.set_status(e.to_string()),
    }
}
