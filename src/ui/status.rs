use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // EDGE-001: Guard against zero-width/height areas
    if area.width < 1 || area.height < 1 {
        return;
    }

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let paragraph = Paragraph::new(status_text(app)).style(style);
    f.render_widget(paragraph, area);
}

/// Transient status message if one is set, otherwise key hints for the
/// focused widget.
fn status_text(app: &App) -> Cow<'_, str> {
    if let Some((msg, _)) = &app.status_message {
        return Cow::Borrowed(msg.as_ref());
    }

    match app.focus {
        Focus::Search if app.live_search => {
            Cow::Borrowed("Type to search | ESC/TAB stories | Ctrl+C quit")
        }
        Focus::Search => {
            Cow::Borrowed("Type to edit | ENTER search | ESC cancel | TAB stories | Ctrl+C quit")
        }
        Focus::Stories => {
            Cow::Borrowed("[j/k]move [d]ismiss [o]pen [r]efresh [/]search [q]uit")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::Unavailable;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_status_message_takes_precedence() {
        let (mut app, _rx) = App::mount(Arc::new(Unavailable), &Config::default()).await;
        assert!(status_text(&app).contains("ENTER search"));

        app.focus = Focus::Stories;
        assert!(status_text(&app).contains("[d]ismiss"));

        app.set_status("Failed to open browser");
        assert_eq!(status_text(&app), "Failed to open browser");
    }
}
