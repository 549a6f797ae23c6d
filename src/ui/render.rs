//! Render functions for the TUI.
//!
//! One screen, top to bottom: headline, search box, fetch notice, story
//! list, status bar.

use crate::app::App;
use crate::feed::FeedStatus;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::loop_runner::SPINNER_FRAMES;
use super::{search_bar, status, stories};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 10;

const HEADLINE: &str = "My Hacker Stories";
const FAILURE_NOTICE: &str = "Something went wrong...";
const LOADING_NOTICE: &str = "Loading...";

const SPINNER: [&str; SPINNER_FRAMES] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main render function.
///
/// Handles terminal size validation before laying out the screen.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    // EDGE-001: Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_headline(f, chunks[0]);
    search_bar::render(f, app, chunks[1]);
    render_notice(f, app, chunks[2]);
    stories::render(f, app, chunks[3]);
    status::render(f, app, chunks[4]);
}

fn render_headline(f: &mut Frame, area: Rect) {
    let headline = Paragraph::new(HEADLINE).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    f.render_widget(headline, area);
}

/// Failure notice, or the spinner while a fetch is in flight.
fn render_notice(f: &mut Frame, app: &App, area: Rect) {
    let notice = match app.feed_state().status {
        FeedStatus::Failure => {
            Span::styled(FAILURE_NOTICE, Style::default().fg(Color::Red))
        }
        FeedStatus::Loading => {
            let frame = SPINNER[app.spinner_frame % SPINNER_FRAMES];
            Span::styled(
                format!("{} {}", frame, LOADING_NOTICE),
                Style::default().fg(Color::Yellow),
            )
        }
        FeedStatus::Idle | FeedStatus::Success => return,
    };

    f.render_widget(Paragraph::new(Line::from(notice)), area);
}
