use crate::app::{App, Focus};
use crate::feed::Story;
use crate::util::{format_age, strip_control_chars, truncate_to_width};
use chrono::Utc;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the story list panel
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Stories;
    let state = app.feed_state();
    // Borders take two columns
    let width = area.width.saturating_sub(2) as usize;
    let now = Utc::now().timestamp();

    let items: Vec<ListItem> = if state.is_empty() {
        let hint = if state.is_loading() { "" } else { "No stories" };
        vec![ListItem::new(Span::styled(hint, Style::default().fg(Color::DarkGray)))]
    } else {
        state
            .items
            .iter()
            .map(|story| story_item(story, width, now))
            .collect()
    };

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let title = if state.is_empty() {
        "Stories".to_string()
    } else {
        format!("Stories ({})", state.len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut list_state = ListState::default();
    if !state.is_empty() {
        list_state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut list_state);
}

/// Two lines per story: title, then link and metadata.
fn story_item(story: &Story, width: usize, now: i64) -> ListItem<'static> {
    let title = strip_control_chars(&story.title);
    let title_line = Line::from(Span::styled(
        truncate_to_width(&title, width).into_owned(),
        Style::default().add_modifier(Modifier::BOLD),
    ));

    let url = strip_control_chars(&story.url);
    let meta = meta_text(story, now);

    let meta_width = unicode_width::UnicodeWidthStr::width(meta.as_str());
    let url_width = width.saturating_sub(meta_width + 2);

    let mut spans = Vec::with_capacity(3);
    if !url.is_empty() && url_width > 3 {
        spans.push(Span::styled(
            truncate_to_width(&url, url_width).into_owned(),
            Style::default().fg(Color::Blue),
        ));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(
        truncate_to_width(&meta, width).into_owned(),
        Style::default().fg(Color::Gray),
    ));

    ListItem::new(vec![title_line, Line::from(spans)])
}

fn meta_text(story: &Story, now: i64) -> String {
    let mut meta = format!(
        "by {} | {} comments | {} points",
        strip_control_chars(&story.author),
        story.comment_count,
        story.points
    );
    let age = format_age(story.created_at, now);
    if !age.is_empty() {
        meta.push_str(" | ");
        meta.push_str(&age);
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn story(value: serde_json::Value) -> Story {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_meta_text() {
        let s = story(serde_json::json!({
            "objectID": 7,
            "title": "t",
            "author": "dang",
            "num_comments": 12,
            "points": 100,
            "created_at_i": NOW - 7200,
        }));
        assert_eq!(meta_text(&s, NOW), "by dang | 12 comments | 100 points | 2h");
    }

    #[test]
    fn test_meta_text_without_timestamp_or_counts() {
        let s = story(serde_json::json!({
            "objectID": 8,
            "author": "evil\u{1b}[2Jname",
            "num_comments": null,
        }));
        assert_eq!(meta_text(&s, NOW), "by evilname | 0 comments | 0 points");
    }

    #[test]
    fn test_story_item_is_two_lines() {
        let s = story(serde_json::json!({
            "objectID": 7,
            "title": "A very long title that will not fit in a narrow panel at all",
            "url": "https://example.com/some/long/path",
        }));
        assert_eq!(story_item(&s, 20, NOW).height(), 2);
    }
}
