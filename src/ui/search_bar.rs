use crate::app::{App, Focus};
use crate::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Render the search input box.
///
/// Shows the in-progress edit; the terminal cursor sits at its end while
/// the box has focus. Long input is clipped from the left so the end stays
/// visible.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Search;
    let inner_width = area.width.saturating_sub(2) as usize;

    let input = app.search_input.as_str();
    let visible = visible_tail(input, inner_width.saturating_sub(1));

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    // Mark an uncommitted edit in the title
    let title = if app.search_input != app.search_term {
        "Search: (Enter to apply)"
    } else {
        "Search:"
    };

    let paragraph = Paragraph::new(truncate_to_width(visible, inner_width).into_owned()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    f.render_widget(paragraph, area);

    if is_focused {
        let cursor_x = area.x + 1 + UnicodeWidthStr::width(visible) as u16;
        f.set_cursor_position((cursor_x.min(area.x + area.width - 2), area.y + 1));
    }
}

/// Longest suffix of `s` that fits in `width` columns.
fn visible_tail(s: &str, width: usize) -> &str {
    if UnicodeWidthStr::width(s) <= width {
        return s;
    }
    let mut used = 0;
    let mut start = s.len();
    for (idx, c) in s.char_indices().rev() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    &s[start..]
}
