use chrono::DateTime;
use std::borrow::Cow;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

/// Fit `s` into `max_width` terminal columns, ending in "..." when cut.
///
/// Width is Unicode-aware (CJK and emoji count as two columns). Widths of 3
/// or less leave no room for the ellipsis, so the text is clipped bare.
/// Returns `Cow::Borrowed` when nothing had to be cut.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if UnicodeWidthStr::width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let budget = if max_width > ELLIPSIS.len() {
        max_width - ELLIPSIS.len()
    } else {
        max_width
    };

    let mut used = 0;
    let mut cut = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        cut = idx + c.len_utf8();
    }

    if max_width > ELLIPSIS.len() {
        Cow::Owned(format!("{}{}", &s[..cut], ELLIPSIS))
    } else {
        Cow::Owned(s[..cut].to_string())
    }
}

/// SEC-001: Drop terminal control characters from remote text.
///
/// Story titles and authors come from a third-party index; an embedded
/// escape sequence must not reach the terminal. ESC starts a sequence that is
/// skipped through its final byte (CSI) or terminator (OSC: BEL or ESC \).
/// Other C0 controls and DEL are removed; tab becomes a space.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(|c| c.is_control()) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\x1b' => match chars.peek() {
                Some('[') => {
                    chars.next();
                    // CSI ends at the first byte in 0x40..=0x7e
                    for c in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&c) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\x07' {
                            break;
                        }
                        if c == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            '\t' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    Cow::Owned(out)
}

/// Compact age of a unix timestamp relative to `now`: "5m", "3h", "2d", or
/// a date ("Mar 04") past a week. `None` renders as an empty string.
pub fn format_age(timestamp: Option<i64>, now: i64) -> String {
    let Some(ts) = timestamp else {
        return String::new();
    };

    let diff = now - ts;
    if diff < 0 {
        return "now".to_string();
    }
    if diff < 3600 {
        return format!("{}m", diff / 60);
    }
    if diff < 86400 {
        return format!("{}h", diff / 3600);
    }
    if diff < 604800 {
        return format!("{}d", diff / 86400);
    }

    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%b %d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_fits_borrows() {
        assert!(matches!(truncate_to_width("Short", 10), Cow::Borrowed("Short")));
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // 4 CJK chars = 8 columns; budget 7 leaves 4 columns before "..."
        assert_eq!(truncate_to_width("你好世界", 7), "你好...");
    }

    #[test]
    fn test_truncate_narrow_widths() {
        assert_eq!(truncate_to_width("Test!", 0), "");
        assert_eq!(truncate_to_width("Test!", 2), "Te");
        assert_eq!(truncate_to_width("Test!", 3), "Tes");
    }

    #[test]
    fn test_strip_clean_text_borrows() {
        assert!(matches!(strip_control_chars("plain title"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_csi_sequence() {
        assert_eq!(strip_control_chars("a\x1b[31mred\x1b[0m b"), "ared b");
    }

    #[test]
    fn test_strip_osc_sequence() {
        assert_eq!(strip_control_chars("x\x1b]0;title\x07y"), "xy");
        assert_eq!(strip_control_chars("x\x1b]8;;http://e\x1b\\y"), "xy");
    }

    #[test]
    fn test_strip_controls_and_tabs() {
        assert_eq!(strip_control_chars("a\x00b\tc\x7f\nd"), "ab cd");
    }

    #[test]
    fn test_format_age() {
        let now = 1_700_000_000;
        assert_eq!(format_age(None, now), "");
        assert_eq!(format_age(Some(now + 10), now), "now");
        assert_eq!(format_age(Some(now - 300), now), "5m");
        assert_eq!(format_age(Some(now - 7200), now), "2h");
        assert_eq!(format_age(Some(now - 3 * 86400), now), "3d");
        // 2023-11-14 22:13:20 UTC minus 30 days
        assert_eq!(format_age(Some(now - 30 * 86400), now), "Oct 15");
    }
}
