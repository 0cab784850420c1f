//! Drawing text that came from the server
//!
//! Keys, values and error bodies are arbitrary strings. Control characters
//! (including ESC, which would start a terminal escape sequence) are shown
//! as escapes instead of being written to the terminal.

use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Escape control characters so `text` is displayed exactly as stored
pub fn literal(text: &str) -> Cow<'_, str> {
    if !text.chars().any(char::is_control) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{1b}' => out.push_str("\\e"),
            c if c.is_control() => out.extend(c.escape_unicode()),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Split a multi-line value into display lines, each made literal.
/// Line breaks are kept as breaks; a lone `\r` is escaped.
pub fn literal_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| literal(line.strip_suffix('\r').unwrap_or(line)).into_owned())
        .collect()
}

/// Cut `text` to at most `width` terminal columns, ending with `…` when cut
pub fn truncate(text: &str, width: usize) -> Cow<'_, str> {
    if text.width() <= width {
        return Cow::Borrowed(text);
    }
    if width == 0 {
        return Cow::Borrowed("");
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    Cow::Owned(out)
}
