use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use crate::app::Pane;
use crate::ui::Theme;

/// Status bar showing keyboard shortcuts on the left and page info on the right
pub struct StatusBar<'a> {
    hints: Vec<(&'a str, &'a str)>,
    right_text: Option<String>,
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self {
            hints: Vec::new(),
            right_text: None,
        }
    }

    /// Add keyboard hints as (key, description) pairs
    pub fn hints<I>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.hints = hints.into_iter().collect();
        self
    }

    pub fn right<S: Into<String>>(mut self, text: S) -> Self {
        self.right_text = Some(text.into());
        self
    }
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Theme::status_bar());

        let mut spans = Vec::new();
        for (i, (key, desc)) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("  ", Theme::status_bar()));
            }
            spans.push(Span::styled(format!("[{}]", key), Theme::status_bar_key()));
            spans.push(Span::styled(format!(" {}", desc), Theme::status_bar()));
        }

        let line = Line::from(spans);
        let line_width = line.width() as u16;
        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));

        // Right text only when it does not collide with the hints
        if let Some(right) = self.right_text {
            let right_width = right.width() as u16;
            let right_x = area.x + area.width.saturating_sub(right_width + 1);
            if right_x > area.x + line_width + 2 {
                let right_span = Span::styled(right, Theme::status_bar());
                buf.set_span(right_x, area.y, &right_span, right_width);
            }
        }
    }
}

/// Hints for the pane with focus. A failed listing leads with its retry key.
pub fn pane_hints(pane: Pane, listing_failed: bool) -> Vec<(&'static str, &'static str)> {
    match pane {
        Pane::Databases => vec![
            ("↑↓", "Move"),
            ("Enter", "Open"),
            ("Tab", "Next pane"),
            ("?", "Help"),
            ("q", "Quit"),
        ],
        Pane::Search => vec![
            ("Enter", "Search now"),
            ("^U", "Clear"),
            ("Esc", "Keys"),
        ],
        Pane::Keys if listing_failed => vec![
            ("r", "Retry"),
            ("n/p", "Page"),
            ("/", "Search"),
            ("?", "Help"),
        ],
        Pane::Keys => vec![
            ("Enter", "View"),
            ("a", "Add"),
            ("d", "Delete"),
            ("n/p", "Page"),
            ("/", "Search"),
            ("?", "Help"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_listing_hints_lead_with_retry() {
        let hints = pane_hints(Pane::Keys, true);
        assert_eq!(hints.first(), Some(&("r", "Retry")));

        assert!(pane_hints(Pane::Keys, false).iter().all(|(key, _)| *key != "r"));
        // Elsewhere `r` means something else
        assert!(pane_hints(Pane::Databases, true).iter().all(|(key, _)| *key != "r"));
    }
}
