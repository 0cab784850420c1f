use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

use crate::ui::{Theme, text};

/// A bordered list with a title, a focus-aware highlight and a placeholder
/// shown when there are no rows
pub struct ListSelector<'a> {
    items: Vec<ListItem<'a>>,
    title: Line<'a>,
    focused: bool,
    empty_text: &'a str,
    highlight_symbol: &'a str,
}

impl<'a> ListSelector<'a> {
    pub fn new(title: impl Into<Line<'a>>) -> Self {
        Self {
            items: Vec::new(),
            title: title.into(),
            focused: true,
            empty_text: "Nothing here",
            highlight_symbol: "▶ ",
        }
    }

    /// Add items from an iterator of (display_text, is_current) tuples.
    /// Text is drawn literally.
    pub fn items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: AsRef<str>,
    {
        self.items = items
            .into_iter()
            .map(|(text, is_current)| {
                let shown = text::literal(text.as_ref()).into_owned();
                let line = if is_current {
                    Line::from(vec![
                        Span::styled(shown, Theme::list_item_current()),
                        Span::styled(" ●", Theme::list_item_current()),
                    ])
                } else {
                    Line::from(Span::styled(shown, Theme::list_item()))
                };
                ListItem::new(line)
            })
            .collect();
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Text shown instead of an empty list
    pub fn empty_text(mut self, text: &'a str) -> Self {
        self.empty_text = text;
        self
    }
}

impl StatefulWidget for ListSelector<'_> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::pane_border(self.focused))
            .title(self.title.style(Theme::title()));

        if self.items.is_empty() {
            Paragraph::new(Span::styled(self.empty_text, Theme::text_dim()))
                .block(block)
                .render(area, buf);
            return;
        }

        let highlight = if self.focused {
            Theme::list_item_selected()
        } else {
            Theme::list_item_selected_unfocused()
        };

        let list = List::new(self.items)
            .block(block)
            .highlight_style(highlight)
            .highlight_symbol(self.highlight_symbol);

        StatefulWidget::render(list, area, buf, state);
    }
}

/// Extension trait to render ListSelector more easily
pub trait ListSelectorExt {
    fn render_list_selector(&mut self, area: Rect, selector: ListSelector, state: &mut ListState);
}

impl ListSelectorExt for ratatui::Frame<'_> {
    fn render_list_selector(&mut self, area: Rect, selector: ListSelector, state: &mut ListState) {
        self.render_stateful_widget(selector, area, state);
    }
}
