//! Rendering of the view / edit / confirm-delete overlays

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout as RatatuiLayout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{Dialog, EditField, EditForm};
use crate::ui::{Layout, Theme, text};
use kvscope_types::KeyValue;

pub struct DialogView;

impl DialogView {
    pub fn render(frame: &mut Frame, dialog: &Dialog) {
        match dialog {
            Dialog::Closed => {}
            Dialog::Viewing { entry, .. } => Self::render_view(frame, entry),
            Dialog::Editing { form, .. } => Self::render_edit(frame, form),
            Dialog::ConfirmingDelete {
                pending, deleting, ..
            } => {
                let key = pending.as_ref().map(|p| p.key.as_str()).unwrap_or_default();
                Self::render_confirm(frame, key, deleting.is_some());
            }
        }
    }

    fn popup_block(title: &str) -> Block<'_> {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_focused())
            .title(Span::styled(title, Theme::title()))
    }

    /// Split a popup into body and a one-line button row
    fn body_and_buttons(area: Rect) -> (Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        (chunks[0], chunks[1])
    }

    fn render_view(frame: &mut Frame, entry: &KeyValue) {
        let area = Layout::centered_popup(frame.area(), 90, 24);
        frame.render_widget(Clear, area);

        let block = Self::popup_block(" View ");
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let (body, buttons) = Self::body_and_buttons(inner);

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Key   ", Theme::text_dim()),
                Span::styled(text::literal(&entry.key).into_owned(), Theme::text_highlight()),
            ]),
            Line::from(Span::styled("Value", Theme::text_dim())),
        ];
        lines.extend(
            text::literal_lines(&entry.value)
                .into_iter()
                .map(|line| Line::from(Span::styled(line, Theme::text()))),
        );

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" e Edit ", Theme::button()),
                Span::raw(" "),
                Span::styled(" Esc Close ", Theme::button()),
            ])),
            buttons,
        );
    }

    fn render_edit(frame: &mut Frame, form: &EditForm) {
        let title = if form.key_editable() {
            " Add key "
        } else {
            " Edit value "
        };
        let area = Layout::centered_popup(frame.area(), 90, 24);
        frame.render_widget(Clear, area);

        let block = Self::popup_block(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Key field
                Constraint::Min(3),    // Value field
                Constraint::Length(1), // Buttons
            ])
            .split(inner);

        let key_active = form.field == EditField::Key && form.key_editable();
        let key_style = if !form.key_editable() {
            Theme::input_readonly()
        } else if key_active {
            Theme::input_active()
        } else {
            Theme::border()
        };
        let key_line = Self::field_line(&form.draft_key, key_active);
        frame.render_widget(
            Paragraph::new(key_line).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(key_style)
                    .title(" Key "),
            ),
            chunks[0],
        );

        let value_active = form.field == EditField::Value;
        let mut value_lines: Vec<Line> = text::literal_lines(&form.draft_value)
            .into_iter()
            .map(|line| Line::from(Span::styled(line, Theme::input())))
            .collect();
        if value_active {
            if let Some(last) = value_lines.last_mut() {
                last.push_span(Span::styled("█", Theme::input_active()));
            }
        }
        frame.render_widget(
            Paragraph::new(value_lines)
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(if value_active {
                            Theme::input_active()
                        } else {
                            Theme::border()
                        })
                        .title(" Value "),
                ),
            chunks[1],
        );

        let save = if form.is_busy() {
            Span::styled(" Saving… ", Theme::button_busy())
        } else {
            Span::styled(" Enter Save ", Theme::button())
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                save,
                Span::raw(" "),
                Span::styled(" Tab Field ", Theme::button()),
                Span::raw(" "),
                Span::styled(" Esc Cancel ", Theme::button()),
            ])),
            chunks[2],
        );
    }

    fn field_line(value: &str, active: bool) -> Line<'static> {
        let mut spans = vec![Span::styled(text::literal(value).into_owned(), Theme::input())];
        if active {
            spans.push(Span::styled("█", Theme::input_active()));
        }
        Line::from(spans)
    }

    fn render_confirm(frame: &mut Frame, key: &str, busy: bool) {
        let area = Layout::centered_popup(frame.area(), 60, 7);
        frame.render_widget(Clear, area);

        let block = Self::popup_block(" Delete key ");
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let (body, buttons) = Self::body_and_buttons(inner);

        let shown = text::truncate(&text::literal(key), body.width.saturating_sub(12) as usize)
            .into_owned();
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(vec![
                    Span::styled("Delete ", Theme::text()),
                    Span::styled(shown, Theme::text_highlight()),
                    Span::styled("?", Theme::text()),
                ]),
                Line::from(Span::styled("This cannot be undone.", Theme::text_dim())),
            ]),
            body,
        );

        let accept = if busy {
            Span::styled(" Deleting… ", Theme::button_busy())
        } else {
            Span::styled(" y Delete ", Theme::button_danger())
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                accept,
                Span::raw(" "),
                Span::styled(" n Cancel ", Theme::button()),
            ])),
            buttons,
        );
    }
}
