use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use kvscope_browse::ListingState;

use crate::{
    app::{AppState, DatabaseList, Pane},
    ui::{
        Layout, Theme,
        components::{
            DialogView, HelpOverlay, ListSelector, ListSelectorExt, NoticePopup, StatusBar,
            pane_hints,
        },
        text,
    },
};

/// The single screen: databases on the left, the key listing on the right
pub struct BrowserScreen;

impl BrowserScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState) {
        let areas = Layout::browser(frame.area());

        Self::render_header(frame, areas.header, state);
        Self::render_databases(frame, areas.sidebar, state);
        Self::render_search(frame, areas.search, state);
        Self::render_keys(frame, areas.keys, state);
        Self::render_pager(frame, areas.pager, state);
        Self::render_status_bar(frame, areas.status, state);

        // Overlays, topmost last
        DialogView::render(frame, state.dialogs.dialog());
        if state.ui_state.help_visible {
            HelpOverlay::render(frame);
        }
        if let Some(notice) = &state.ui_state.notice {
            NoticePopup::render(frame, notice);
        }
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
        let mut spans = vec![
            Span::styled("kvscope", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(text::literal(&state.server).into_owned(), Theme::text()),
        ];
        if let Some(db) = state.navigator.session().active_database() {
            spans.push(Span::styled(" │ ", Theme::text_dim()));
            spans.push(Span::styled(
                text::literal(db).into_owned(),
                Theme::text_highlight(),
            ));
        }

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );
        frame.render_widget(header, area);
    }

    fn render_databases(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let focused = state.ui_state.focus == Pane::Databases;

        let names = match &state.databases {
            DatabaseList::Loading => {
                Self::render_message(frame, area, " Databases ", "Loading…", focused, false);
                return;
            }
            DatabaseList::Failed(message) => {
                let message = format!("{}\n\npress r to retry", message);
                Self::render_message(frame, area, " Databases ", &message, focused, true);
                return;
            }
            DatabaseList::Ready(names) => names,
        };

        let active = state.navigator.session().active_database();
        let items = names.iter().map(|name| (name.as_str(), Some(name.as_str()) == active));
        let selector = ListSelector::new(" Databases ")
            .items(items)
            .focused(focused)
            .empty_text("No databases");

        frame.render_list_selector(area, selector, &mut state.ui_state.database_list_state);
    }

    fn render_search(frame: &mut Frame, area: Rect, state: &AppState) {
        let focused = state.ui_state.focus == Pane::Search;
        let input = &state.ui_state.search_input;

        let mut spans = vec![Span::styled(text::literal(input).into_owned(), Theme::input())];
        if focused {
            spans.push(Span::styled("█", Theme::input_active()));
        } else if input.is_empty() {
            spans.push(Span::styled("press / to search by prefix", Theme::text_dim()));
        }

        let title = if state.navigator.pending_search().is_some() {
            " Prefix (typing…) "
        } else {
            " Prefix "
        };

        let search = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::pane_border(focused))
                .title(Span::styled(title, Theme::title())),
        );
        frame.render_widget(search, area);
    }

    fn render_keys(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let focused = state.ui_state.focus == Pane::Keys;

        let view = match state.navigator.listing() {
            ListingState::Idle => {
                Self::render_message(frame, area, " Keys ", "Select a database", focused, false);
                return;
            }
            ListingState::Loading => {
                Self::render_message(frame, area, " Keys ", "Loading…", focused, false);
                return;
            }
            ListingState::Failed(message) => {
                let message = format!("Failed to load keys: {}\n\npress r to retry", message);
                Self::render_message(frame, area, " Keys ", &message, focused, true);
                return;
            }
            ListingState::Ready(view) => view,
        };

        let title = format!(" Keys ({}) ", view.keys.len());
        let empty = if state.navigator.session().prefix().is_empty() {
            "No keys"
        } else {
            "No keys match this prefix"
        };
        let selector = ListSelector::new(title)
            .items(view.keys.iter().map(|k| (k.as_str(), false)))
            .focused(focused)
            .empty_text(empty);

        frame.render_list_selector(area, selector, &mut state.ui_state.key_list_state);
    }

    fn render_pager(frame: &mut Frame, area: Rect, state: &AppState) {
        let Some(view) = state.navigator.page() else {
            return;
        };

        let style_for = |enabled: bool| {
            if enabled {
                Theme::text_highlight()
            } else {
                Theme::text_dim()
            }
        };

        let line = Line::from(vec![
            Span::styled("◀ p Prev", style_for(view.has_previous)),
            Span::styled(format!("   page {}   ", view.page_number), Theme::text()),
            Span::styled("Next n ▶", style_for(view.has_next())),
        ]);
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
        let right = if let Some(key) = state.dialogs.loading_view() {
            format!("loading {}…", text::truncate(&text::literal(key), 24))
        } else if let Some(view) = state.navigator.page() {
            format!(
                "page {} · {} keys · loaded at {}",
                view.page_number,
                view.keys.len(),
                view.loaded_at.format("%H:%M:%S")
            )
        } else if state.navigator.is_loading() {
            "loading…".to_string()
        } else {
            String::new()
        };

        let listing_failed = matches!(state.navigator.listing(), ListingState::Failed(_));
        let status = StatusBar::new()
            .hints(pane_hints(state.ui_state.focus, listing_failed))
            .right(right);
        frame.render_widget(status, area);
    }

    fn render_message(
        frame: &mut Frame,
        area: Rect,
        title: &str,
        message: &str,
        focused: bool,
        is_error: bool,
    ) {
        let style = if is_error {
            Theme::error()
        } else {
            Theme::text_dim()
        };
        let lines: Vec<Line> = text::literal_lines(message)
            .into_iter()
            .map(|line| Line::from(Span::styled(line, style)))
            .collect();

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::pane_border(focused))
                .title(Span::styled(title, Theme::title())),
        );
        frame.render_widget(paragraph, area);
    }
}
