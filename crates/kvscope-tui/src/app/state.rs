use std::time::Duration;

use ratatui::widgets::ListState;
use tokio::sync::mpsc;

use kvscope_browse::Navigator;
use kvscope_types::Notice;

use super::{Action, Dialog, DialogStack, FocusTarget};
use crate::config::KeyContext;

/// Pane of the browser screen that owns keyboard focus
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pane {
    #[default]
    Databases,
    Search,
    Keys,
}

impl Pane {
    pub fn next(self) -> Self {
        match self {
            Self::Databases => Self::Search,
            Self::Search => Self::Keys,
            Self::Keys => Self::Databases,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Databases => Self::Keys,
            Self::Search => Self::Databases,
            Self::Keys => Self::Search,
        }
    }
}

/// Database names loaded from the server
#[derive(Clone, Debug, Default)]
pub enum DatabaseList {
    #[default]
    Loading,
    Ready(Vec<String>),
    Failed(String),
}

impl DatabaseList {
    pub fn names(&self) -> &[String] {
        match self {
            Self::Ready(names) => names,
            _ => &[],
        }
    }
}

/// UI-specific transient state
#[derive(Default)]
pub struct UiState {
    /// Pane with keyboard focus
    pub focus: Pane,

    /// Current search input text
    pub search_input: String,

    /// Is help overlay visible?
    pub help_visible: bool,

    /// Selection in the database sidebar
    pub database_list_state: ListState,

    /// Selection in the key list
    pub key_list_state: ListState,

    /// Blocking notice waiting to be acknowledged
    pub notice: Option<Notice>,
}

/// Global application state
pub struct AppState {
    /// Base URL of the server, shown in the header
    pub server: String,

    /// Databases available on the server
    pub databases: DatabaseList,

    /// Session, pagination history and the listing request
    pub navigator: Navigator,

    /// Open overlay and its requests
    pub dialogs: DialogStack,

    /// UI state
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,

    /// Channel sender for async actions
    pub action_tx: mpsc::UnboundedSender<Action>,
}

impl AppState {
    pub fn new(
        server: impl Into<String>,
        search_quiet_period: Duration,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            server: server.into(),
            databases: DatabaseList::default(),
            navigator: Navigator::new(search_quiet_period),
            dialogs: DialogStack::new(),
            ui_state: UiState::default(),
            should_quit: false,
            action_tx,
        }
    }

    /// Key binding context for the current modal state
    pub fn key_context(&self) -> KeyContext {
        if self.ui_state.notice.is_some() {
            return KeyContext::Notice;
        }
        match self.dialogs.dialog() {
            Dialog::Viewing { .. } => return KeyContext::ViewDialog,
            Dialog::Editing { .. } => return KeyContext::EditDialog,
            Dialog::ConfirmingDelete { .. } => return KeyContext::ConfirmDialog,
            Dialog::Closed => {}
        }
        if self.ui_state.help_visible {
            return KeyContext::Help;
        }
        match self.ui_state.focus {
            Pane::Databases => KeyContext::DatabaseList,
            Pane::Search => KeyContext::SearchInput,
            Pane::Keys => KeyContext::KeyList,
        }
    }

    pub fn set_databases(&mut self, names: Vec<String>) {
        let selected = match self.navigator.session().active_database() {
            Some(active) => names.iter().position(|n| n == active),
            None => None,
        };
        let selected = selected.or(if names.is_empty() { None } else { Some(0) });
        self.ui_state.database_list_state.select(selected);
        self.databases = DatabaseList::Ready(names);
    }

    /// Keys on the displayed page
    pub fn keys(&self) -> &[String] {
        self.navigator
            .page()
            .map(|page| page.keys.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_database(&self) -> Option<&str> {
        let idx = self.ui_state.database_list_state.selected()?;
        self.databases.names().get(idx).map(String::as_str)
    }

    pub fn selected_key(&self) -> Option<&str> {
        let idx = self.ui_state.key_list_state.selected()?;
        self.keys().get(idx).map(String::as_str)
    }

    /// Get the current list length based on focus
    fn focused_list_len(&self) -> usize {
        match self.ui_state.focus {
            Pane::Databases => self.databases.names().len(),
            Pane::Keys => self.keys().len(),
            Pane::Search => 0,
        }
    }

    fn focused_list_state(&mut self) -> &mut ListState {
        match self.ui_state.focus {
            Pane::Databases | Pane::Search => &mut self.ui_state.database_list_state,
            Pane::Keys => &mut self.ui_state.key_list_state,
        }
    }

    /// Move selection up
    pub fn list_up(&mut self) {
        let len = self.focused_list_len();
        if len == 0 || self.ui_state.focus == Pane::Search {
            return;
        }

        let state = self.focused_list_state();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i.min(len) - 1,
        };
        state.select(Some(i));
    }

    /// Move selection down
    pub fn list_down(&mut self) {
        let len = self.focused_list_len();
        if len == 0 || self.ui_state.focus == Pane::Search {
            return;
        }

        let state = self.focused_list_state();
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    /// Select the first row of a freshly loaded page
    pub fn reset_key_selection(&mut self) {
        let selected = if self.keys().is_empty() { None } else { Some(0) };
        self.ui_state.key_list_state.select(selected);
    }

    /// Keep the key selection inside the displayed page
    pub fn clamp_key_selection(&mut self) {
        let len = self.keys().len();
        let selected = match self.ui_state.key_list_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.ui_state.key_list_state.select(selected);
    }

    /// The focus target a dialog opened from here should hand back
    pub fn focus_target(&self) -> FocusTarget {
        match self.ui_state.focus {
            Pane::Databases => FocusTarget::DatabaseList,
            Pane::Search => FocusTarget::SearchInput,
            Pane::Keys => match self.selected_key() {
                Some(key) => FocusTarget::KeyRow(key.to_string()),
                None => FocusTarget::KeyList,
            },
        }
    }

    pub fn restore_focus(&mut self, target: FocusTarget) {
        match target {
            FocusTarget::DatabaseList => self.ui_state.focus = Pane::Databases,
            FocusTarget::SearchInput => self.ui_state.focus = Pane::Search,
            FocusTarget::KeyList => {
                self.ui_state.focus = Pane::Keys;
                self.clamp_key_selection();
            }
            FocusTarget::KeyRow(key) => {
                self.ui_state.focus = Pane::Keys;
                match self.keys().iter().position(|k| *k == key) {
                    Some(idx) => self.ui_state.key_list_state.select(Some(idx)),
                    None => self.clamp_key_selection(),
                }
            }
        }
    }

    /// Show a notice; an unacknowledged one is replaced
    pub fn show_notice(&mut self, notice: Notice) {
        self.ui_state.notice = Some(notice);
    }

    pub fn dismiss_notice(&mut self) {
        self.ui_state.notice = None;
    }

    /// Add a character to search input
    pub fn search_input_char(&mut self, c: char) {
        self.ui_state.search_input.push(c);
    }

    /// Remove last character from search input
    pub fn search_input_backspace(&mut self) {
        self.ui_state.search_input.pop();
    }

    /// Make the search input show the prefix the session is using
    pub fn sync_search_input(&mut self) {
        let prefix = self.navigator.session().prefix();
        if self.navigator.pending_search().is_none() && self.ui_state.search_input != prefix {
            self.ui_state.search_input = prefix.to_string();
        }
    }
}
