use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::app::Action;

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    DatabaseList,
    KeyList,
    SearchInput,
    Help,
    ViewDialog,
    EditDialog,
    ConfirmDialog,
    Notice,
}

impl KeyContext {
    /// Contexts where unbound characters are typed into a text field
    fn accepts_text(self) -> bool {
        matches!(self, Self::SearchInput | Self::EditDialog)
    }

    /// Contexts that swallow everything they do not bind (modal overlays)
    fn is_modal(self) -> bool {
        matches!(
            self,
            Self::Help | Self::ViewDialog | Self::EditDialog | Self::ConfirmDialog | Self::Notice
        )
    }
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Tab), Action::FocusNext);
        global.insert(KeyBinding::shift(KeyCode::BackTab), Action::FocusPrev);
        global.insert(KeyBinding::new(KeyCode::BackTab), Action::FocusPrev);
        global.insert(KeyBinding::new(KeyCode::Char('/')), Action::FocusSearch);
        bindings.insert(KeyContext::Global, global);

        // Database sidebar
        let mut databases = HashMap::new();
        databases.insert(KeyBinding::new(KeyCode::Char('j')), Action::ListDown);
        databases.insert(KeyBinding::new(KeyCode::Down), Action::ListDown);
        databases.insert(KeyBinding::new(KeyCode::Char('k')), Action::ListUp);
        databases.insert(KeyBinding::new(KeyCode::Up), Action::ListUp);
        databases.insert(KeyBinding::new(KeyCode::Enter), Action::ListSelect);
        databases.insert(KeyBinding::new(KeyCode::Char('l')), Action::ListSelect);
        databases.insert(KeyBinding::new(KeyCode::Char('r')), Action::RefreshDatabases);
        bindings.insert(KeyContext::DatabaseList, databases);

        // Key list
        let mut keys = HashMap::new();
        keys.insert(KeyBinding::new(KeyCode::Char('j')), Action::ListDown);
        keys.insert(KeyBinding::new(KeyCode::Down), Action::ListDown);
        keys.insert(KeyBinding::new(KeyCode::Char('k')), Action::ListUp);
        keys.insert(KeyBinding::new(KeyCode::Up), Action::ListUp);
        keys.insert(KeyBinding::new(KeyCode::Enter), Action::ListSelect);
        keys.insert(KeyBinding::new(KeyCode::Char('v')), Action::ViewKey);
        keys.insert(KeyBinding::new(KeyCode::Char('a')), Action::AddKey);
        keys.insert(KeyBinding::new(KeyCode::Char('d')), Action::DeleteKey);
        keys.insert(KeyBinding::new(KeyCode::Delete), Action::DeleteKey);
        keys.insert(KeyBinding::new(KeyCode::Char('n')), Action::NextPage);
        keys.insert(KeyBinding::new(KeyCode::Right), Action::NextPage);
        keys.insert(KeyBinding::new(KeyCode::PageDown), Action::NextPage);
        keys.insert(KeyBinding::new(KeyCode::Char('p')), Action::PrevPage);
        keys.insert(KeyBinding::new(KeyCode::Left), Action::PrevPage);
        keys.insert(KeyBinding::new(KeyCode::PageUp), Action::PrevPage);
        keys.insert(KeyBinding::new(KeyCode::Char('r')), Action::RefreshKeys);
        keys.insert(KeyBinding::new(KeyCode::Char('x')), Action::SearchClear);
        keys.insert(KeyBinding::new(KeyCode::Esc), Action::FocusDatabases);
        keys.insert(KeyBinding::new(KeyCode::Char('h')), Action::FocusDatabases);
        bindings.insert(KeyContext::KeyList, keys);

        // Search input (when the search bar has focus)
        let mut search = HashMap::new();
        search.insert(KeyBinding::new(KeyCode::Enter), Action::SearchSubmit);
        search.insert(KeyBinding::new(KeyCode::Esc), Action::FocusKeys);
        search.insert(KeyBinding::new(KeyCode::Backspace), Action::SearchBackspace);
        search.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::SearchClear);
        search.insert(KeyBinding::new(KeyCode::Tab), Action::FocusNext);
        search.insert(KeyBinding::new(KeyCode::BackTab), Action::FocusPrev);
        search.insert(KeyBinding::shift(KeyCode::BackTab), Action::FocusPrev);
        search.insert(KeyBinding::new(KeyCode::Down), Action::FocusKeys);
        search.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        bindings.insert(KeyContext::SearchInput, search);

        // Help overlay
        let mut help = HashMap::new();
        help.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        help.insert(KeyBinding::new(KeyCode::Esc), Action::ToggleHelp);
        help.insert(KeyBinding::new(KeyCode::Char('q')), Action::ToggleHelp);
        help.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        bindings.insert(KeyContext::Help, help);

        // View dialog
        let mut view = HashMap::new();
        view.insert(KeyBinding::new(KeyCode::Esc), Action::CloseDialog);
        view.insert(KeyBinding::new(KeyCode::Char('q')), Action::CloseDialog);
        view.insert(KeyBinding::new(KeyCode::Enter), Action::CloseDialog);
        view.insert(KeyBinding::new(KeyCode::Char('e')), Action::EditFromView);
        view.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        bindings.insert(KeyContext::ViewDialog, view);

        // Edit / add dialog
        let mut edit = HashMap::new();
        edit.insert(KeyBinding::new(KeyCode::Esc), Action::CloseDialog);
        edit.insert(KeyBinding::new(KeyCode::Enter), Action::FormSubmit);
        edit.insert(KeyBinding::ctrl(KeyCode::Char('s')), Action::FormSubmit);
        edit.insert(KeyBinding::ctrl(KeyCode::Char('j')), Action::FormNewline);
        edit.insert(KeyBinding::new(KeyCode::Tab), Action::FormNextField);
        edit.insert(KeyBinding::new(KeyCode::BackTab), Action::FormNextField);
        edit.insert(KeyBinding::shift(KeyCode::BackTab), Action::FormNextField);
        edit.insert(KeyBinding::new(KeyCode::Backspace), Action::FormBackspace);
        edit.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::FormClearField);
        edit.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        bindings.insert(KeyContext::EditDialog, edit);

        // Delete confirmation
        let mut confirm = HashMap::new();
        confirm.insert(KeyBinding::new(KeyCode::Enter), Action::ConfirmAccept);
        confirm.insert(KeyBinding::new(KeyCode::Char('y')), Action::ConfirmAccept);
        confirm.insert(KeyBinding::shift(KeyCode::Char('Y')), Action::ConfirmAccept);
        confirm.insert(KeyBinding::new(KeyCode::Esc), Action::CloseDialog);
        confirm.insert(KeyBinding::new(KeyCode::Char('n')), Action::CloseDialog);
        confirm.insert(KeyBinding::shift(KeyCode::Char('N')), Action::CloseDialog);
        confirm.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        bindings.insert(KeyContext::ConfirmDialog, confirm);

        // Notice popup
        let mut notice = HashMap::new();
        notice.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        bindings.insert(KeyContext::Notice, notice);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|context_bindings| context_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // Any key acknowledges a notice
        if context == KeyContext::Notice {
            return Some(Action::DismissNotice);
        }

        // For regular characters in text fields, return an input action
        if context.accepts_text() {
            if let KeyCode::Char(c) = key.code {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    return Some(match context {
                        KeyContext::SearchInput => Action::SearchInput(c),
                        _ => Action::FormInput(c),
                    });
                }
            }
        }

        if context.is_modal() {
            return None;
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_key_list_bindings() {
        let kb = KeyBindings::new();
        assert!(matches!(
            kb.get_action(KeyContext::KeyList, &key(KeyCode::Char('n'))),
            Some(Action::NextPage)
        ));
        assert!(matches!(
            kb.get_action(KeyContext::KeyList, &key(KeyCode::Char('d'))),
            Some(Action::DeleteKey)
        ));
        // Falls through to global
        assert!(matches!(
            kb.get_action(KeyContext::KeyList, &key(KeyCode::Char('q'))),
            Some(Action::Quit)
        ));
    }

    #[test]
    fn test_search_input_types_characters() {
        let kb = KeyBindings::new();
        assert!(matches!(
            kb.get_action(KeyContext::SearchInput, &key(KeyCode::Char('q'))),
            Some(Action::SearchInput('q'))
        ));
        assert!(matches!(
            kb.get_action(KeyContext::SearchInput, &key(KeyCode::Enter)),
            Some(Action::SearchSubmit)
        ));
        assert!(matches!(
            kb.get_action(KeyContext::SearchInput, &ctrl('u')),
            Some(Action::SearchClear)
        ));
    }

    #[test]
    fn test_confirm_dialog_accept_key() {
        let kb = KeyBindings::new();
        assert!(matches!(
            kb.get_action(KeyContext::ConfirmDialog, &key(KeyCode::Char('y'))),
            Some(Action::ConfirmAccept)
        ));
        assert!(matches!(
            kb.get_action(KeyContext::ConfirmDialog, &key(KeyCode::Esc)),
            Some(Action::CloseDialog)
        ));
        // Dialogs are modal: list keys do nothing
        assert!(kb
            .get_action(KeyContext::ConfirmDialog, &key(KeyCode::Char('a')))
            .is_none());
    }

    #[test]
    fn test_edit_dialog_input() {
        let kb = KeyBindings::new();
        assert!(matches!(
            kb.get_action(KeyContext::EditDialog, &key(KeyCode::Char('x'))),
            Some(Action::FormInput('x'))
        ));
        assert!(matches!(
            kb.get_action(KeyContext::EditDialog, &key(KeyCode::Esc)),
            Some(Action::CloseDialog)
        ));
        assert!(kb
            .get_action(KeyContext::EditDialog, &key(KeyCode::F(5)))
            .is_none());
    }

    #[test]
    fn test_notice_dismissed_by_any_key() {
        let kb = KeyBindings::new();
        assert!(matches!(
            kb.get_action(KeyContext::Notice, &key(KeyCode::Char('z'))),
            Some(Action::DismissNotice)
        ));
        assert!(matches!(
            kb.get_action(KeyContext::Notice, &ctrl('c')),
            Some(Action::Quit)
        ));
    }
}
