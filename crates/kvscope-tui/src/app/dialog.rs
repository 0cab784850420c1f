//! View / edit / confirm-delete overlays and the focus they hand back

use std::fmt;

use tokio_util::sync::CancellationToken;

use kvscope_browse::RequestSlot;
use kvscope_types::{KeyValue, Notice, RequestId};

/// Where keyboard focus returns when a dialog closes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FocusTarget {
    DatabaseList,
    SearchInput,
    KeyList,
    /// A specific row of the key list
    KeyRow(String),
}

/// Field of the edit form receiving input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditField {
    #[default]
    Key,
    Value,
}

/// Draft state of the edit / add dialog
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditForm {
    /// Key being edited; `None` when adding a new entry
    pub original_key: Option<String>,
    pub draft_key: String,
    pub draft_value: String,
    pub field: EditField,
    /// Save request in flight
    pub saving: Option<RequestId>,
}

impl EditForm {
    fn add() -> Self {
        Self::default()
    }

    fn edit(entry: KeyValue) -> Self {
        Self {
            original_key: Some(entry.key.clone()),
            draft_key: entry.key,
            draft_value: entry.value,
            field: EditField::Value,
            saving: None,
        }
    }

    /// Keys of existing entries cannot be renamed
    pub fn key_editable(&self) -> bool {
        self.original_key.is_none()
    }

    pub fn is_busy(&self) -> bool {
        self.saving.is_some()
    }

    fn active_field(&mut self) -> Option<&mut String> {
        if self.is_busy() {
            return None;
        }
        match self.field {
            EditField::Key if self.key_editable() => Some(&mut self.draft_key),
            EditField::Key => None,
            EditField::Value => Some(&mut self.draft_value),
        }
    }
}

/// Deletion bound to one key when the confirmation opened
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDelete {
    pub key: String,
}

/// Which overlay is open
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Dialog {
    #[default]
    Closed,
    Viewing {
        entry: KeyValue,
        prior_focus: FocusTarget,
    },
    Editing {
        form: EditForm,
        prior_focus: FocusTarget,
    },
    ConfirmingDelete {
        pending: Option<PendingDelete>,
        deleting: Option<RequestId>,
        prior_focus: FocusTarget,
    },
}

impl Dialog {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    fn prior_focus(&self) -> Option<&FocusTarget> {
        match self {
            Self::Closed => None,
            Self::Viewing { prior_focus, .. }
            | Self::Editing { prior_focus, .. }
            | Self::ConfirmingDelete { prior_focus, .. } => Some(prior_focus),
        }
    }
}

/// Fetch of a single value for the view dialog
#[derive(Clone, Debug)]
pub struct ViewRequest {
    pub id: RequestId,
    pub database: String,
    pub key: String,
    pub cancel: CancellationToken,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveRequest {
    pub id: RequestId,
    pub database: String,
    pub entry: KeyValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteRequest {
    pub id: RequestId,
    pub database: String,
    pub key: String,
}

/// Result of submitting the edit form
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    /// Nothing to do (no form, busy, or no active database)
    Ignored,
    /// Rejected locally before any request
    Rejected(Notice),
    Started(SaveRequest),
}

/// Follow-up work for the rest of the application
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogEffect {
    RestoreFocus(FocusTarget),
    /// Reload the listing of `database` from its first page
    ReloadListing { database: String },
    /// Drop a key deleted from `database` off the displayed page
    RemoveKey { database: String, key: String },
    Notice(Notice),
}

#[derive(Debug)]
struct PendingView {
    id: RequestId,
    key: String,
    trigger: FocusTarget,
}

/// Keeps at most one dialog open and tracks the requests it started
#[derive(Debug, Default)]
pub struct DialogStack {
    dialog: Dialog,
    pending_view: Option<PendingView>,
    view_slot: RequestSlot,
    last_mutation: RequestId,
}

impl DialogStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn is_open(&self) -> bool {
        self.dialog.is_open()
    }

    /// Key whose value is being fetched for the view dialog
    pub fn loading_view(&self) -> Option<&str> {
        self.pending_view.as_ref().map(|p| p.key.as_str())
    }

    /// Close the open dialog, discarding drafts and any bound action
    pub fn close(&mut self) -> Vec<DialogEffect> {
        let closed = std::mem::take(&mut self.dialog);
        closed
            .prior_focus()
            .cloned()
            .map(DialogEffect::RestoreFocus)
            .into_iter()
            .collect()
    }

    /// Start fetching `key` for display. Supersedes an older pending fetch.
    pub fn request_view(
        &mut self,
        database: Option<&str>,
        key: &str,
        trigger: FocusTarget,
    ) -> Option<ViewRequest> {
        let database = database?;
        let (id, cancel) = self.view_slot.start();
        tracing::debug!(%id, key, "fetching value");

        self.pending_view = Some(PendingView {
            id,
            key: key.to_string(),
            trigger,
        });

        Some(ViewRequest {
            id,
            database: database.to_string(),
            key: key.to_string(),
            cancel,
        })
    }

    /// Drop the pending view fetch, if any
    pub fn cancel_view(&mut self) -> bool {
        self.pending_view = None;
        self.view_slot.cancel()
    }

    pub fn view_loaded<E: fmt::Display>(
        &mut self,
        id: RequestId,
        result: Result<KeyValue, E>,
    ) -> Vec<DialogEffect> {
        if !self.view_slot.finish(id) {
            tracing::debug!(%id, "ignoring stale value fetch");
            return Vec::new();
        }
        let Some(pending) = self.pending_view.take() else {
            return Vec::new();
        };

        match result {
            Ok(entry) => {
                let effects = self.close();
                self.dialog = Dialog::Viewing {
                    entry,
                    prior_focus: pending.trigger,
                };
                effects
            }
            Err(err) => {
                tracing::warn!(key = %pending.key, error = %err, "failed to load value");
                vec![DialogEffect::Notice(Notice::error(format!(
                    "Could not load '{}': {}",
                    pending.key, err
                )))]
            }
        }
    }

    /// Switch the view dialog into editing its entry
    pub fn edit_from_view(&mut self) -> bool {
        match std::mem::take(&mut self.dialog) {
            Dialog::Viewing { entry, prior_focus } => {
                self.dialog = Dialog::Editing {
                    form: EditForm::edit(entry),
                    prior_focus,
                };
                true
            }
            other => {
                self.dialog = other;
                false
            }
        }
    }

    pub fn open_add(&mut self, trigger: FocusTarget) -> Vec<DialogEffect> {
        self.cancel_view();
        let effects = self.close();
        self.dialog = Dialog::Editing {
            form: EditForm::add(),
            prior_focus: trigger,
        };
        effects
    }

    pub fn open_delete(&mut self, key: &str, trigger: FocusTarget) -> Vec<DialogEffect> {
        self.cancel_view();
        let effects = self.close();
        self.dialog = Dialog::ConfirmingDelete {
            pending: Some(PendingDelete {
                key: key.to_string(),
            }),
            deleting: None,
            prior_focus: trigger,
        };
        effects
    }

    /// Type into the active form field
    pub fn input(&mut self, c: char) {
        if let Some(field) = self.form_mut().and_then(EditForm::active_field) {
            field.push(c);
        }
    }

    /// Paste into the active form field. Keys stay on one line.
    pub fn paste(&mut self, text: &str) {
        let Some(form) = self.form_mut() else {
            return;
        };
        let single_line = form.field == EditField::Key;
        if let Some(field) = form.active_field() {
            if single_line {
                field.extend(text.chars().filter(|c| *c != '\n' && *c != '\r'));
            } else {
                field.push_str(&text.replace("\r\n", "\n"));
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.form_mut().and_then(EditForm::active_field) {
            field.pop();
        }
    }

    pub fn clear_field(&mut self) {
        if let Some(field) = self.form_mut().and_then(EditForm::active_field) {
            field.clear();
        }
    }

    pub fn next_field(&mut self) {
        if let Some(form) = self.form_mut() {
            form.field = match form.field {
                EditField::Key => EditField::Value,
                EditField::Value if form.key_editable() => EditField::Key,
                EditField::Value => EditField::Value,
            };
        }
    }

    pub fn submit(&mut self, database: Option<&str>) -> Submission {
        let Some(form) = self.form_mut() else {
            return Submission::Ignored;
        };
        if form.is_busy() {
            return Submission::Ignored;
        }
        if form.draft_key.is_empty() {
            return Submission::Rejected(Notice::error("Key cannot be empty"));
        }
        let Some(database) = database else {
            return Submission::Ignored;
        };

        let entry = KeyValue::new(form.draft_key.clone(), form.draft_value.clone());
        self.last_mutation = self.last_mutation.next();
        let id = self.last_mutation;
        if let Some(form) = self.form_mut() {
            form.saving = Some(id);
        }
        tracing::debug!(%id, key = %entry.key, "saving entry");

        Submission::Started(SaveRequest {
            id,
            database: database.to_string(),
            entry,
        })
    }

    pub fn save_finished<E: fmt::Display>(
        &mut self,
        id: RequestId,
        database: &str,
        key: &str,
        result: Result<(), E>,
    ) -> Vec<DialogEffect> {
        let is_current = matches!(
            &self.dialog,
            Dialog::Editing { form, .. } if form.saving == Some(id)
        );

        match result {
            Ok(()) => {
                let mut effects = Vec::new();
                if is_current {
                    effects.extend(self.close());
                }
                effects.push(DialogEffect::ReloadListing {
                    database: database.to_string(),
                });
                effects
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "save failed");
                if is_current {
                    if let Some(form) = self.form_mut() {
                        form.saving = None;
                    }
                }
                vec![DialogEffect::Notice(Notice::error(format!(
                    "Could not save '{}': {}",
                    key, err
                )))]
            }
        }
    }

    /// Run the pending deletion. No-op without one or while it is running.
    pub fn confirm(&mut self, database: Option<&str>) -> Option<DeleteRequest> {
        let database = database?;
        let next_id = self.last_mutation.next();

        let Dialog::ConfirmingDelete {
            pending: Some(pending),
            deleting,
            ..
        } = &mut self.dialog
        else {
            return None;
        };
        if deleting.is_some() {
            return None;
        }

        *deleting = Some(next_id);
        self.last_mutation = next_id;
        tracing::debug!(id = %next_id, key = %pending.key, "deleting entry");

        Some(DeleteRequest {
            id: next_id,
            database: database.to_string(),
            key: pending.key.clone(),
        })
    }

    pub fn delete_finished<E: fmt::Display>(
        &mut self,
        id: RequestId,
        database: &str,
        key: &str,
        result: Result<(), E>,
    ) -> Vec<DialogEffect> {
        let is_current = matches!(
            &self.dialog,
            Dialog::ConfirmingDelete { deleting, .. } if *deleting == Some(id)
        );

        match result {
            Ok(()) => {
                let mut effects = vec![DialogEffect::RemoveKey {
                    database: database.to_string(),
                    key: key.to_string(),
                }];
                if is_current {
                    effects.extend(self.close());
                }
                effects
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "delete failed");
                if is_current {
                    if let Dialog::ConfirmingDelete { deleting, .. } = &mut self.dialog {
                        *deleting = None;
                    }
                }
                vec![DialogEffect::Notice(Notice::error(format!(
                    "Could not delete '{}': {}",
                    key, err
                )))]
            }
        }
    }

    fn form_mut(&mut self) -> Option<&mut EditForm> {
        match &mut self.dialog {
            Dialog::Editing { form, .. } => Some(form),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DB: Option<&str> = Some("main");

    fn row(key: &str) -> FocusTarget {
        FocusTarget::KeyRow(key.to_string())
    }

    fn open_view(stack: &mut DialogStack, key: &str, value: &str) {
        let request = stack.request_view(DB, key, row(key)).unwrap();
        let effects = stack.view_loaded::<String>(request.id, Ok(KeyValue::new(key, value)));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_view_then_close_restores_trigger() {
        let mut stack = DialogStack::new();
        open_view(&mut stack, "alpha", "1");
        assert!(matches!(stack.dialog(), Dialog::Viewing { entry, .. } if entry.value == "1"));

        assert_eq!(stack.close(), vec![DialogEffect::RestoreFocus(row("alpha"))]);
        assert!(!stack.is_open());
        assert!(stack.close().is_empty());
    }

    #[test]
    fn test_opening_add_over_view_closes_view_first() {
        let mut stack = DialogStack::new();
        open_view(&mut stack, "alpha", "1");

        let effects = stack.open_add(FocusTarget::KeyList);
        assert_eq!(effects, vec![DialogEffect::RestoreFocus(row("alpha"))]);
        match stack.dialog() {
            Dialog::Editing { form, prior_focus } => {
                assert!(form.key_editable());
                assert!(form.draft_key.is_empty());
                assert_eq!(prior_focus, &FocusTarget::KeyList);
            }
            other => panic!("unexpected dialog: {:?}", other),
        }
    }

    #[test]
    fn test_opening_add_drops_pending_view() {
        let mut stack = DialogStack::new();
        let request = stack.request_view(DB, "alpha", row("alpha")).unwrap();

        stack.open_add(FocusTarget::KeyList);
        for c in "new".chars() {
            stack.input(c);
        }
        assert!(request.cancel.is_cancelled());
        assert!(stack.loading_view().is_none());

        let effects = stack.view_loaded::<String>(request.id, Ok(KeyValue::new("alpha", "1")));
        assert!(effects.is_empty());
        assert!(matches!(stack.dialog(), Dialog::Editing { form, .. } if form.draft_key == "new"));
    }

    #[test]
    fn test_opening_delete_drops_pending_view() {
        let mut stack = DialogStack::new();
        let request = stack.request_view(DB, "alpha", row("alpha")).unwrap();

        stack.open_delete("beta", row("beta"));
        assert!(request.cancel.is_cancelled());

        let effects = stack.view_loaded::<String>(request.id, Ok(KeyValue::new("alpha", "1")));
        assert!(effects.is_empty());
        assert!(matches!(
            stack.dialog(),
            Dialog::ConfirmingDelete { pending: Some(p), .. } if p.key == "beta"
        ));
    }

    #[test]
    fn test_newer_view_request_supersedes_older() {
        let mut stack = DialogStack::new();
        let first = stack.request_view(DB, "a", row("a")).unwrap();
        let second = stack.request_view(DB, "b", row("b")).unwrap();
        assert!(first.cancel.is_cancelled());

        assert!(stack
            .view_loaded::<String>(first.id, Ok(KeyValue::new("a", "1")))
            .is_empty());
        assert!(!stack.is_open());

        stack.view_loaded::<String>(second.id, Ok(KeyValue::new("b", "2")));
        assert!(matches!(stack.dialog(), Dialog::Viewing { entry, .. } if entry.key == "b"));
    }

    #[test]
    fn test_view_failure_surfaces_notice_and_stays_closed() {
        let mut stack = DialogStack::new();
        let request = stack.request_view(DB, "gone", row("gone")).unwrap();
        let effects = stack.view_loaded(request.id, Err("HTTP 404"));

        assert!(matches!(&effects[..], [DialogEffect::Notice(n)] if n.message.contains("HTTP 404")));
        assert!(!stack.is_open());
        assert!(stack.loading_view().is_none());
    }

    #[test]
    fn test_view_needs_active_database() {
        let mut stack = DialogStack::new();
        assert!(stack.request_view(None, "a", row("a")).is_none());
    }

    #[test]
    fn test_edit_from_view_keeps_key_immutable() {
        let mut stack = DialogStack::new();
        open_view(&mut stack, "alpha", "1");
        assert!(stack.edit_from_view());

        stack.next_field();
        stack.input('x');
        match stack.dialog() {
            Dialog::Editing { form, prior_focus } => {
                assert_eq!(form.original_key.as_deref(), Some("alpha"));
                assert_eq!(form.draft_key, "alpha");
                assert_eq!(form.draft_value, "1x");
                assert_eq!(prior_focus, &row("alpha"));
            }
            other => panic!("unexpected dialog: {:?}", other),
        }
    }

    #[test]
    fn test_submit_rejects_empty_key() {
        let mut stack = DialogStack::new();
        stack.open_add(FocusTarget::KeyList);
        stack.next_field();
        stack.input('v');

        assert!(matches!(stack.submit(DB), Submission::Rejected(_)));
        assert!(matches!(stack.dialog(), Dialog::Editing { form, .. } if !form.is_busy()));
    }

    #[test]
    fn test_save_success_closes_and_reloads() {
        let mut stack = DialogStack::new();
        stack.open_add(FocusTarget::KeyList);
        stack.input('k');
        stack.next_field();
        stack.input('v');

        let Submission::Started(request) = stack.submit(DB) else {
            panic!("expected a save request");
        };
        assert_eq!(request.entry, KeyValue::new("k", "v"));
        assert_eq!(stack.submit(DB), Submission::Ignored);

        let effects = stack.save_finished::<String>(request.id, "main", "k", Ok(()));
        assert_eq!(
            effects,
            vec![
                DialogEffect::RestoreFocus(FocusTarget::KeyList),
                DialogEffect::ReloadListing {
                    database: "main".to_string()
                }
            ]
        );
        assert!(!stack.is_open());
    }

    #[test]
    fn test_save_failure_keeps_dialog_open() {
        let mut stack = DialogStack::new();
        stack.open_add(FocusTarget::KeyList);
        stack.input('k');
        let Submission::Started(request) = stack.submit(DB) else {
            panic!("expected a save request");
        };

        let effects = stack.save_finished(request.id, "main", "k", Err("HTTP 500"));
        assert!(matches!(&effects[..], [DialogEffect::Notice(_)]));
        assert!(matches!(stack.dialog(), Dialog::Editing { form, .. } if !form.is_busy() && form.draft_key == "k"));
    }

    #[test]
    fn test_save_after_close_still_reloads() {
        let mut stack = DialogStack::new();
        stack.open_add(FocusTarget::KeyList);
        stack.input('k');
        let Submission::Started(request) = stack.submit(DB) else {
            panic!("expected a save request");
        };
        stack.close();

        let effects = stack.save_finished::<String>(request.id, "main", "k", Ok(()));
        assert_eq!(
            effects,
            vec![DialogEffect::ReloadListing {
                database: "main".to_string()
            }]
        );
    }

    #[test]
    fn test_confirm_deletes_most_recently_bound_key() {
        let mut stack = DialogStack::new();
        stack.open_delete("a", row("a"));
        stack.close();
        stack.open_delete("b", row("b"));

        let request = stack.confirm(DB).unwrap();
        assert_eq!(request.key, "b");
        // Busy: second accept does nothing
        assert!(stack.confirm(DB).is_none());
    }

    #[test]
    fn test_confirm_without_pending_action_is_noop() {
        let mut stack = DialogStack::new();
        assert!(stack.confirm(DB).is_none());

        stack.open_add(FocusTarget::KeyList);
        assert!(stack.confirm(DB).is_none());
    }

    #[test]
    fn test_delete_success_removes_row_and_closes() {
        let mut stack = DialogStack::new();
        stack.open_delete("a", row("a"));
        let request = stack.confirm(DB).unwrap();

        let effects = stack.delete_finished::<String>(request.id, "main", "a", Ok(()));
        assert_eq!(
            effects,
            vec![
                DialogEffect::RemoveKey {
                    database: "main".to_string(),
                    key: "a".to_string()
                },
                DialogEffect::RestoreFocus(row("a"))
            ]
        );
        assert!(!stack.is_open());
    }

    #[test]
    fn test_delete_after_close_names_its_database() {
        let mut stack = DialogStack::new();
        stack.open_delete("a", row("a"));
        let request = stack.confirm(Some("users")).unwrap();
        stack.close();

        let effects = stack.delete_finished::<String>(request.id, &request.database, "a", Ok(()));
        assert_eq!(
            effects,
            vec![DialogEffect::RemoveKey {
                database: "users".to_string(),
                key: "a".to_string()
            }]
        );
    }

    #[test]
    fn test_delete_failure_clears_busy() {
        let mut stack = DialogStack::new();
        stack.open_delete("a", row("a"));
        let request = stack.confirm(DB).unwrap();

        let effects = stack.delete_finished(request.id, "main", "a", Err("HTTP 500"));
        assert!(matches!(&effects[..], [DialogEffect::Notice(_)]));
        assert!(matches!(
            stack.dialog(),
            Dialog::ConfirmingDelete { deleting: None, pending: Some(_), .. }
        ));
        assert!(stack.confirm(DB).is_some());
    }
}
