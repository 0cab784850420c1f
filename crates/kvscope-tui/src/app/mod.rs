//! Application state, actions and dialogs

mod action;
mod dialog;
mod state;

pub use action::Action;
pub use dialog::{
    DeleteRequest, Dialog, DialogEffect, DialogStack, EditField, EditForm, FocusTarget,
    PendingDelete, SaveRequest, Submission, ViewRequest,
};
pub use state::{AppState, DatabaseList, Pane, UiState};
