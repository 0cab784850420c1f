//! Terminal UI for kvscope
//!
//! This crate provides the terminal user interface for kvscope, including
//! state management, the dialog controller, keybindings, settings, event
//! handling, and UI components.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{
    Action, AppState, DatabaseList, DeleteRequest, Dialog, DialogEffect, DialogStack, FocusTarget,
    Pane, SaveRequest, Submission, UiState, ViewRequest,
};
pub use config::{ConfigError, KeyBinding, KeyBindings, KeyContext, Settings};
pub use tui::{Event, EventHandler, Tui};
pub use ui::screens::BrowserScreen;
pub use ui::{Layout, Theme};
