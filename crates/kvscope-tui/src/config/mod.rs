//! Key bindings and settings

mod keybindings;
mod settings;

pub use keybindings::{KeyBinding, KeyBindings, KeyContext};
pub use settings::{ConfigError, DEFAULT_SERVER, Settings, config_dir, config_path};
