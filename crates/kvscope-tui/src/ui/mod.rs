pub mod components;
mod layout;
pub mod screens;
pub mod text;
mod theme;

pub use layout::{BrowserAreas, Layout};
pub use theme::Theme;
