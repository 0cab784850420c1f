mod dialogs;
mod help_overlay;
mod list_selector;
mod notice;
mod status_bar;

pub use dialogs::DialogView;
pub use help_overlay::HelpOverlay;
pub use list_selector::{ListSelector, ListSelectorExt};
pub use notice::NoticePopup;
pub use status_bar::{StatusBar, pane_hints};
