//! Key listing navigation for kvscope
//!
//! This crate provides the session context, pagination history, debounced
//! prefix search, the key listing navigator, and the request runner that
//! executes API calls off the event loop.

mod debounce;
mod history;
mod navigator;
mod runner;
mod session;

pub use debounce::{DEFAULT_QUIET_PERIOD, SearchDebounce};
pub use history::PageHistory;
pub use navigator::{Applied, ListingRequest, ListingState, Navigator, PageView};
pub use runner::{RequestRunner, RequestSlot};
pub use session::Session;

// Re-export types used in our public API
pub use kvscope_types::{KeyPage, PageSnapshot, RequestId};
