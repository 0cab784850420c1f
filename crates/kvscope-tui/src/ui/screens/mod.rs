//! Screen implementations

mod browser;

pub use browser::BrowserScreen;
