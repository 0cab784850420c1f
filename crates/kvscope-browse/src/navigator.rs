//! Key listing navigator
//!
//! Owns the session, the pagination history, the search debounce timer and
//! the in-flight listing request. Every operation that needs the server
//! returns a [`ListingRequest`]; the caller runs it and feeds the outcome
//! back through [`Navigator::apply_listing`].

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tokio_util::sync::CancellationToken;

use crate::debounce::SearchDebounce;
use crate::history::PageHistory;
use crate::runner::RequestSlot;
use crate::session::Session;
use kvscope_types::{KeyPage, PageSnapshot, RequestId};

/// A listing request the caller must execute
#[derive(Clone, Debug)]
pub struct ListingRequest {
    pub id: RequestId,
    pub database: String,
    pub snapshot: PageSnapshot,
    /// Fired when a newer listing request supersedes this one
    pub cancel: CancellationToken,
}

/// One page as presented to the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageView {
    pub keys: Vec<String>,

    /// Cursor for the next page; only set when more keys exist
    pub next_cursor: Option<String>,

    /// Whether a previous page can be navigated to
    pub has_previous: bool,

    /// 1-based position in the current search
    pub page_number: usize,

    pub loaded_at: DateTime<Local>,
}

impl PageView {
    pub fn has_next(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// What the key list currently shows
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ListingState {
    /// No database selected yet
    #[default]
    Idle,
    Loading,
    Ready(PageView),
    /// The last listing failed; pagination state is untouched
    Failed(String),
}

/// Outcome of feeding a listing response to the navigator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Applied,
    /// The response belongs to a superseded request and was dropped
    Stale,
}

/// Cursor-paginated, prefix-filtered key listing
#[derive(Debug)]
pub struct Navigator {
    session: Session,
    history: PageHistory,
    slot: RequestSlot,
    debounce: SearchDebounce,
    listing: ListingState,
}

impl Navigator {
    pub fn new(search_quiet_period: Duration) -> Self {
        Self {
            session: Session::new(),
            history: PageHistory::new(),
            slot: RequestSlot::new(),
            debounce: SearchDebounce::new(search_quiet_period),
            listing: ListingState::Idle,
        }
    }

    // -- Read access --

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn history(&self) -> &PageHistory {
        &self.history
    }

    pub fn listing(&self) -> &ListingState {
        &self.listing
    }

    pub fn page(&self) -> Option<&PageView> {
        match &self.listing {
            ListingState::Ready(view) => Some(view),
            _ => None,
        }
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn next_cursor(&self) -> Option<&str> {
        self.page().and_then(|p| p.next_cursor.as_deref())
    }

    pub fn is_loading(&self) -> bool {
        self.slot.is_active()
    }

    /// When the pending search timer fires, if one is scheduled
    pub fn search_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn pending_search(&self) -> Option<&str> {
        self.debounce.pending_text()
    }

    // -- Navigation --

    /// Switch to `name` and load its first unfiltered page
    pub fn select_database(&mut self, name: impl Into<String>) -> ListingRequest {
        let name = name.into();
        tracing::debug!(database = %name, "selecting database");

        self.session.select(name.clone());
        self.history.clear();
        self.debounce.cancel();
        self.issue(name)
    }

    /// Load the page at `cursor` within the `prefix` search.
    ///
    /// A prefix change starts a new search and drops the history. Moving to
    /// a new cursor within the same search remembers the current page.
    pub fn go_to_page(
        &mut self,
        cursor: Option<String>,
        prefix: impl Into<String>,
    ) -> Option<ListingRequest> {
        let database = self.session.active_database()?.to_string();
        let target = PageSnapshot::new(cursor, prefix);
        let current = self.session.snapshot();

        if target.prefix != current.prefix {
            self.history.clear();
        } else if let Some(cursor) = target.cursor.as_deref() {
            let is_current = current.cursor.as_deref() == Some(cursor);
            let is_top = self.history.top().and_then(|s| s.cursor.as_deref()) == Some(cursor);
            if !is_current && !is_top {
                self.history.push(current);
            }
        }

        // The history never holds the page we are about to show
        self.history.discard_from(&target);
        self.session.restore(target);
        Some(self.issue(database))
    }

    /// Follow the continuation token of the page on screen
    pub fn go_next(&mut self) -> Option<ListingRequest> {
        let cursor = self.next_cursor()?.to_string();
        let prefix = self.session.prefix().to_string();
        self.go_to_page(Some(cursor), prefix)
    }

    /// Return to the page visited before the current one
    pub fn go_back(&mut self) -> Option<ListingRequest> {
        let database = self.session.active_database()?.to_string();
        let previous = self.history.pop()?;
        self.session.restore(previous);
        Some(self.issue(database))
    }

    /// Reload from the first page of the current search, forgetting history.
    /// Used after a write to `database` that may have changed the result set;
    /// does nothing once another database is active.
    pub fn reload(&mut self, database: &str) -> Option<ListingRequest> {
        if !self.is_active(database) {
            return None;
        }
        let database = database.to_string();
        self.history.clear();
        self.session.rewind();
        Some(self.issue(database))
    }

    /// Re-issue the current page as-is
    pub fn retry(&mut self) -> Option<ListingRequest> {
        let database = self.session.active_database()?.to_string();
        Some(self.issue(database))
    }

    // -- Search --

    /// Record a keystroke in the search box; the search runs once input has
    /// been quiet for the debounce period
    pub fn search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.debounce.input(text, now);
    }

    /// Fire the pending search if it is due
    pub fn poll_search(&mut self, now: Instant) -> Option<ListingRequest> {
        let prefix = self.debounce.poll(now)?;
        self.go_to_page(None, prefix)
    }

    /// Search immediately, skipping the debounce
    pub fn submit_search(&mut self, text: impl Into<String>) -> Option<ListingRequest> {
        self.debounce.cancel();
        self.go_to_page(None, text)
    }

    /// Drop the prefix filter immediately
    pub fn clear_search(&mut self) -> Option<ListingRequest> {
        self.debounce.cancel();
        self.go_to_page(None, String::new())
    }

    // -- Results --

    /// Apply the outcome of listing request `id`
    pub fn apply_listing<E: fmt::Display>(
        &mut self,
        id: RequestId,
        result: Result<KeyPage, E>,
    ) -> Applied {
        if !self.slot.finish(id) {
            tracing::debug!(%id, "dropping stale listing response");
            return Applied::Stale;
        }

        self.listing = match result {
            Ok(page) => {
                // A continuation token next to an empty page means exhausted
                let next_cursor = if page.keys.is_empty() {
                    None
                } else {
                    page.next_key
                };

                ListingState::Ready(PageView {
                    keys: page.keys,
                    next_cursor,
                    has_previous: !self.history.is_empty(),
                    page_number: self.history.len() + 1,
                    loaded_at: Local::now(),
                })
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "listing failed");
                ListingState::Failed(e.to_string())
            }
        };

        Applied::Applied
    }

    /// Remove `key` from the page on screen without refetching.
    /// Removes at most one row, and only while `database` is active.
    pub fn remove_key(&mut self, database: &str, key: &str) -> bool {
        if !self.is_active(database) {
            return false;
        }
        let ListingState::Ready(view) = &mut self.listing else {
            return false;
        };

        match view.keys.iter().position(|k| k == key) {
            Some(idx) => {
                view.keys.remove(idx);
                true
            }
            None => false,
        }
    }

    fn is_active(&self, database: &str) -> bool {
        self.session.active_database() == Some(database)
    }

    fn issue(&mut self, database: String) -> ListingRequest {
        let (id, cancel) = self.slot.start();
        let snapshot = self.session.snapshot();
        tracing::debug!(%id, %database, prefix = %snapshot.prefix, cursor = ?snapshot.cursor, "issuing listing");

        self.listing = ListingState::Loading;
        ListingRequest {
            id,
            database,
            snapshot,
            cancel,
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(crate::debounce::DEFAULT_QUIET_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(keys: &[&str], next: Option<&str>) -> Result<KeyPage, String> {
        Ok(KeyPage::new(
            keys.iter().map(|k| k.to_string()).collect(),
            next.map(str::to_string),
        ))
    }

    fn snapshot(cursor: Option<&str>, prefix: &str) -> PageSnapshot {
        PageSnapshot::new(cursor.map(str::to_string), prefix)
    }

    fn assert_no_self_loop(nav: &Navigator) {
        assert!(!nav.history().contains(&nav.session().snapshot()));
    }

    #[test]
    fn test_select_database_first_page() {
        let mut nav = Navigator::default();
        let req = nav.select_database("users");

        assert_eq!(req.database, "users");
        assert_eq!(req.snapshot, snapshot(None, ""));
        assert!(nav.is_loading());

        assert_eq!(nav.apply_listing(req.id, page(&["a", "b"], Some("c"))), Applied::Applied);
        let view = nav.page().unwrap();
        assert_eq!(view.keys, vec!["a", "b"]);
        assert!(!view.has_previous);
        assert_eq!(view.next_cursor.as_deref(), Some("c"));
        assert_eq!(view.page_number, 1);
    }

    #[test]
    fn test_next_then_previous_restores_first_page() {
        let mut nav = Navigator::default();
        let req = nav.select_database("users");
        nav.apply_listing(req.id, page(&["a", "b"], Some("c")));

        let req = nav.go_next().unwrap();
        assert_eq!(req.snapshot, snapshot(Some("c"), ""));
        assert_eq!(nav.history().len(), 1);
        nav.apply_listing(req.id, page(&["c", "d"], None));
        assert!(nav.page().unwrap().has_previous);
        assert!(!nav.page().unwrap().has_next());

        let req = nav.go_back().unwrap();
        assert_eq!(req.snapshot, snapshot(None, ""));
        assert_eq!(nav.session().prefix(), "");
        assert_eq!(nav.session().cursor(), None);
        assert!(nav.history().is_empty());
    }

    #[test]
    fn test_back_replays_each_forward_step() {
        let mut nav = Navigator::default();
        nav.select_database("users");
        nav.submit_search("user:");

        let cursors = ["c1", "c2", "c3", "c4"];
        let mut visited = vec![nav.session().snapshot()];
        for cursor in cursors {
            nav.go_to_page(Some(cursor.to_string()), "user:");
            assert_no_self_loop(&nav);
            visited.push(nav.session().snapshot());
        }
        assert_eq!(nav.history().len(), cursors.len());

        visited.pop();
        while let Some(expected) = visited.pop() {
            let req = nav.go_back().unwrap();
            assert_eq!(req.snapshot, expected);
            assert_eq!(nav.session().snapshot(), expected);
            assert_no_self_loop(&nav);
        }
        assert!(nav.go_back().is_none());
    }

    #[test]
    fn test_prefix_change_clears_history() {
        let mut nav = Navigator::default();
        nav.select_database("users");
        nav.go_to_page(Some("c".to_string()), "");
        nav.go_to_page(Some("f".to_string()), "");
        assert_eq!(nav.history().len(), 2);

        let req = nav.go_to_page(None, "ali").unwrap();
        assert!(nav.history().is_empty());
        assert_eq!(req.snapshot, snapshot(None, "ali"));
    }

    #[test]
    fn test_same_cursor_does_not_push() {
        let mut nav = Navigator::default();
        nav.select_database("users");
        nav.go_to_page(Some("c".to_string()), "");
        nav.go_to_page(Some("c".to_string()), "");
        assert_eq!(nav.history().len(), 1);
        assert_no_self_loop(&nav);
    }

    #[test]
    fn test_cursor_at_top_of_history_is_not_pushed() {
        let mut nav = Navigator::default();
        nav.select_database("users");
        nav.go_to_page(Some("c".to_string()), "");
        nav.go_to_page(Some("f".to_string()), "");

        // Navigating forward to the page we came from acts like going back
        nav.go_to_page(Some("c".to_string()), "");
        assert_eq!(nav.history().len(), 1);
        assert_eq!(nav.history().top(), Some(&snapshot(None, "")));
        assert_no_self_loop(&nav);
    }

    #[test]
    fn test_returning_to_first_page_clears_history() {
        let mut nav = Navigator::default();
        nav.select_database("users");
        nav.go_to_page(Some("c".to_string()), "");
        nav.submit_search("");
        assert!(nav.history().is_empty());
        assert_no_self_loop(&nav);
    }

    #[test]
    fn test_stale_response_is_ignored() {
        let mut nav = Navigator::default();
        let first = nav.select_database("users");
        nav.apply_listing(first.id, page(&["a", "b"], Some("c")));

        let slow = nav.go_next().unwrap();
        let fast = nav.go_back().unwrap();
        assert!(slow.cancel.is_cancelled());
        assert!(!fast.cancel.is_cancelled());

        assert_eq!(nav.apply_listing(fast.id, page(&["a", "b"], Some("c"))), Applied::Applied);
        let before = nav.page().cloned();
        let history_before = nav.history().len();

        assert_eq!(nav.apply_listing(slow.id, page(&["x", "y"], None)), Applied::Stale);
        assert_eq!(nav.page().cloned(), before);
        assert_eq!(nav.history().len(), history_before);
        assert_eq!(nav.session().cursor(), None);
    }

    #[test]
    fn test_next_cursor_with_empty_page_is_exhausted() {
        let mut nav = Navigator::default();
        let req = nav.select_database("users");
        nav.apply_listing(req.id, page(&[], Some("zzz")));
        assert!(!nav.page().unwrap().has_next());
        assert!(nav.go_next().is_none());
    }

    #[test]
    fn test_debounced_search_issues_once() {
        let start = Instant::now();
        let mut nav = Navigator::default();
        let req = nav.select_database("users");
        nav.apply_listing(req.id, page(&["a"], None));

        nav.search_input("al", start);
        assert!(nav.poll_search(start + Duration::from_millis(100)).is_none());
        nav.search_input("ali", start + Duration::from_millis(150));
        assert!(nav.poll_search(start + Duration::from_millis(400)).is_none());

        let req = nav.poll_search(start + Duration::from_millis(450)).unwrap();
        assert_eq!(req.snapshot, snapshot(None, "ali"));
        assert!(nav.poll_search(start + Duration::from_secs(10)).is_none());
        assert!(nav.search_deadline().is_none());
    }

    #[test]
    fn test_submit_and_clear_bypass_debounce() {
        let start = Instant::now();
        let mut nav = Navigator::default();
        nav.select_database("users");

        nav.search_input("al", start);
        let req = nav.submit_search("al").unwrap();
        assert_eq!(req.snapshot.prefix, "al");
        assert!(nav.pending_search().is_none());

        nav.search_input("xyz", start);
        let req = nav.clear_search().unwrap();
        assert_eq!(req.snapshot, snapshot(None, ""));
        assert!(nav.poll_search(start + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_failure_leaves_pagination_unchanged() {
        let mut nav = Navigator::default();
        let req = nav.select_database("users");
        nav.apply_listing(req.id, page(&["a"], Some("c")));
        let req = nav.go_next().unwrap();

        let applied = nav.apply_listing::<&str>(req.id, Err("500 Internal Server Error"));
        assert_eq!(applied, Applied::Applied);
        assert!(matches!(nav.listing(), ListingState::Failed(msg) if msg.contains("500")));
        assert_eq!(nav.session().cursor(), Some("c"));
        assert_eq!(nav.history().len(), 1);

        let retry = nav.retry().unwrap();
        assert_eq!(retry.snapshot, snapshot(Some("c"), ""));
        assert_eq!(nav.history().len(), 1);
    }

    #[test]
    fn test_select_database_supersedes_and_resets() {
        let start = Instant::now();
        let mut nav = Navigator::default();
        let old = nav.select_database("users");
        nav.go_to_page(Some("c".to_string()), "al");
        nav.search_input("ali", start);

        let req = nav.select_database("orders");
        assert!(old.cancel.is_cancelled());
        assert_eq!(req.snapshot, snapshot(None, ""));
        assert!(nav.history().is_empty());
        assert!(nav.poll_search(start + Duration::from_secs(1)).is_none());
        assert_eq!(nav.session().active_database(), Some("orders"));
    }

    #[test]
    fn test_navigation_requires_database() {
        let mut nav = Navigator::default();
        assert!(nav.go_to_page(None, "a").is_none());
        assert!(nav.submit_search("a").is_none());
        assert!(nav.reload("users").is_none());
        assert!(nav.go_back().is_none());
        assert_eq!(nav.listing(), &ListingState::Idle);
    }

    #[test]
    fn test_reload_keeps_prefix_and_resets_history() {
        let mut nav = Navigator::default();
        nav.select_database("users");
        nav.submit_search("user:");
        nav.go_to_page(Some("user:5".to_string()), "user:");
        assert_eq!(nav.history().len(), 1);

        let req = nav.reload("users").unwrap();
        assert_eq!(req.snapshot, snapshot(None, "user:"));
        assert!(nav.history().is_empty());
    }

    #[test]
    fn test_remove_key_removes_one_row() {
        let mut nav = Navigator::default();
        let req = nav.select_database("users");
        nav.apply_listing(req.id, page(&["a", "b", "c"], None));

        assert!(nav.remove_key("users", "b"));
        assert!(!nav.remove_key("users", "b"));
        assert_eq!(nav.page().unwrap().keys, vec!["a", "c"]);
    }

    #[test]
    fn test_late_removal_ignores_other_database() {
        let mut nav = Navigator::default();
        let req = nav.select_database("users");
        nav.apply_listing(req.id, page(&["a", "b"], None));

        // Deletion in users completes after switching to orders
        let req = nav.select_database("orders");
        nav.apply_listing(req.id, page(&["a", "z"], None));

        assert!(!nav.remove_key("users", "a"));
        assert_eq!(nav.page().unwrap().keys, vec!["a", "z"]);
    }

    #[test]
    fn test_late_reload_ignores_other_database() {
        let mut nav = Navigator::default();
        nav.select_database("users");
        let req = nav.select_database("orders");
        nav.apply_listing(req.id, page(&["a"], Some("a")));
        nav.go_next();
        assert_eq!(nav.history().len(), 1);

        assert!(nav.reload("users").is_none());
        assert_eq!(nav.history().len(), 1);
        assert!(nav.is_loading());
    }
}
