use kvscope_types::PageSnapshot;

/// The selected database and the page currently on screen
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    /// Selected database (None until the user picks one)
    active_database: Option<String>,

    /// Active prefix filter (empty matches every key)
    prefix: String,

    /// Continuation token of the current page (None = first page)
    cursor: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_database(&self) -> Option<&str> {
        self.active_database.as_deref()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// The `(cursor, prefix)` pair of the current page
    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot::new(self.cursor.clone(), self.prefix.clone())
    }

    /// Make `name` the active database and go back to its unfiltered first page
    pub(crate) fn select(&mut self, name: String) {
        self.active_database = Some(name);
        self.prefix.clear();
        self.cursor = None;
    }

    pub(crate) fn restore(&mut self, snapshot: PageSnapshot) {
        self.cursor = snapshot.cursor;
        self.prefix = snapshot.prefix;
    }

    pub(crate) fn rewind(&mut self) {
        self.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_resets_position() {
        let mut session = Session::new();
        session.select("users".to_string());
        session.restore(PageSnapshot::new(Some("k".to_string()), "al"));
        assert_eq!(session.prefix(), "al");

        session.select("orders".to_string());
        assert_eq!(session.active_database(), Some("orders"));
        assert_eq!(session.snapshot(), PageSnapshot::new(None, ""));
    }
}
