use kvscope_types::PageSnapshot;

/// Pages visited before the current one, most recent on top
#[derive(Clone, Debug, Default)]
pub struct PageHistory {
    stack: Vec<PageSnapshot>,
}

impl PageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: PageSnapshot) {
        self.stack.push(snapshot);
    }

    pub fn pop(&mut self) -> Option<PageSnapshot> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&PageSnapshot> {
        self.stack.last()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn contains(&self, snapshot: &PageSnapshot) -> bool {
        self.stack.contains(snapshot)
    }

    /// Drop `snapshot` and everything pushed after it.
    /// Returns false if the snapshot was not in the history.
    pub fn discard_from(&mut self, snapshot: &PageSnapshot) -> bool {
        match self.stack.iter().position(|s| s == snapshot) {
            Some(idx) => {
                self.stack.truncate(idx);
                true
            }
            None => false,
        }
    }
}
