use tracing::debug;

use crate::models::Question;

/// Cursor over the current generation batch. Movement is clamped to the
/// batch; it never wraps and never touches the items.
#[derive(Debug, Default)]
pub struct Navigator {
    items: Vec<Question>,
    cursor: usize,
}

impl Navigator {
    /// Replaces the batch and rewinds to the first question.
    pub fn reset(&mut self, items: Vec<Question>) {
        self.items = items;
        self.cursor = 0;
    }

    pub fn next(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
        debug!(cursor = self.cursor, "navigator next");
    }

    pub fn previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        debug!(cursor = self.cursor, "navigator previous");
    }

    /// `None` when the batch is empty; the view then shows "No questions available".
    pub fn current(&self) -> Option<&Question> {
        self.items.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
