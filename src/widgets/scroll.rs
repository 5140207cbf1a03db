/// Vertical scroll position of a table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    offset: usize,
}

impl ScrollState {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.offset = self.offset.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: usize, total_rows: usize, visible_rows: usize) {
        let max_scroll = total_rows.saturating_sub(visible_rows);
        self.offset = (self.offset + amount).min(max_scroll);
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
    }

    pub fn scroll_to_bottom(&mut self, total_rows: usize, visible_rows: usize) {
        self.offset = total_rows.saturating_sub(visible_rows);
    }

    /// First row to draw, pulled back if the list shrank under the offset
    pub fn start(&self, total_rows: usize, visible_rows: usize) -> usize {
        self.offset.min(total_rows.saturating_sub(visible_rows))
    }
}
