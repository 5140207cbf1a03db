use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::core::filters::SearchState;

/// One-line search prompt shown above the ports and processes tables
pub struct SearchBarWidget<'a> {
    search: &'a SearchState,
}

impl<'a> SearchBarWidget<'a> {
    pub fn new(search: &'a SearchState) -> Self {
        Self { search }
    }

    fn line(&self) -> Line<'a> {
        if self.search.is_editing() {
            return Line::from(vec![
                Span::styled("Search: ", Style::new().fg(Color::White)),
                Span::styled(format!("{}_", self.search.input()), Style::new().fg(Color::Yellow)),
                Span::styled("  (enter: apply, esc: cancel)", Style::new().fg(Color::Gray)),
            ]);
        }

        if self.search.query().is_empty() {
            return Line::from(Span::styled("Press / to search", Style::new().fg(Color::Gray)));
        }

        Line::from(vec![
            Span::raw("Filter: "),
            Span::styled(self.search.query().to_string(), Style::new().fg(Color::Yellow)),
            Span::styled(" (press / to change, ctrl+u to clear)", Style::new().fg(Color::Gray)),
        ])
    }
}

impl Widget for &SearchBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.line()).render(area, buf);
    }
}
