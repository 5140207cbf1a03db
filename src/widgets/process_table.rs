use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Style, Stylize},
    widgets::{Block, BorderType, Cell, Paragraph, Row, Table, Widget},
};

use crate::core::filters::ProcColumns;
use crate::core::model::Model;
use crate::widgets::{highlighted_line, ScrollState};

/// Processes ranked by open socket count
pub struct ProcessTableWidget<'a> {
    model: &'a Model,
    scroll: &'a ScrollState,
}

impl<'a> ProcessTableWidget<'a> {
    pub fn new(model: &'a Model, scroll: &'a ScrollState) -> Self {
        Self { model, scroll }
    }

    fn block(&self, shown: usize) -> Block<'static> {
        let total = self.model.procs().len();
        let title = if shown == total {
            format!("Connections by Process ({})", total)
        } else {
            format!("Connections by Process ({}/{})", shown, total)
        };
        Block::bordered()
            .title(title)
            .title_style(Style::new().bold().fg(Color::Cyan))
            .border_type(BorderType::Plain)
            .border_style(Style::new().fg(Color::Blue))
    }
}

impl Widget for &ProcessTableWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.model.procs().is_empty() {
            Paragraph::new("No data (yet)…")
                .style(Style::new().fg(Color::Gray))
                .block(self.block(0))
                .render(area, buf);
            return;
        }

        let cols = ProcColumns::for_width(area.width.saturating_sub(2) as usize);
        let rows = self.model.proc_rows(cols);

        let visible_rows = area.height.saturating_sub(4) as usize;
        let start = self.scroll.start(rows.len(), visible_rows);

        let table_rows: Vec<Row> = rows
            .iter()
            .skip(start)
            .take(visible_rows)
            .map(|row| {
                let mut cells = row.cells.iter().map(|cell| Cell::from(highlighted_line(cell)));
                let pid = cells.next().map(|c| c.style(Style::new().fg(Color::Green)));
                Row::new(pid.into_iter().chain(cells))
            })
            .collect();

        let widths = [
            Constraint::Length(cols.pid as u16),
            Constraint::Length(cols.name as u16),
            Constraint::Length(cols.conns as u16),
            Constraint::Length(cols.listen as u16),
        ];

        let table = Table::new(table_rows, widths)
            .header(
                Row::new(vec!["PID", "Process Name", "Conns", "Listen"])
                    .style(Style::new().bold().fg(Color::White))
                    .bottom_margin(1),
            )
            .block(self.block(rows.len()));

        table.render(area, buf);
    }
}
