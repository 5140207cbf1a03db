use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Style, Stylize},
    widgets::{Block, BorderType, Cell, Paragraph, Row, Table, Widget},
};

use crate::core::filters::PortColumns;
use crate::core::model::Model;
use crate::widgets::{highlighted_line, ScrollState};

pub struct PortsTableWidget<'a> {
    model: &'a Model,
    scroll: &'a ScrollState,
}

impl<'a> PortsTableWidget<'a> {
    pub fn new(model: &'a Model, scroll: &'a ScrollState) -> Self {
        Self { model, scroll }
    }

    fn block(&self, shown: usize) -> Block<'static> {
        let total = self.model.ports().len();
        let title = if shown == total {
            format!("Listening Ports ({})", total)
        } else {
            format!("Listening Ports ({}/{})", shown, total)
        };
        Block::bordered()
            .title(title)
            .title_style(Style::new().bold().fg(Color::Cyan))
            .border_type(BorderType::Plain)
            .border_style(Style::new().fg(Color::Blue))
    }
}

impl Widget for &PortsTableWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.model.ports().is_empty() {
            Paragraph::new("No data (yet)…")
                .style(Style::new().fg(Color::Gray))
                .block(self.block(0))
                .render(area, buf);
            return;
        }

        let cols = PortColumns::for_width(area.width.saturating_sub(2) as usize);
        let rows = self.model.port_rows(cols);

        // borders plus header row and its margin
        let visible_rows = area.height.saturating_sub(4) as usize;
        let start = self.scroll.start(rows.len(), visible_rows);

        let table_rows: Vec<Row> = rows
            .iter()
            .skip(start)
            .take(visible_rows)
            .map(|row| Row::new(row.cells.iter().map(|cell| Cell::from(highlighted_line(cell)))))
            .collect();

        let widths = [
            Constraint::Length(cols.proto as u16),
            Constraint::Length(cols.local as u16),
            Constraint::Length(cols.pid as u16),
            Constraint::Length(cols.process as u16),
        ];

        let table = Table::new(table_rows, widths)
            .header(
                Row::new(vec!["Proto", "Local Address", "PID", "Process"])
                    .style(Style::new().bold().fg(Color::White))
                    .bottom_margin(1),
            )
            .block(self.block(rows.len()));

        table.render(area, buf);
    }
}
