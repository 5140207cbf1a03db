use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Tabs, Widget},
};

use crate::app::Tab;

/// Title bar with the terminal size and the tab strip
pub struct HeaderWidget {
    active: Tab,
    size: (u16, u16),
}

impl HeaderWidget {
    pub fn new(active: Tab, size: (u16, u16)) -> Self {
        Self { active, size }
    }
}

impl Widget for &HeaderWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(concat!("netview ", env!("CARGO_PKG_VERSION")))
            .title_top(Line::from(format!("{}x{}", self.size.0, self.size.1)).right_aligned())
            .title_style(Style::new().bold().fg(Color::Cyan))
            .border_type(BorderType::Plain)
            .border_style(Style::new().fg(Color::Blue));

        Tabs::new(Tab::ALL.iter().map(|t| t.title()))
            .select(self.active.index())
            .style(Style::new().fg(Color::Gray))
            .highlight_style(Style::new().bold().fg(Color::Yellow))
            .divider("|")
            .block(block)
            .render(area, buf);
    }
}
