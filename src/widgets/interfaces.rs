use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Paragraph, Widget, Wrap},
};

use crate::core::iface::InterfaceInfo;
use crate::core::model::Model;
use crate::core::utils::{human_bytes, human_bytes_per_sec};
use crate::widgets::RateGraphWidget;

/// Interface list on top, details and RX/TX history for the selected one below
pub struct InterfacesWidget<'a> {
    model: &'a Model,
}

impl<'a> InterfacesWidget<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    fn render_list(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title("Interfaces (↑/↓ to select)")
            .title_style(Style::new().bold().fg(Color::Cyan))
            .border_type(BorderType::Plain)
            .border_style(Style::new().fg(Color::Blue));

        let Some(snap) = self.model.snapshot() else {
            Paragraph::new("Collecting data…")
                .style(Style::new().fg(Color::Gray))
                .block(block)
                .render(area, buf);
            return;
        };

        let visible = area.height.saturating_sub(2) as usize;
        let selected = self.model.selected_index();
        // keep the selected row on screen
        let start = match selected {
            Some(idx) if visible > 0 && idx >= visible => idx + 1 - visible,
            _ => 0,
        };

        let lines: Vec<Line> = snap
            .interfaces
            .iter()
            .enumerate()
            .skip(start)
            .take(visible)
            .map(|(idx, iface)| list_line(iface, selected == Some(idx)))
            .collect();

        Paragraph::new(Text::from(lines)).block(block).render(area, buf);
    }

    fn render_details(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title("Details")
            .title_style(Style::new().bold().fg(Color::Cyan))
            .border_type(BorderType::Plain)
            .border_style(Style::new().fg(Color::Blue));

        let Some(iface) = self.model.selected_interface() else {
            Paragraph::new("No interface selected")
                .style(Style::new().fg(Color::Gray))
                .block(block)
                .render(area, buf);
            return;
        };

        Paragraph::new(Text::from(detail_lines(iface)))
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

fn list_line(iface: &InterfaceInfo, selected: bool) -> Line<'static> {
    let marker = if iface.is_up {
        Span::styled("● ", Style::new().fg(Color::Green))
    } else {
        Span::styled("○ ", Style::new().fg(Color::Red))
    };
    let hardware = if iface.hardware.is_empty() { "-" } else { iface.hardware.as_str() };

    let line = Line::from(vec![
        marker,
        Span::styled(format!("{:<16}", iface.name), Style::new().bold()),
        Span::raw(format!(
            " MAC {}  RX {}  TX {}",
            hardware,
            human_bytes_per_sec(iface.rx_bps),
            human_bytes_per_sec(iface.tx_bps),
        )),
    ]);

    if selected {
        line.style(Style::new().add_modifier(Modifier::REVERSED))
    } else {
        line
    }
}

fn detail_lines(iface: &InterfaceInfo) -> Vec<Line<'static>> {
    let label = Style::new().fg(Color::Gray);
    let state = if iface.is_up {
        Span::styled("up", Style::new().fg(Color::Green).bold())
    } else {
        Span::styled("down", Style::new().fg(Color::Red).bold())
    };

    let mut lines = vec![
        Line::from(vec![Span::styled("Name:  ", label), Span::raw(iface.name.clone())]),
        Line::from(vec![Span::styled("Kind:  ", label), Span::raw(iface.kind.as_str())]),
        Line::from(vec![Span::styled("State: ", label), state]),
        Line::from(vec![Span::styled("MTU:   ", label), Span::raw(iface.mtu.to_string())]),
        Line::from(vec![
            Span::styled("MAC:   ", label),
            Span::raw(if iface.hardware.is_empty() { "-".to_string() } else { iface.hardware.clone() }),
        ]),
        Line::from(vec![
            Span::styled("RX:    ", label),
            Span::styled(human_bytes_per_sec(iface.rx_bps), Style::new().fg(Color::Green)),
            Span::raw(format!("  (total {})", human_bytes(iface.rx_total))),
        ]),
        Line::from(vec![
            Span::styled("TX:    ", label),
            Span::styled(human_bytes_per_sec(iface.tx_bps), Style::new().fg(Color::Magenta)),
            Span::raw(format!("  (total {})", human_bytes(iface.tx_total))),
        ]),
        Line::from(Span::styled("Addresses:", label)),
    ];

    if iface.addrs.is_empty() {
        lines.push(Line::from("  -"));
    }
    lines.extend(iface.addrs.iter().map(|addr| Line::from(format!("  {}", addr))));
    lines
}

impl Widget for &InterfacesWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let count = self.model.snapshot().map(|s| s.interfaces.len()).unwrap_or(1) as u16;
        let list_height = (count + 2).min(area.height / 2).max(3);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(list_height), Constraint::Min(0)])
            .split(area);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[1]);

        let graphs = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(bottom[1]);

        self.render_list(rows[0], buf);
        self.render_details(bottom[0], buf);

        let history = self.model.history();
        (&RateGraphWidget::new("RX", history.rx(), Color::Green)).render(graphs[0], buf);
        (&RateGraphWidget::new("TX", history.tx(), Color::Magenta)).render(graphs[1], buf);
    }
}
