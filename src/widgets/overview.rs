use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Paragraph, Widget, Wrap},
};

use crate::core::model::Model;
use crate::core::utils::{format_uptime, human_bytes_per_sec};

pub struct OverviewWidget<'a> {
    model: &'a Model,
    external_ip_enabled: bool,
}

impl<'a> OverviewWidget<'a> {
    pub fn new(model: &'a Model, external_ip_enabled: bool) -> Self {
        Self { model, external_ip_enabled }
    }

    fn host_lines(&self) -> Vec<Line<'static>> {
        let Some(snap) = self.model.snapshot() else {
            return vec![Line::from(Span::styled("Collecting data…", Style::new().fg(Color::Gray)))];
        };

        let (up, down) = snap.up_down();
        let mut lines = vec![
            field("Host", snap.hostname.clone()),
            field("Uptime", format_uptime(snap.uptime)),
            field("Captured", snap.taken_at.format("%Y-%m-%d %H:%M:%S %:z").to_string()),
            Line::from(vec![
                Span::styled(format!("{:<12}", "Interfaces"), Style::new().fg(Color::Gray)),
                Span::styled(snap.interfaces.len().to_string(), Style::new().fg(Color::Green).bold()),
                Span::raw(" total, "),
                Span::styled(up.to_string(), Style::new().fg(Color::Green).bold()),
                Span::raw(" up, "),
                Span::styled(down.to_string(), Style::new().fg(Color::Red).bold()),
                Span::raw(" down"),
            ]),
        ];

        match self.model.selected_interface() {
            Some(iface) => {
                lines.push(field("Selected", format!("{} ({})", iface.name, iface.kind.as_str())));
                lines.push(field(
                    "Traffic",
                    format!(
                        "RX {}  TX {}",
                        human_bytes_per_sec(iface.rx_bps),
                        human_bytes_per_sec(iface.tx_bps)
                    ),
                ));
                if let Some(addr) = iface.addrs.first() {
                    lines.push(field("Address", addr.clone()));
                }
            }
            None => lines.push(field("Selected", "-".to_string())),
        }
        lines
    }

    fn external_ip_lines(&self) -> Vec<Line<'static>> {
        if !self.external_ip_enabled {
            return vec![field("External IP", "disabled".to_string())];
        }

        let ext = self.model.external_ip();
        let mut value = vec![
            Span::styled(format!("{:<12}", "External IP"), Style::new().fg(Color::Gray)),
            Span::styled(
                ext.ip.clone().unwrap_or_else(|| "resolving…".to_string()),
                Style::new().fg(Color::Yellow).bold(),
            ),
        ];
        if let Some(at) = ext.updated_at {
            value.push(Span::styled(
                format!("  updated {}", at.format("%H:%M:%S")),
                Style::new().fg(Color::Gray),
            ));
        }

        let mut lines = vec![Line::from(value)];
        if let Some(err) = &ext.error {
            lines.push(Line::from(Span::styled(
                format!("{:<12}{}", "", err),
                Style::new().fg(Color::Red),
            )));
        }
        lines
    }
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::new().fg(Color::Gray)),
        Span::raw(value),
    ])
}

impl Widget for &OverviewWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = self.host_lines();
        lines.push(Line::default());
        lines.extend(self.external_ip_lines());

        Paragraph::new(Text::from(lines))
            .block(
                Block::bordered()
                    .title("Overview")
                    .title_style(Style::new().bold().fg(Color::Cyan))
                    .border_type(BorderType::Plain)
                    .border_style(Style::new().fg(Color::Blue)),
            )
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::Message;
    use crate::error::NetViewError;

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_collecting_before_first_snapshot() {
        let model = Model::new();
        let widget = OverviewWidget::new(&model, true);
        assert_eq!(text(&widget.host_lines()), "Collecting data…");
        assert!(text(&widget.external_ip_lines()).contains("resolving…"));
    }

    #[test]
    fn test_external_ip_error_keeps_last_value() {
        let mut model = Model::new();
        model.apply(Message::ExternalIp(Ok("198.51.100.4".into())));
        model.apply(Message::ExternalIp(Err(NetViewError::EmptyResponse)));

        let widget = OverviewWidget::new(&model, true);
        let shown = text(&widget.external_ip_lines());
        assert!(shown.contains("198.51.100.4"));
        assert!(shown.contains("updated "));
        assert!(shown.contains("empty response"));
    }

    #[test]
    fn test_disabled_external_ip() {
        let model = Model::new();
        let widget = OverviewWidget::new(&model, false);
        assert!(text(&widget.external_ip_lines()).contains("disabled"));
    }
}
