use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style, Stylize},
    symbols,
    text::Span,
    widgets::{Block, BorderType, Sparkline, Widget},
};

use crate::core::history::HistoryBuffer;
use crate::core::utils::human_bytes_per_sec;

const SCALE_WIDTH: u16 = 11;

/// Sparkline of one direction's rate history, newest sample on the right
pub struct RateGraphWidget<'a> {
    label: &'static str,
    history: &'a HistoryBuffer,
    color: Color,
}

impl<'a> RateGraphWidget<'a> {
    pub fn new(label: &'static str, history: &'a HistoryBuffer, color: Color) -> Self {
        Self { label, history, color }
    }

    fn title(&self) -> String {
        match self.history.latest() {
            Some(bps) => format!("{} {}", self.label, human_bytes_per_sec(bps)),
            None => self.label.to_string(),
        }
    }
}

/// Rounds `max` up to one significant digit so the scale label stays stable
fn round_scale(max: u64) -> u64 {
    if max == 0 {
        return 1;
    }
    let magnitude = (max as f64).log10().floor() as u32;
    let base = 10u64.pow(magnitude);
    ((max as f64 / base as f64).ceil() as u64) * base
}

impl Widget for &RateGraphWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(self.title())
            .title_style(Style::new().bold().fg(self.color))
            .border_type(BorderType::Plain)
            .border_style(Style::new().fg(Color::Blue));

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.history.is_empty() || inner_area.width <= SCALE_WIDTH || inner_area.height < 1 {
            return;
        }

        let available_points = (inner_area.width - SCALE_WIDTH) as usize;
        let tail = self.history.tail_as_u64(available_points);
        let max_value = round_scale(tail.iter().copied().max().unwrap_or(0));

        let max_marker = Span::styled(human_bytes_per_sec(max_value as f64), Style::default().fg(Color::Gray));
        buf.set_span(inner_area.x, inner_area.y, &max_marker, SCALE_WIDTH - 1);

        if inner_area.height > 1 {
            let min_marker = Span::styled("0", Style::default().fg(Color::Gray));
            buf.set_span(inner_area.x, inner_area.bottom() - 1, &min_marker, SCALE_WIDTH - 1);
        }

        let mut data = vec![0; available_points - tail.len()];
        data.extend(tail);

        let sparkline_area = Rect {
            x: inner_area.x + SCALE_WIDTH,
            y: inner_area.y,
            width: inner_area.width - SCALE_WIDTH,
            height: inner_area.height,
        };

        Sparkline::default()
            .data(&data)
            .max(max_value)
            .style(Style::default().fg(self.color))
            .bar_set(symbols::bar::NINE_LEVELS)
            .render(sparkline_area, buf);
    }
}
