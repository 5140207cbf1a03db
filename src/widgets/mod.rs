pub mod header;
pub mod interfaces;
pub mod overview;
pub mod ports_table;
pub mod process_table;
pub mod rate_graph;
pub mod scroll;
pub mod search_bar;

pub use self::header::HeaderWidget;
pub use self::interfaces::InterfacesWidget;
pub use self::overview::OverviewWidget;
pub use self::ports_table::PortsTableWidget;
pub use self::process_table::ProcessTableWidget;
pub use self::rate_graph::RateGraphWidget;
pub use self::scroll::ScrollState;
pub use self::search_bar::SearchBarWidget;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::core::filters::Highlighted;

/// Style applied to the parts of a cell that matched the search query
pub const MATCH_STYLE: Style = Style::new().fg(Color::Black).bg(Color::Yellow);

pub fn highlighted_line(cell: &Highlighted) -> Line<'static> {
    let spans: Vec<Span<'static>> = cell
        .segments
        .iter()
        .map(|seg| {
            if seg.highlighted {
                Span::styled(seg.text.clone(), MATCH_STYLE)
            } else {
                Span::raw(seg.text.clone())
            }
        })
        .collect();
    Line::from(spans)
}
