//! Read-time search over the ports and processes lists.
//!
//! Nothing here mutates the stored collections: every function borrows the
//! rows and returns a projection, so clearing a query always gets the full
//! list back.

use unicode_width::UnicodeWidthChar;

use super::connection::ListenPort;
use super::process::ProcNet;

const ELLIPSIS: char = '…';

/// Query being composed vs. query applied, for one list
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    query: String,
    input: String,
    editing: bool,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn begin_edit(&mut self) {
        self.input = self.query.clone();
        self.editing = true;
    }

    pub fn push(&mut self, c: char) {
        if self.editing {
            self.input.push(c);
        }
    }

    pub fn pop(&mut self) {
        if self.editing {
            self.input.pop();
        }
    }

    pub fn confirm(&mut self) {
        self.query = self.input.trim().to_string();
        self.editing = false;
    }

    pub fn cancel(&mut self) {
        self.editing = false;
    }

    /// Clears the input while editing, otherwise the applied query
    pub fn clear(&mut self) {
        self.input.clear();
        if !self.editing {
            self.query.clear();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

/// A cell's text split into plain and matched runs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Highlighted {
    pub segments: Vec<Segment>,
}

impl Highlighted {
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::default();
        }
        Self { segments: vec![Segment { text, highlighted: false }] }
    }

    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn has_match(&self) -> bool {
        self.segments.iter().any(|s| s.highlighted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRow {
    pub cells: Vec<Highlighted>,
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn folded(s: &str) -> Vec<char> {
    s.chars().map(fold).collect()
}

/// Case-insensitive substring test, compared code point by code point
pub fn contains_fold(haystack: &str, needle: &str) -> bool {
    let needle = folded(needle.trim());
    if needle.is_empty() {
        return true;
    }
    folded(haystack).windows(needle.len()).any(|w| w == needle.as_slice())
}

/// Splits `text` into runs, marking every non-overlapping case-insensitive
/// occurrence of `query`.
pub fn highlight(text: &str, query: &str) -> Highlighted {
    let needle = folded(query.trim());
    if needle.is_empty() {
        return Highlighted::plain(text);
    }

    let chars: Vec<char> = text.chars().collect();
    let hay: Vec<char> = chars.iter().copied().map(fold).collect();

    let mut segments = Vec::new();
    let mut pending = String::new();
    let mut i = 0;
    while i < chars.len() {
        if i + needle.len() <= chars.len() && hay[i..i + needle.len()] == needle[..] {
            if !pending.is_empty() {
                segments.push(Segment { text: std::mem::take(&mut pending), highlighted: false });
            }
            segments.push(Segment {
                text: chars[i..i + needle.len()].iter().collect(),
                highlighted: true,
            });
            i += needle.len();
        } else {
            pending.push(chars[i]);
            i += 1;
        }
    }
    if !pending.is_empty() {
        segments.push(Segment { text: pending, highlighted: false });
    }

    Highlighted { segments }
}

/// Cuts `s` to at most `width` display columns, marking the cut with an
/// ellipsis.
pub fn truncate_to_width(s: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return s.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push(ELLIPSIS);
    out
}

/// Column widths for the ports table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortColumns {
    pub proto: usize,
    pub local: usize,
    pub pid: usize,
    pub process: usize,
}

impl PortColumns {
    pub fn for_width(width: usize) -> Self {
        let proto = 4;
        let pid = 7;
        let local = width.saturating_sub(proto + 2 + pid + 1 + 12).clamp(18, 38);
        let process = width.saturating_sub(proto + 2 + local + 2 + pid + 1).max(5);
        Self { proto, local, pid, process }
    }
}

/// Column widths for the processes table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcColumns {
    pub pid: usize,
    pub name: usize,
    pub conns: usize,
    pub listen: usize,
}

impl ProcColumns {
    pub fn for_width(width: usize) -> Self {
        let pid = 7;
        let conns = 6;
        let listen = 6;
        let name = width.saturating_sub(pid + 2 + conns + 2 + listen).clamp(16, 40);
        Self { pid, name, conns, listen }
    }
}

pub fn port_matches(port: &ListenPort, query: &str) -> bool {
    contains_fold(port.display_local(), query)
        || contains_fold(port.display_process(), query)
        || contains_fold(port.proto.as_str(), query)
}

pub fn proc_matches(proc: &ProcNet, query: &str) -> bool {
    contains_fold(proc.display_name(), query) || contains_fold(&proc.pid.to_string(), query)
}

pub fn filter_ports<'a>(ports: &'a [ListenPort], query: &str) -> Vec<&'a ListenPort> {
    ports.iter().filter(|p| port_matches(p, query)).collect()
}

pub fn filter_procs<'a>(procs: &'a [ProcNet], query: &str) -> Vec<&'a ProcNet> {
    procs.iter().filter(|p| proc_matches(p, query)).collect()
}

/// Filtered, truncated and highlighted port rows
pub fn project_ports(ports: &[ListenPort], query: &str, cols: PortColumns) -> Vec<RenderRow> {
    filter_ports(ports, query)
        .into_iter()
        .map(|p| RenderRow {
            cells: vec![
                highlight(&truncate_to_width(p.proto.as_str(), cols.proto), query),
                highlight(&truncate_to_width(p.display_local(), cols.local), query),
                Highlighted::plain(truncate_to_width(&p.pid.to_string(), cols.pid)),
                highlight(&truncate_to_width(p.display_process(), cols.process), query),
            ],
        })
        .collect()
}

/// Filtered, truncated and highlighted process rows
pub fn project_procs(procs: &[ProcNet], query: &str, cols: ProcColumns) -> Vec<RenderRow> {
    filter_procs(procs, query)
        .into_iter()
        .map(|p| RenderRow {
            cells: vec![
                highlight(&truncate_to_width(&p.pid.to_string(), cols.pid), query),
                highlight(&truncate_to_width(p.display_name(), cols.name), query),
                Highlighted::plain(truncate_to_width(&p.conn_count.to_string(), cols.conns)),
                Highlighted::plain(truncate_to_width(&p.listen_count.to_string(), cols.listen)),
            ],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::connection::Protocol;

    fn port(proto: Protocol, local: &str, pid: u32, process: &str) -> ListenPort {
        ListenPort { proto, local: local.into(), pid, process: process.into() }
    }

    fn sample_ports() -> Vec<ListenPort> {
        vec![
            port(Protocol::Tcp, "0.0.0.0:8080", 100, "nginx"),
            port(Protocol::Tcp, "127.0.0.1:443", 200, "Caddy"),
            port(Protocol::Udp, "0.0.0.0:53", 0, ""),
        ]
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let ports = sample_ports();
        let filtered = filter_ports(&ports, "");
        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered[0], &ports[0]);

        let whitespace = filter_ports(&ports, "   ");
        assert_eq!(whitespace.len(), 3);
    }

    #[test]
    fn test_query_matches_local_address() {
        let ports = sample_ports();
        let filtered = filter_ports(&ports, "80");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].local, "0.0.0.0:8080");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let ports = sample_ports();
        assert_eq!(filter_ports(&ports, "TCP").len(), 2);
        assert_eq!(filter_ports(&ports, "caddy").len(), 1);
        assert_eq!(filter_ports(&ports, "NGINX")[0].pid, 100);
    }

    #[test]
    fn test_placeholder_process_is_searchable() {
        let ports = sample_ports();
        let filtered = filter_ports(&ports, "-");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].proto, Protocol::Udp);
    }

    #[test]
    fn test_procs_match_name_or_pid() {
        let procs = vec![
            ProcNet { pid: 4242, name: "firefox".into(), conn_count: 9, listen_count: 0 },
            ProcNet { pid: 17, name: "sshd".into(), conn_count: 2, listen_count: 1 },
        ];
        assert_eq!(filter_procs(&procs, "42")[0].name, "firefox");
        assert_eq!(filter_procs(&procs, "SSH")[0].pid, 17);
        assert!(filter_procs(&procs, "chrome").is_empty());
    }

    #[test]
    fn test_projection_leaves_source_untouched() {
        let ports = sample_ports();
        let before = ports.clone();
        let cols = PortColumns::for_width(80);

        let narrowed = project_ports(&ports, "nginx", cols);
        assert_eq!(narrowed.len(), 1);

        let full = project_ports(&ports, "", cols);
        assert_eq!(ports, before);
        assert_eq!(full.len(), ports.len());
        assert_eq!(full[1].cells[1].text(), "127.0.0.1:443");
        assert!(full.iter().all(|row| row.cells.iter().all(|c| !c.has_match())));
    }

    #[test]
    fn test_highlight_marks_every_occurrence() {
        let h = highlight("abcABCab", "ab");
        let parts: Vec<(&str, bool)> = h.segments.iter().map(|s| (s.text.as_str(), s.highlighted)).collect();
        assert_eq!(parts, vec![("ab", true), ("c", false), ("AB", true), ("C", false), ("ab", true)]);
        assert_eq!(h.text(), "abcABCab");
    }

    #[test]
    fn test_highlight_is_non_overlapping() {
        let h = highlight("aaaa", "aa");
        assert_eq!(h.segments.len(), 2);
        assert!(h.segments.iter().all(|s| s.highlighted && s.text == "aa"));
    }

    #[test]
    fn test_highlight_multibyte_text() {
        let h = highlight("Überweisung-über", "ÜBER");
        let parts: Vec<(&str, bool)> = h.segments.iter().map(|s| (s.text.as_str(), s.highlighted)).collect();
        assert_eq!(parts, vec![("Über", true), ("weisung-", false), ("über", true)]);
    }

    #[test]
    fn test_highlight_empty_query_is_plain() {
        assert_eq!(highlight("nginx", ""), Highlighted::plain("nginx"));
        assert_eq!(highlight("", "x"), Highlighted::default());
    }

    #[test]
    fn test_highlight_runs_on_truncated_text() {
        let procs = vec![ProcNet {
            pid: 1,
            name: "a-very-long-process-name-that-ends-with-needle".into(),
            conn_count: 1,
            listen_count: 0,
        }];
        let cols = ProcColumns { pid: 7, name: 16, conns: 6, listen: 6 };
        let rows = project_procs(&procs, "needle", cols);

        assert_eq!(rows.len(), 1);
        let name = &rows[0].cells[1];
        assert_eq!(name.text().chars().count(), 16);
        assert!(!name.has_match());
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("nginx", 10), "nginx");
        assert_eq!(truncate_to_width("nginx", 5), "nginx");
        assert_eq!(truncate_to_width("nginx-worker", 6), "nginx…");
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn test_search_state_editing_does_not_touch_query() {
        let mut s = SearchState::new();
        s.begin_edit();
        for c in " tcp ".chars() {
            s.push(c);
        }
        assert!(s.is_editing());
        assert_eq!(s.query(), "");

        s.confirm();
        assert_eq!(s.query(), "tcp");
        assert!(!s.is_editing());

        s.begin_edit();
        assert_eq!(s.input(), "tcp");
        s.pop();
        s.cancel();
        assert_eq!(s.query(), "tcp");
    }

    #[test]
    fn test_search_state_clear() {
        let mut s = SearchState::new();
        s.begin_edit();
        s.push('x');
        s.confirm();

        s.begin_edit();
        s.clear();
        assert_eq!(s.input(), "");
        assert_eq!(s.query(), "x");
        s.cancel();

        s.clear();
        assert_eq!(s.query(), "");
    }

    #[test]
    fn test_column_widths() {
        let cols = PortColumns::for_width(120);
        assert_eq!(cols.local, 38);
        assert_eq!(cols.process, 120 - (4 + 2 + 38 + 2 + 7 + 1));

        let narrow = PortColumns::for_width(20);
        assert_eq!(narrow.local, 18);
        assert_eq!(narrow.process, 5);

        assert_eq!(ProcColumns::for_width(200).name, 40);
        assert_eq!(ProcColumns::for_width(10).name, 16);
    }
}
