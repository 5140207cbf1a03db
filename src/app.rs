use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use crossterm::{event::DisableMouseCapture, event::EnableMouseCapture, execute};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::{DefaultTerminal, Frame};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::core::filters::{filter_ports, filter_procs, SearchState};
use crate::core::model::{Effect, Model};
use crate::core::scheduler::{Message, Orchestrator, PollKind};
use crate::widgets::{
    HeaderWidget,
    InterfacesWidget,
    OverviewWidget,
    PortsTableWidget,
    ProcessTableWidget,
    ScrollState,
    SearchBarWidget,
};

/// Rows taken by everything except table bodies: header, footer, search
/// line, table borders and the table header with its margin.
const TABLE_CHROME: u16 = 3 + 1 + 1 + 2 + 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Interfaces,
    Ports,
    Processes,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Interfaces, Tab::Ports, Tab::Processes];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Interfaces => "Interfaces",
            Tab::Ports => "Ports",
            Tab::Processes => "Processes",
        }
    }

    pub fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

pub struct App {
    pub model: Model,
    pub orchestrator: Orchestrator,
    pub rx: UnboundedReceiver<Message>,
    pub tab: Tab,
    pub ports_scroll: ScrollState,
    pub procs_scroll: ScrollState,
    pub external_ip_enabled: bool,
    pub exit: bool,
    pub tick_rate: Duration,
    pub mouse_enabled: bool,
}

impl App {
    pub fn new(
        orchestrator: Orchestrator,
        rx: UnboundedReceiver<Message>,
        tick_rate: Duration,
        external_ip_enabled: bool,
    ) -> Self {
        App {
            model: Model::new(),
            orchestrator,
            rx,
            tab: Tab::Overview,
            ports_scroll: ScrollState::default(),
            procs_scroll: ScrollState::default(),
            external_ip_enabled,
            exit: false,
            tick_rate,
            mouse_enabled: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        if let Ok(()) = execute!(std::io::stdout(), EnableMouseCapture) {
            self.mouse_enabled = true;
        }

        let result = self.run_loop(terminal);

        if self.mouse_enabled {
            let _ = execute!(std::io::stdout(), DisableMouseCapture);
        }

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        let size = terminal.size()?;
        self.model.resize(size.width, size.height);
        self.orchestrator.start();

        while !self.exit {
            terminal.draw(|frame| self.draw(frame))?;

            let until_poll = self.orchestrator.next_deadline().saturating_duration_since(Instant::now());
            let timeout = self.tick_rate.min(until_poll);

            if event::poll(timeout)? {
                self.handle_events()?;
            }

            self.orchestrator.tick(Instant::now());
            self.drain_messages();
        }
        Ok(())
    }

    /// Applies every message that has arrived, in arrival order
    pub fn drain_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            let effects = self.model.apply(msg);
            self.run_effects(effects);
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RefreshExternalIp => self.orchestrator.dispatch(PollKind::ExternalIp),
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // header + tabs
                Constraint::Min(0),    // active tab
                Constraint::Length(1), // status bar
            ])
            .split(frame.area());

        frame.render_widget(&HeaderWidget::new(self.tab, self.model.size()), main_chunks[0]);

        match self.tab {
            Tab::Overview => {
                frame.render_widget(&OverviewWidget::new(&self.model, self.external_ip_enabled), main_chunks[1]);
            }
            Tab::Interfaces => {
                frame.render_widget(&InterfacesWidget::new(&self.model), main_chunks[1]);
            }
            Tab::Ports => {
                let [search, table] = search_split(main_chunks[1]);
                frame.render_widget(&SearchBarWidget::new(self.model.ports_search()), search);
                frame.render_widget(&PortsTableWidget::new(&self.model, &self.ports_scroll), table);
            }
            Tab::Processes => {
                let [search, table] = search_split(main_chunks[1]);
                frame.render_widget(&SearchBarWidget::new(self.model.procs_search()), search);
                frame.render_widget(&ProcessTableWidget::new(&self.model, &self.procs_scroll), table);
            }
        }

        frame.render_widget(Paragraph::new(self.status_line()), main_chunks[2]);
    }

    fn status_line(&self) -> Line<'static> {
        if let Some(err) = self.model.last_error() {
            return Line::from(Span::styled(format!("Error: {}", err), Style::default().fg(Color::Red)));
        }

        let mut status_text = Vec::new();
        let mut hint = |key: &'static str, what: &'static str| {
            status_text.push(Span::styled(key, Style::default().fg(Color::Green)));
            status_text.push(Span::raw(what));
        };

        if self.active_search().is_some_and(SearchState::is_editing) {
            hint("enter", ": Apply ");
            hint("esc", ": Cancel ");
            hint("ctrl+u", ": Clear");
        } else {
            hint("tab/←→", ": Switch Tab ");
            match self.tab {
                Tab::Interfaces => hint("↑↓", ": Select "),
                Tab::Ports | Tab::Processes => {
                    hint("↑↓", ": Scroll ");
                    hint("/", ": Search ");
                }
                Tab::Overview => {}
            }
            hint("ctrl+e", ": External IP ");
            hint("q", ": Quit");
        }

        Line::from(status_text)
    }

    fn handle_events(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                self.handle_key_event(key_event)
            }
            Event::Mouse(mouse_event) => {
                self.handle_mouse_event(mouse_event)
            }
            Event::Resize(width, height) => {
                self.model.resize(width, height)
            }
            _ => {}
        };
        Ok(())
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) {
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key_event.code == KeyCode::Char('c') {
            self.exit();
            return;
        }

        if let Some(search) = self.active_search_mut().filter(|s| s.is_editing()) {
            match key_event.code {
                KeyCode::Esc => search.cancel(),
                KeyCode::Enter => {
                    search.confirm();
                    self.reset_scroll();
                }
                KeyCode::Backspace => search.pop(),
                KeyCode::Char('u') if ctrl => search.clear(),
                KeyCode::Char(c) if !ctrl => search.push(c),
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('e') if ctrl => self.orchestrator.dispatch(PollKind::ExternalIp),
            KeyCode::Char('u') if ctrl => {
                if let Some(search) = self.active_search_mut() {
                    search.clear();
                    self.reset_scroll();
                }
            }
            KeyCode::Char('q') => self.exit(),
            KeyCode::Char('/') => {
                if let Some(search) = self.active_search_mut() {
                    search.begin_edit();
                }
            }
            KeyCode::Tab | KeyCode::Right => self.tab = self.tab.next(),
            KeyCode::BackTab | KeyCode::Left => self.tab = self.tab.prev(),
            KeyCode::Up => self.move_up(1),
            KeyCode::Down => self.move_down(1),
            KeyCode::PageUp => self.scroll_up(10),
            KeyCode::PageDown => self.scroll_down(10),
            KeyCode::Home => self.scroll_to_top(),
            KeyCode::End => self.scroll_to_bottom(),
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, mouse_event: MouseEvent) {
        if !self.mouse_enabled {
            return;
        }

        match mouse_event.kind {
            MouseEventKind::ScrollUp => self.move_up(3),
            MouseEventKind::ScrollDown => self.move_down(3),
            _ => {}
        }
    }

    fn active_search(&self) -> Option<&SearchState> {
        match self.tab {
            Tab::Ports => Some(self.model.ports_search()),
            Tab::Processes => Some(self.model.procs_search()),
            _ => None,
        }
    }

    fn active_search_mut(&mut self) -> Option<&mut SearchState> {
        match self.tab {
            Tab::Ports => Some(self.model.ports_search_mut()),
            Tab::Processes => Some(self.model.procs_search_mut()),
            _ => None,
        }
    }

    fn move_up(&mut self, amount: usize) {
        if self.tab == Tab::Interfaces {
            let effects = self.model.select_step(-(amount as isize));
            self.run_effects(effects);
        } else {
            self.scroll_up(amount);
        }
    }

    fn move_down(&mut self, amount: usize) {
        if self.tab == Tab::Interfaces {
            let effects = self.model.select_step(amount as isize);
            self.run_effects(effects);
        } else {
            self.scroll_down(amount);
        }
    }

    /// Rows currently matching the active tab's query
    fn total_rows(&self) -> usize {
        match self.tab {
            Tab::Ports => filter_ports(self.model.ports(), self.model.ports_search().query()).len(),
            Tab::Processes => filter_procs(self.model.procs(), self.model.procs_search().query()).len(),
            _ => 0,
        }
    }

    fn visible_rows(&self) -> usize {
        self.model.size().1.saturating_sub(TABLE_CHROME) as usize
    }

    fn active_scroll_mut(&mut self) -> Option<&mut ScrollState> {
        match self.tab {
            Tab::Ports => Some(&mut self.ports_scroll),
            Tab::Processes => Some(&mut self.procs_scroll),
            _ => None,
        }
    }

    fn scroll_up(&mut self, amount: usize) {
        if let Some(scroll) = self.active_scroll_mut() {
            scroll.scroll_up(amount);
        }
    }

    fn scroll_down(&mut self, amount: usize) {
        let (total, visible) = (self.total_rows(), self.visible_rows());
        if let Some(scroll) = self.active_scroll_mut() {
            scroll.scroll_down(amount, total, visible);
        }
    }

    fn scroll_to_top(&mut self) {
        if let Some(scroll) = self.active_scroll_mut() {
            scroll.scroll_to_top();
        }
    }

    fn scroll_to_bottom(&mut self) {
        let (total, visible) = (self.total_rows(), self.visible_rows());
        if let Some(scroll) = self.active_scroll_mut() {
            scroll.scroll_to_bottom(total, visible);
        }
    }

    fn reset_scroll(&mut self) {
        if let Some(scroll) = self.active_scroll_mut() {
            scroll.scroll_to_top();
        }
    }

    fn exit(&mut self) {
        self.exit = true
    }
}

fn search_split(area: Rect) -> [Rect; 2] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    [chunks[0], chunks[1]]
}
