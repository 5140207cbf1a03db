//! Single-owner view state. Only the UI loop mutates it, one message at a
//! time, so nothing here is shared or locked.

use chrono::{DateTime, Local};

use super::connection::ListenPort;
use super::filters::{project_ports, project_procs, PortColumns, ProcColumns, RenderRow, SearchState};
use super::history::{history_cap_for_width, RateHistory, MIN_HISTORY};
use super::iface::{InterfaceInfo, NetSnapshot};
use super::process::ProcNet;
use super::scheduler::Message;
use super::selection::{reconcile, step, Selected};

/// Follow-up work the model asks the loop to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    RefreshExternalIp,
}

/// Last known external address. A failed lookup keeps the previous address
/// visible next to the error.
#[derive(Debug, Clone, Default)]
pub struct ExternalIpState {
    pub ip: Option<String>,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, Default)]
struct PollErrors {
    network: Option<String>,
    ports: Option<String>,
    processes: Option<String>,
}

pub struct Model {
    snapshot: Option<NetSnapshot>,
    selection: Option<Selected<String>>,
    history: RateHistory,
    ports: Vec<ListenPort>,
    procs: Vec<ProcNet>,
    ports_search: SearchState,
    procs_search: SearchState,
    external_ip: ExternalIpState,
    errors: PollErrors,
    width: u16,
    height: u16,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            selection: None,
            history: RateHistory::new(MIN_HISTORY),
            ports: Vec::new(),
            procs: Vec::new(),
            ports_search: SearchState::new(),
            procs_search: SearchState::new(),
            external_ip: ExternalIpState::default(),
            errors: PollErrors::default(),
            width: 0,
            height: 0,
        }
    }

    pub fn apply(&mut self, msg: Message) -> Vec<Effect> {
        match msg {
            Message::Network(Ok(snap)) => {
                self.errors.network = None;
                return self.apply_snapshot(snap);
            }
            Message::Network(Err(e)) => {
                tracing::warn!("network poll failed: {}", e);
                self.errors.network = Some(e.to_string());
            }
            Message::Ports(Ok(ports)) => {
                self.ports = ports;
                self.errors.ports = None;
            }
            Message::Ports(Err(e)) => {
                tracing::warn!("ports poll failed: {}", e);
                self.errors.ports = Some(e.to_string());
            }
            Message::Processes(Ok(procs)) => {
                self.procs = procs;
                self.errors.processes = None;
            }
            Message::Processes(Err(e)) => {
                tracing::warn!("process poll failed: {}", e);
                self.errors.processes = Some(e.to_string());
            }
            Message::ExternalIp(Ok(ip)) => {
                if self.external_ip.ip.as_deref() != Some(ip.as_str()) {
                    tracing::info!("external ip is {}", ip);
                }
                self.external_ip.ip = Some(ip);
                self.external_ip.error = None;
                self.external_ip.updated_at = Some(Local::now());
            }
            Message::ExternalIp(Err(e)) => {
                tracing::warn!("external ip lookup failed: {}", e);
                self.external_ip.error = Some(e.to_string());
            }
        }
        Vec::new()
    }

    fn apply_snapshot(&mut self, snap: NetSnapshot) -> Vec<Effect> {
        let had_selection = self.selection.is_some();
        let reconciled = reconcile(&snap.names(), self.selection.as_ref());
        self.selection = reconciled.selection;

        let mut effects = Vec::new();
        if reconciled.identity_changed {
            self.on_selection_changed();
            if had_selection {
                effects.push(Effect::RefreshExternalIp);
            }
        }

        if let Some(iface) = self.selection.as_ref().and_then(|sel| snap.interface(&sel.key)) {
            self.history.push(iface.rx_bps, iface.tx_bps);
        }

        self.snapshot = Some(snap);
        effects
    }

    fn on_selection_changed(&mut self) {
        tracing::debug!(selected = ?self.selection.as_ref().map(|s| &s.key), "interface selection changed");
        self.history.clear();
    }

    /// Moves the interface selection by `delta` rows
    pub fn select_step(&mut self, delta: isize) -> Vec<Effect> {
        let keys = self.snapshot.as_ref().map(NetSnapshot::names).unwrap_or_default();
        let next = step(&keys, self.selection.as_ref(), delta);

        let changed = next.as_ref().map(|s| &s.key) != self.selection.as_ref().map(|s| &s.key);
        self.selection = next;
        if changed {
            self.on_selection_changed();
            return vec![Effect::RefreshExternalIp];
        }
        Vec::new()
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.history.set_capacity(history_cap_for_width(width));
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn snapshot(&self) -> Option<&NetSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selection.as_ref().map(|s| s.key.as_str())
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selection.as_ref().map(|s| s.index)
    }

    pub fn selected_interface(&self) -> Option<&InterfaceInfo> {
        let name = self.selected_name()?;
        self.snapshot.as_ref()?.interface(name)
    }

    pub fn history(&self) -> &RateHistory {
        &self.history
    }

    pub fn ports(&self) -> &[ListenPort] {
        &self.ports
    }

    pub fn procs(&self) -> &[ProcNet] {
        &self.procs
    }

    pub fn ports_search(&self) -> &SearchState {
        &self.ports_search
    }

    pub fn ports_search_mut(&mut self) -> &mut SearchState {
        &mut self.ports_search
    }

    pub fn procs_search(&self) -> &SearchState {
        &self.procs_search
    }

    pub fn procs_search_mut(&mut self) -> &mut SearchState {
        &mut self.procs_search
    }

    pub fn port_rows(&self, cols: PortColumns) -> Vec<RenderRow> {
        project_ports(&self.ports, self.ports_search.query(), cols)
    }

    pub fn proc_rows(&self, cols: ProcColumns) -> Vec<RenderRow> {
        project_procs(&self.procs, self.procs_search.query(), cols)
    }

    pub fn external_ip(&self) -> &ExternalIpState {
        &self.external_ip
    }

    pub fn network_error(&self) -> Option<&str> {
        self.errors.network.as_deref()
    }

    /// Most relevant poll error, network first
    pub fn last_error(&self) -> Option<&str> {
        self.errors.network.as_deref()
            .or(self.errors.ports.as_deref())
            .or(self.errors.processes.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::connection::Protocol;
    use crate::core::sampler::tests::{raw, ScriptedInterfaces};
    use crate::core::sampler::RateSampler;
    use crate::core::iface::InterfaceKind;
    use crate::error::NetViewError;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn iface(name: &str, rx_bps: f64, tx_bps: f64) -> InterfaceInfo {
        InterfaceInfo {
            name: name.into(),
            mtu: 1500,
            hardware: String::new(),
            addrs: Vec::new(),
            is_up: true,
            kind: InterfaceKind::classify(name),
            rx_bps,
            tx_bps,
            rx_total: 0,
            tx_total: 0,
        }
    }

    fn snapshot(ifaces: Vec<InterfaceInfo>) -> Message {
        Message::Network(Ok(NetSnapshot {
            hostname: "box".into(),
            uptime: Duration::from_secs(10),
            interfaces: ifaces,
            taken_at: Local::now(),
        }))
    }

    fn listen(local: &str, process: &str) -> ListenPort {
        ListenPort { proto: Protocol::Tcp, local: local.into(), pid: 9, process: process.into() }
    }

    #[test]
    fn test_end_to_end_rates_through_model() {
        let source = ScriptedInterfaces::new(vec![
            Ok(vec![raw("eth0", 1000, 2000)]),
            Ok(vec![raw("eth0", 3000, 6000)]),
        ]);
        let mut sampler = RateSampler::new(Arc::new(source));
        let mut model = Model::new();
        let t0 = Instant::now();

        model.apply(Message::Network(sampler.sample_at(t0)));
        model.apply(Message::Network(sampler.sample_at(t0 + Duration::from_secs(2))));

        let eth0 = model.selected_interface().unwrap();
        assert_eq!(eth0.name, "eth0");
        assert!((eth0.rx_bps - 1000.0).abs() < 1e-9);
        assert!((eth0.tx_bps - 2000.0).abs() < 1e-9);
        assert_eq!(model.history().rx().values(), vec![0.0, 1000.0]);
        assert_eq!(model.history().tx().values(), vec![0.0, 2000.0]);
    }

    #[test]
    fn test_selection_kept_across_reordering() {
        let mut model = Model::new();
        model.apply(snapshot(vec![iface("eth0", 1.0, 1.0), iface("lo", 0.0, 0.0)]));
        assert_eq!(model.selected_name(), Some("eth0"));

        let effects = model.apply(snapshot(vec![iface("lo", 0.0, 0.0), iface("eth0", 2.0, 2.0)]));
        assert!(effects.is_empty());
        assert_eq!(model.selected_name(), Some("eth0"));
        assert_eq!(model.selected_index(), Some(1));
        assert_eq!(model.history().rx().len(), 2);
    }

    #[test]
    fn test_vanished_interface_resets_history() {
        let mut model = Model::new();
        model.apply(snapshot(vec![iface("tun0", 5.0, 5.0), iface("eth0", 1.0, 1.0)]));
        model.apply(snapshot(vec![iface("tun0", 6.0, 6.0), iface("eth0", 1.0, 1.0)]));
        assert_eq!(model.history().rx().len(), 2);

        let effects = model.apply(snapshot(vec![iface("eth0", 7.0, 8.0)]));
        assert_eq!(effects, vec![Effect::RefreshExternalIp]);
        assert_eq!(model.selected_name(), Some("eth0"));
        assert_eq!(model.history().rx().values(), vec![7.0]);
        assert_eq!(model.history().tx().values(), vec![8.0]);
    }

    #[test]
    fn test_vanished_interface_falls_back_to_first_not_its_row() {
        let mut model = Model::new();
        model.apply(snapshot(vec![iface("eth0", 1.0, 1.0), iface("wlan0", 2.0, 2.0)]));
        model.select_step(1);
        assert_eq!(model.selected_name(), Some("wlan0"));

        model.apply(snapshot(vec![iface("eth0", 1.0, 1.0), iface("lo", 0.0, 0.0)]));
        assert_eq!(model.selected_name(), Some("eth0"));
        assert_eq!(model.selected_index(), Some(0));
    }

    #[test]
    fn test_user_selection_change_clears_both_histories() {
        let mut model = Model::new();
        for _ in 0..3 {
            model.apply(snapshot(vec![iface("eth0", 1.0, 2.0), iface("wlan0", 3.0, 4.0)]));
        }
        assert_eq!(model.history().rx().len(), 3);

        let effects = model.select_step(1);
        assert_eq!(effects, vec![Effect::RefreshExternalIp]);
        assert_eq!(model.selected_name(), Some("wlan0"));
        assert!(model.history().rx().is_empty());
        assert!(model.history().tx().is_empty());

        assert!(model.select_step(1).is_empty());
        assert_eq!(model.selected_name(), Some("wlan0"));
    }

    #[test]
    fn test_network_failure_keeps_previous_snapshot() {
        let mut model = Model::new();
        model.apply(snapshot(vec![iface("eth0", 1.0, 1.0)]));
        model.apply(Message::Network(Err(NetViewError::Interfaces("netlink busy".into()))));

        assert!(model.snapshot().is_some());
        assert_eq!(model.selected_name(), Some("eth0"));
        assert!(model.last_error().unwrap().contains("netlink busy"));

        model.apply(snapshot(vec![iface("eth0", 1.0, 1.0)]));
        assert!(model.last_error().is_none());
    }

    #[test]
    fn test_external_ip_failure_is_isolated() {
        let mut model = Model::new();
        model.apply(Message::ExternalIp(Ok("203.0.113.9".into())));
        model.apply(snapshot(vec![iface("eth0", 1.0, 1.0)]));
        model.apply(Message::ExternalIp(Err(NetViewError::HttpStatus(502))));
        model.apply(snapshot(vec![iface("eth0", 1.0, 1.0)]));

        assert!(model.network_error().is_none());
        assert!(model.last_error().is_none());

        let ext = model.external_ip();
        assert_eq!(ext.ip.as_deref(), Some("203.0.113.9"));
        assert!(ext.error.as_deref().unwrap().contains("502"));
        assert!(ext.updated_at.is_some());
    }

    #[test]
    fn test_aux_failure_keeps_rows_and_does_not_touch_network() {
        let mut model = Model::new();
        model.apply(Message::Ports(Ok(vec![listen("0.0.0.0:22", "sshd")])));
        model.apply(Message::Ports(Err(NetViewError::Sockets("denied".into()))));
        model.apply(snapshot(vec![iface("eth0", 1.0, 1.0)]));

        assert_eq!(model.ports().len(), 1);
        assert!(model.network_error().is_none());
        assert!(model.last_error().unwrap().contains("denied"));
    }

    #[test]
    fn test_interleaved_messages() {
        let mut model = Model::new();
        model.apply(Message::Ports(Ok(vec![listen("0.0.0.0:80", "nginx")])));
        model.apply(snapshot(vec![iface("eth0", 1.0, 1.0)]));
        model.apply(Message::Processes(Ok(vec![ProcNet { pid: 9, name: "nginx".into(), conn_count: 4, listen_count: 1 }])));
        model.apply(Message::Ports(Ok(vec![listen("0.0.0.0:443", "nginx")])));
        model.apply(snapshot(vec![iface("eth0", 2.0, 2.0)]));

        assert_eq!(model.ports()[0].local, "0.0.0.0:443");
        assert_eq!(model.procs()[0].conn_count, 4);
        assert_eq!(model.history().rx().values(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_filtering_through_model_is_read_only() {
        let mut model = Model::new();
        model.apply(Message::Ports(Ok(vec![
            listen("0.0.0.0:8080", "nginx"),
            listen("127.0.0.1:443", "caddy"),
        ])));
        let cols = PortColumns::for_width(100);

        let search = model.ports_search_mut();
        search.begin_edit();
        search.push('8');
        search.push('0');
        assert_eq!(model.port_rows(cols).len(), 2);

        model.ports_search_mut().confirm();
        let rows = model.port_rows(cols);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].cells[1].has_match());

        model.ports_search_mut().clear();
        assert_eq!(model.port_rows(cols).len(), 2);
        assert_eq!(model.ports().len(), 2);
    }

    #[test]
    fn test_resize_clamps_history() {
        let mut model = Model::new();
        model.resize(400, 50);
        for i in 0..150 {
            model.apply(snapshot(vec![iface("eth0", i as f64, 0.0)]));
        }
        assert_eq!(model.history().rx().len(), 150);

        model.resize(100, 50);
        assert_eq!(model.history().rx().len(), 50);
        assert_eq!(model.history().tx().len(), 50);
        assert_eq!(model.history().rx().latest(), Some(149.0));
    }
}
