use std::time::Duration;

use chrono::{DateTime, Local};

/// Coarse classification of a network interface, derived from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    Unknown,
    Loopback,
    DockerBridge,
    LinuxBridge,
    Veth,
    TunTap,
    VirtualOverlay,
    Physical,
}

impl InterfaceKind {
    pub fn classify(name: &str) -> Self {
        if name.starts_with("lo") {
            InterfaceKind::Loopback
        } else if name.starts_with("docker") {
            InterfaceKind::DockerBridge
        } else if name.starts_with("br-") || name.starts_with("virbr") {
            InterfaceKind::LinuxBridge
        } else if name.starts_with("veth") {
            InterfaceKind::Veth
        } else if name.starts_with("tun") || name.starts_with("tap") {
            InterfaceKind::TunTap
        } else if name.starts_with("wg") {
            InterfaceKind::VirtualOverlay
        } else if name.starts_with("en") || name.starts_with("eth") || name.starts_with("wl") {
            InterfaceKind::Physical
        } else {
            InterfaceKind::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceKind::Unknown => "unknown",
            InterfaceKind::Loopback => "loopback",
            InterfaceKind::DockerBridge => "docker bridge",
            InterfaceKind::LinuxBridge => "bridge",
            InterfaceKind::Veth => "veth",
            InterfaceKind::TunTap => "tun/tap",
            InterfaceKind::VirtualOverlay => "overlay",
            InterfaceKind::Physical => "physical",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceInfo {
    pub name: String,
    pub mtu: u32,
    pub hardware: String,
    pub addrs: Vec<String>,
    pub is_up: bool,
    pub kind: InterfaceKind,
    pub rx_bps: f64,
    pub tx_bps: f64,
    pub rx_total: u64,
    pub tx_total: u64,
}

/// One network poll. Replaced wholesale by the next one.
#[derive(Debug, Clone)]
pub struct NetSnapshot {
    pub hostname: String,
    pub uptime: Duration,
    pub interfaces: Vec<InterfaceInfo>,
    pub taken_at: DateTime<Local>,
}

impl NetSnapshot {
    pub fn interface(&self, name: &str) -> Option<&InterfaceInfo> {
        self.interfaces.iter().find(|iface| iface.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.interfaces.iter().map(|iface| iface.name.clone()).collect()
    }

    /// (up, down) interface counts
    pub fn up_down(&self) -> (usize, usize) {
        let up = self.interfaces.iter().filter(|iface| iface.is_up).count();
        (up, self.interfaces.len() - up)
    }
}
