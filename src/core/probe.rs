use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use netstat2::{get_sockets_info, AddressFamilyFlags, ProtocolFlags, ProtocolSocketInfo, TcpState};
use sysinfo::{Networks, Pid, ProcessesToUpdate, System};

use super::connection::{sort_ports, ListenPort, Protocol};
use super::process::{rank_processes, ConnectionTally, ProcNet};
use crate::error::{NetViewError, Result};

const IFF_UP: u32 = 0x1;

/// One interface as reported by the OS, before rates are derived
#[derive(Debug, Clone, PartialEq)]
pub struct RawInterface {
    pub name: String,
    pub mtu: u32,
    pub hardware: String,
    pub addrs: Vec<String>,
    pub is_up: bool,
    pub rx_total: u64,
    pub tx_total: u64,
}

#[derive(Debug, Clone)]
pub struct HostInterfaces {
    pub hostname: String,
    pub uptime: Duration,
    pub interfaces: Vec<RawInterface>,
}

pub trait InterfaceSampler: Send + Sync {
    fn sample_interfaces(&self) -> Result<HostInterfaces>;
}

pub trait ListeningPortLister: Send + Sync {
    fn list_listening(&self) -> Result<Vec<ListenPort>>;
}

pub trait ProcessConnectionRanker: Send + Sync {
    fn rank_by_connections(&self, limit: usize) -> Result<Vec<ProcNet>>;
}

pub trait ExternalIpResolver: Send + Sync {
    /// Resolves within the resolver's own timeout budget
    fn resolve(&self) -> Result<String>;
}

/// Live host probe backed by sysinfo and netstat2
#[derive(Debug, Default)]
pub struct SystemProbe;

impl SystemProbe {
    pub fn new() -> Self {
        Self
    }

    fn sockets() -> Result<Vec<netstat2::SocketInfo>> {
        let af_flags = AddressFamilyFlags::IPV4 | AddressFamilyFlags::IPV6;
        let proto_flags = ProtocolFlags::TCP | ProtocolFlags::UDP;
        get_sockets_info(af_flags, proto_flags)
            .map_err(|e| NetViewError::Sockets(e.to_string()))
    }

    /// Best-effort pid to name lookup. Missing entries mean the process is
    /// gone or not visible to us.
    fn process_names(pids: &[u32]) -> HashMap<u32, String> {
        if pids.is_empty() {
            return HashMap::new();
        }

        let sys_pids: Vec<Pid> = pids.iter().map(|pid| Pid::from_u32(*pid)).collect();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&sys_pids), true);

        let mut names = HashMap::with_capacity(pids.len());
        for pid in pids {
            match sys.process(Pid::from_u32(*pid)) {
                Some(proc) => {
                    names.insert(*pid, proc.name().to_string_lossy().to_string());
                }
                None => tracing::debug!(pid, "process name unavailable"),
            }
        }
        names
    }
}

fn read_sys_net(name: &str, attr: &str) -> Option<String> {
    fs::read_to_string(format!("/sys/class/net/{}/{}", name, attr))
        .ok()
        .map(|s| s.trim().to_string())
}

fn parse_flags(raw: &str) -> Option<u32> {
    u32::from_str_radix(raw.trim_start_matches("0x"), 16).ok()
}

/// Whether a socket belongs on the ports tab
fn is_listening(info: &ProtocolSocketInfo) -> bool {
    match info {
        ProtocolSocketInfo::Tcp(tcp) => tcp.state == TcpState::Listen,
        // UDP has no LISTEN state; any bound local port counts
        ProtocolSocketInfo::Udp(udp) => udp.local_port != 0,
    }
}

/// Whether a socket counts toward a process's listen count
fn in_listen_state(info: &ProtocolSocketInfo) -> bool {
    matches!(info, ProtocolSocketInfo::Tcp(tcp) if tcp.state == TcpState::Listen)
}

/// Fails when sysinfo reports no interfaces although the kernel lists some
fn check_visible(reported: usize, kernel: Option<usize>) -> Result<()> {
    match kernel {
        Some(expected) if reported == 0 && expected > 0 => Err(NetViewError::Interfaces(format!(
            "none reported, {} present in /sys/class/net",
            expected
        ))),
        _ => Ok(()),
    }
}

fn kernel_interface_count() -> Option<usize> {
    fs::read_dir("/sys/class/net").ok().map(|dir| dir.count())
}

impl InterfaceSampler for SystemProbe {
    fn sample_interfaces(&self) -> Result<HostInterfaces> {
        let networks = Networks::new_with_refreshed_list();
        check_visible(networks.list().len(), kernel_interface_count())?;

        let mut interfaces: Vec<RawInterface> = networks
            .list()
            .iter()
            .map(|(name, data)| {
                let addrs: Vec<String> = data
                    .ip_networks()
                    .iter()
                    .map(|net| format!("{}/{}", net.addr, net.prefix))
                    .collect();

                let mtu = read_sys_net(name, "mtu")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0);
                let is_up = match read_sys_net(name, "flags").as_deref().and_then(parse_flags) {
                    Some(flags) => flags & IFF_UP != 0,
                    None => !addrs.is_empty(),
                };

                RawInterface {
                    name: name.clone(),
                    mtu,
                    hardware: data.mac_address().to_string(),
                    addrs,
                    is_up,
                    rx_total: data.total_received(),
                    tx_total: data.total_transmitted(),
                }
            })
            .collect();

        interfaces.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(HostInterfaces {
            hostname: System::host_name().unwrap_or_default(),
            uptime: Duration::from_secs(System::uptime()),
            interfaces,
        })
    }
}

impl ListeningPortLister for SystemProbe {
    fn list_listening(&self) -> Result<Vec<ListenPort>> {
        let sockets = Self::sockets()?;

        let listening: Vec<_> = sockets
            .into_iter()
            .filter(|si| is_listening(&si.protocol_socket_info))
            .collect();

        let mut pids: Vec<u32> = listening
            .iter()
            .filter_map(|si| si.associated_pids.first().copied())
            .collect();
        pids.sort_unstable();
        pids.dedup();
        let names = Self::process_names(&pids);

        let mut ports: Vec<ListenPort> = listening
            .iter()
            .map(|si| {
                let pid = si.associated_pids.first().copied().unwrap_or(0);
                let process = names.get(&pid).cloned().unwrap_or_default();
                let (proto, addr, port) = match &si.protocol_socket_info {
                    ProtocolSocketInfo::Tcp(tcp) => (Protocol::Tcp, tcp.local_addr, tcp.local_port),
                    ProtocolSocketInfo::Udp(udp) => (Protocol::Udp, udp.local_addr, udp.local_port),
                };
                ListenPort::new(proto, addr, port, pid, process)
            })
            .collect();

        sort_ports(&mut ports);
        Ok(ports)
    }
}

impl ProcessConnectionRanker for SystemProbe {
    fn rank_by_connections(&self, limit: usize) -> Result<Vec<ProcNet>> {
        let sockets = Self::sockets()?;

        let mut tally = ConnectionTally::new();
        for si in &sockets {
            if let Some(pid) = si.associated_pids.first() {
                tally.record(*pid, in_listen_state(&si.protocol_socket_info));
            }
        }

        let names = Self::process_names(&tally.pids());
        Ok(rank_processes(tally.into_procs(&names), limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netstat2::{TcpSocketInfo, UdpSocketInfo};
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_parse_flags() {
        assert_eq!(parse_flags("0x1003"), Some(0x1003));
        assert_eq!(parse_flags("0x1002").map(|f| f & IFF_UP != 0), Some(false));
        assert_eq!(parse_flags("garbage"), None);
    }

    fn tcp(state: TcpState) -> ProtocolSocketInfo {
        ProtocolSocketInfo::Tcp(TcpSocketInfo {
            local_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            local_port: 22,
            remote_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            remote_port: 0,
            state,
        })
    }

    fn udp(port: u16) -> ProtocolSocketInfo {
        ProtocolSocketInfo::Udp(UdpSocketInfo {
            local_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            local_port: port,
        })
    }

    #[test]
    fn test_bound_udp_is_listed_but_not_a_listener() {
        assert!(is_listening(&udp(53)));
        assert!(!in_listen_state(&udp(53)));
        assert!(!is_listening(&udp(0)));

        assert!(is_listening(&tcp(TcpState::Listen)));
        assert!(in_listen_state(&tcp(TcpState::Listen)));
        assert!(!in_listen_state(&tcp(TcpState::Established)));
    }

    #[test]
    fn test_missing_interfaces_are_an_error() {
        assert!(matches!(check_visible(0, Some(3)), Err(NetViewError::Interfaces(_))));
        assert!(check_visible(2, Some(3)).is_ok());
        assert!(check_visible(0, Some(0)).is_ok());
        assert!(check_visible(0, None).is_ok());
    }
}
