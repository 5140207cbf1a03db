use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

/// A listening socket as seen by one ports poll
#[derive(Debug, Clone, PartialEq)]
pub struct ListenPort {
    pub proto: Protocol,
    pub local: String,       // ip:port
    pub pid: u32,            // 0 when unknown
    pub process: String,     // empty when unresolvable
}

impl ListenPort {
    pub fn new(proto: Protocol, addr: IpAddr, port: u16, pid: u32, process: String) -> Self {
        Self {
            proto,
            local: SocketAddr::new(addr, port).to_string(),
            pid,
            process,
        }
    }

    pub fn display_local(&self) -> &str {
        if self.local.is_empty() || self.local == ":" || self.local == "0.0.0.0:0" {
            "-"
        } else {
            &self.local
        }
    }

    pub fn display_process(&self) -> &str {
        if self.process.is_empty() {
            "-"
        } else {
            &self.process
        }
    }
}

/// Orders ports by protocol, then local address, then pid
pub fn sort_ports(ports: &mut [ListenPort]) {
    ports.sort_by(|a, b| {
        a.proto.as_str().cmp(b.proto.as_str())
            .then_with(|| a.local.cmp(&b.local))
            .then_with(|| a.pid.cmp(&b.pid))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn port(proto: Protocol, local: &str, pid: u32) -> ListenPort {
        ListenPort {
            proto,
            local: local.to_string(),
            pid,
            process: String::new(),
        }
    }

    #[test]
    fn test_new_formats_socket_address() {
        let p = ListenPort::new(Protocol::Tcp, IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080, 42, "nginx".into());
        assert_eq!(p.local, "0.0.0.0:8080");

        let v6 = ListenPort::new(Protocol::Udp, "::".parse().unwrap(), 53, 0, String::new());
        assert_eq!(v6.local, "[::]:53");
    }

    #[test]
    fn test_display_placeholders() {
        let p = port(Protocol::Udp, "0.0.0.0:0", 0);
        assert_eq!(p.display_local(), "-");
        assert_eq!(p.display_process(), "-");

        let q = ListenPort { process: "sshd".into(), ..port(Protocol::Tcp, "0.0.0.0:22", 7) };
        assert_eq!(q.display_local(), "0.0.0.0:22");
        assert_eq!(q.display_process(), "sshd");
    }

    #[test]
    fn test_sort_ports_by_proto_local_pid() {
        let mut ports = vec![
            port(Protocol::Udp, "0.0.0.0:53", 3),
            port(Protocol::Tcp, "127.0.0.1:443", 9),
            port(Protocol::Tcp, "0.0.0.0:8080", 5),
            port(Protocol::Tcp, "0.0.0.0:8080", 2),
        ];
        sort_ports(&mut ports);

        let order: Vec<(&str, &str, u32)> = ports.iter()
            .map(|p| (p.proto.as_str(), p.local.as_str(), p.pid))
            .collect();
        assert_eq!(order, vec![
            ("tcp", "0.0.0.0:8080", 2),
            ("tcp", "0.0.0.0:8080", 5),
            ("tcp", "127.0.0.1:443", 9),
            ("udp", "0.0.0.0:53", 3),
        ]);
    }
}
