use std::io::{self, ErrorKind, Read};
use std::net::IpAddr;
use std::time::{Duration, Instant};

use super::probe::ExternalIpResolver;
use crate::config::ExternalIpConfig;
use crate::error::{NetViewError, Result};

const MAX_BODY_BYTES: u64 = 64;

/// "What is my IP" lookup against a plain-text endpoint.
///
/// Every call builds its own agent with pooling off and asks the server to
/// close, so nothing survives a VPN reconnect or route change between polls.
#[derive(Debug, Clone)]
pub struct HttpExternalIpResolver {
    url: String,
    timeout: Duration,
    use_env_proxy: bool,
}

impl HttpExternalIpResolver {
    pub fn new(url: impl Into<String>, timeout: Duration, use_env_proxy: bool) -> Self {
        Self {
            url: url.into(),
            timeout,
            use_env_proxy,
        }
    }

    pub fn from_config(config: &ExternalIpConfig) -> Self {
        Self::new(config.url.clone(), config.timeout(), config.use_env_proxy)
    }

    fn agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(self.timeout)
            .max_idle_connections(0)
            .try_proxy_from_env(self.use_env_proxy)
            .user_agent(concat!("netview/", env!("CARGO_PKG_VERSION")))
            .build()
    }

    fn transport_error(&self, err: &ureq::Transport, started: Instant) -> NetViewError {
        let io_timeout = std::error::Error::source(err)
            .and_then(|src| src.downcast_ref::<io::Error>())
            .is_some_and(|e| matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock));

        if io_timeout || started.elapsed() >= self.timeout {
            NetViewError::Timeout(self.timeout)
        } else {
            NetViewError::ExternalIp(err.to_string())
        }
    }
}

impl ExternalIpResolver for HttpExternalIpResolver {
    fn resolve(&self) -> Result<String> {
        let started = Instant::now();

        let response = match self
            .agent()
            .get(&self.url)
            .set("Accept", "text/plain")
            .set("Connection", "close")
            .call()
        {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => return Err(NetViewError::HttpStatus(code)),
            Err(ureq::Error::Transport(t)) => return Err(self.transport_error(&t, started)),
        };

        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_BODY_BYTES)
            .read_to_end(&mut body)
            .map_err(|e| match e.kind() {
                ErrorKind::TimedOut | ErrorKind::WouldBlock => NetViewError::Timeout(self.timeout),
                _ => NetViewError::ExternalIp(e.to_string()),
            })?;

        parse_body(&String::from_utf8_lossy(&body))
    }
}

/// Validates a response body as a bare IP address
pub fn parse_body(body: &str) -> Result<String> {
    let ip = body.trim();
    if ip.is_empty() {
        return Err(NetViewError::EmptyResponse);
    }

    ip.parse::<IpAddr>()
        .map(|addr| addr.to_string())
        .map_err(|_| NetViewError::InvalidResponse(ip.chars().take(32).collect()))
}
