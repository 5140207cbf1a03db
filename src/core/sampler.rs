use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;

use super::iface::{InterfaceInfo, InterfaceKind, NetSnapshot};
use super::probe::InterfaceSampler;
use crate::error::Result;

const MIN_ELAPSED_SECS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Counters {
    rx: u64,
    tx: u64,
}

/// Turns cumulative interface counters into bytes/sec rates.
///
/// Keeps the previous poll's counters per interface name. The baseline is
/// only replaced after a successful read, so a failed poll never corrupts
/// the next delta.
pub struct RateSampler {
    source: Arc<dyn InterfaceSampler>,
    last: HashMap<String, Counters>,
    last_at: Option<Instant>,
}

impl RateSampler {
    pub fn new(source: Arc<dyn InterfaceSampler>) -> Self {
        Self {
            source,
            last: HashMap::new(),
            last_at: None,
        }
    }

    pub fn sample(&mut self) -> Result<NetSnapshot> {
        self.sample_at(Instant::now())
    }

    pub fn sample_at(&mut self, now: Instant) -> Result<NetSnapshot> {
        let host = self.source.sample_interfaces()?;

        let elapsed = self.last_at
            .map(|at| now.saturating_duration_since(at).as_secs_f64())
            .unwrap_or(MIN_ELAPSED_SECS)
            .max(MIN_ELAPSED_SECS);

        let mut current = HashMap::with_capacity(host.interfaces.len());
        let interfaces: Vec<InterfaceInfo> = host.interfaces
            .into_iter()
            .map(|raw| {
                let counters = Counters { rx: raw.rx_total, tx: raw.tx_total };
                let (rx_bps, tx_bps) = match self.last.get(&raw.name) {
                    Some(prev) => (
                        rate(prev.rx, counters.rx, elapsed),
                        rate(prev.tx, counters.tx, elapsed),
                    ),
                    None => (0.0, 0.0),
                };
                current.insert(raw.name.clone(), counters);

                InterfaceInfo {
                    kind: InterfaceKind::classify(&raw.name),
                    name: raw.name,
                    mtu: raw.mtu,
                    hardware: raw.hardware,
                    addrs: raw.addrs,
                    is_up: raw.is_up,
                    rx_bps,
                    tx_bps,
                    rx_total: raw.rx_total,
                    tx_total: raw.tx_total,
                }
            })
            .collect();

        self.last = current;
        self.last_at = Some(now);

        Ok(NetSnapshot {
            hostname: host.hostname,
            uptime: host.uptime,
            interfaces,
            taken_at: Local::now(),
        })
    }
}

// Counters that went backwards (interface recreated, wrap) yield zero
fn rate(prev: u64, cur: u64, elapsed_secs: f64) -> f64 {
    cur.saturating_sub(prev) as f64 / elapsed_secs
}
