use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::connection::ListenPort;
use super::iface::NetSnapshot;
use super::probe::{ExternalIpResolver, InterfaceSampler, ListeningPortLister, ProcessConnectionRanker};
use super::process::ProcNet;
use super::sampler::RateSampler;
use crate::config::RefreshConfig;
use crate::error::{NetViewError, Result};

/// Result of one poll, posted back to the UI loop
#[derive(Debug)]
pub enum Message {
    Network(Result<NetSnapshot>),
    Ports(Result<Vec<ListenPort>>),
    Processes(Result<Vec<ProcNet>>),
    ExternalIp(Result<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollKind {
    Network,
    /// Listening ports and process ranking
    Aux,
    ExternalIp,
}

/// Fixed-period deadline that reschedules itself whether or not the poll it
/// drives succeeds. Missed periods are skipped, never replayed in a burst.
#[derive(Debug, Clone)]
pub struct Cadence {
    period: Duration,
    next_due: Instant,
}

impl Cadence {
    /// First deadline one period from `now`
    pub fn every(period: Duration, now: Instant) -> Self {
        Self { period, next_due: now + period }
    }

    /// First deadline on the next wall-clock multiple of `period`, so
    /// separate instances poll at roughly the same moments.
    pub fn aligned(period: Duration, now: Instant, wall: SystemTime) -> Self {
        let since_epoch = wall.duration_since(UNIX_EPOCH).unwrap_or_default();
        let period_ms = period.as_millis().max(1);
        let into = since_epoch.as_millis() % period_ms;
        let wait = if into == 0 { period_ms } else { period_ms - into };
        Self {
            period,
            next_due: now + Duration::from_millis(wait as u64),
        }
    }

    pub fn due(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        while self.next_due <= now {
            self.next_due += self.period;
        }
        true
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }
}

/// The collaborators the orchestrator polls
#[derive(Clone)]
pub struct Sources {
    pub interfaces: Arc<dyn InterfaceSampler>,
    pub ports: Arc<dyn ListeningPortLister>,
    pub processes: Arc<dyn ProcessConnectionRanker>,
    pub external_ip: Option<Arc<dyn ExternalIpResolver>>,
}

/// Drives the poll cadences and runs each poll off the UI thread.
///
/// Poll tasks never touch the model; each posts exactly one `Message` on the
/// channel returned by `new`.
pub struct Orchestrator {
    runtime: Handle,
    tx: UnboundedSender<Message>,
    sampler: Arc<Mutex<RateSampler>>,
    ports: Arc<dyn ListeningPortLister>,
    processes: Arc<dyn ProcessConnectionRanker>,
    resolver: Option<Arc<dyn ExternalIpResolver>>,
    process_limit: usize,
    network: Cadence,
    aux: Cadence,
    external_ip: Cadence,
}

impl Orchestrator {
    pub fn new(
        runtime: Handle,
        sources: Sources,
        refresh: &RefreshConfig,
        process_limit: usize,
    ) -> (Self, UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let now = Instant::now();

        let orchestrator = Self {
            runtime,
            tx,
            sampler: Arc::new(Mutex::new(RateSampler::new(sources.interfaces))),
            ports: sources.ports,
            processes: sources.processes,
            resolver: sources.external_ip,
            process_limit,
            network: Cadence::every(refresh.network_interval(), now),
            aux: Cadence::aligned(refresh.aux_interval(), now, SystemTime::now()),
            external_ip: Cadence::every(refresh.external_ip_interval(), now),
        };
        (orchestrator, rx)
    }

    /// Fires every poll once, immediately
    pub fn start(&self) {
        self.dispatch(PollKind::Network);
        self.dispatch(PollKind::Aux);
        self.dispatch(PollKind::ExternalIp);
    }

    /// Dispatches every poll whose deadline has passed
    pub fn tick(&mut self, now: Instant) -> Vec<PollKind> {
        let mut fired = Vec::new();
        if self.network.due(now) {
            fired.push(PollKind::Network);
        }
        if self.aux.due(now) {
            fired.push(PollKind::Aux);
        }
        if self.external_ip.due(now) {
            fired.push(PollKind::ExternalIp);
        }
        for kind in &fired {
            self.dispatch(*kind);
        }
        fired
    }

    /// Earliest upcoming deadline across all cadences
    pub fn next_deadline(&self) -> Instant {
        self.network.next_due()
            .min(self.aux.next_due())
            .min(self.external_ip.next_due())
    }

    pub fn dispatch(&self, kind: PollKind) {
        match kind {
            PollKind::Network => {
                let sampler = Arc::clone(&self.sampler);
                let tx = self.tx.clone();
                self.runtime.spawn_blocking(move || {
                    let result = match sampler.lock() {
                        Ok(mut sampler) => sampler.sample(),
                        Err(_) => Err(NetViewError::SamplerPoisoned),
                    };
                    tx.send(Message::Network(result)).ok();
                });
            }
            PollKind::Aux => {
                let ports = Arc::clone(&self.ports);
                let tx = self.tx.clone();
                self.runtime.spawn_blocking(move || {
                    tx.send(Message::Ports(ports.list_listening())).ok();
                });

                let processes = Arc::clone(&self.processes);
                let limit = self.process_limit;
                let tx = self.tx.clone();
                self.runtime.spawn_blocking(move || {
                    tx.send(Message::Processes(processes.rank_by_connections(limit))).ok();
                });
            }
            PollKind::ExternalIp => {
                let Some(resolver) = self.resolver.as_ref().map(Arc::clone) else {
                    return;
                };
                let tx = self.tx.clone();
                self.runtime.spawn_blocking(move || {
                    tx.send(Message::ExternalIp(resolver.resolve())).ok();
                });
            }
        }
    }
}
