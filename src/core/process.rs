use std::collections::HashMap;

/// Connection counts for one process, rebuilt every aux poll
#[derive(Debug, Clone, PartialEq)]
pub struct ProcNet {
    pub pid: u32,
    pub name: String,
    pub conn_count: usize,
    pub listen_count: usize,
}

impl ProcNet {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "-"
        } else {
            &self.name
        }
    }
}

/// Accumulates connections per pid for a single poll
#[derive(Debug, Default)]
pub struct ConnectionTally {
    counts: HashMap<u32, (usize, usize)>,
}

impl ConnectionTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, pid: u32, listening: bool) {
        if pid == 0 {
            return;
        }
        let entry = self.counts.entry(pid).or_insert((0, 0));
        entry.0 += 1;
        if listening {
            entry.1 += 1;
        }
    }

    pub fn pids(&self) -> Vec<u32> {
        self.counts.keys().copied().collect()
    }

    pub fn into_procs(self, names: &HashMap<u32, String>) -> Vec<ProcNet> {
        self.counts
            .into_iter()
            .map(|(pid, (conn_count, listen_count))| ProcNet {
                pid,
                name: names.get(&pid).cloned().unwrap_or_default(),
                conn_count,
                listen_count,
            })
            .collect()
    }
}

/// Sorts by connection count descending, pid ascending, and keeps the top
/// `limit` entries (0 keeps everything).
pub fn rank_processes(mut procs: Vec<ProcNet>, limit: usize) -> Vec<ProcNet> {
    procs.sort_by(|a, b| b.conn_count.cmp(&a.conn_count)
        .then_with(|| a.pid.cmp(&b.pid)));

    if limit > 0 && procs.len() > limit {
        procs.truncate(limit);
    }
    procs
}
