use std::collections::VecDeque;

pub const MIN_HISTORY: usize = 30;
pub const MAX_HISTORY: usize = 200;

/// History length to keep for a terminal `width` columns wide
pub fn history_cap_for_width(width: u16) -> usize {
    (width as usize / 2).clamp(MIN_HISTORY, MAX_HISTORY)
}

/// Bounded FIFO of rate samples
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: f64) {
        self.samples.push_back(value);
        self.clamp_to(self.capacity);
    }

    /// Drops the oldest samples until at most `max_len` remain
    pub fn clamp_to(&mut self, max_len: usize) {
        while self.samples.len() > max_len {
            self.samples.pop_front();
        }
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.clamp_to(capacity);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    /// Last `n` samples scaled to integer bars, oldest first
    pub fn tail_as_u64(&self, n: usize) -> Vec<u64> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip).map(|v| v.max(0.0).round() as u64).collect()
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// RX/TX history for the selected interface. Both directions always move
/// together: pushed together, resized together, cleared together.
#[derive(Debug, Clone)]
pub struct RateHistory {
    rx: HistoryBuffer,
    tx: HistoryBuffer,
}

impl RateHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            rx: HistoryBuffer::new(capacity),
            tx: HistoryBuffer::new(capacity),
        }
    }

    pub fn push(&mut self, rx_bps: f64, tx_bps: f64) {
        self.rx.push(rx_bps);
        self.tx.push(tx_bps);
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.rx.set_capacity(capacity);
        self.tx.set_capacity(capacity);
    }

    pub fn clear(&mut self) {
        self.rx.clear();
        self.tx.clear();
    }

    pub fn rx(&self) -> &HistoryBuffer {
        &self.rx
    }

    pub fn tx(&self) -> &HistoryBuffer {
        &self.tx
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty() && self.tx.is_empty()
    }
}
