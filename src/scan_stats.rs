use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct ScanStats {
    cycles: AtomicU64,
    chains_scanned: AtomicU64,
    chains_without_result: AtomicU64,
    endpoint_failures: AtomicU64,
    sink_failures: AtomicU64,
}

impl Default for ScanStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanStats {
    pub const fn new() -> Self {
        Self {
            cycles: AtomicU64::new(0),
            chains_scanned: AtomicU64::new(0),
            chains_without_result: AtomicU64::new(0),
            endpoint_failures: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
        }
    }

    pub fn inc_cycles(&self, n: u64) {
        self.cycles.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_chains_scanned(&self, n: u64) {
        self.chains_scanned.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_chains_without_result(&self, n: u64) {
        self.chains_without_result.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_endpoint_failures(&self, n: u64) {
        self.endpoint_failures.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_sink_failures(&self, n: u64) {
        self.sink_failures.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        ScanSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            chains_scanned: self.chains_scanned.load(Ordering::Relaxed),
            chains_without_result: self.chains_without_result.load(Ordering::Relaxed),
            endpoint_failures: self.endpoint_failures.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ScanSnapshot {
    pub cycles: u64,
    pub chains_scanned: u64,
    pub chains_without_result: u64,
    pub endpoint_failures: u64,
    pub sink_failures: u64,
}
