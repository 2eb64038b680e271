use std::cmp::Ordering;
use std::num::{IntErrorKind, NonZeroUsize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use tokio::task::JoinSet;

use crate::config::Chain;
use crate::models::{RankedEntry, ScanResult};
use crate::protocols::ProtocolTable;
use crate::scan_stats::ScanStats;
use crate::scanner::ChainScanner;

pub const DEFAULT_LIMIT: usize = 10;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid limit {0:?}: expected a positive integer")]
pub struct InvalidLimit(pub String);

/// Maximum number of ranked entries to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(NonZeroUsize);

impl Limit {
    pub fn new(n: usize) -> Result<Self, InvalidLimit> {
        NonZeroUsize::new(n)
            .map(Self)
            .ok_or_else(|| InvalidLimit(n.to_string()))
    }

    /// Absent means the default; anything but a positive integer is rejected.
    /// Integers too large for `usize` saturate to `usize::MAX`.
    pub fn parse(raw: Option<&str>) -> Result<Self, InvalidLimit> {
        let Some(raw) = raw else {
            return Self::new(DEFAULT_LIMIT);
        };
        let n = match raw.trim().parse::<usize>() {
            Ok(n) => n,
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => usize::MAX,
            Err(_) => 0,
        };
        NonZeroUsize::new(n)
            .map(Self)
            .ok_or_else(|| InvalidLimit(raw.to_string()))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self(NonZeroUsize::MIN.saturating_add(DEFAULT_LIMIT - 1))
    }
}

/// Receives every chain's result after each cycle, e.g. to keep a rolling
/// score across cycles.
#[async_trait]
pub trait ScanSink: Send + Sync {
    async fn record(&self, result: &ScanResult) -> anyhow::Result<()>;
}

/// Runs one scan per chain concurrently and folds the results into a single
/// ranking across all chains.
#[derive(Clone)]
pub struct TopDappsMerger {
    scanner: ChainScanner,
    protocols: Arc<ProtocolTable>,
    sink: Option<Arc<dyn ScanSink>>,
}

impl TopDappsMerger {
    pub fn new(scanner: ChainScanner, protocols: Arc<ProtocolTable>) -> Self {
        Self {
            scanner,
            protocols,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ScanSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn stats(&self) -> &Arc<ScanStats> {
        self.scanner.stats()
    }

    pub fn protocols(&self) -> &Arc<ProtocolTable> {
        &self.protocols
    }

    pub async fn merge_top_dapps(&self, chains: &[Chain], limit: Limit) -> Vec<RankedEntry> {
        let results = self.scan_all(chains).await;
        self.stats().inc_cycles(1);

        if let Some(sink) = &self.sink {
            for result in &results {
                if let Err(e) = sink.record(result).await {
                    self.stats().inc_sink_failures(1);
                    tracing::warn!("failed recording scan result for {}: {:#}", result.chain, e);
                }
            }
        }

        let entries = results
            .into_iter()
            .filter_map(|result| {
                let top = result.top_entry?;
                let chain = chains.iter().find(|c| c.id == result.chain)?;
                Some(self.protocols.enrich(chain, top))
            })
            .collect();
        let ranked = rank_entries(entries, limit);

        tracing::info!(
            "scan cycle over {} chain(s) produced {} ranked entr{}",
            chains.len(),
            ranked.len(),
            if ranked.len() == 1 { "y" } else { "ies" }
        );
        ranked
    }

    /// One result per chain, even when a chain's scan panics.
    async fn scan_all(&self, chains: &[Chain]) -> Vec<ScanResult> {
        let mut tasks = JoinSet::new();
        for chain in chains {
            let scanner = self.scanner.clone();
            let chain = chain.clone();
            tasks.spawn(async move {
                let scan = AssertUnwindSafe(scanner.scan_one_chain(&chain))
                    .catch_unwind()
                    .await;
                (chain.id, scan)
            });
        }

        let mut results = Vec::with_capacity(chains.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(result))) => results.push(result),
                Ok((chain, Err(_))) => {
                    self.stats().inc_chains_without_result(1);
                    tracing::error!("chain {}: scan panicked", chain);
                    results.push(ScanResult {
                        chain,
                        block_number: None,
                        top_entry: None,
                    });
                }
                Err(e) => {
                    self.stats().inc_chains_without_result(1);
                    tracing::error!("chain scan task failed: {}", e);
                }
            }
        }
        results
    }
}

/// Global ordering: gas descending, then chain, then address.
pub fn rank_entries(mut entries: Vec<RankedEntry>, limit: Limit) -> Vec<RankedEntry> {
    entries.sort_by(compare_entries);
    entries.truncate(limit.get());
    entries
}

fn compare_entries(a: &RankedEntry, b: &RankedEntry) -> Ordering {
    b.gas_value
        .cmp(&a.gas_value)
        .then_with(|| a.chain.cmp(&b.chain))
        .then_with(|| a.address.cmp(&b.address))
}
