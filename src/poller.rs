use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::config::Chain;
use crate::merge::{Limit, TopDappsMerger};

/// Run scan cycles on a fixed interval. A cycle that overruns the interval
/// delays the next one instead of stacking up.
pub async fn run_poller(
    merger: TopDappsMerger,
    chains: Arc<Vec<Chain>>,
    interval: Duration,
    limit: Limit,
    max_cycles: Option<u64>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut completed = 0u64;
    loop {
        if max_cycles.is_some_and(|max| completed >= max) {
            break;
        }
        ticker.tick().await;

        let ranked = merger.merge_top_dapps(&chains, limit).await;
        completed += 1;
        match ranked.first() {
            Some(top) => tracing::info!(
                "cycle {}: hottest is {} on {} ({})",
                completed,
                top.name,
                top.chain,
                top.display_gas
            ),
            None => tracing::warn!("cycle {}: no chain produced a result", completed),
        }
    }
}
