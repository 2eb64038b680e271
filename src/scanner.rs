use std::sync::Arc;

use crate::aggregate::{aggregate, top_contract};
use crate::config::Chain;
use crate::eth::BlockFetcher;
use crate::models::ScanResult;
use crate::rotator::EndpointRotator;
use crate::scan_stats::ScanStats;

/// Rotator + aggregator for one chain. Failures end up as an absent top
/// entry, never as an error.
#[derive(Clone)]
pub struct ChainScanner {
    rotator: EndpointRotator,
    stats: Arc<ScanStats>,
}

impl ChainScanner {
    pub fn new(fetcher: Arc<dyn BlockFetcher>, stats: Arc<ScanStats>) -> Self {
        Self {
            rotator: EndpointRotator::new(fetcher, stats.clone()),
            stats,
        }
    }

    pub fn stats(&self) -> &Arc<ScanStats> {
        &self.stats
    }

    pub async fn scan_one_chain(&self, chain: &Chain) -> ScanResult {
        self.stats.inc_chains_scanned(1);

        let fetched = match self.rotator.scan_chain(&chain.endpoints).await {
            Ok(fetched) => fetched,
            Err(err) => {
                let detail: Vec<String> = err.attempts.iter().map(ToString::to_string).collect();
                tracing::warn!("chain {}: {} [{}]", chain.id, err, detail.join("; "));
                return self.absent(chain, None);
            }
        };
        let block_number = fetched.block.number;

        let totals = match aggregate(&fetched.block) {
            Ok(totals) => totals,
            Err(err) => {
                tracing::warn!(
                    "chain {}: block {:?} from {} could not be aggregated: {}",
                    chain.id,
                    block_number,
                    fetched.endpoint,
                    err
                );
                return self.absent(chain, block_number);
            }
        };

        match top_contract(&totals) {
            Some(top) => {
                tracing::debug!(
                    "chain {}: block {:?} top contract {} burned {}",
                    chain.id,
                    block_number,
                    top.address,
                    top.gas
                );
                ScanResult {
                    chain: chain.id.clone(),
                    block_number,
                    top_entry: Some(top),
                }
            }
            None => {
                tracing::info!(
                    "chain {}: block {:?} has no contract calls",
                    chain.id,
                    block_number
                );
                self.absent(chain, block_number)
            }
        }
    }

    fn absent(&self, chain: &Chain, block_number: Option<u64>) -> ScanResult {
        self.stats.inc_chains_without_result(1);
        ScanResult {
            chain: chain.id.clone(),
            block_number,
            top_entry: None,
        }
    }
}
