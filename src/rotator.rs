use std::fmt;
use std::sync::Arc;

use crate::eth::{BlockFetcher, RpcError};
use crate::models::Block;
use crate::scan_stats::ScanStats;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointFailure {
    pub endpoint: String,
    pub error: RpcError,
}

impl fmt::Display for EndpointFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.endpoint, self.error)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("all {} endpoint(s) failed", attempts.len())]
pub struct AllEndpointsFailed {
    pub attempts: Vec<EndpointFailure>,
}

#[derive(Debug, Clone)]
pub struct FetchedBlock {
    pub endpoint: String,
    pub block: Block,
}

/// Tries a chain's endpoints in configured order, once each, and returns the
/// first block that comes back.
#[derive(Clone)]
pub struct EndpointRotator {
    fetcher: Arc<dyn BlockFetcher>,
    stats: Arc<ScanStats>,
}

impl EndpointRotator {
    pub fn new(fetcher: Arc<dyn BlockFetcher>, stats: Arc<ScanStats>) -> Self {
        Self { fetcher, stats }
    }

    pub async fn scan_chain<S: AsRef<str>>(
        &self,
        endpoints: &[S],
    ) -> Result<FetchedBlock, AllEndpointsFailed> {
        let mut attempts = Vec::with_capacity(endpoints.len());

        for endpoint in endpoints {
            let endpoint = endpoint.as_ref();
            match self.fetcher.fetch_latest_block(endpoint).await {
                Ok(block) => {
                    if !attempts.is_empty() {
                        tracing::info!(
                            "endpoint {} answered after {} failed attempt(s)",
                            endpoint,
                            attempts.len()
                        );
                    }
                    return Ok(FetchedBlock {
                        endpoint: endpoint.to_string(),
                        block,
                    });
                }
                Err(error) => {
                    tracing::warn!("endpoint {} failed: {}", endpoint, error);
                    self.stats.inc_endpoint_failures(1);
                    attempts.push(EndpointFailure {
                        endpoint: endpoint.to_string(),
                        error,
                    });
                }
            }
        }

        Err(AllEndpointsFailed { attempts })
    }
}
