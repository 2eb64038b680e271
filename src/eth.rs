use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use ethers_providers::{Http, HttpClientError, JsonRpcClient};
use num_traits::ToPrimitive;
use url::Url;

use crate::aggregate::parse_quantity;
use crate::models::{Block, RawBlock};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("latest block has no transaction list")]
    EmptyBlock,
}

/// Source of the latest block for a single endpoint. One call is one attempt.
#[async_trait]
pub trait BlockFetcher: Send + Sync {
    async fn fetch_latest_block(&self, endpoint: &str) -> Result<Block, RpcError>;
}

#[derive(Clone)]
pub struct EthClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl EthClient {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl BlockFetcher for EthClient {
    /// `eth_getBlockByNumber("latest", true)` bounded by the per-attempt timeout.
    async fn fetch_latest_block(&self, endpoint: &str) -> Result<Block, RpcError> {
        let url = Url::parse(endpoint)
            .map_err(|e| RpcError::Network(format!("invalid endpoint url {endpoint}: {e}")))?;
        let transport = Http::new_with_client(url, self.client.clone());

        let request = transport.request("eth_getBlockByNumber", ("latest", true));
        let raw: Option<RawBlock> = match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result.map_err(classify_client_error)?,
            Err(_) => return Err(RpcError::Timeout(self.timeout)),
        };

        into_block(raw)
    }
}

fn classify_client_error(err: HttpClientError) -> RpcError {
    match err {
        HttpClientError::ReqwestError(e) => RpcError::Network(e.to_string()),
        other => RpcError::MalformedResponse(other.to_string()),
    }
}

/// A `null` result or a missing `transactions` field both mean there is
/// nothing to aggregate.
fn into_block(raw: Option<RawBlock>) -> Result<Block, RpcError> {
    let raw = raw.ok_or(RpcError::EmptyBlock)?;
    let transactions = raw.transactions.ok_or(RpcError::EmptyBlock)?;
    let number = raw
        .number
        .as_deref()
        .and_then(|n| parse_quantity(n).ok())
        .and_then(|n| n.to_u64());

    Ok(Block {
        number,
        transactions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawTx;

    #[test]
    fn null_result_is_empty_block() {
        assert_eq!(into_block(None).unwrap_err(), RpcError::EmptyBlock);
    }

    #[test]
    fn missing_transactions_is_empty_block() {
        let raw = RawBlock {
            number: Some("0x10".to_string()),
            transactions: None,
        };
        assert_eq!(into_block(Some(raw)).unwrap_err(), RpcError::EmptyBlock);
    }

    #[test]
    fn block_number_is_decoded() {
        let raw = RawBlock {
            number: Some("0x1b4".to_string()),
            transactions: Some(vec![RawTx {
                to: None,
                gas: "0x1".to_string(),
                gas_price: None,
            }]),
        };
        let block = into_block(Some(raw)).unwrap();
        assert_eq!(block.number, Some(436));
        assert_eq!(block.transactions.len(), 1);
    }

    #[test]
    fn raw_block_deserializes_full_transactions() {
        let json = serde_json::json!({
            "number": "0x2",
            "hash": "0xabc",
            "transactions": [
                {"hash": "0x1", "to": "0x1111111254fb6c44bac0bed2854e76f90643097d", "gas": "0x5208", "gasPrice": "0x3b9aca00"},
                {"hash": "0x2", "to": null, "gas": "0x5208"}
            ]
        });
        let raw: RawBlock = serde_json::from_value(json).unwrap();
        let txs = raw.transactions.unwrap();
        assert_eq!(txs[0].gas_price.as_deref(), Some("0x3b9aca00"));
        assert!(txs[1].to.is_none());
        assert!(txs[1].gas_price.is_none());
    }

    #[tokio::test]
    async fn unparseable_endpoint_is_network_error() {
        let client = EthClient::new(Duration::from_millis(100)).unwrap();
        let err = client.fetch_latest_block("not a url").await.unwrap_err();
        assert!(matches!(err, RpcError::Network(_)));
    }
}
