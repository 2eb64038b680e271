use std::collections::BTreeMap;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize, Serializer};

/// `eth_getBlockByNumber` result with full transaction objects.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBlock {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub transactions: Option<Vec<RawTx>>,
}

/// The subset of a transaction object the aggregator reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawTx {
    #[serde(default)]
    pub to: Option<String>,
    pub gas: String,
    #[serde(default, rename = "gasPrice")]
    pub gas_price: Option<String>,
}

/// A block that made it through the RPC layer with its transaction list present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub number: Option<u64>,
    pub transactions: Vec<RawTx>,
}

/// Canonical recipient address -> cumulative burn for one scan window.
pub type GasTotal = BTreeMap<String, BigUint>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractBurn {
    pub address: String,
    pub gas: BigUint,
}

#[derive(Debug, Clone)]
pub struct ScanResult {
    pub chain: String,
    pub block_number: Option<u64>,
    pub top_entry: Option<ContractBurn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub address: String,
    pub display_gas: String,
    #[serde(serialize_with = "serialize_decimal")]
    pub gas_value: BigUint,
    pub chain: String,
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopDappsResponse {
    pub dapps: Vec<RankedEntry>,
}

fn serialize_decimal<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_str_radix(10))
}
