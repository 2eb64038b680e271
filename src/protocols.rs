use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::Chain;
use crate::format::format_gas;
use crate::models::{ContractBurn, RankedEntry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolInfo {
    pub name: String,
    pub icon: String,
}

/// Known contracts keyed by canonical address. `chains` entries take
/// precedence over `shared` ones for the same address.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProtocolTable {
    #[serde(default)]
    shared: HashMap<String, ProtocolInfo>,
    #[serde(default)]
    chains: HashMap<String, HashMap<String, ProtocolInfo>>,
}

impl ProtocolTable {
    pub fn builtin() -> Self {
        let shared = [
            ("0x3fc91a3afd70395cd496c647d5a6cc9d4b2b7fad", "Uniswap Universal", "🦄"),
            ("0xef1c6e67703c7bd7107eed8303fbe6ec2554ee6b", "Uniswap V3", "🦄"),
            ("0x1111111254fb6c44bac0bed2854e76f90643097d", "1inch Aggregator", "🔀"),
            ("0x4752ba5dbc23f44d82123f0f6739aee0c9f45a60", "Base Swap", "🔵"),
        ]
        .into_iter()
        .map(|(address, name, icon)| {
            (
                address.to_string(),
                ProtocolInfo {
                    name: name.to_string(),
                    icon: icon.to_string(),
                },
            )
        })
        .collect();

        Self {
            shared,
            chains: HashMap::new(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let parsed: ProtocolTable = serde_json::from_str(raw)?;
        Ok(Self {
            shared: canonical_keys(parsed.shared),
            chains: parsed
                .chains
                .into_iter()
                .map(|(chain, entries)| (chain.trim().to_lowercase(), canonical_keys(entries)))
                .collect(),
        })
    }

    pub fn lookup(&self, chain_id: &str, address: &str) -> Option<&ProtocolInfo> {
        let address = address.trim().to_lowercase();
        self.chains
            .get(chain_id)
            .and_then(|entries| entries.get(&address))
            .or_else(|| self.shared.get(&address))
    }

    pub fn len(&self) -> usize {
        self.shared.len() + self.chains.values().map(HashMap::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attach display name, icon and formatted burn to a chain's top contract.
    pub fn enrich(&self, chain: &Chain, burn: ContractBurn) -> RankedEntry {
        let (name, icon) = match self.lookup(&chain.id, &burn.address) {
            Some(info) => (info.name.clone(), info.icon.clone()),
            None => (placeholder_name(&burn.address), chain.fallback_icon.clone()),
        };

        RankedEntry {
            display_gas: format_gas(&burn.gas),
            gas_value: burn.gas,
            address: burn.address,
            chain: chain.display_name.clone(),
            name,
            icon,
        }
    }
}

fn canonical_keys(entries: HashMap<String, ProtocolInfo>) -> HashMap<String, ProtocolInfo> {
    entries
        .into_iter()
        .map(|(address, info)| (address.trim().to_lowercase(), info))
        .collect()
}

fn placeholder_name(address: &str) -> String {
    let prefix: String = address.chars().take(6).collect();
    format!("Contract {}...", prefix)
}
