use std::collections::HashSet;
use std::env;
use std::time::Duration;

use crate::protocols::ProtocolTable;

const DEFAULT_CHAINS: &str = "ethereum,base,linea";
const DEFAULT_RPC_TIMEOUT_MS: u64 = 8_000;

/// A logical network and its candidate endpoints, primary first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub id: String,
    pub display_name: String,
    pub endpoints: Vec<String>,
    pub fallback_icon: String,
}

impl Chain {
    pub fn new(id: &str, endpoints: Vec<String>) -> Self {
        let id = id.trim().to_lowercase();
        let fallback_icon = if id == "base" { "🔵" } else { "💠" }.to_string();
        Self {
            display_name: id.to_uppercase(),
            id,
            endpoints,
            fallback_icon,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub chains: Vec<Chain>,
    pub rpc_timeout: Duration,
    pub protocols: ProtocolTable,
    pub database_url: String,
    pub http_bind_addr: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("no chains configured (CHAINS is empty)")]
    NoChains,
    #[error("chain {0:?} has no endpoints; set RPC_URLS_{1}")]
    NoEndpoints(String, String),
    #[error("invalid RPC_TIMEOUT_MS {0:?}: expected a positive integer")]
    InvalidTimeout(String),
    #[error("failed to read PROTOCOLS_FILE {path}: {source}")]
    ProtocolsFile {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse PROTOCOLS_FILE {path}: {source}")]
    ProtocolsParse {
        path: String,
        source: serde_json::Error,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let chain_ids = lookup("CHAINS").unwrap_or_else(|| DEFAULT_CHAINS.to_string());
        let chains = dedup_keep_first(parse_list(&chain_ids.to_lowercase()))
            .into_iter()
            .map(|id| {
                let var_suffix = env_suffix(&id);
                let endpoints = lookup(&format!("RPC_URLS_{}", var_suffix))
                    .map(|raw| dedup_keep_first(parse_list(&raw)))
                    .unwrap_or_else(|| default_endpoints(&id));
                if endpoints.is_empty() {
                    return Err(ConfigError::NoEndpoints(id, var_suffix));
                }
                Ok(Chain::new(&id, endpoints))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if chains.is_empty() {
            return Err(ConfigError::NoChains);
        }

        let rpc_timeout = match lookup("RPC_TIMEOUT_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => Duration::from_millis(DEFAULT_RPC_TIMEOUT_MS),
        };

        let protocols = match lookup("PROTOCOLS_FILE") {
            Some(path) => load_protocols(&path)?,
            None => ProtocolTable::builtin(),
        };

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://data/gas_trends.db".to_string());
        let http_bind_addr = lookup("HTTP_BIND").unwrap_or_else(|| "127.0.0.1:8080".to_string());

        Ok(Self {
            chains,
            rpc_timeout,
            protocols,
            database_url,
            http_bind_addr,
        })
    }
}

fn load_protocols(path: &str) -> Result<ProtocolTable, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ProtocolsFile {
        path: path.to_string(),
        source,
    })?;
    ProtocolTable::from_json(&raw).map_err(|source| ConfigError::ProtocolsParse {
        path: path.to_string(),
        source,
    })
}

/// Public endpoints used when `RPC_URLS_<CHAIN>` is not set.
fn default_endpoints(chain_id: &str) -> Vec<String> {
    let urls: &[&str] = match chain_id {
        "ethereum" => &["https://eth.drpc.org", "https://ethereum-rpc.publicnode.com"],
        "base" => &["https://mainnet.base.org", "https://base-rpc.publicnode.com"],
        "linea" => &["https://rpc.linea.build", "https://linea.drpc.org"],
        "arbitrum" => &[
            "https://arb1.arbitrum.io/rpc",
            "https://arbitrum-one-rpc.publicnode.com",
        ],
        "monad" => &["https://testnet-rpc.monad.xyz"],
        _ => &[],
    };
    urls.iter().map(|s| s.to_string()).collect()
}

fn env_suffix(chain_id: &str) -> String {
    chain_id.to_uppercase().replace('-', "_")
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Repeated entries are dropped; the first occurrence keeps its position.
fn dedup_keep_first(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
