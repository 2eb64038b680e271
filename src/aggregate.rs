use std::cmp::Ordering;
use std::str::FromStr;

use ethers_core::types::H160;
use num_bigint::BigUint;
use num_traits::Zero;

use crate::models::{Block, ContractBurn, GasTotal};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("invalid quantity {0:?}")]
    InvalidQuantity(String),
    #[error("invalid recipient address {0:?}")]
    InvalidAddress(String),
}

/// Sum `gas * gasPrice` per recipient. Contract creations (`to == null`) are
/// skipped and a missing `gasPrice` counts as zero.
pub fn aggregate(block: &Block) -> Result<GasTotal, AggregateError> {
    let mut totals = GasTotal::new();

    for tx in &block.transactions {
        let Some(to) = tx.to.as_deref() else {
            continue;
        };
        let address = canonical_address(to)?;
        let gas_limit = parse_quantity(&tx.gas)?;
        let gas_price = match tx.gas_price.as_deref() {
            Some(raw) => parse_quantity(raw)?,
            None => BigUint::zero(),
        };

        *totals.entry(address).or_default() += gas_limit * gas_price;
    }

    Ok(totals)
}

/// Entries ordered by burn descending, then address ascending.
pub fn rank_totals(totals: &GasTotal) -> Vec<ContractBurn> {
    let mut ranked: Vec<ContractBurn> = totals
        .iter()
        .map(|(address, gas)| ContractBurn {
            address: address.clone(),
            gas: gas.clone(),
        })
        .collect();
    ranked.sort_by(compare_burn);
    ranked
}

pub fn top_contract(totals: &GasTotal) -> Option<ContractBurn> {
    rank_totals(totals).into_iter().next()
}

fn compare_burn(a: &ContractBurn, b: &ContractBurn) -> Ordering {
    b.gas.cmp(&a.gas).then_with(|| a.address.cmp(&b.address))
}

/// Parse a JSON-RPC quantity: `0x`-prefixed hex, or plain decimal.
pub fn parse_quantity(raw: &str) -> Result<BigUint, AggregateError> {
    let trimmed = raw.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some("") => Some(BigUint::zero()),
        Some(hex) => BigUint::parse_bytes(hex.as_bytes(), 16),
        None => BigUint::parse_bytes(trimmed.as_bytes(), 10),
    };
    parsed.ok_or_else(|| AggregateError::InvalidQuantity(raw.to_string()))
}

pub fn canonical_address(raw: &str) -> Result<String, AggregateError> {
    let addr = H160::from_str(raw.trim())
        .map_err(|_| AggregateError::InvalidAddress(raw.to_string()))?;
    Ok(address_to_lower_hex(addr))
}

fn address_to_lower_hex(addr: H160) -> String {
    format!("0x{:x}", addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawTx;

    const UNI: &str = "0x3fC91A3afd70395Cd496C647d5a6CC9D4B2b7FAD";
    const ONE_INCH: &str = "0x1111111254fb6c44bac0bed2854e76f90643097d";

    fn tx(to: Option<&str>, gas: &str, gas_price: Option<&str>) -> RawTx {
        RawTx {
            to: to.map(str::to_string),
            gas: gas.to_string(),
            gas_price: gas_price.map(str::to_string),
        }
    }

    fn block(transactions: Vec<RawTx>) -> Block {
        Block {
            number: Some(1),
            transactions,
        }
    }

    #[test]
    fn sums_burn_per_canonical_recipient() {
        let b = block(vec![
            tx(Some(UNI), "0x5208", Some("0x3b9aca00")),
            tx(Some(&UNI.to_lowercase()), "21000", Some("1000000000")),
            tx(Some(ONE_INCH), "0x10", Some("0x2")),
        ]);

        let totals = aggregate(&b).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(
            totals[&UNI.to_lowercase()],
            BigUint::from(2u64 * 21_000 * 1_000_000_000)
        );
        assert_eq!(totals[ONE_INCH], BigUint::from(32u32));
    }

    #[test]
    fn skips_contract_creation() {
        let b = block(vec![
            tx(None, "0x5208", Some("0x1")),
            tx(None, "0x100", Some("0x1")),
        ]);
        assert!(aggregate(&b).unwrap().is_empty());
    }

    #[test]
    fn missing_gas_price_contributes_zero() {
        let b = block(vec![tx(Some(ONE_INCH), "0x5208", None)]);
        let totals = aggregate(&b).unwrap();
        assert_eq!(totals[ONE_INCH], BigUint::zero());
    }

    #[test]
    fn same_block_in_any_order_gives_same_totals() {
        let txs = vec![
            tx(Some(UNI), "0x5208", Some("0x3b9aca00")),
            tx(Some(ONE_INCH), "0x10", Some("0x2")),
            tx(None, "0x1", Some("0x1")),
            tx(Some(ONE_INCH), "0x7", Some("0x3")),
        ];
        let mut reversed = txs.clone();
        reversed.reverse();
        let original = block(txs);

        let first = aggregate(&original).unwrap();
        assert_eq!(first, aggregate(&original).unwrap());
        assert_eq!(first, aggregate(&block(reversed)).unwrap());
        assert_eq!(first[ONE_INCH], BigUint::from(32u32 + 21));
    }

    #[test]
    fn burn_exceeding_u64_is_exact() {
        let b = block(vec![tx(
            Some(ONE_INCH),
            "0xffffffffffffffff",
            Some("0xffffffffffffffff"),
        )]);
        let totals = aggregate(&b).unwrap();
        let max = BigUint::from(u64::MAX);
        assert_eq!(totals[ONE_INCH], &max * &max);
    }

    #[test]
    fn malformed_gas_is_an_error() {
        let b = block(vec![tx(Some(ONE_INCH), "0xzz", Some("0x1"))]);
        assert_eq!(
            aggregate(&b),
            Err(AggregateError::InvalidQuantity("0xzz".to_string()))
        );
    }

    #[test]
    fn malformed_recipient_is_an_error() {
        let b = block(vec![tx(Some("0x1234"), "0x1", Some("0x1"))]);
        assert!(matches!(
            aggregate(&b),
            Err(AggregateError::InvalidAddress(_))
        ));
    }

    #[test]
    fn ties_break_on_address() {
        let mut totals = GasTotal::new();
        totals.insert("0xbb".to_string(), BigUint::from(5u32));
        totals.insert("0xaa".to_string(), BigUint::from(5u32));
        totals.insert("0xcc".to_string(), BigUint::from(1u32));

        let top = top_contract(&totals).unwrap();
        assert_eq!(top.address, "0xaa");

        let ranked: Vec<_> = rank_totals(&totals)
            .into_iter()
            .map(|c| c.address)
            .collect();
        assert_eq!(ranked, vec!["0xaa", "0xbb", "0xcc"]);
    }

    #[test]
    fn empty_totals_have_no_top() {
        assert!(top_contract(&GasTotal::new()).is_none());
    }
}
