use crate::abi::IBEP20;
use crate::chain::read_call;
use crate::registry::{Bep2Token, RegistryClient};
use crate::rpc::RpcClient;
use crate::units::{convert_to_bep20_amount, convert_to_bep2_amount, parse_u256, BEP2_DECIMALS};
use alloy_primitives::{Address, U256};
use anyhow::{anyhow, Result};
use bigdecimal::BigDecimal;
use std::str::FromStr;
use tracing::{info, warn};

/// Largest BEP2 supply, in 8-decimal units.
pub const BEP2_MAX_SUPPLY: u64 = 9_000_000_000_000_000_000;

const SWAP_OFFCHAIN: &str = "please swap tokens offchain, e.g., through CEXs (if your tokens are \
listed on Binance.com, you can ask your users deposit their tokens to it then do the exchange)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: Option<String>,
    pub suggestion: &'static str,
}

impl CheckResult {
    fn new(name: String, passed: bool, suggestion: &'static str) -> Self {
        Self {
            name,
            passed,
            detail: None,
            suggestion,
        }
    }

    fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// On-chain facts about the BEP20 side gathered before checking.
#[derive(Debug, Clone)]
pub struct Bep20Facts {
    pub symbol: String,
    pub total_supply: U256,
    pub decimals: u8,
    pub has_owner: bool,
}

pub fn check_symbol_length(bep20_symbol: &str) -> CheckResult {
    let len = bep20_symbol.len();
    CheckResult::new(
        format!("Checking BEP20 symbol length: {bep20_symbol}"),
        (2..=8).contains(&len),
        SWAP_OFFCHAIN,
    )
    .with_detail("BEP20 symbol length should be between 2 and 8".to_string())
}

/// The BEP2 symbol must be the BEP20 symbol followed by `-` and a suffix.
pub fn symbols_match(bep2_symbol: &str, bep20_symbol: &str) -> bool {
    bep2_symbol
        .strip_prefix(bep20_symbol)
        .is_some_and(|rest| rest.starts_with('-'))
}

pub fn check_symbol_match(bep2_symbol: &str, bep20_symbol: &str) -> CheckResult {
    CheckResult::new(
        format!("Checking symbols match or not, BEP2: {bep2_symbol}, BEP20: {bep20_symbol}"),
        symbols_match(bep2_symbol, bep20_symbol),
        SWAP_OFFCHAIN,
    )
    .with_detail("BEP2 and BEP20 symbols do not match".to_string())
}

pub fn check_max_supply(bep20_symbol: &str, total_supply: U256, decimals: u8) -> Result<CheckResult> {
    let max = convert_to_bep20_amount(U256::from(BEP2_MAX_SUPPLY), decimals)?;
    Ok(CheckResult::new(
        format!("Checking BEP20 total supply exceeds the max BEP2 allowance or not: {bep20_symbol}"),
        total_supply <= max,
        "please manage your BEP20 token total supply, e.g., burn tokens",
    )
    .with_detail(format!(
        "BEP20 total supply: {total_supply}, BEP2 max allowed total supply: {max}"
    )))
}

/// Registry supplies are decimal strings such as `"1000000.00000000"`.
pub fn bep2_supply_in_bep20_units(bep2_total_supply: &str, decimals: u8) -> Result<U256> {
    let amount = BigDecimal::from_str(bep2_total_supply.trim())
        .map_err(|err| anyhow!("invalid BEP2 total supply {bep2_total_supply}: {err}"))?;
    let scaled = amount * BigDecimal::from(10u64.pow(u32::from(BEP2_DECIMALS)));
    let (integer, _) = scaled.with_scale(0).into_bigint_and_exponent();
    convert_to_bep20_amount(parse_u256(&integer.to_string())?, decimals)
}

pub fn check_supply_match(
    total_supply: U256,
    bep2_total_supply: &str,
    decimals: u8,
) -> Result<CheckResult> {
    let bep2_supply = bep2_supply_in_bep20_units(bep2_total_supply, decimals)?;
    let in_bep2_units = convert_to_bep2_amount(total_supply, decimals)?;
    Ok(CheckResult::new(
        "Checking BEP20 total supply and BEP2 total supply match or not".to_string(),
        total_supply == bep2_supply,
        "please manage your BEP20/BEP2 token total supply, e.g., burn tokens, mint tokens, \
         to make sure they are equal using different decimals",
    )
    .with_detail(format!(
        "BEP20 total supply: {total_supply} ({in_bep2_units} in BEP2 units), BEP2 total supply: {bep2_supply}"
    )))
}

pub fn check_get_owner(bep20_symbol: &str, has_owner: bool) -> CheckResult {
    CheckResult::new(
        format!("Checking BEP20 has getOwner function or not: {bep20_symbol}"),
        has_owner,
        "please upgrade your contract to follow BEP20 standards, i.e., adding getOwner function",
    )
    .with_detail("BEP20 does not implement getOwner function".to_string())
}

/// Run all five checks; none short-circuits.
pub fn run_checks(bep2: &Bep2Token, facts: &Bep20Facts) -> Result<Vec<CheckResult>> {
    Ok(vec![
        check_symbol_length(&facts.symbol),
        check_symbol_match(&bep2.symbol, &facts.symbol),
        check_max_supply(&facts.symbol, facts.total_supply, facts.decimals)?,
        check_supply_match(facts.total_supply, &bep2.total_supply, facts.decimals)?,
        check_get_owner(&facts.symbol, facts.has_owner),
    ])
}

pub async fn bep20_facts(client: &RpcClient, contract: Address) -> Result<Bep20Facts> {
    let symbol = read_call(client, contract, IBEP20::symbolCall {}).await?;
    let total_supply = read_call(client, contract, IBEP20::totalSupplyCall {}).await?;
    let decimals = read_call(client, contract, IBEP20::decimalsCall {}).await?;
    let has_owner = match read_call(client, contract, IBEP20::getOwnerCall {}).await {
        Ok(owner) => {
            info!(%owner, "getOwner returned");
            true
        }
        Err(err) => {
            warn!(error = %err, "getOwner call failed");
            false
        }
    };
    Ok(Bep20Facts {
        symbol,
        total_supply,
        decimals,
        has_owner,
    })
}

/// Returns whether the pair can bind.
pub async fn pre_check_bind(
    client: &RpcClient,
    registry: &RegistryClient,
    bep2_symbol: &str,
    contract: Address,
) -> Result<bool> {
    let bep2 = registry.unbound_token(bep2_symbol).await?;
    let facts = bep20_facts(client, contract).await?;
    let results = run_checks(&bep2, &facts)?;
    print_report(&results);
    Ok(results.iter().all(|check| check.passed))
}

pub fn print_report(results: &[CheckResult]) {
    for (index, check) in results.iter().enumerate() {
        println!("\n{}. {}", index + 1, check.name);
        if check.passed {
            println!("Pass");
            continue;
        }
        if let Some(detail) = &check.detail {
            println!("Cannot bind: {detail}");
        }
        println!("Suggestion: {}", check.suggestion);
    }
    if results.iter().all(|check| check.passed) {
        println!("\nYou can bind the BEP2 and BEP20 tokens, please read README and take actions");
    } else {
        println!("\nThe BEP2 and BEP20 cannot bind, please take actions according the suggestions");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(symbol: &str, total_supply: U256, has_owner: bool) -> Bep20Facts {
        Bep20Facts {
            symbol: symbol.to_string(),
            total_supply,
            decimals: 18,
            has_owner,
        }
    }

    fn bep2(symbol: &str, total_supply: &str) -> Bep2Token {
        Bep2Token {
            symbol: symbol.to_string(),
            contract_address: None,
            total_supply: total_supply.to_string(),
        }
    }

    fn ether(amount: u64) -> U256 {
        U256::from(amount) * U256::from(10u64).pow(U256::from(18u64))
    }

    #[test]
    fn test_symbol_match() {
        assert!(check_symbol_match("ABC-1A2", "ABC").passed);
        assert!(!check_symbol_match("ABCD-1A2", "ABC").passed);
        assert!(!check_symbol_match("XABC-1A2", "ABC").passed);
    }

    #[test]
    fn test_symbol_match_short_bep2_does_not_panic() {
        assert!(!symbols_match("ABC", "ABC"));
        assert!(!symbols_match("AB", "ABC"));
        assert!(!symbols_match("", "ABC"));
    }

    #[test]
    fn test_symbol_length_bounds() {
        assert!(!check_symbol_length("A").passed);
        assert!(check_symbol_length("AB").passed);
        assert!(check_symbol_length("ABCDEFGH").passed);
        assert!(!check_symbol_length("ABCDEFGHI").passed);
    }

    #[test]
    fn test_max_supply() {
        assert!(check_max_supply("ABC", ether(90_000_000_000), 18).unwrap().passed);
        assert!(!check_max_supply("ABC", ether(90_000_000_001), 18).unwrap().passed);
    }

    #[test]
    fn test_supply_match_from_decimal_string() {
        assert_eq!(
            bep2_supply_in_bep20_units("1000000.00000000", 18).unwrap(),
            ether(1_000_000)
        );
        assert_eq!(
            bep2_supply_in_bep20_units("0.5", 8).unwrap(),
            U256::from(50_000_000u64)
        );
        assert!(check_supply_match(ether(21), "21", 18).unwrap().passed);
        assert!(!check_supply_match(ether(21), "21.00000001", 18).unwrap().passed);
        assert!(bep2_supply_in_bep20_units("abc", 18).is_err());
    }

    #[test]
    fn test_run_checks_reports_every_failure() {
        let results = run_checks(&bep2("ABCDEFGHI-1A2", "1"), &facts("X", ether(2), false)).unwrap();
        assert_eq!(results.len(), 5);
        let failed: Vec<bool> = results.iter().map(|r| r.passed).collect();
        assert_eq!(failed, vec![false, false, true, false, false]);
    }

    #[test]
    fn test_run_checks_all_pass() {
        let results = run_checks(&bep2("ABC-1A2", "1000000"), &facts("ABC", ether(1_000_000), true))
            .unwrap();
        assert!(results.iter().all(|r| r.passed));
    }
}
