use crate::abi::{ITokenManager, IBEP20, TOKEN_HUB_ADDRESS, TOKEN_MANAGER_ADDRESS};
use crate::chain::read_call;
use crate::price::PriceClient;
use crate::rpc::{get_block_number, get_logs_chunked, RpcClient};
use crate::units::to_decimal;
use alloy_primitives::{Address, U256};
use alloy_rpc_types::Filter;
use alloy_sol_types::SolEvent;
use anyhow::{anyhow, Result};
use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;
use tracing::{debug, info};

/// Addresses whose balances do not count as circulating.
#[derive(Debug, Clone, Default)]
pub struct StatsSettings {
    pub admin_addresses: Vec<Address>,
    pub withdraw_address: Option<Address>,
    pub exclude: Vec<Address>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenStatsInfo {
    pub contract: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: BigDecimal,
    pub token_hub_balance: BigDecimal,
    pub withdraw_balance: BigDecimal,
    pub admin_balances: Vec<BigDecimal>,
    pub bsc_circulation: BigDecimal,
    pub scattered_balance: BigDecimal,
    pub price: BigDecimal,
    pub scattered_market_cap: BigDecimal,
}

/// Raw balances of one token, in contract units.
#[derive(Debug, Clone, Default)]
pub struct TokenBalances {
    pub total_supply: U256,
    pub token_hub: U256,
    pub withdraw: U256,
    pub admins: Vec<U256>,
    /// `None` when the owner is one of the admin addresses.
    pub owner: Option<U256>,
    pub excluded: Vec<U256>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Circulation {
    pub excluded: U256,
    pub scattered: U256,
    pub bsc_circulation: U256,
}

impl TokenBalances {
    pub fn circulation(&self) -> Circulation {
        let excluded = self
            .admins
            .iter()
            .chain(self.excluded.iter())
            .chain(self.owner.iter())
            .fold(self.token_hub.saturating_add(self.withdraw), |acc, b| {
                acc.saturating_add(*b)
            });
        Circulation {
            excluded,
            scattered: self.total_supply.saturating_sub(excluded),
            bsc_circulation: self.total_supply.saturating_sub(self.token_hub),
        }
    }
}

/// Contracts that emitted `bindSuccess` from `from_block` to the chain head.
pub async fn bound_contracts(client: &RpcClient, from_block: u64, chunk: u64) -> Result<Vec<Address>> {
    let latest = get_block_number(client).await?;
    if from_block > latest {
        return Err(anyhow!("from block {from_block} is beyond latest block {latest}"));
    }
    info!(from_block, latest, chunk, "scanning bindSuccess events");
    let filter = Filter::new()
        .address(TOKEN_MANAGER_ADDRESS)
        .event_signature(ITokenManager::bindSuccess::SIGNATURE_HASH);
    let logs = get_logs_chunked(client, filter, from_block, latest, chunk).await?;

    let mut contracts = Vec::new();
    for log in logs {
        let decoded = log
            .log_decode::<ITokenManager::bindSuccess>()
            .map_err(|err| anyhow!("failed to decode bindSuccess: {err}"))?;
        let event = decoded.inner.data;
        debug!(contract = %event.contractAddr, symbol = %event.bep2Symbol, "bound token");
        if !contracts.contains(&event.contractAddr) {
            contracts.push(event.contractAddr);
        }
    }
    Ok(contracts)
}

async fn balance(client: &RpcClient, token: Address, account: Address) -> Result<U256> {
    read_call(client, token, IBEP20::balanceOfCall { account }).await
}

pub async fn token_stats(
    client: &RpcClient,
    token: Address,
    settings: &StatsSettings,
    prices: Option<(&PriceClient, &BigDecimal)>,
) -> Result<TokenStatsInfo> {
    let name = read_call(client, token, IBEP20::nameCall {}).await?;
    let symbol = read_call(client, token, IBEP20::symbolCall {}).await?;
    let decimals = read_call(client, token, IBEP20::decimalsCall {}).await?;
    let total_supply = read_call(client, token, IBEP20::totalSupplyCall {}).await?;
    let owner = read_call(client, token, IBEP20::getOwnerCall {}).await?;

    let token_hub = balance(client, token, TOKEN_HUB_ADDRESS).await?;
    let withdraw = match settings.withdraw_address {
        Some(address) => balance(client, token, address).await?,
        None => U256::ZERO,
    };
    let mut admins = Vec::with_capacity(settings.admin_addresses.len());
    for admin in &settings.admin_addresses {
        admins.push(balance(client, token, *admin).await?);
    }
    let owner = if settings.admin_addresses.contains(&owner) {
        None
    } else {
        Some(balance(client, token, owner).await?)
    };
    let mut excluded = Vec::with_capacity(settings.exclude.len());
    for address in &settings.exclude {
        excluded.push(balance(client, token, *address).await?);
    }

    let balances = TokenBalances {
        total_supply,
        token_hub,
        withdraw,
        admins,
        owner,
        excluded,
    };
    let price = match prices {
        Some((price_client, bnb_price)) => price_client.price(&symbol, bnb_price).await,
        None => BigDecimal::zero(),
    };
    Ok(build_stats(token, name, symbol, decimals, &balances, price))
}

pub fn build_stats(
    token: Address,
    name: String,
    symbol: String,
    decimals: u8,
    balances: &TokenBalances,
    price: BigDecimal,
) -> TokenStatsInfo {
    let circulation = balances.circulation();
    let scattered_balance = to_decimal(circulation.scattered, decimals);
    let scattered_market_cap = &scattered_balance * &price;
    TokenStatsInfo {
        contract: token.to_string(),
        name,
        symbol,
        decimals,
        total_supply: to_decimal(balances.total_supply, decimals),
        token_hub_balance: to_decimal(balances.token_hub, decimals),
        withdraw_balance: to_decimal(balances.withdraw, decimals),
        admin_balances: balances
            .admins
            .iter()
            .map(|b| to_decimal(*b, decimals))
            .collect(),
        bsc_circulation: to_decimal(circulation.bsc_circulation, decimals),
        scattered_balance,
        price,
        scattered_market_cap,
    }
}

pub fn print_table(stats: &[TokenStatsInfo]) {
    println!(
        "{:<10} {:<24} {:>28} {:>28} {:>28} {:>28} {:>14} {:>20}",
        "symbol",
        "name",
        "total supply",
        "token hub",
        "bsc circulation",
        "scattered",
        "price",
        "scattered cap"
    );
    let mut total_cap = BigDecimal::zero();
    for info in stats {
        println!(
            "{:<10} {:<24} {:>28} {:>28} {:>28} {:>28} {:>14} {:>20}",
            info.symbol,
            info.name,
            info.total_supply.normalized().to_string(),
            info.token_hub_balance.normalized().to_string(),
            info.bsc_circulation.normalized().to_string(),
            info.scattered_balance.normalized().to_string(),
            info.price.normalized().to_string(),
            info.scattered_market_cap.with_scale(2).to_string()
        );
        total_cap += &info.scattered_market_cap;
    }
    println!("tokens: {}, total scattered market cap: {}", stats.len(), total_cap.with_scale(2));
}
