use crate::cli::CrossChainStatsArgs;
use crate::config::Config;
use crate::network::NetworkContext;
use crate::price::PriceClient;
use crate::rpc::RpcClient;
use crate::stats::{bound_contracts, print_table, token_stats, StatsSettings};
use crate::units::validate_address;
use anyhow::{Context, Result};
use tracing::info;

fn settings(args: &CrossChainStatsArgs, config: &Config) -> Result<StatsSettings> {
    let admin_addresses = config
        .admin_addresses()
        .iter()
        .map(|address| validate_address("admin address", address))
        .collect::<Result<Vec<_>>>()?;
    let withdraw_address = config
        .withdraw_address()
        .map(|address| validate_address("withdraw address", &address))
        .transpose()?;
    let exclude = args
        .exclude
        .iter()
        .map(|address| validate_address("exclude address", address))
        .collect::<Result<Vec<_>>>()?;
    Ok(StatsSettings {
        admin_addresses,
        withdraw_address,
        exclude,
    })
}

pub async fn run(args: CrossChainStatsArgs, network: &str, config: Config) -> Result<()> {
    let ctx = NetworkContext::resolve(network, &config)?;
    let settings = settings(&args, &config)?;
    let client = RpcClient::new(&ctx.rpc_url)?;

    let prices = if args.with_price {
        let price_client = PriceClient::new(config.price_api(), config.stablecoins())?;
        let bnb_price = price_client
            .bnb_price()
            .await
            .context("failed to fetch BNB price")?;
        info!(%bnb_price, "BNB price");
        Some((price_client, bnb_price))
    } else {
        None
    };

    let contracts = bound_contracts(&client, args.from_block, config.log_chunk_size()).await?;
    info!(count = contracts.len(), "found bound tokens");

    let mut stats = Vec::with_capacity(contracts.len());
    for contract in contracts {
        let price_ref = prices.as_ref().map(|(price_client, bnb_price)| (price_client, bnb_price));
        let info = token_stats(&client, contract, &settings, price_ref)
            .await
            .with_context(|| format!("failed to collect stats for {contract}"))?;
        info!(symbol = %info.symbol, %contract, "collected token stats");
        stats.push(info);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_table(&stats);
    }
    Ok(())
}
