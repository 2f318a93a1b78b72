use crate::abi::CanonicalTokenParams;
use crate::bind::{deploy_canonical_proxy, deploy_contract, transfer_token_and_ownership};
use crate::bind_config::BindConfig;
use crate::cli::{DeployAndTransferArgs, DeployCanonicalProxyArgs, DeployContractArgs};
use crate::commands::keystore_chain;
use crate::config::Config;
use crate::error::BindError;
use crate::units::{convert_to_bep20_amount, parse_u256, validate_address};
use alloy_primitives::Address;
use anyhow::Result;
use tracing::info;

pub async fn run_deploy(args: DeployContractArgs, network: &str, config: Config) -> Result<()> {
    let bind_config = BindConfig::load(&args.bind_config)?;
    let code = bind_config.bytecode()?;
    let (ctx, chain) = keystore_chain(network, &args.keystore.keystore_path, &config)?;

    let contract = deploy_contract(&chain, code).await?;
    ctx.print_address("Contract", contract);
    println!("{contract}");
    print_next_step(&bind_config, contract);
    Ok(())
}

pub async fn run_deploy_canonical_proxy(
    args: DeployCanonicalProxyArgs,
    network: &str,
    config: Config,
) -> Result<()> {
    let implementation = validate_address("canonical implementation address", &args.canonical_impl_addr)?;
    if args.name.trim().is_empty() || args.symbol.trim().is_empty() {
        return Err(BindError::MissingValue("token name or symbol").into());
    }
    if args.total_supply.trim().is_empty() {
        return Err(BindError::MissingValue("total supply").into());
    }
    let total_supply = convert_to_bep20_amount(parse_u256(&args.total_supply)?, args.decimals)?;
    let owner = validate_address("bep20 token owner", &args.owner)?;
    let proxy_admin = validate_address("proxy admin", &args.proxy_admin)?;
    let proxy_code = BindConfig::load(&args.bind_config)?.bytecode()?;

    let params = CanonicalTokenParams {
        name: args.name,
        symbol: args.symbol,
        decimals: args.decimals,
        total_supply,
        mintable: args.mintable,
        owner,
    };
    let (ctx, chain) = keystore_chain(network, &args.keystore.keystore_path, &config)?;
    let contract =
        deploy_canonical_proxy(&chain, &proxy_code, implementation, proxy_admin, &params).await?;
    ctx.print_address("Proxy contract", contract);
    println!("{contract}");
    Ok(())
}

pub async fn run_deploy_and_transfer(
    args: DeployAndTransferArgs,
    network: &str,
    config: Config,
) -> Result<()> {
    let bind_config = BindConfig::load(&args.bind_config)?;
    let code = bind_config.bytecode()?;
    let owner = match args.bep20_owner.as_deref() {
        Some(owner) => validate_address("bep20 owner", owner)?,
        None => bind_config
            .final_owner()?
            .ok_or(BindError::MissingValue("bep20 owner"))?,
    };
    let (ctx, chain) = keystore_chain(network, &args.keystore.keystore_path, &config)?;

    let contract = deploy_contract(&chain, code).await?;
    ctx.print_address("Contract", contract);
    transfer_token_and_ownership(&chain, contract, owner).await?;
    print_next_step(&bind_config, contract);
    Ok(())
}

fn print_next_step(bind_config: &BindConfig, contract: Address) {
    if let Some(symbol) = bind_config.bep20_symbol.as_deref() {
        info!(bep20_symbol = symbol, %contract, "deployed token");
    }
    if let Ok(bep2_symbol) = bind_config.bep2_symbol() {
        println!("Next: send the bind transaction for {bep2_symbol} to {contract} on the beacon chain");
    }
}
