use crate::cli::PreCheckArgs;
use crate::config::Config;
use crate::error::BindError;
use crate::network::NetworkContext;
use crate::precheck::pre_check_bind;
use crate::registry::RegistryClient;
use crate::rpc::RpcClient;
use crate::units::validate_address;
use anyhow::{anyhow, Result};
use tracing::info;

pub async fn run(args: PreCheckArgs, network: &str, config: Config) -> Result<()> {
    let ctx = NetworkContext::resolve(network, &config)?;
    if !ctx.is_mainnet() {
        return Err(anyhow!("this command only works on mainnet"));
    }
    let contract = validate_address("bep20 contract address", &args.bep20_contract_addr)?;
    let bep2_symbol = args.bep2_symbol.trim();
    if bep2_symbol.is_empty() {
        return Err(BindError::MissingValue("bep2 symbol").into());
    }

    let client = RpcClient::new(&ctx.rpc_url)?;
    let registry = RegistryClient::new(config.registry_url())?;
    let can_bind = pre_check_bind(&client, &registry, bep2_symbol, contract).await?;
    info!(can_bind, bep2_symbol, %contract, "pre-check finished");
    Ok(())
}
