use crate::bind::erc721_total_supply;
use crate::cli::Erc721Args;
use crate::config::Config;
use crate::network::NetworkContext;
use crate::rpc::RpcClient;
use crate::units::validate_address;
use anyhow::Result;

pub async fn run(args: Erc721Args, network: &str, config: Config) -> Result<()> {
    let contract = validate_address("erc721 contract address", &args.erc721_addr)?;
    let ctx = NetworkContext::resolve(network, &config)?;
    let client = RpcClient::new(&ctx.rpc_url)?;
    let total_supply = erc721_total_supply(&client, contract).await?;
    println!("total supply: {total_supply}");
    Ok(())
}
