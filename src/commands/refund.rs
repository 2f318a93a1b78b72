use crate::bind::refund_rest_gas_token;
use crate::cli::RefundArgs;
use crate::commands::keystore_chain;
use crate::config::Config;
use crate::units::validate_address;
use anyhow::Result;

pub async fn run(args: RefundArgs, network: &str, config: Config) -> Result<()> {
    let recipient = validate_address("refund address", &args.recipient)?;
    let (_ctx, chain) = keystore_chain(network, &args.keystore.keystore_path, &config)?;
    refund_rest_gas_token(&chain, recipient).await?;
    Ok(())
}
