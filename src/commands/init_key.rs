use crate::cli::InitKeyArgs;
use crate::config::Config;
use crate::network::NetworkContext;
use crate::signer::load_or_create_keystore;
use anyhow::Result;

pub async fn run(args: InitKeyArgs, network: &str, config: Config) -> Result<()> {
    let ctx = NetworkContext::resolve(network, &config)?;
    let identity = load_or_create_keystore(&args.keystore.keystore_path, &config.passphrase())?;
    println!("{}", identity.address());
    ctx.print_address("Temp account", identity.address());
    Ok(())
}
