pub mod approve_bind;
pub mod deploy;
pub mod erc721;
pub mod init_key;
pub mod pre_check;
pub mod refund;
pub mod stats;

use crate::chain::EvmBindChain;
use crate::config::Config;
use crate::network::NetworkContext;
use crate::rpc::RpcClient;
use crate::signer::{load_or_create_keystore, SigningIdentity};
use crate::tx::TxSender;
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Network, node connection and sender for a keystore-signed command.
pub(crate) fn keystore_chain(
    network: &str,
    keystore_path: &Path,
    config: &Config,
) -> Result<(NetworkContext, EvmBindChain)> {
    let ctx = NetworkContext::resolve(network, config)?;
    let identity = load_or_create_keystore(keystore_path, &config.passphrase())?;
    let chain = signing_chain(&ctx, identity, config)?;
    Ok((ctx, chain))
}

pub(crate) fn signing_chain(
    ctx: &NetworkContext,
    identity: SigningIdentity,
    config: &Config,
) -> Result<EvmBindChain> {
    info!(network = %ctx.network, rpc = %ctx.rpc_url, chain_id = ctx.chain_id, "using network");
    let client = RpcClient::new(&ctx.rpc_url)?;
    let sender = TxSender::new(
        client,
        identity,
        ctx.chain_id,
        config.gas(),
        config.confirmation(),
    );
    Ok(EvmBindChain::new(sender, ctx.clone()))
}
