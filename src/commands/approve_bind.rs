use crate::bind::{approve_bind_and_transfer_ownership, BindOutcome, BindRequest};
use crate::cli::{ApproveBindArgs, ApproveBindFromLedgerArgs};
use crate::commands::{keystore_chain, signing_chain};
use crate::config::Config;
use crate::error::BindError;
use crate::network::{Network, NetworkContext};
use crate::signer::open_ledger;
use anyhow::Result;
use std::str::FromStr;
use tracing::{info, warn};

/// Testnet has no lock amount query; the peggy amount must be given.
fn require_peggy_on_testnet(network: &str, peggy_amount: Option<&str>) -> Result<()> {
    let missing = peggy_amount.map_or(true, |value| value.trim().is_empty());
    if Network::from_str(network)? == Network::Testnet && missing {
        return Err(BindError::MissingValue("peggy amount, required on testnet").into());
    }
    Ok(())
}

pub async fn run_keystore(args: ApproveBindArgs, network: &str, config: Config) -> Result<()> {
    require_peggy_on_testnet(network, args.peggy_amount.as_deref())?;
    let request = BindRequest::new(
        &args.bep20_contract_addr,
        &args.bep2_symbol,
        args.peggy_amount.as_deref(),
        Some(&args.bep20_owner),
    )?;
    let (_ctx, chain) = keystore_chain(network, &args.keystore.keystore_path, &config)?;
    let outcome = approve_bind_and_transfer_ownership(&chain, &request).await?;
    report(&outcome);
    Ok(())
}

pub async fn run_ledger(args: ApproveBindFromLedgerArgs, network: &str, config: Config) -> Result<()> {
    require_peggy_on_testnet(network, args.peggy_amount.as_deref())?;
    let request = BindRequest::new(
        &args.bep20_contract_addr,
        &args.bep2_symbol,
        args.peggy_amount.as_deref(),
        None,
    )?;
    let ctx = NetworkContext::resolve(network, &config)?;
    let identity = open_ledger(
        &config.derivation_path(args.ledger_account_index),
        ctx.chain_id,
    )
    .await?;
    let chain = signing_chain(&ctx, identity, &config)?;
    let outcome = approve_bind_and_transfer_ownership(&chain, &request).await?;
    report(&outcome);
    Ok(())
}

fn report(outcome: &BindOutcome) {
    match outcome {
        BindOutcome::Accepted { refunded, ownership_tx } => {
            info!(refunded = refunded.is_some(), ownership = ownership_tx.is_some(), "bind approved");
        }
        BindOutcome::Rejected { reject_tx, reject_succeeded } => {
            warn!(tx = %reject_tx, reject_succeeded, "bind rejected");
        }
    }
}
