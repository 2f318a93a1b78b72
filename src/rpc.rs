use crate::config::ConfirmationPolicy;
use crate::error::BindError;
use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::{Filter, Log, TransactionReceipt, TransactionRequest};
use anyhow::{anyhow, Context, Result};
use std::future::Future;
use tracing::debug;

#[derive(Clone)]
pub struct RpcClient {
    pub provider: DynProvider,
}

impl RpcClient {
    pub fn new(url: &str) -> Result<Self> {
        let parsed: url::Url = url
            .parse()
            .with_context(|| format!("invalid rpc url {url}"))?;
        let provider = ProviderBuilder::new().connect_http(parsed).erased();
        Ok(Self { provider })
    }
}

pub async fn eth_call(client: &RpcClient, to: Address, data: Bytes) -> Result<Bytes> {
    let request = TransactionRequest::default().with_to(to).with_input(data);
    let result = client.provider.call(request).await?;
    Ok(result)
}

pub async fn get_transaction_receipt(
    client: &RpcClient,
    tx_hash: B256,
) -> Result<Option<TransactionReceipt>> {
    Ok(client.provider.get_transaction_receipt(tx_hash).await?)
}

/// Poll for a receipt with exponential backoff.
///
/// Returns [`BindError::ConfirmationTimeout`] once the attempt budget is spent
/// without the node knowing the transaction; RPC failures propagate as-is.
pub async fn wait_for_receipt(
    client: &RpcClient,
    tx_hash: B256,
    policy: &ConfirmationPolicy,
) -> Result<TransactionReceipt> {
    poll_until_found(tx_hash, policy, || get_transaction_receipt(client, tx_hash)).await
}

async fn poll_until_found<T, F, Fut>(
    tx_hash: B256,
    policy: &ConfirmationPolicy,
    mut lookup: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    for attempt in 0..policy.max_attempts {
        let delay = policy.backoff_for_attempt(attempt);
        debug!(tx = %tx_hash, attempt, ?delay, "waiting for receipt");
        tokio::time::sleep(delay).await;
        if let Some(found) = lookup().await? {
            return Ok(found);
        }
    }
    Err(BindError::ConfirmationTimeout {
        hash: tx_hash,
        attempts: policy.max_attempts,
    }
    .into())
}

pub async fn pending_nonce(client: &RpcClient, address: Address) -> Result<u64> {
    Ok(client
        .provider
        .get_transaction_count(address)
        .pending()
        .await?)
}

pub async fn get_balance(client: &RpcClient, address: Address) -> Result<U256> {
    Ok(client.provider.get_balance(address).await?)
}

pub async fn get_block_number(client: &RpcClient) -> Result<u64> {
    Ok(client.provider.get_block_number().await?)
}

/// Fetch logs matching `filter` in `[from, to]`, `chunk` blocks at a time.
pub async fn get_logs_chunked(
    client: &RpcClient,
    filter: Filter,
    from: u64,
    to: u64,
    chunk: u64,
) -> Result<Vec<Log>> {
    if chunk == 0 {
        return Err(anyhow!("log chunk size must be positive"));
    }
    let mut logs = Vec::new();
    let mut start = from;
    while start <= to {
        let end = start.saturating_add(chunk - 1).min(to);
        let page = client
            .provider
            .get_logs(&filter.clone().from_block(start).to_block(end))
            .await
            .with_context(|| format!("eth_getLogs failed for blocks {start}..={end}"))?;
        debug!(start, end, found = page.len(), "fetched logs");
        logs.extend(page);
        if end == u64::MAX {
            break;
        }
        start = end + 1;
    }
    Ok(logs)
}
