use crate::config::{ConfirmationPolicy, GasSettings};
use crate::error::BindError;
use crate::rpc::{get_balance, pending_nonce, wait_for_receipt, RpcClient};
use crate::signer::SigningIdentity;
use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

/// A signed transaction that has been handed to the node.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    pub hash: B256,
    pub to: Option<Address>,
    pub input: Bytes,
    pub value: U256,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
}

/// What the receipt says about a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub hash: B256,
    pub success: bool,
    pub contract_address: Option<Address>,
    pub block_number: Option<u64>,
}

/// Builds, signs and submits legacy transactions for one identity.
pub struct TxSender {
    client: RpcClient,
    wallet: EthereumWallet,
    from: Address,
    chain_id: u64,
    gas: GasSettings,
    confirmation: ConfirmationPolicy,
}

impl TxSender {
    pub fn new(
        client: RpcClient,
        identity: SigningIdentity,
        chain_id: u64,
        gas: GasSettings,
        confirmation: ConfirmationPolicy,
    ) -> Self {
        let from = identity.address();
        debug!(%from, kind = identity.kind(), chain_id, "transaction sender ready");
        Self {
            client,
            wallet: identity.into_wallet(),
            from,
            chain_id,
            gas,
            confirmation,
        }
    }

    pub fn from(&self) -> Address {
        self.from
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    /// Send `input` to `to`, or deploy it when `to` is `None`.
    pub async fn send(
        &self,
        to: Option<Address>,
        value: U256,
        input: Bytes,
    ) -> Result<PendingTransaction> {
        self.send_with_gas_limit(to, value, input, self.gas.limit)
            .await
    }

    pub async fn send_with_gas_limit(
        &self,
        to: Option<Address>,
        value: U256,
        input: Bytes,
        gas_limit: u64,
    ) -> Result<PendingTransaction> {
        let nonce = pending_nonce(&self.client, self.from)
            .await
            .context("failed to fetch pending nonce")?;

        let request = TransactionRequest::default()
            .with_from(self.from)
            .with_chain_id(self.chain_id)
            .with_nonce(nonce)
            .with_gas_price(self.gas.price_wei)
            .with_gas_limit(gas_limit)
            .with_value(value);
        let request = match to {
            Some(to) => request.with_to(to).with_input(input.clone()),
            None => request.with_deploy_code(input.clone()),
        };

        let envelope = request
            .build(&self.wallet)
            .await
            .map_err(|err| anyhow!("failed to sign transaction: {err}"))?;
        let pending = self
            .client
            .provider
            .send_tx_envelope(envelope)
            .await
            .context("failed to submit transaction")?;
        let hash = *pending.tx_hash();
        info!(tx = %hash, nonce, to = ?to, %value, "transaction submitted");

        Ok(PendingTransaction {
            hash,
            to,
            input,
            value,
            nonce,
            gas_price: self.gas.price_wei,
            gas_limit,
        })
    }

    pub async fn confirm(&self, hash: B256) -> Result<Confirmation> {
        let receipt = wait_for_receipt(&self.client, hash, &self.confirmation).await?;
        let confirmation = Confirmation {
            hash,
            success: receipt.status(),
            contract_address: receipt.contract_address,
            block_number: receipt.block_number,
        };
        info!(
            tx = %hash,
            success = confirmation.success,
            block = ?confirmation.block_number,
            "transaction confirmed"
        );
        Ok(confirmation)
    }

    /// Send everything except the fee of a plain transfer to `recipient`.
    pub async fn send_all_gas_token(&self, recipient: Address) -> Result<PendingTransaction> {
        let balance = get_balance(&self.client, self.from).await?;
        let limit = self.gas.transfer_limit;
        let fee = transfer_fee(self.gas.price_wei, limit);
        let amount = rest_after_fee(balance, fee)?;
        println!("rest balance {balance}, transfer BNB tx fee {fee}, transfer {amount} back to {recipient}");
        self.send_with_gas_limit(Some(recipient), amount, Bytes::new(), limit)
            .await
    }
}

pub fn transfer_fee(gas_price: u128, gas_limit: u64) -> U256 {
    U256::from(gas_price) * U256::from(gas_limit)
}

pub fn rest_after_fee(balance: U256, fee: U256) -> Result<U256> {
    balance.checked_sub(fee).ok_or_else(|| {
        BindError::InsufficientGasToken {
            balance: balance.to_string(),
            fee: fee.to_string(),
        }
        .into()
    })
}
