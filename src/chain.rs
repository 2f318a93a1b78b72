use crate::abi::{ITokenHub, ITokenManager, IBEP20, TOKEN_HUB_ADDRESS, TOKEN_MANAGER_ADDRESS};
use crate::network::NetworkContext;
use crate::rpc::{eth_call, RpcClient};
use crate::tx::{Confirmation, TxSender};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::debug;

/// One state-changing call the orchestrator wants on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub label: &'static str,
    /// `None` deploys `data` as creation code.
    pub to: Option<Address>,
    pub data: Bytes,
    pub value: U256,
}

impl ContractCall {
    pub fn new(label: &'static str, to: Address, data: Bytes) -> Self {
        Self {
            label,
            to: Some(to),
            data,
            value: U256::ZERO,
        }
    }

    pub fn deploy(label: &'static str, code: Bytes) -> Self {
        Self {
            label,
            to: None,
            data: code,
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Everything the bind workflow needs from the chain.
#[async_trait]
pub trait BindChain: Send + Sync {
    fn signer_address(&self) -> Address;

    async fn total_supply(&self, token: Address) -> Result<U256>;
    async fn decimals(&self, token: Address) -> Result<u8>;
    async fn balance_of(&self, token: Address, account: Address) -> Result<U256>;
    async fn required_lock_amount(&self, bep2_symbol: &str) -> Result<U256>;
    async fn mini_relay_fee(&self) -> Result<U256>;

    async fn submit(&self, call: ContractCall) -> Result<B256>;
    async fn confirm(&self, hash: B256) -> Result<Confirmation>;
    async fn refund_gas_token(&self, recipient: Address) -> Result<B256>;
}

/// `eth_call` a typed contract function and decode its return value.
pub async fn read_call<C: SolCall>(client: &RpcClient, to: Address, call: C) -> Result<C::Return> {
    let data = eth_call(client, to, Bytes::from(call.abi_encode())).await?;
    C::abi_decode_returns(&data)
        .map_err(|err| anyhow!("failed to decode {} from {to}: {err}", C::SIGNATURE))
}

/// [`BindChain`] backed by a JSON-RPC node and a signing identity.
pub struct EvmBindChain {
    sender: TxSender,
    ctx: NetworkContext,
}

impl EvmBindChain {
    pub fn new(sender: TxSender, ctx: NetworkContext) -> Self {
        Self { sender, ctx }
    }

    fn client(&self) -> &RpcClient {
        self.sender.client()
    }
}

#[async_trait]
impl BindChain for EvmBindChain {
    fn signer_address(&self) -> Address {
        self.sender.from()
    }

    async fn total_supply(&self, token: Address) -> Result<U256> {
        read_call(self.client(), token, IBEP20::totalSupplyCall {}).await
    }

    async fn decimals(&self, token: Address) -> Result<u8> {
        read_call(self.client(), token, IBEP20::decimalsCall {}).await
    }

    async fn balance_of(&self, token: Address, account: Address) -> Result<U256> {
        read_call(self.client(), token, IBEP20::balanceOfCall { account }).await
    }

    async fn required_lock_amount(&self, bep2_symbol: &str) -> Result<U256> {
        let call = ITokenManager::queryRequiredLockAmountForBindCall {
            symbol: bep2_symbol.to_string(),
        };
        read_call(self.client(), TOKEN_MANAGER_ADDRESS, call).await
    }

    async fn mini_relay_fee(&self) -> Result<U256> {
        read_call(self.client(), TOKEN_HUB_ADDRESS, ITokenHub::getMiniRelayFeeCall {}).await
    }

    async fn submit(&self, call: ContractCall) -> Result<B256> {
        let pending = self.sender.send(call.to, call.value, call.data).await?;
        debug!(
            step = call.label,
            nonce = pending.nonce,
            gas_price = pending.gas_price,
            gas_limit = pending.gas_limit,
            value = %pending.value,
            input_len = pending.input.len(),
            "signed {}",
            if pending.to.is_some() { "call" } else { "deployment" }
        );
        self.ctx.print_tx(&format!("{} txHash", call.label), pending.hash);
        Ok(pending.hash)
    }

    async fn confirm(&self, hash: B256) -> Result<Confirmation> {
        self.sender.confirm(hash).await
    }

    async fn refund_gas_token(&self, recipient: Address) -> Result<B256> {
        let pending = self.sender.send_all_gas_token(recipient).await?;
        self.ctx.print_tx("Refund txHash", pending.hash);
        Ok(pending.hash)
    }
}
