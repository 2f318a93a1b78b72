use crate::abi::{
    encode_approve, encode_approve_bind, encode_canonical_proxy_deploy, encode_reject_bind,
    encode_transfer, encode_transfer_ownership, CanonicalTokenParams, IERC721,
    TOKEN_MANAGER_ADDRESS,
};
use crate::chain::{read_call, BindChain, ContractCall};
use crate::error::BindError;
use crate::rpc::RpcClient;
use crate::tx::Confirmation;
use crate::units::{convert_to_bep20_amount, parse_u256, validate_address};
use alloy_primitives::{Address, Bytes, B256, U256};
use anyhow::Result;
use tracing::{info, warn};

pub const LABEL_DEPLOY: &str = "Deploy contract";
pub const LABEL_APPROVE: &str = "Approve token to tokenManagerContractAddr";
pub const LABEL_APPROVE_BIND: &str = "ApproveBind";
pub const LABEL_REJECT_BIND: &str = "RejectBind";
pub const LABEL_REFUND_BEP20: &str = "Refund rest BEP20 balance";
pub const LABEL_TRANSFER_TOKEN: &str = "Transfer token";
pub const LABEL_TRANSFER_OWNERSHIP: &str = "Transfer ownership";
pub const LABEL_REFUND_GAS_TOKEN: &str = "Refund rest BNB";

const SEPARATOR: &str =
    "--------------------------------------------------------------------------------";

/// A validated request to bind `bep20_contract` to `bep2_symbol`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    pub bep20_contract: Address,
    pub bep2_symbol: String,
    pub peggy_amount: Option<U256>,
    /// Where the residual balance and ownership go on success. `None` when
    /// the signing identity already is the final owner.
    pub final_owner: Option<Address>,
}

impl BindRequest {
    pub fn new(
        bep20_contract: &str,
        bep2_symbol: &str,
        peggy_amount: Option<&str>,
        final_owner: Option<&str>,
    ) -> Result<Self> {
        let bep20_contract = validate_address("bep20 contract address", bep20_contract)?;
        let bep2_symbol = bep2_symbol.trim();
        if bep2_symbol.is_empty() {
            return Err(BindError::MissingValue("bep2 symbol").into());
        }
        let peggy_amount = peggy_amount
            .filter(|value| !value.trim().is_empty())
            .map(parse_u256)
            .transpose()?;
        let final_owner = final_owner
            .map(|owner| validate_address("bep20 owner", owner))
            .transpose()?;
        Ok(Self {
            bep20_contract,
            bep2_symbol: bep2_symbol.to_string(),
            peggy_amount,
            final_owner,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    Accepted {
        /// Residual BEP20 transfer, skipped on a zero balance.
        refunded: Option<B256>,
        ownership_tx: Option<B256>,
    },
    Rejected {
        reject_tx: B256,
        reject_succeeded: bool,
    },
}

/// `total_supply - peggy` in contract units; the peggy amount is in 8 decimals.
pub fn lock_amount_from_peggy(total_supply: U256, peggy: U256, decimals: u8) -> Result<U256> {
    let peggy = convert_to_bep20_amount(peggy, decimals)?;
    total_supply
        .checked_sub(peggy)
        .ok_or_else(|| BindError::PeggyExceedsSupply.into())
}

pub async fn compute_lock_amount(chain: &dyn BindChain, request: &BindRequest) -> Result<U256> {
    match request.peggy_amount {
        Some(peggy) => {
            let total_supply = chain.total_supply(request.bep20_contract).await?;
            let decimals = chain.decimals(request.bep20_contract).await?;
            lock_amount_from_peggy(total_supply, peggy, decimals)
        }
        None => chain.required_lock_amount(&request.bep2_symbol).await,
    }
}

/// Approve the lock amount, call `approveBind`, and follow the outcome.
///
/// On rejection `rejectBind` is sent once and nothing else happens. On
/// acceptance with a final owner, the remaining BEP20 balance and then the
/// contract ownership move to that owner.
pub async fn approve_bind_and_transfer_ownership(
    chain: &dyn BindChain,
    request: &BindRequest,
) -> Result<BindOutcome> {
    let from = chain.signer_address();
    let lock_amount = compute_lock_amount(chain, request).await?;

    println!(
        "Approve {lock_amount}:{} to TokenManager from {from}",
        request.bep2_symbol
    );
    let approve = chain
        .submit(ContractCall::new(
            LABEL_APPROVE,
            request.bep20_contract,
            encode_approve(TOKEN_MANAGER_ADDRESS, lock_amount),
        ))
        .await?;
    confirm_success(chain, approve, LABEL_APPROVE).await?;

    let relay_fee = chain.mini_relay_fee().await?;
    println!("ApproveBind from {from}");
    let approve_bind_call = ContractCall::new(
        LABEL_APPROVE_BIND,
        TOKEN_MANAGER_ADDRESS,
        encode_approve_bind(request.bep20_contract, &request.bep2_symbol),
    )
    .with_value(relay_fee);
    let approve_bind = chain.submit(approve_bind_call).await?;

    println!("Track approveBind Tx status");
    let outcome = chain.confirm(approve_bind).await?;
    if !outcome.success {
        println!("Approve Bind is failed");
        let reject_call = ContractCall::new(
            LABEL_REJECT_BIND,
            TOKEN_MANAGER_ADDRESS,
            encode_reject_bind(request.bep20_contract, &request.bep2_symbol),
        )
        .with_value(relay_fee);
        let reject_tx = chain.submit(reject_call).await?;
        println!("Track rejectBind Tx status");
        let rejected = chain.confirm(reject_tx).await?;
        println!("reject bind tx receipt status {}", u8::from(rejected.success));
        return Ok(BindOutcome::Rejected {
            reject_tx,
            reject_succeeded: rejected.success,
        });
    }
    println!("Approve Bind is successful");

    let Some(owner) = request.final_owner else {
        println!("{SEPARATOR}");
        return Ok(BindOutcome::Accepted {
            refunded: None,
            ownership_tx: None,
        });
    };

    let balance = chain.balance_of(request.bep20_contract, from).await?;
    let refunded = if balance > U256::ZERO {
        println!("Refund rest BEP20 balance {balance} to {owner}");
        let hash = chain
            .submit(ContractCall::new(
                LABEL_REFUND_BEP20,
                request.bep20_contract,
                encode_transfer(owner, balance),
            ))
            .await?;
        confirm_success(chain, hash, LABEL_REFUND_BEP20).await?;
        Some(hash)
    } else {
        info!("no residual BEP20 balance to refund");
        None
    };

    let ownership_tx = transfer_ownership(chain, request.bep20_contract, owner).await?;
    println!("{SEPARATOR}");
    Ok(BindOutcome::Accepted {
        refunded,
        ownership_tx: Some(ownership_tx),
    })
}

/// Deploy `code` and return the new contract's address.
pub async fn deploy_contract(chain: &dyn BindChain, code: Bytes) -> Result<Address> {
    let hash = chain.submit(ContractCall::deploy(LABEL_DEPLOY, code)).await?;
    let confirmation = confirm_success(chain, hash, LABEL_DEPLOY).await?;
    let address = confirmation
        .contract_address
        .ok_or(BindError::MissingContractAddress(hash))?;
    info!(%address, "contract deployed");
    Ok(address)
}

/// Deploy a proxy in front of `implementation` whose constructor calls
/// `initialize` with `params`.
pub async fn deploy_canonical_proxy(
    chain: &dyn BindChain,
    proxy_creation_code: &Bytes,
    implementation: Address,
    proxy_admin: Address,
    params: &CanonicalTokenParams,
) -> Result<Address> {
    info!(
        %implementation,
        %proxy_admin,
        symbol = %params.symbol,
        total_supply = %params.total_supply,
        "deploying canonical proxy"
    );
    let code = encode_canonical_proxy_deploy(proxy_creation_code, implementation, proxy_admin, params);
    deploy_contract(chain, code).await
}

/// Move the entire supply and then ownership of a freshly deployed token.
pub async fn transfer_token_and_ownership(
    chain: &dyn BindChain,
    contract: Address,
    owner: Address,
) -> Result<B256> {
    let total_supply = chain.total_supply(contract).await?;
    println!("Total Supply {total_supply}");
    println!("Transfer {total_supply} token to {owner}");
    let hash = chain
        .submit(ContractCall::new(
            LABEL_TRANSFER_TOKEN,
            contract,
            encode_transfer(owner, total_supply),
        ))
        .await?;
    confirm_success(chain, hash, LABEL_TRANSFER_TOKEN).await?;

    let ownership = transfer_ownership(chain, contract, owner).await?;
    println!("{SEPARATOR}");
    Ok(ownership)
}

pub async fn refund_rest_gas_token(chain: &dyn BindChain, recipient: Address) -> Result<B256> {
    let hash = chain.refund_gas_token(recipient).await?;
    confirm_success(chain, hash, LABEL_REFUND_GAS_TOKEN).await?;
    println!("{SEPARATOR}");
    Ok(hash)
}

pub async fn erc721_total_supply(client: &RpcClient, contract: Address) -> Result<U256> {
    read_call(client, contract, IERC721::totalSupplyCall {}).await
}

async fn transfer_ownership(chain: &dyn BindChain, contract: Address, owner: Address) -> Result<B256> {
    println!("Transfer ownership to {owner}");
    let hash = chain
        .submit(ContractCall::new(
            LABEL_TRANSFER_OWNERSHIP,
            contract,
            encode_transfer_ownership(owner),
        ))
        .await?;
    confirm_success(chain, hash, LABEL_TRANSFER_OWNERSHIP).await?;
    Ok(hash)
}

/// Wait for `hash` and fail with [`BindError::TransactionReverted`] unless it
/// succeeded.
async fn confirm_success(
    chain: &dyn BindChain,
    hash: B256,
    step: &'static str,
) -> Result<Confirmation> {
    let confirmation = chain.confirm(hash).await?;
    if !confirmation.success {
        warn!(tx = %hash, step, "transaction reverted");
        return Err(BindError::TransactionReverted { step, hash }.into());
    }
    Ok(confirmation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{IBEP20, IOwnable, ITokenManager};
    use alloy_sol_types::SolCall;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const CONTRACT: &str = "0x4E656459ed25bF986Eea1196Bc1B00665401645d";
    const OWNER: &str = "0x1111111111111111111111111111111111111111";

    /// In-memory chain. Calls whose label is in `reverting` get a failed
    /// receipt; everything submitted is recorded in order.
    struct FakeChain {
        signer: Address,
        total_supply: U256,
        decimals: u8,
        balance: U256,
        required_lock: U256,
        relay_fee: U256,
        reverting: Vec<&'static str>,
        deployed: Option<Address>,
        submitted: Mutex<Vec<ContractCall>>,
    }

    impl FakeChain {
        fn new() -> Self {
            Self {
                signer: Address::repeat_byte(0xaa),
                total_supply: U256::from(1_000_000u64) * U256::from(10u64).pow(U256::from(18u64)),
                decimals: 18,
                balance: U256::from(5u64),
                required_lock: U256::from(777u64),
                relay_fee: U256::from(10_000_000_000_000_000u64),
                reverting: Vec::new(),
                deployed: Some(Address::repeat_byte(0xcc)),
                submitted: Mutex::new(Vec::new()),
            }
        }

        fn labels(&self) -> Vec<&'static str> {
            self.submitted.lock().unwrap().iter().map(|c| c.label).collect()
        }

        fn call(&self, label: &str) -> ContractCall {
            self.submitted
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.label == label)
                .cloned()
                .unwrap()
        }
    }

    fn hash_for(index: usize) -> B256 {
        B256::with_last_byte(index as u8 + 1)
    }

    #[async_trait]
    impl BindChain for FakeChain {
        fn signer_address(&self) -> Address {
            self.signer
        }

        async fn total_supply(&self, _token: Address) -> Result<U256> {
            Ok(self.total_supply)
        }

        async fn decimals(&self, _token: Address) -> Result<u8> {
            Ok(self.decimals)
        }

        async fn balance_of(&self, _token: Address, _account: Address) -> Result<U256> {
            Ok(self.balance)
        }

        async fn required_lock_amount(&self, _bep2_symbol: &str) -> Result<U256> {
            Ok(self.required_lock)
        }

        async fn mini_relay_fee(&self) -> Result<U256> {
            Ok(self.relay_fee)
        }

        async fn submit(&self, call: ContractCall) -> Result<B256> {
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push(call);
            Ok(hash_for(submitted.len() - 1))
        }

        async fn confirm(&self, hash: B256) -> Result<Confirmation> {
            let index = hash[31] as usize - 1;
            let call = self.submitted.lock().unwrap()[index].clone();
            Ok(Confirmation {
                hash,
                success: !self.reverting.contains(&call.label),
                contract_address: if call.to.is_none() { self.deployed } else { None },
                block_number: Some(1),
            })
        }

        async fn refund_gas_token(&self, _recipient: Address) -> Result<B256> {
            self.submit(ContractCall::new(LABEL_REFUND_GAS_TOKEN, Address::ZERO, Bytes::new()))
                .await
        }
    }

    fn request(peggy: Option<&str>, owner: Option<&str>) -> BindRequest {
        BindRequest::new(CONTRACT, "ABC-1A2", peggy, owner).unwrap()
    }

    #[test]
    fn test_lock_amount_from_peggy() {
        let total = U256::from(1_000_000u64) * U256::from(10u64).pow(U256::from(18u64));
        let lock = lock_amount_from_peggy(total, U256::from(400_000u64), 18).unwrap();
        let expected = total - convert_to_bep20_amount(U256::from(400_000u64), 18).unwrap();
        assert_eq!(lock, expected);
        assert_eq!(lock, total - U256::from(4_000_000_000_000_000u64));
    }

    #[test]
    fn test_lock_amount_peggy_exceeds_supply() {
        let err = lock_amount_from_peggy(U256::from(100u64), U256::from(101u64), 8).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BindError>(),
            Some(BindError::PeggyExceedsSupply)
        ));
        assert_eq!(err.to_string(), "peggy amount is larger than total supply");

        let scaled = U256::from(10u64).pow(U256::from(10u64));
        assert!(lock_amount_from_peggy(scaled, U256::from(2u64), 18).is_err());
    }

    #[test]
    fn test_lock_amount_peggy_equal_to_supply() {
        let lock = lock_amount_from_peggy(U256::from(100u64), U256::from(100u64), 8).unwrap();
        assert_eq!(lock, U256::ZERO);
        let total = U256::from(3u64) * U256::from(10u64).pow(U256::from(10u64));
        assert_eq!(lock_amount_from_peggy(total, U256::from(3u64), 18).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_bind_request_validation() {
        assert!(BindRequest::new("0x1234", "ABC-1A2", None, None).is_err());
        let err = BindRequest::new(CONTRACT, "  ", None, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BindError>(),
            Some(BindError::MissingValue(_))
        ));
        let req = BindRequest::new(CONTRACT, "ABC-1A2", Some(""), None).unwrap();
        assert!(req.peggy_amount.is_none());
    }

    #[tokio::test]
    async fn test_lock_amount_queries_token_manager_without_peggy() {
        let chain = FakeChain::new();
        let lock = compute_lock_amount(&chain, &request(None, None)).await.unwrap();
        assert_eq!(lock, U256::from(777u64));
    }

    #[tokio::test]
    async fn test_success_path_refunds_then_transfers_ownership() {
        let chain = FakeChain::new();
        let outcome = approve_bind_and_transfer_ownership(&chain, &request(Some("400000"), Some(OWNER)))
            .await
            .unwrap();

        assert_eq!(
            chain.labels(),
            vec![
                LABEL_APPROVE,
                LABEL_APPROVE_BIND,
                LABEL_REFUND_BEP20,
                LABEL_TRANSFER_OWNERSHIP
            ]
        );
        assert!(matches!(
            outcome,
            BindOutcome::Accepted { refunded: Some(_), ownership_tx: Some(_) }
        ));

        let approve_bind = chain.call(LABEL_APPROVE_BIND);
        assert_eq!(approve_bind.to, Some(TOKEN_MANAGER_ADDRESS));
        assert_eq!(approve_bind.value, chain.relay_fee);

        let approve = IBEP20::approveCall::abi_decode(&chain.call(LABEL_APPROVE).data).unwrap();
        assert_eq!(approve.spender, TOKEN_MANAGER_ADDRESS);
        assert_eq!(
            approve.amount,
            chain.total_supply - U256::from(4_000_000_000_000_000u64)
        );

        let refund = IBEP20::transferCall::abi_decode(&chain.call(LABEL_REFUND_BEP20).data).unwrap();
        assert_eq!(refund.amount, U256::from(5u64));
        let ownership =
            IOwnable::transferOwnershipCall::abi_decode(&chain.call(LABEL_TRANSFER_OWNERSHIP).data)
                .unwrap();
        assert_eq!(ownership.newOwner, validate_address("owner", OWNER).unwrap());
    }

    #[tokio::test]
    async fn test_rejection_calls_reject_bind_once() {
        let mut chain = FakeChain::new();
        chain.reverting = vec![LABEL_APPROVE_BIND];
        let outcome = approve_bind_and_transfer_ownership(&chain, &request(None, Some(OWNER)))
            .await
            .unwrap();

        let labels = chain.labels();
        assert_eq!(labels, vec![LABEL_APPROVE, LABEL_APPROVE_BIND, LABEL_REJECT_BIND]);
        assert_eq!(labels.iter().filter(|l| **l == LABEL_REJECT_BIND).count(), 1);
        assert!(!labels.contains(&LABEL_REFUND_BEP20));
        assert!(!labels.contains(&LABEL_TRANSFER_OWNERSHIP));
        assert!(matches!(
            outcome,
            BindOutcome::Rejected { reject_succeeded: true, .. }
        ));

        let reject = chain.call(LABEL_REJECT_BIND);
        assert_eq!(reject.value, chain.relay_fee);
        let decoded = ITokenManager::rejectBindCall::abi_decode(&reject.data).unwrap();
        assert_eq!(decoded.bep2Symbol, "ABC-1A2");
    }

    #[tokio::test]
    async fn test_zero_balance_skips_refund_but_transfers_ownership() {
        let mut chain = FakeChain::new();
        chain.balance = U256::ZERO;
        let outcome = approve_bind_and_transfer_ownership(&chain, &request(None, Some(OWNER)))
            .await
            .unwrap();

        assert_eq!(
            chain.labels(),
            vec![LABEL_APPROVE, LABEL_APPROVE_BIND, LABEL_TRANSFER_OWNERSHIP]
        );
        assert!(matches!(
            outcome,
            BindOutcome::Accepted { refunded: None, ownership_tx: Some(_) }
        ));
    }

    fn reverted_step(err: &anyhow::Error) -> Option<&'static str> {
        match err.downcast_ref::<BindError>() {
            Some(BindError::TransactionReverted { step, .. }) => Some(*step),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_reverted_approve_stops_before_approve_bind() {
        let mut chain = FakeChain::new();
        chain.reverting = vec![LABEL_APPROVE, LABEL_APPROVE_BIND];
        let err = approve_bind_and_transfer_ownership(&chain, &request(None, Some(OWNER)))
            .await
            .unwrap_err();
        assert_eq!(reverted_step(&err), Some(LABEL_APPROVE));
        assert_eq!(chain.labels(), vec![LABEL_APPROVE]);
    }

    #[tokio::test]
    async fn test_reverted_refund_skips_ownership_transfer() {
        let mut chain = FakeChain::new();
        chain.reverting = vec![LABEL_REFUND_BEP20];
        let err = approve_bind_and_transfer_ownership(&chain, &request(None, Some(OWNER)))
            .await
            .unwrap_err();
        assert_eq!(reverted_step(&err), Some(LABEL_REFUND_BEP20));
        assert!(!chain.labels().contains(&LABEL_TRANSFER_OWNERSHIP));
    }

    #[tokio::test]
    async fn test_reverted_ownership_transfer_is_an_error() {
        let mut chain = FakeChain::new();
        chain.reverting = vec![LABEL_TRANSFER_OWNERSHIP];
        let err = approve_bind_and_transfer_ownership(&chain, &request(None, Some(OWNER)))
            .await
            .unwrap_err();
        assert_eq!(reverted_step(&err), Some(LABEL_TRANSFER_OWNERSHIP));
        match err.downcast_ref::<BindError>() {
            Some(BindError::TransactionReverted { hash, .. }) => assert_eq!(*hash, hash_for(3)),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ledger_flow_stops_after_approve_bind() {
        let chain = FakeChain::new();
        let outcome = approve_bind_and_transfer_ownership(&chain, &request(None, None))
            .await
            .unwrap();
        assert_eq!(chain.labels(), vec![LABEL_APPROVE, LABEL_APPROVE_BIND]);
        assert_eq!(
            outcome,
            BindOutcome::Accepted {
                refunded: None,
                ownership_tx: None
            }
        );
    }

    #[tokio::test]
    async fn test_peggy_exceeding_supply_sends_nothing() {
        let mut chain = FakeChain::new();
        chain.total_supply = U256::from(1u64);
        let err = approve_bind_and_transfer_ownership(&chain, &request(Some("1"), Some(OWNER)))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BindError>(),
            Some(BindError::PeggyExceedsSupply)
        ));
        assert!(chain.labels().is_empty());
    }

    #[tokio::test]
    async fn test_deploy_contract_returns_address() {
        let chain = FakeChain::new();
        let address = deploy_contract(&chain, Bytes::from(vec![0x60, 0x80])).await.unwrap();
        assert_eq!(address, Address::repeat_byte(0xcc));
        assert_eq!(chain.call(LABEL_DEPLOY).to, None);
    }

    #[tokio::test]
    async fn test_deploy_contract_without_address() {
        let mut chain = FakeChain::new();
        chain.deployed = None;
        let err = deploy_contract(&chain, Bytes::from(vec![0x60])).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BindError>(),
            Some(BindError::MissingContractAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_reverted_deploy_returns_no_address() {
        let mut chain = FakeChain::new();
        chain.reverting = vec![LABEL_DEPLOY];
        let err = deploy_contract(&chain, Bytes::from(vec![0x60, 0x80])).await.unwrap_err();
        assert_eq!(reverted_step(&err), Some(LABEL_DEPLOY));
    }

    #[tokio::test]
    async fn test_reverted_token_transfer_keeps_ownership() {
        let mut chain = FakeChain::new();
        chain.reverting = vec![LABEL_TRANSFER_TOKEN];
        let owner = validate_address("owner", OWNER).unwrap();
        let err = transfer_token_and_ownership(&chain, Address::repeat_byte(0xcc), owner)
            .await
            .unwrap_err();
        assert_eq!(reverted_step(&err), Some(LABEL_TRANSFER_TOKEN));
        assert_eq!(chain.labels(), vec![LABEL_TRANSFER_TOKEN]);
    }

    #[tokio::test]
    async fn test_reverted_gas_refund_is_an_error() {
        let mut chain = FakeChain::new();
        chain.reverting = vec![LABEL_REFUND_GAS_TOKEN];
        let err = refund_rest_gas_token(&chain, Address::repeat_byte(0x11))
            .await
            .unwrap_err();
        assert_eq!(reverted_step(&err), Some(LABEL_REFUND_GAS_TOKEN));
    }

    #[tokio::test]
    async fn test_transfer_token_and_ownership_moves_total_supply() {
        let chain = FakeChain::new();
        let owner = validate_address("owner", OWNER).unwrap();
        let contract = Address::repeat_byte(0xcc);
        transfer_token_and_ownership(&chain, contract, owner).await.unwrap();

        assert_eq!(
            chain.labels(),
            vec![LABEL_TRANSFER_TOKEN, LABEL_TRANSFER_OWNERSHIP]
        );
        let transfer = IBEP20::transferCall::abi_decode(&chain.call(LABEL_TRANSFER_TOKEN).data).unwrap();
        assert_eq!(transfer.recipient, owner);
        assert_eq!(transfer.amount, chain.total_supply);
    }
}
