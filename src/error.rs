use alloy_primitives::B256;
use std::path::PathBuf;
use thiserror::Error;

/// Failure kinds that callers branch on. Everything else travels as a plain
/// `anyhow::Error` with context attached.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("unsupported network type {0} (expected mainnet or testnet)")]
    UnsupportedNetwork(String),

    #[error("invalid {what}, expect bsc address, like 0x4E656459ed25bF986Eea1196Bc1B00665401645d: {value}")]
    InvalidAddress { what: &'static str, value: String },

    #[error("missing {0}")]
    MissingValue(&'static str),

    #[error("expect only one or zero keystore file in {}", .0.display())]
    AmbiguousKeystore(PathBuf),

    #[error("peggy amount is larger than total supply")]
    PeggyExceedsSupply,

    #[error("transaction {hash:#x} not confirmed after {attempts} receipt lookups")]
    ConfirmationTimeout { hash: B256, attempts: u32 },

    #[error("{step} transaction {hash:#x} reverted")]
    TransactionReverted { step: &'static str, hash: B256 },

    #[error("deploy transaction {0:#x} has no contract address in its receipt")]
    MissingContractAddress(B256),

    #[error("rest BNB {balance} is less than minimum transfer transaction fee {fee}")]
    InsufficientGasToken { balance: String, fee: String },

    #[error("cannot find the BEP2 {0}")]
    Bep2NotFound(String),

    #[error("the BEP2 {symbol} is already bind to {contract}")]
    Bep2AlreadyBound { symbol: String, contract: String },
}
