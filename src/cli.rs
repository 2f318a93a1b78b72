use crate::commands;
use crate::config::Config;
use crate::signer::DEFAULT_KEYSTORE_DIR;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "token-bind-tool",
    version,
    about = "Command line interface for deploying BEP20 contracts and binding them with BEP2 tokens"
)]
pub struct Cli {
    /// mainnet or testnet
    #[arg(long, global = true, default_value = "mainnet")]
    pub network: String,

    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub async fn run(self, config: Config) -> Result<()> {
        let network = self.network;
        match self.command {
            Command::InitKey(args) => commands::init_key::run(args, &network, config).await,
            Command::DeployContract(args) => commands::deploy::run_deploy(args, &network, config).await,
            Command::DeployCanonicalProxyContract(args) => {
                commands::deploy::run_deploy_canonical_proxy(args, &network, config).await
            }
            Command::ApproveBindAndTransferOwnership(args) => {
                commands::approve_bind::run_keystore(args, &network, config).await
            }
            Command::DeployAndTransfer(args) => {
                commands::deploy::run_deploy_and_transfer(args, &network, config).await
            }
            Command::ApproveBindFromLedger(args) => {
                commands::approve_bind::run_ledger(args, &network, config).await
            }
            Command::RefundRestGasToken(args) => commands::refund::run(args, &network, config).await,
            Command::QueryErc721TotalSupply(args) => {
                commands::erc721::run(args, &network, config).await
            }
            Command::PreCheck(args) => commands::pre_check::run(args, &network, config).await,
            Command::CrossChainStats(args) => commands::stats::run(args, &network, config).await,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the temporary keystore account, or print the existing one
    InitKey(InitKeyArgs),
    /// Deploy the contract bytecode from a bind config file
    DeployContract(DeployContractArgs),
    /// Deploy a proxy in front of a canonical BEP20 implementation
    DeployCanonicalProxyContract(DeployCanonicalProxyArgs),
    /// Approve bind from the keystore account, then hand the rest balance and
    /// ownership to the final owner
    ApproveBindAndTransferOwnership(ApproveBindArgs),
    /// Deploy a BEP20 contract and transfer its total supply and ownership
    DeployAndTransfer(DeployAndTransferArgs),
    /// Approve bind with a Ledger account that owns the BEP20 contract
    ApproveBindFromLedger(ApproveBindFromLedgerArgs),
    /// Send all remaining BNB of the keystore account to a recipient
    RefundRestGasToken(RefundArgs),
    /// Query the total supply of an ERC721 contract
    #[command(name = "query-erc721-total-supply")]
    QueryErc721TotalSupply(Erc721Args),
    /// Check whether a BEP2 and BEP20 token pair can bind (mainnet only)
    PreCheck(PreCheckArgs),
    /// Report circulation of every bound BEP20 token
    CrossChainStats(CrossChainStatsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct KeystoreArgs {
    #[arg(long, default_value = DEFAULT_KEYSTORE_DIR)]
    pub keystore_path: PathBuf,
}

#[derive(Args, Debug)]
pub struct InitKeyArgs {
    #[command(flatten)]
    pub keystore: KeystoreArgs,
}

#[derive(Args, Debug)]
pub struct DeployContractArgs {
    #[arg(long)]
    pub bind_config: PathBuf,

    #[command(flatten)]
    pub keystore: KeystoreArgs,
}

#[derive(Args, Debug)]
pub struct DeployCanonicalProxyArgs {
    /// Bind config whose `contract_data` is the proxy creation code
    #[arg(long)]
    pub bind_config: PathBuf,

    #[arg(long, default_value = "0x8feCC1762561eE3D1b2ea003E1d78B71c5581BcE")]
    pub canonical_impl_addr: String,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub symbol: String,

    #[arg(long, default_value_t = 18)]
    pub decimals: u8,

    /// Total supply in 8-decimal units
    #[arg(long)]
    pub total_supply: String,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub mintable: bool,

    #[arg(long)]
    pub owner: String,

    #[arg(long)]
    pub proxy_admin: String,

    #[command(flatten)]
    pub keystore: KeystoreArgs,
}

#[derive(Args, Debug)]
pub struct ApproveBindArgs {
    #[arg(long)]
    pub bep20_contract_addr: String,

    #[arg(long)]
    pub bep20_owner: String,

    #[arg(long)]
    pub bep2_symbol: String,

    /// Peggy amount, identical to the one in the bind transaction; required on testnet
    #[arg(long)]
    pub peggy_amount: Option<String>,

    #[command(flatten)]
    pub keystore: KeystoreArgs,
}

#[derive(Args, Debug)]
pub struct DeployAndTransferArgs {
    #[arg(long)]
    pub bind_config: PathBuf,

    /// Defaults to `final_bep20_owner` from the bind config
    #[arg(long)]
    pub bep20_owner: Option<String>,

    #[command(flatten)]
    pub keystore: KeystoreArgs,
}

#[derive(Args, Debug)]
pub struct ApproveBindFromLedgerArgs {
    #[arg(long)]
    pub bep20_contract_addr: String,

    #[arg(long)]
    pub bep2_symbol: String,

    #[arg(long, default_value_t = 0)]
    pub ledger_account_index: u32,

    #[arg(long)]
    pub peggy_amount: Option<String>,
}

#[derive(Args, Debug)]
pub struct RefundArgs {
    #[arg(long)]
    pub recipient: String,

    #[command(flatten)]
    pub keystore: KeystoreArgs,
}

#[derive(Args, Debug)]
pub struct Erc721Args {
    #[arg(long)]
    pub erc721_addr: String,
}

#[derive(Args, Debug)]
pub struct PreCheckArgs {
    #[arg(long)]
    pub bep20_contract_addr: String,

    #[arg(long)]
    pub bep2_symbol: String,
}

#[derive(Args, Debug)]
pub struct CrossChainStatsArgs {
    /// Addresses whose balances are not circulating
    #[arg(long, num_args = 1..)]
    pub exclude: Vec<String>,

    #[arg(long, default_value_t = 0)]
    pub from_block: u64,

    #[arg(long)]
    pub with_price: bool,

    #[arg(long)]
    pub json: bool,
}
