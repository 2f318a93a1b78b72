use crate::config::Config;
use crate::error::BindError;
use alloy_primitives::{Address, B256};
use anyhow::Result;
use std::fmt;
use std::str::FromStr;

pub const MAINNET_RPC: &str = "https://bsc-dataseed1.binance.org:443";
pub const MAINNET_CHAIN_ID: u64 = 56;
pub const MAINNET_EXPLORER: &str = "https://bscscan.com";

pub const TESTNET_RPC: &str = "https://data-seed-prebsc-1-s1.binance.org:8545";
pub const TESTNET_CHAIN_ID: u64 = 97;
pub const TESTNET_EXPLORER: &str = "https://testnet.bscscan.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl FromStr for Network {
    type Err = BindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(BindError::UnsupportedNetwork(other.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint and chain id for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkContext {
    pub network: Network,
    pub rpc_url: String,
    pub chain_id: u64,
    pub explorer_url: String,
}

impl NetworkContext {
    pub fn resolve(selector: &str, config: &Config) -> Result<Self> {
        let network = Network::from_str(selector)?;
        let (rpc, chain_id, explorer) = match network {
            Network::Mainnet => (MAINNET_RPC, MAINNET_CHAIN_ID, MAINNET_EXPLORER),
            Network::Testnet => (TESTNET_RPC, TESTNET_CHAIN_ID, TESTNET_EXPLORER),
        };
        let overrides = config.network(network.as_str());
        let rpc_url = overrides
            .and_then(|cfg| cfg.rpc.clone())
            .unwrap_or_else(|| rpc.to_string());
        let explorer_url = overrides
            .and_then(|cfg| cfg.explorer.clone())
            .unwrap_or_else(|| explorer.to_string());

        Ok(Self {
            network,
            rpc_url,
            chain_id,
            explorer_url: explorer_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn is_mainnet(&self) -> bool {
        self.network == Network::Mainnet
    }

    pub fn tx_url(&self, hash: B256) -> String {
        format!("{}/tx/{hash:#x}", self.explorer_url)
    }

    pub fn address_url(&self, address: Address) -> String {
        format!("{}/address/{address:#x}", self.explorer_url)
    }

    pub fn print_tx(&self, label: &str, hash: B256) {
        println!("{label}: {}", self.tx_url(hash));
    }

    pub fn print_address(&self, label: &str, address: Address) {
        println!("{label}: {}", self.address_url(address));
    }
}
