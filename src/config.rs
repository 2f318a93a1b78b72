use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_GAS_PRICE: u128 = 20_000_000_000;
pub const DEFAULT_GAS_LIMIT: u64 = 4_700_000;
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;
pub const DEFAULT_PASSPHRASE: &str = "12345678";
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/60'/{index}'/0/0";
pub const DEFAULT_REGISTRY_URL: &str = "https://dex.binance.org/api/v1/tokens?limit=1000";
pub const DEFAULT_PRICE_API: &str = "https://api.binance.com/api/v3/avgPrice";

/// Tool settings. Every field is optional so a missing or partial file falls
/// back to the built-in defaults.
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Config {
    pub networks: Option<BTreeMap<String, NetworkConfig>>,
    pub gas: Option<GasConfig>,
    pub confirmation: Option<ConfirmationConfig>,
    pub keystore: Option<KeystoreConfig>,
    pub ledger: Option<LedgerConfig>,
    pub stats: Option<StatsConfig>,
    pub registry: Option<RegistryConfig>,
    #[serde(skip)]
    pub path: PathBuf,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct NetworkConfig {
    pub rpc: Option<String>,
    pub explorer: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct GasConfig {
    pub price_wei: Option<u64>,
    pub limit: Option<u64>,
    pub transfer_limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfirmationConfig {
    pub initial_backoff_ms: Option<u64>,
    pub max_backoff_ms: Option<u64>,
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct KeystoreConfig {
    pub passphrase: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct LedgerConfig {
    pub derivation_path: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct StatsConfig {
    pub stablecoins: Option<Vec<String>>,
    pub admin_addresses: Option<Vec<String>>,
    pub withdraw_address: Option<String>,
    pub price_api: Option<String>,
    pub log_chunk_size: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct RegistryConfig {
    pub url: Option<String>,
}

/// Gas parameters applied to every transaction; no fee estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSettings {
    pub price_wei: u128,
    pub limit: u64,
    pub transfer_limit: u64,
}

/// Receipt polling schedule: `initial`, doubling up to `max`, at most
/// `max_attempts` lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub max_attempts: u32,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(16),
            max_attempts: 10,
        }
    }
}

impl ConfirmationPolicy {
    /// Delay before lookup number `attempt` (zero based).
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u128.saturating_pow(attempt);
        let backoff = self.initial_backoff.as_millis().saturating_mul(factor);
        Duration::from_millis(backoff.min(self.max_backoff.as_millis()) as u64)
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path(),
        };

        if !path.exists() {
            let mut config = Self::default();
            config.path = path;
            return Ok(config);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.path = path;
        Ok(config)
    }

    pub fn network(&self, name: &str) -> Option<&NetworkConfig> {
        self.networks.as_ref()?.get(name)
    }

    pub fn gas(&self) -> GasSettings {
        let gas = self.gas.clone().unwrap_or_default();
        GasSettings {
            price_wei: gas.price_wei.map(u128::from).unwrap_or(DEFAULT_GAS_PRICE),
            limit: gas.limit.unwrap_or(DEFAULT_GAS_LIMIT),
            transfer_limit: gas.transfer_limit.unwrap_or(TRANSFER_GAS_LIMIT),
        }
    }

    pub fn confirmation(&self) -> ConfirmationPolicy {
        let defaults = ConfirmationPolicy::default();
        let Some(cfg) = self.confirmation.as_ref() else {
            return defaults;
        };
        ConfirmationPolicy {
            initial_backoff: cfg
                .initial_backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.initial_backoff),
            max_backoff: cfg
                .max_backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_backoff),
            max_attempts: cfg.max_attempts.unwrap_or(defaults.max_attempts).max(1),
        }
    }

    pub fn passphrase(&self) -> String {
        self.keystore
            .as_ref()
            .and_then(|cfg| cfg.passphrase.clone())
            .unwrap_or_else(|| DEFAULT_PASSPHRASE.to_string())
    }

    pub fn derivation_path(&self, index: u32) -> String {
        self.ledger
            .as_ref()
            .and_then(|cfg| cfg.derivation_path.clone())
            .unwrap_or_else(|| DEFAULT_DERIVATION_PATH.to_string())
            .replace("{index}", &index.to_string())
    }

    pub fn registry_url(&self) -> String {
        self.registry
            .as_ref()
            .and_then(|cfg| cfg.url.clone())
            .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string())
    }

    pub fn stablecoins(&self) -> Vec<String> {
        self.stats
            .as_ref()
            .and_then(|cfg| cfg.stablecoins.clone())
            .unwrap_or_else(|| {
                ["BUSD", "USDT", "USDC", "DAI", "TUSD", "PAX", "USDSB"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
    }

    pub fn price_api(&self) -> String {
        self.stats
            .as_ref()
            .and_then(|cfg| cfg.price_api.clone())
            .unwrap_or_else(|| DEFAULT_PRICE_API.to_string())
    }

    pub fn admin_addresses(&self) -> Vec<String> {
        self.stats
            .as_ref()
            .and_then(|cfg| cfg.admin_addresses.clone())
            .unwrap_or_default()
    }

    pub fn withdraw_address(&self) -> Option<String> {
        self.stats.as_ref()?.withdraw_address.clone()
    }

    pub fn log_chunk_size(&self) -> u64 {
        self.stats
            .as_ref()
            .and_then(|cfg| cfg.log_chunk_size)
            .unwrap_or(5_000)
            .max(1)
    }
}

fn default_config_path() -> PathBuf {
    if let Some(dir) = dirs::config_dir() {
        return dir.join("token-bind-tool").join("config.toml");
    }
    PathBuf::from("./config.toml")
}
