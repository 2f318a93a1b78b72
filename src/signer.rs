use crate::error::BindError;
use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_signer::Signer;
use alloy_signer_ledger::{HDPath, LedgerSigner};
use alloy_signer_local::PrivateKeySigner;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default keystore directory, relative to the working directory.
pub const DEFAULT_KEYSTORE_DIR: &str = "bind_keystore";

/// The account that signs every transaction of an invocation.
pub enum SigningIdentity {
    Keystore(PrivateKeySigner),
    Ledger(LedgerSigner),
}

impl SigningIdentity {
    pub fn address(&self) -> Address {
        match self {
            SigningIdentity::Keystore(signer) => signer.address(),
            SigningIdentity::Ledger(signer) => Signer::address(signer),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SigningIdentity::Keystore(_) => "keystore",
            SigningIdentity::Ledger(_) => "ledger",
        }
    }

    pub fn into_wallet(self) -> EthereumWallet {
        match self {
            SigningIdentity::Keystore(signer) => EthereumWallet::from(signer),
            SigningIdentity::Ledger(signer) => EthereumWallet::from(signer),
        }
    }
}

/// Load the single key in `dir`, creating one when the directory is empty.
pub fn load_or_create_keystore(dir: &Path, passphrase: &str) -> Result<SigningIdentity> {
    let files = list_key_files(dir)?;
    match files.as_slice() {
        [] => {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create keystore dir {}", dir.display()))?;
            let mut rng = rand::thread_rng();
            let (signer, name) = PrivateKeySigner::new_keystore(dir, &mut rng, passphrase, None)
                .map_err(|err| anyhow!("failed to create keystore account: {err}"))?;
            info!(address = %signer.address(), file = %name, "created new keystore account");
            Ok(SigningIdentity::Keystore(signer))
        }
        [file] => {
            let signer = PrivateKeySigner::decrypt_keystore(file, passphrase)
                .map_err(|err| anyhow!("failed to unlock {}: {err}", file.display()))?;
            info!(address = %signer.address(), "unlocked keystore account");
            Ok(SigningIdentity::Keystore(signer))
        }
        _ => Err(BindError::AmbiguousKeystore(absolute(dir)).into()),
    }
}

/// Open the first connected Ledger at `derivation_path`.
pub async fn open_ledger(derivation_path: &str, chain_id: u64) -> Result<SigningIdentity> {
    let ledger = LedgerSigner::new(HDPath::Other(derivation_path.to_string()), Some(chain_id))
        .await
        .map_err(|err| anyhow!("failed to start Ledger hub: {err}"))?;
    let version = ledger
        .version()
        .await
        .map_err(|err| anyhow!("failed to query Ledger status: {err}"))?;
    info!(%version, path = derivation_path, "ledger ethereum app ready");
    let address = ledger
        .get_address()
        .await
        .map_err(|err| anyhow!("failed to derive account from ledger: {err}"))?;
    info!(%address, "derived ledger account");
    Ok(SigningIdentity::Ledger(ledger))
}

fn list_key_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let entry = entry?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if entry.file_type()?.is_file() && !hidden {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn absolute(dir: &Path) -> PathBuf {
    std::env::current_dir()
        .map(|cwd| cwd.join(dir))
        .unwrap_or_else(|_| dir.to_path_buf())
}
