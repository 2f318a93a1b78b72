use crate::error::BindError;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// One entry from the beacon chain token listing.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Bep2Token {
    pub symbol: String,
    #[serde(default)]
    pub contract_address: Option<String>,
    pub total_supply: String,
}

pub struct RegistryClient {
    http: Client,
    url: String,
}

impl RegistryClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub async fn tokens(&self) -> Result<Vec<Bep2Token>> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("registry request to {} failed", self.url))?
            .error_for_status()?;
        let tokens: Vec<Bep2Token> = response.json().await.context("registry decode failed")?;
        debug!(count = tokens.len(), "fetched bep2 token list");
        Ok(tokens)
    }

    /// Look up `symbol`, which must exist and must not be bound yet.
    pub async fn unbound_token(&self, symbol: &str) -> Result<Bep2Token> {
        let tokens = self.tokens().await?;
        find_unbound(tokens, symbol)
    }
}

pub fn find_unbound(tokens: Vec<Bep2Token>, symbol: &str) -> Result<Bep2Token> {
    let token = tokens
        .into_iter()
        .find(|token| token.symbol == symbol)
        .ok_or_else(|| BindError::Bep2NotFound(symbol.to_string()))?;
    if let Some(contract) = token.contract_address.as_deref().filter(|c| !c.is_empty()) {
        return Err(BindError::Bep2AlreadyBound {
            symbol: symbol.to_string(),
            contract: contract.to_string(),
        }
        .into());
    }
    Ok(token)
}
