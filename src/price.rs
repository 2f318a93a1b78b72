use anyhow::{anyhow, Context, Result};
use bigdecimal::{BigDecimal, Zero};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct AvgPrice {
    price: String,
}

/// USD prices from the exchange average-price endpoint.
pub struct PriceClient {
    http: Client,
    api: String,
    stablecoins: HashSet<String>,
}

impl PriceClient {
    pub fn new(api: impl Into<String>, stablecoins: Vec<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            api: api.into(),
            stablecoins: stablecoins.into_iter().collect(),
        })
    }

    pub fn is_stablecoin(&self, symbol: &str) -> bool {
        self.stablecoins.contains(symbol)
    }

    async fn avg_price(&self, pair: &str) -> Result<BigDecimal> {
        let url = url::Url::parse_with_params(&self.api, &[("symbol", pair)])
            .with_context(|| format!("invalid price api {}", self.api))?;
        let body = self.http.get(url).send().await?.text().await?;
        let parsed: AvgPrice = serde_json::from_str(&body)
            .map_err(|err| anyhow!("price {body}, err: {err}"))?;
        let price = BigDecimal::from_str(&parsed.price)
            .map_err(|err| anyhow!("price {body}, err: {err}"))?;
        debug!(pair, %price, "avg price");
        Ok(price)
    }

    pub async fn bnb_price(&self) -> Result<BigDecimal> {
        self.avg_price("BNBUSDT").await
    }

    /// Price of `symbol` in USD, or zero when no market quotes it.
    pub async fn price(&self, symbol: &str, bnb_price: &BigDecimal) -> BigDecimal {
        if self.is_stablecoin(symbol) {
            return BigDecimal::from(1u8);
        }
        let base = lookup_symbol(symbol);

        match self.avg_price(&format!("{base}BNB")).await {
            Ok(quote) => return via_bnb_quote(&quote, bnb_price),
            Err(err) => debug!(symbol, error = %err, "no BNB quote"),
        }
        match self.avg_price(&format!("BNB{base}")).await {
            Ok(quote) => match via_inverse_bnb_quote(&quote, bnb_price) {
                Ok(price) => return price,
                Err(err) => debug!(symbol, error = %err, "unusable inverse BNB quote"),
            },
            Err(err) => debug!(symbol, error = %err, "no inverse BNB quote"),
        }
        match self.avg_price(&format!("{base}USDT")).await {
            Ok(price) => price,
            Err(err) => {
                warn!(symbol, error = %err, "no price found, using zero");
                BigDecimal::zero()
            }
        }
    }
}

/// Exchange tickers list wrapped BTC under its native symbol.
pub fn lookup_symbol(symbol: &str) -> &str {
    match symbol {
        "BTCB" => "BTC",
        other => other,
    }
}

/// `SYMBOLBNB` quote times the BNB price.
pub fn via_bnb_quote(quote: &BigDecimal, bnb_price: &BigDecimal) -> BigDecimal {
    quote * bnb_price
}

/// BNB price divided by the `BNBSYMBOL` quote.
pub fn via_inverse_bnb_quote(quote: &BigDecimal, bnb_price: &BigDecimal) -> Result<BigDecimal> {
    if quote.is_zero() {
        return Err(anyhow!("zero BNB quote"));
    }
    Ok(bnb_price / quote)
}
