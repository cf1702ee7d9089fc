//! Tronscan API client.
//!
//! Fetches the USDT TRC20 balance of Tron addresses from the public Tronscan
//! token list endpoint.
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//! use tron_wallet_bot::tronscan::{BalanceSource, TronscanClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), String> {
//!     let client = TronscanClient::new(Duration::from_secs(10))?;
//!     let balance = client.fetch_balance("TEhmKXCPgX64yjQ3t9skuSyUQBxwaWY4KS").await;
//!     println!("Balance: {:?} USDT", balance);
//!     Ok(())
//! }
//! ```

use rust_decimal::Decimal;
use serde::Deserialize;
use std::future::Future;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Tronscan token list endpoint.
const TRONSCAN_TOKENS_URL: &str = "https://apilist.tronscanapi.com/api/account/tokens";

/// Official USDT TRC20 contract address.
pub const USDT_CONTRACT: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";

/// Number of decimal places of USDT on Tron (1 USDT = 10^6 sun).
pub const USDT_DECIMALS: u32 = 6;

/// Token list response from Tronscan.
#[derive(Deserialize)]
struct TokensResponse {
    #[serde(default)]
    data: Vec<TokenEntry>,
}

/// One token held by an account.
#[derive(Deserialize)]
struct TokenEntry {
    #[serde(rename = "tokenId", default)]
    token_id: String,
    /// Raw balance in the token's smallest unit. Tronscan sends a string but
    /// plain numbers are accepted as well.
    #[serde(default)]
    balance: Option<RawAmount>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

/// Something that can look up the USDT balance of an address.
///
/// A failed lookup is `None`, never an error: one bad address must not abort
/// a report.
pub trait BalanceSource {
    fn fetch_balance(&self, address: &str) -> impl Future<Output = Option<Decimal>> + Send;
}

/// Fetches balances for every `(display name, address)` pair.
///
/// Lookups run one after another and the output keeps the input order.
pub async fn fetch_many<S: BalanceSource>(
    source: &S,
    targets: &[(String, String)],
) -> Vec<(String, Option<Decimal>)> {
    let mut balances = Vec::with_capacity(targets.len());

    for (name, address) in targets {
        let balance = source.fetch_balance(address).await;
        match balance {
            Some(amount) => log::info!("Fetched balance name={} balance={} USDT", name, amount),
            None => log::warn!("Failed to fetch balance name={} address={}", name, address),
        }
        balances.push((name.clone(), balance));
    }

    balances
}

/// Extracts the USDT balance from a Tronscan token list payload.
///
/// A payload without the USDT token means a zero balance. A USDT entry whose
/// balance cannot be parsed is an error.
fn usdt_balance(body: &str) -> Result<Decimal, String> {
    let response: TokensResponse =
        serde_json::from_str(body).map_err(|e| format!("Failed to parse response: {e}"))?;

    let Some(token) = response.data.into_iter().find(|t| t.token_id == USDT_CONTRACT) else {
        return Ok(Decimal::ZERO);
    };

    let raw = match token.balance {
        Some(RawAmount::Text(s)) => s,
        Some(RawAmount::Number(n)) => n.to_string(),
        None => return Ok(Decimal::ZERO),
    };
    let raw = Decimal::from_str(raw.trim())
        .map_err(|e| format!("Failed to parse amount '{raw}': {e}"))?;

    Ok(raw / Decimal::from(10u64.pow(USDT_DECIMALS)))
}

/// HTTP client for the Tronscan API.
#[derive(Clone)]
pub struct TronscanClient {
    client: reqwest::Client,
}

impl TronscanClient {
    /// Creates a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;
        Ok(Self { client })
    }

    /// Fetches the USDT balance of `address`, reporting why it failed.
    pub async fn try_fetch_balance(&self, address: &str) -> Result<Decimal, String> {
        log::debug!("Fetching balance address={} endpoint={}", address, TRONSCAN_TOKENS_URL);

        let start = Instant::now();
        let response = self
            .client
            .get(TRONSCAN_TOKENS_URL)
            .query(&[("address", address)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    format!("Request timed out: {e}")
                } else {
                    format!("HTTP request failed: {e}")
                }
            })?;

        log::debug!(
            "Tronscan request completed address={} duration_ms={} status={:?}",
            address,
            start.elapsed().as_millis(),
            response.status()
        );

        let response = response
            .error_for_status()
            .map_err(|e| format!("HTTP error: {e}"))?;
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {e}"))?;

        usdt_balance(&body)
    }
}

impl BalanceSource for TronscanClient {
    async fn fetch_balance(&self, address: &str) -> Option<Decimal> {
        match self.try_fetch_balance(address).await {
            Ok(balance) => Some(balance),
            Err(e) => {
                log::error!("Balance lookup failed address={}: {}", address, e);
                None
            }
        }
    }
}
