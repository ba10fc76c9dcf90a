use std::cmp::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::traits::QuoteSource;
use crate::errors::CoreError;
use crate::models::quote::SymbolMatch;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Request timeout. A hung upstream must not stall a snapshot for long —
/// callers degrade to cached or absent data on failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Alpha Vantage source for stock quotes and symbol search.
///
/// - **Free tier**: 25 requests/day (across ALL endpoints).
/// - **Requires**: API key.
/// - **Coverage**: 100k+ global equity symbols.
///
/// Registered behind Yahoo Finance as a fallback; the shared quote cache
/// keeps request volume inside the free-tier budget.
pub struct AlphaVantageSource {
    client: Client,
    api_key: String,
}

impl AlphaVantageSource {
    pub fn new(api_key: String) -> Self {
        let builder = Client::builder().timeout(REQUEST_TIMEOUT);
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
        }
    }
}

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
}

#[derive(Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
}

#[derive(Deserialize)]
struct SymbolSearchResponse {
    #[serde(rename = "bestMatches")]
    best_matches: Option<Vec<BestMatch>>,
}

#[derive(Deserialize)]
struct BestMatch {
    #[serde(rename = "1. symbol")]
    symbol: String,
    #[serde(rename = "2. name")]
    name: String,
    #[serde(rename = "9. matchScore")]
    match_score: String,
}

#[async_trait]
impl QuoteSource for AlphaVantageSource {
    fn name(&self) -> &str {
        "Alpha Vantage"
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Decimal, CoreError> {
        let resp: GlobalQuoteResponse = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Alpha Vantage".into(),
                message: format!("Failed to parse quote for {symbol}: {e}"),
            })?;

        let price_str = resp
            .global_quote
            .and_then(|q| q.price)
            .ok_or_else(|| CoreError::Api {
                provider: "Alpha Vantage".into(),
                message: format!("No quote data for {symbol}. API limit may be exceeded."),
            })?;

        price_str.parse().map_err(|e| CoreError::Api {
            provider: "Alpha Vantage".into(),
            message: format!("Invalid price format for {symbol}: {e}"),
        })
    }

    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>, CoreError> {
        let resp: SymbolSearchResponse = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "SYMBOL_SEARCH"),
                ("keywords", query),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Alpha Vantage".into(),
                message: format!("Failed to parse search results for {query:?}: {e}"),
            })?;

        let mut matches = resp.best_matches.unwrap_or_default();
        // The endpoint scores matches but does not guarantee order.
        matches.sort_by(|a, b| {
            let a_score: f64 = a.match_score.parse().unwrap_or(0.0);
            let b_score: f64 = b.match_score.parse().unwrap_or(0.0);
            b_score.partial_cmp(&a_score).unwrap_or(Ordering::Equal)
        });

        Ok(matches
            .into_iter()
            .map(|m| SymbolMatch::new(m.symbol, m.name))
            .collect())
    }
}
