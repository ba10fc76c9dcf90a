use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::traits::QuoteSource;
use crate::errors::CoreError;
use crate::models::quote::SymbolMatch;

/// Yahoo Finance source for equity quotes and ticker search.
///
/// - **Free**: No API key required.
/// - **No strict rate limits** (unofficial public API).
/// - **Coverage**: Global equities, ETFs, indices, mutual funds.
///
/// Uses the `yahoo_finance_api` crate which wraps Yahoo Finance's public
/// endpoints. Prices come back in the stock's native currency.
pub struct YahooFinanceSource {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceSource {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl QuoteSource for YahooFinanceSource {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Decimal, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to fetch latest quote for {symbol}: {e}"),
            })?;

        let quote = resp.last_quote().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("No quote data for {symbol}: {e}"),
        })?;

        Decimal::from_f64(quote.close).ok_or_else(|| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Unrepresentable close price for {symbol}: {}", quote.close),
        })
    }

    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>, CoreError> {
        let resp = self
            .connector
            .search_ticker(query)
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Ticker search failed for {query:?}: {e}"),
            })?;

        // Yahoo returns results already ordered by relevance score.
        Ok(resp
            .quotes
            .iter()
            .map(|item| {
                let name = if item.long_name.is_empty() {
                    &item.short_name
                } else {
                    &item.long_name
                };
                SymbolMatch::new(&item.symbol, name)
            })
            .collect())
    }
}
