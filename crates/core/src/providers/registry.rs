use log::warn;
use rust_decimal::Decimal;

use super::alphavantage::AlphaVantageSource;
use super::traits::QuoteSource;
use super::yahoo_finance::YahooFinanceSource;
use crate::errors::CoreError;
use crate::models::quote::SymbolMatch;

/// Ordered registry of quote sources.
///
/// Requests go to sources in registration order; when one fails the next is
/// tried immediately. The chain is the whole retry policy — each source is
/// attempted at most once per call, with no backoff.
pub struct QuoteSourceRegistry {
    sources: Vec<Box<dyn QuoteSource>>,
}

impl QuoteSourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Create a registry with the default source chain: Yahoo Finance
    /// (keyless, primary) and Alpha Vantage when an API key is configured.
    pub fn new_with_defaults(alphavantage_key: Option<String>) -> Self {
        let mut registry = Self::new();

        match YahooFinanceSource::new() {
            Ok(yahoo) => registry.register(Box::new(yahoo)),
            Err(e) => warn!("Yahoo Finance source unavailable: {e}"),
        }

        if let Some(key) = alphavantage_key {
            registry.register(Box::new(AlphaVantageSource::new(key)));
        }

        registry
    }

    /// Register a source at the end of the fallback chain.
    pub fn register(&mut self, source: Box<dyn QuoteSource>) {
        self.sources.push(source);
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Resolve a price through the chain; first success wins.
    pub async fn fetch_price(&self, symbol: &str) -> Result<Decimal, CoreError> {
        if self.sources.is_empty() {
            return Err(CoreError::NoQuoteSource);
        }

        let mut last_error = None;
        for source in &self.sources {
            match source.fetch_price(symbol).await {
                Ok(price) => {
                    // A negative quote is provider garbage, not a price.
                    if price < Decimal::ZERO {
                        last_error = Some(CoreError::Api {
                            provider: source.name().to_string(),
                            message: format!("Invalid price for {symbol}: {price}"),
                        });
                        continue;
                    }
                    return Ok(price);
                }
                Err(e) => {
                    warn!("{} failed to price {symbol}: {e}", source.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoQuoteSource))
    }

    /// Search for ticker candidates through the chain; first success wins.
    pub async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>, CoreError> {
        if self.sources.is_empty() {
            return Err(CoreError::NoQuoteSource);
        }

        let mut last_error = None;
        for source in &self.sources {
            match source.search_symbols(query).await {
                Ok(matches) => return Ok(matches),
                Err(e) => {
                    warn!("{} search failed for {query:?}: {e}", source.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoQuoteSource))
    }
}

impl Default for QuoteSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
