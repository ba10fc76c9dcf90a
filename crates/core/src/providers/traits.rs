use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::CoreError;
use crate::models::quote::SymbolMatch;

/// Trait abstraction over external market-data sources.
///
/// Each upstream (Yahoo Finance, Alpha Vantage) implements this trait. If an
/// API stops working or changes, only that one implementation is replaced —
/// the rest of the codebase is untouched.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Resolve the current per-unit price of a ticker symbol.
    async fn fetch_price(&self, symbol: &str) -> Result<Decimal, CoreError>;

    /// Resolve a partial query to ranked `{symbol, name}` candidates.
    /// A query with no matches yields an empty list, not an error.
    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>, CoreError>;
}
