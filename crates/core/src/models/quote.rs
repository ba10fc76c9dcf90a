use serde::{Deserialize, Serialize};

/// One candidate from a ticker search, ranked by provider relevance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMatch {
    /// Ticker symbol (e.g., "AAPL")
    pub symbol: String,

    /// Human-readable name (e.g., "Apple Inc.")
    pub name: String,
}

impl SymbolMatch {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}
