pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use errors::CoreError;
use models::holding::Holding;
use models::quote::SymbolMatch;
use models::snapshot::PortfolioSnapshot;
use providers::registry::QuoteSourceRegistry;
use services::holdings_service::HoldingsService;
use services::quote_service::{QuoteCacheConfig, QuoteService};
use services::search_service::SearchService;
use services::valuation_service::ValuationService;

/// Main entry point for the Stockfolio core.
/// Wires the holdings store, quote cache, valuation, and symbol search
/// behind one handle the API layer consumes.
#[must_use]
pub struct PortfolioTracker {
    holdings: Arc<HoldingsService>,
    quotes: Arc<QuoteService>,
    valuation: ValuationService,
    search: SearchService,
}

impl std::fmt::Debug for PortfolioTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioTracker")
            .field("cached_symbols", &self.quotes.cached_symbols())
            .finish()
    }
}

impl PortfolioTracker {
    /// Assemble a tracker from a source registry and holdings store with the
    /// default cache tuning.
    pub fn new(registry: QuoteSourceRegistry, holdings: HoldingsService) -> Self {
        Self::with_cache_config(registry, holdings, QuoteCacheConfig::default())
    }

    pub fn with_cache_config(
        registry: QuoteSourceRegistry,
        holdings: HoldingsService,
        cache: QuoteCacheConfig,
    ) -> Self {
        let registry = Arc::new(registry);
        let holdings = Arc::new(holdings);
        let quotes = Arc::new(QuoteService::with_config(registry.clone(), cache));
        Self {
            valuation: ValuationService::new(holdings.clone(), quotes.clone()),
            search: SearchService::new(registry),
            holdings,
            quotes,
        }
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// Record a new holding for `owner_id`.
    pub async fn add_holding(
        &self,
        owner_id: Uuid,
        symbol: &str,
        quantity: Decimal,
        buy_price: Decimal,
    ) -> Result<Holding, CoreError> {
        self.holdings.add(owner_id, symbol, quantity, buy_price).await
    }

    /// Delete one of `owner_id`'s holdings by id.
    pub async fn remove_holding(&self, owner_id: Uuid, id: Uuid) -> Result<(), CoreError> {
        self.holdings.remove(owner_id, id).await
    }

    /// All of `owner_id`'s holdings in insertion order, without prices.
    pub async fn holdings(&self, owner_id: Uuid) -> Vec<Holding> {
        self.holdings.list(owner_id).await
    }

    // ── Valuation & search ──────────────────────────────────────────

    /// Live-valued view of one owner's portfolio.
    pub async fn snapshot(&self, owner_id: Uuid) -> Result<PortfolioSnapshot, CoreError> {
        self.valuation.snapshot(owner_id).await
    }

    /// Ticker autocomplete. Never fails; degrades to an empty list.
    pub async fn search_symbols(&self, query: &str) -> Vec<SymbolMatch> {
        self.search.search(query).await
    }
}
