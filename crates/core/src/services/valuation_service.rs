use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use log::debug;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::snapshot::{PortfolioSnapshot, Position};
use crate::services::holdings_service::HoldingsService;
use crate::services::quote_service::QuoteService;

/// Joins the holdings store with live quote resolution and derives the
/// aggregate metrics.
///
/// Partial-failure policy: a symbol the quote service cannot resolve prices
/// nothing — its positions carry `latest_price: None` and contribute zero to
/// `current_value`. One bad quote degrades a subset of the numbers, never
/// the whole snapshot.
pub struct ValuationService {
    holdings: Arc<HoldingsService>,
    quotes: Arc<QuoteService>,
}

impl ValuationService {
    pub fn new(holdings: Arc<HoldingsService>, quotes: Arc<QuoteService>) -> Self {
        Self { holdings, quotes }
    }

    /// Compute the current snapshot for one owner.
    ///
    /// Each distinct symbol is looked up exactly once — N holdings of one
    /// ticker share a single lookup. All lookups run concurrently and
    /// aggregation waits for every one of them to settle.
    pub async fn snapshot(&self, owner_id: Uuid) -> Result<PortfolioSnapshot, CoreError> {
        let holdings = self.holdings.list(owner_id).await;

        // Distinct symbols in first-seen order
        let mut symbols: Vec<String> = Vec::new();
        for holding in &holdings {
            if !symbols.contains(&holding.symbol) {
                symbols.push(holding.symbol.clone());
            }
        }

        let lookups = symbols
            .iter()
            .map(|symbol| async move { (symbol.clone(), self.quotes.get(symbol).await.ok()) });
        let prices: HashMap<String, Option<Decimal>> =
            join_all(lookups).await.into_iter().collect();

        let positions = holdings
            .into_iter()
            .map(|holding| {
                let latest_price = prices.get(&holding.symbol).copied().flatten();
                Position {
                    holding,
                    latest_price,
                }
            })
            .collect();

        let snapshot = PortfolioSnapshot::from_positions(positions);
        debug!(
            "snapshot for {owner_id}: {} positions, invested {}, value {}, p/l {}",
            snapshot.positions.len(),
            snapshot.total_investment,
            snapshot.current_value,
            snapshot.unrealized_pl
        );
        Ok(snapshot)
    }
}
