// ═══════════════════════════════════════════════════════════════════
// Valuation tests — snapshot totals, partial quote failure, per-symbol
// lookup dedup, owner isolation
// ═══════════════════════════════════════════════════════════════════

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use stockfolio_core::errors::CoreError;
use stockfolio_core::models::quote::SymbolMatch;
use stockfolio_core::providers::registry::QuoteSourceRegistry;
use stockfolio_core::providers::traits::QuoteSource;
use stockfolio_core::services::holdings_service::HoldingsService;
use stockfolio_core::PortfolioTracker;

// ── Mock source ─────────────────────────────────────────────────────

/// Fixed price table; any symbol missing from it fails to resolve, which is
/// how these tests model a dead upstream for one ticker.
struct MockSource {
    prices: HashMap<String, Decimal>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl QuoteSource for MockSource {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Decimal, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| CoreError::Api {
                provider: "Mock".into(),
                message: format!("unknown symbol {symbol}"),
            })
    }

    async fn search_symbols(&self, _query: &str) -> Result<Vec<SymbolMatch>, CoreError> {
        Ok(Vec::new())
    }
}

fn tracker_with(prices: &[(&str, Decimal)]) -> (PortfolioTracker, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let source = MockSource {
        prices: prices.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
        calls: calls.clone(),
    };
    let mut registry = QuoteSourceRegistry::new();
    registry.register(Box::new(source));
    let tracker = PortfolioTracker::new(registry, HoldingsService::in_memory());
    (tracker, calls)
}

// ── Tests ───────────────────────────────────────────────────────────

mod totals {
    use super::*;

    #[tokio::test]
    async fn worked_example_two_lots_one_symbol() {
        // holdings = [(AAPL, qty=2, buy=100), (AAPL, qty=1, buy=150)],
        // price(AAPL) = 120 ⇒ invested 350, value 360, p/l +10
        let (tracker, calls) = tracker_with(&[("AAPL", dec!(120))]);
        let owner = Uuid::new_v4();
        tracker.add_holding(owner, "AAPL", dec!(2), dec!(100)).await.unwrap();
        tracker.add_holding(owner, "AAPL", dec!(1), dec!(150)).await.unwrap();

        let snapshot = tracker.snapshot(owner).await.unwrap();
        assert_eq!(snapshot.total_investment, dec!(350));
        assert_eq!(snapshot.current_value, dec!(360));
        assert_eq!(snapshot.unrealized_pl, dec!(10));

        assert_eq!(snapshot.positions.len(), 2);
        for position in &snapshot.positions {
            assert_eq!(position.latest_price, Some(dec!(120)));
        }

        // Both lots share one ticker, so one upstream fetch suffices.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_portfolio_has_zero_totals_and_no_lookups() {
        let (tracker, calls) = tracker_with(&[("AAPL", dec!(120))]);
        let snapshot = tracker.snapshot(Uuid::new_v4()).await.unwrap();

        assert!(snapshot.positions.is_empty());
        assert_eq!(snapshot.total_investment, dec!(0));
        assert_eq!(snapshot.current_value, dec!(0));
        assert_eq!(snapshot.unrealized_pl, dec!(0));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn totals_identity_holds_after_rounding() {
        let (tracker, _) = tracker_with(&[("FRAC", dec!(123.456))]);
        let owner = Uuid::new_v4();
        tracker
            .add_holding(owner, "FRAC", dec!(0.333), dec!(99.999))
            .await
            .unwrap();

        let snapshot = tracker.snapshot(owner).await.unwrap();
        assert_eq!(snapshot.total_investment, dec!(33.30));
        assert_eq!(snapshot.current_value, dec!(41.11));
        assert_eq!(
            snapshot.current_value - snapshot.total_investment,
            snapshot.unrealized_pl
        );
    }

    #[tokio::test]
    async fn losses_come_out_negative() {
        let (tracker, _) = tracker_with(&[("AAPL", dec!(80))]);
        let owner = Uuid::new_v4();
        tracker.add_holding(owner, "AAPL", dec!(2), dec!(100)).await.unwrap();

        let snapshot = tracker.snapshot(owner).await.unwrap();
        assert_eq!(snapshot.unrealized_pl, dec!(-40));
    }
}

mod partial_failure {
    use super::*;

    #[tokio::test]
    async fn one_dead_symbol_degrades_only_its_positions() {
        let (tracker, _) = tracker_with(&[("GOOD", dec!(50))]);
        let owner = Uuid::new_v4();
        tracker.add_holding(owner, "DEAD", dec!(3), dec!(10)).await.unwrap();
        tracker.add_holding(owner, "GOOD", dec!(2), dec!(40)).await.unwrap();

        let snapshot = tracker.snapshot(owner).await.unwrap();

        let dead = &snapshot.positions[0];
        assert_eq!(dead.holding.symbol, "DEAD");
        assert_eq!(dead.latest_price, None);

        let good = &snapshot.positions[1];
        assert_eq!(good.holding.symbol, "GOOD");
        assert_eq!(good.latest_price, Some(dec!(50)));

        // DEAD contributes its cost to investment but nothing to value.
        assert_eq!(snapshot.total_investment, dec!(110));
        assert_eq!(snapshot.current_value, dec!(100));
        assert_eq!(snapshot.unrealized_pl, dec!(-10));
    }

    #[tokio::test]
    async fn all_symbols_dead_still_returns_a_snapshot() {
        let (tracker, _) = tracker_with(&[]);
        let owner = Uuid::new_v4();
        tracker.add_holding(owner, "AAPL", dec!(1), dec!(100)).await.unwrap();
        tracker.add_holding(owner, "MSFT", dec!(1), dec!(200)).await.unwrap();

        let snapshot = tracker.snapshot(owner).await.unwrap();
        assert_eq!(snapshot.total_investment, dec!(300));
        assert_eq!(snapshot.current_value, dec!(0));
        assert_eq!(snapshot.unrealized_pl, dec!(-300));
        assert!(snapshot.positions.iter().all(|p| p.latest_price.is_none()));
    }

    #[tokio::test]
    async fn absent_price_is_distinct_from_zero_price() {
        let (tracker, _) = tracker_with(&[("FLAT", dec!(0))]);
        let owner = Uuid::new_v4();
        tracker.add_holding(owner, "FLAT", dec!(5), dec!(1)).await.unwrap();
        tracker.add_holding(owner, "DEAD", dec!(5), dec!(1)).await.unwrap();

        let snapshot = tracker.snapshot(owner).await.unwrap();
        // A real zero price is reported as zero, not dropped.
        assert_eq!(snapshot.positions[0].latest_price, Some(dec!(0)));
        assert_eq!(snapshot.positions[1].latest_price, None);
        assert_eq!(snapshot.current_value, dec!(0));
    }
}

mod lookup_dedup {
    use super::*;

    #[tokio::test]
    async fn distinct_symbols_are_each_fetched_once() {
        let (tracker, calls) = tracker_with(&[("AAPL", dec!(120)), ("MSFT", dec!(415))]);
        let owner = Uuid::new_v4();
        tracker.add_holding(owner, "AAPL", dec!(1), dec!(100)).await.unwrap();
        tracker.add_holding(owner, "MSFT", dec!(1), dec!(400)).await.unwrap();
        tracker.add_holding(owner, "AAPL", dec!(2), dec!(110)).await.unwrap();

        tracker.snapshot(owner).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn consecutive_snapshots_reuse_the_cache() {
        let (tracker, calls) = tracker_with(&[("AAPL", dec!(120))]);
        let owner = Uuid::new_v4();
        tracker.add_holding(owner, "AAPL", dec!(1), dec!(100)).await.unwrap();

        tracker.snapshot(owner).await.unwrap();
        tracker.snapshot(owner).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

mod isolation {
    use super::*;

    #[tokio::test]
    async fn snapshot_never_includes_other_owners_holdings() {
        let (tracker, _) = tracker_with(&[("AAPL", dec!(120))]);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        tracker.add_holding(alice, "AAPL", dec!(2), dec!(100)).await.unwrap();

        let bob_snapshot = tracker.snapshot(bob).await.unwrap();
        assert!(bob_snapshot.positions.is_empty());
        assert_eq!(bob_snapshot.total_investment, dec!(0));
    }
}
