use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::holding::Holding;

/// A holding joined with its current market price, if one could be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub holding: Holding,

    /// Latest per-unit market price. `None` means the quote source could not
    /// resolve the symbol — deliberately distinct from a real price of zero.
    pub latest_price: Option<Decimal>,
}

impl Position {
    /// Market value of this position: price × quantity, or zero while the
    /// price is unresolved.
    pub fn market_value(&self) -> Decimal {
        self.latest_price
            .map(|price| price * self.holding.quantity)
            .unwrap_or(Decimal::ZERO)
    }

    /// Acquisition cost of this position: buy price × quantity.
    pub fn invested(&self) -> Decimal {
        self.holding.buy_price * self.holding.quantity
    }
}

/// The read-time view of one owner's portfolio: every holding joined with
/// the freshest resolvable price, plus aggregate totals.
///
/// Recomputed on every read, never persisted. Totals are rounded to two
/// decimal places and `unrealized_pl` is derived from the rounded totals, so
/// `current_value - total_investment == unrealized_pl` holds exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    /// Positions in holding insertion order
    pub positions: Vec<Position>,

    /// Σ buy_price × quantity over all positions
    pub total_investment: Decimal,

    /// Σ latest_price × quantity over priced positions
    pub current_value: Decimal,

    /// current_value − total_investment
    pub unrealized_pl: Decimal,
}

impl PortfolioSnapshot {
    /// Build a snapshot from resolved positions, computing the totals.
    pub fn from_positions(positions: Vec<Position>) -> Self {
        let total_investment = positions
            .iter()
            .map(Position::invested)
            .sum::<Decimal>()
            .round_dp(2);
        let current_value = positions
            .iter()
            .map(Position::market_value)
            .sum::<Decimal>()
            .round_dp(2);
        let unrealized_pl = current_value - total_investment;

        Self {
            positions,
            total_investment,
            current_value,
            unrealized_pl,
        }
    }
}
