use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's recorded position in one ticker symbol.
///
/// Holdings are append-only: created on add, destroyed on delete, never
/// mutated in place. `(owner_id, id)` uniquely identifies a holding and a
/// holding is never visible to any other owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Unique identifier, scoped to the owner
    pub id: Uuid,

    /// The user who exclusively owns this holding
    pub owner_id: Uuid,

    /// Ticker symbol, trimmed and uppercased (e.g., "AAPL")
    pub symbol: String,

    /// Number of units held — strictly positive
    pub quantity: Decimal,

    /// Per-unit price at acquisition — non-negative
    pub buy_price: Decimal,

    /// When the holding was recorded
    pub added_at: DateTime<Utc>,
}

impl Holding {
    pub fn new(
        owner_id: Uuid,
        symbol: impl Into<String>,
        quantity: Decimal,
        buy_price: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            symbol: normalize_symbol(&symbol.into()),
            quantity,
            buy_price,
            added_at: Utc::now(),
        }
    }
}

/// Canonical form of a ticker symbol: surrounding whitespace stripped,
/// uppercased. Applied once on write and again on every quote lookup so the
/// cache never holds two entries for one ticker.
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}
