use std::path::PathBuf;

use log::{debug, info};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::holding::{normalize_symbol, Holding};
use crate::storage::manager::StorageManager;

/// Owner-scoped CRUD over the durable holdings collection.
///
/// Holdings live in memory in insertion order and are written through to a
/// versioned binary file after every mutation (when a path is configured).
/// Every read sees the result of every prior completed write.
pub struct HoldingsService {
    holdings: RwLock<Vec<Holding>>,
    path: Option<PathBuf>,
}

impl HoldingsService {
    /// Purely in-memory store with no durable file (tests, ephemeral runs).
    pub fn in_memory() -> Self {
        Self {
            holdings: RwLock::new(Vec::new()),
            path: None,
        }
    }

    /// Store backed by `path`; loads the existing file when present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let holdings = if path.exists() {
            StorageManager::load_from_file(&path)?
        } else {
            Vec::new()
        };
        info!(
            "holdings store opened at {} ({} rows)",
            path.display(),
            holdings.len()
        );
        Ok(Self {
            holdings: RwLock::new(holdings),
            path: Some(path),
        })
    }

    /// Record a new holding for `owner_id`.
    ///
    /// Rules:
    /// - symbol must be non-empty after trimming (stored uppercased)
    /// - quantity must be positive
    /// - buy price must be non-negative
    pub async fn add(
        &self,
        owner_id: Uuid,
        symbol: &str,
        quantity: Decimal,
        buy_price: Decimal,
    ) -> Result<Holding, CoreError> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(CoreError::Validation("Symbol must not be empty".into()));
        }
        if quantity <= Decimal::ZERO {
            return Err(CoreError::Validation(format!(
                "Quantity must be positive, got {quantity}"
            )));
        }
        if buy_price < Decimal::ZERO {
            return Err(CoreError::Validation(format!(
                "Buy price must not be negative, got {buy_price}"
            )));
        }

        let holding = Holding::new(owner_id, symbol, quantity, buy_price);

        let mut holdings = self.holdings.write().await;
        holdings.push(holding.clone());
        if let Err(e) = self.persist(&holdings).await {
            // Rollback: the store and the file must agree.
            holdings.pop();
            return Err(e);
        }

        debug!("added holding {} ({})", holding.id, holding.symbol);
        Ok(holding)
    }

    /// All holdings owned by `owner_id`, in insertion order.
    pub async fn list(&self, owner_id: Uuid) -> Vec<Holding> {
        self.holdings
            .read()
            .await
            .iter()
            .filter(|h| h.owner_id == owner_id)
            .cloned()
            .collect()
    }

    /// Delete one of `owner_id`'s holdings by id.
    ///
    /// A holding owned by someone else is indistinguishable from a missing
    /// one: both fail with `HoldingNotFound`, so ids never leak across
    /// owners.
    pub async fn remove(&self, owner_id: Uuid, id: Uuid) -> Result<(), CoreError> {
        let mut holdings = self.holdings.write().await;
        let idx = holdings
            .iter()
            .position(|h| h.id == id && h.owner_id == owner_id)
            .ok_or_else(|| CoreError::HoldingNotFound(id.to_string()))?;

        let removed = holdings.remove(idx);
        if let Err(e) = self.persist(&holdings).await {
            // Rollback: re-insert at the original position.
            holdings.insert(idx, removed);
            return Err(e);
        }

        debug!("removed holding {} ({})", id, removed.symbol);
        Ok(())
    }

    async fn persist(&self, holdings: &[Holding]) -> Result<(), CoreError> {
        if let Some(path) = &self.path {
            let bytes = StorageManager::save_to_bytes(holdings)?;
            tokio::fs::write(path, bytes).await?;
        }
        Ok(())
    }
}
