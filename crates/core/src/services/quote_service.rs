use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::{Duration, Instant};

use log::{debug, warn};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::errors::CoreError;
use crate::models::holding::normalize_symbol;
use crate::providers::registry::QuoteSourceRegistry;

/// Tuning knobs for the quote cache.
#[derive(Debug, Clone)]
pub struct QuoteCacheConfig {
    /// How long a fetched price counts as fresh.
    pub ttl: Duration,

    /// Hard cap on cached symbols; least-recently-used entries are evicted
    /// beyond this.
    pub max_entries: usize,

    /// Entries unused for this long are dropped regardless of the cap.
    pub idle: Duration,
}

impl Default for QuoteCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(15),
            max_entries: 256,
            idle: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    price: Decimal,
    fetched_at: Instant,
    last_used: Instant,
}

/// Resolves ticker symbols to current prices through the source registry,
/// with a short-lived cache in front.
///
/// Failure policy: a stale entry is served (and stays stale) when its
/// refresh fails; only a symbol with no cached value at all surfaces
/// `QuoteUnavailable`. Concurrent lookups for one symbol share a single
/// upstream fetch.
pub struct QuoteService {
    registry: Arc<QuoteSourceRegistry>,
    config: QuoteCacheConfig,
    entries: StdMutex<HashMap<String, CacheEntry>>,
    /// Per-symbol fetch locks: whoever holds a symbol's lock is the one
    /// talking to the upstream for it.
    inflight: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl QuoteService {
    pub fn new(registry: Arc<QuoteSourceRegistry>) -> Self {
        Self::with_config(registry, QuoteCacheConfig::default())
    }

    pub fn with_config(registry: Arc<QuoteSourceRegistry>, config: QuoteCacheConfig) -> Self {
        Self {
            registry,
            config,
            entries: StdMutex::new(HashMap::new()),
            inflight: StdMutex::new(HashMap::new()),
        }
    }

    /// Current price for `symbol`.
    ///
    /// 1. Fresh cached entry → returned as-is.
    /// 2. Stale or missing → one upstream fetch, shared across concurrent
    ///    callers, stored on success.
    /// 3. Fetch failed → stale entry served degraded when present, otherwise
    ///    `QuoteUnavailable`.
    pub async fn get(&self, symbol: &str) -> Result<Decimal, CoreError> {
        let symbol = normalize_symbol(symbol);

        if let Some(price) = self.fresh_price(&symbol) {
            return Ok(price);
        }

        let result = self.resolve(&symbol).await;
        self.prune_flight(&symbol);
        result
    }

    /// Number of cached symbols, fresh or stale.
    pub fn cached_symbols(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    async fn resolve(&self, symbol: &str) -> Result<Decimal, CoreError> {
        // Serialize upstream fetches per symbol; late arrivals block here
        // and then hit the cache the leader just populated.
        let flight = self.flight_lock(symbol);
        let _guard = flight.lock().await;

        if let Some(price) = self.fresh_price(symbol) {
            debug!("quote for {symbol} resolved by a concurrent fetch");
            return Ok(price);
        }

        match self.registry.fetch_price(symbol).await {
            Ok(price) => {
                self.store(symbol, price);
                Ok(price)
            }
            Err(e) => {
                // The entry keeps its old fetch time, so the next call
                // attempts another refresh.
                if let Some(stale) = self.stale_price(symbol) {
                    warn!("serving stale quote for {symbol}: {e}");
                    return Ok(stale);
                }
                warn!("no quote available for {symbol}: {e}");
                Err(CoreError::QuoteUnavailable(symbol.to_string()))
            }
        }
    }

    fn fresh_price(&self, symbol: &str) -> Option<Decimal> {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        let entry = entries.get_mut(symbol)?;
        if now.duration_since(entry.fetched_at) < self.config.ttl {
            entry.last_used = now;
            Some(entry.price)
        } else {
            None
        }
    }

    fn stale_price(&self, symbol: &str) -> Option<Decimal> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.get_mut(symbol)?;
        entry.last_used = Instant::now();
        Some(entry.price)
    }

    fn store(&self, symbol: &str, price: Decimal) {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();

        if !entries.contains_key(symbol) {
            // Drop entries nobody has asked about lately, then enforce the
            // LRU cap before inserting.
            let idle = self.config.idle;
            entries.retain(|_, e| now.duration_since(e.last_used) <= idle);
            while entries.len() >= self.config.max_entries.max(1) {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.last_used)
                    .map(|(s, _)| s.clone());
                match oldest {
                    Some(s) => {
                        entries.remove(&s);
                    }
                    None => break,
                }
            }
        }

        entries.insert(
            symbol.to_string(),
            CacheEntry {
                price,
                fetched_at: now,
                last_used: now,
            },
        );
    }

    fn flight_lock(&self, symbol: &str) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().unwrap();
        inflight
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn prune_flight(&self, symbol: &str) {
        let mut inflight = self.inflight.lock().unwrap();
        // Only the map still holds the lock once every caller is done.
        if let Some(lock) = inflight.get(symbol) {
            if Arc::strong_count(lock) == 1 {
                inflight.remove(symbol);
            }
        }
    }
}
