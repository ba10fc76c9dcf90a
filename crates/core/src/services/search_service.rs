use std::sync::Arc;

use log::warn;

use crate::models::quote::SymbolMatch;
use crate::providers::registry::QuoteSourceRegistry;

/// Upper bound on results returned to the caller.
const MAX_RESULTS: usize = 10;

/// Resolves a partial user query to ranked ticker candidates.
///
/// Degrade policy: an empty or whitespace query short-circuits to an empty
/// list without touching any source (the guard that keeps empty autocomplete
/// keystrokes off the upstream), and a source failure also yields an empty
/// list. Autocomplete never errors.
pub struct SearchService {
    registry: Arc<QuoteSourceRegistry>,
}

impl SearchService {
    pub fn new(registry: Arc<QuoteSourceRegistry>) -> Self {
        Self { registry }
    }

    pub async fn search(&self, query: &str) -> Vec<SymbolMatch> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        match self.registry.search_symbols(query).await {
            Ok(mut matches) => {
                matches.truncate(MAX_RESULTS);
                matches
            }
            Err(e) => {
                warn!("symbol search degraded to empty for {query:?}: {e}");
                Vec::new()
            }
        }
    }
}
