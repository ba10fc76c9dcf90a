use std::sync::Arc;

use env_logger::Builder;
use log::{error, info, warn, LevelFilter};

use stockfolio_core::providers::registry::QuoteSourceRegistry;
use stockfolio_core::services::holdings_service::HoldingsService;
use stockfolio_core::services::quote_service::QuoteCacheConfig;
use stockfolio_core::PortfolioTracker;

use stockfolio_server::api;
use stockfolio_server::auth::AuthService;
use stockfolio_server::config::Config;

#[tokio::main]
async fn main() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    let config = Config::from_env();

    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        error!(
            "Failed to create data directory {}: {e}",
            config.data_dir.display()
        );
        return;
    }

    let holdings = match HoldingsService::open(config.data_dir.join("holdings.sfol")) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open holdings store: {e}");
            return;
        }
    };

    let auth = match AuthService::open(
        config.data_dir.join("accounts.json"),
        config.jwt_secret.clone(),
    ) {
        Ok(auth) => Arc::new(auth),
        Err(e) => {
            error!("Failed to open account store: {e}");
            return;
        }
    };

    let registry = QuoteSourceRegistry::new_with_defaults(config.alphavantage_key.clone());
    if registry.is_empty() {
        // Quotes degrade to absent; the portfolio endpoints still work.
        warn!("No quote sources available; all prices will be reported absent");
    }

    let cache = QuoteCacheConfig {
        ttl: config.quote_ttl,
        ..QuoteCacheConfig::default()
    };
    let tracker = Arc::new(PortfolioTracker::with_cache_config(
        registry, holdings, cache,
    ));

    let routes = api::routes(tracker, auth);

    info!("Server running on http://127.0.0.1:{}", config.port);
    warp::serve(routes).run(([127, 0, 0, 1], config.port)).await;
}
